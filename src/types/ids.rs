// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Port identifiers.
//!
//! The matrix addresses its ports with two-digit numbers, so both
//! identifiers are restricted to `1..=99`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

macro_rules! port_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub struct $name(u8);

        impl $name {
            /// Smallest valid port number.
            pub const MIN: u8 = 1;

            /// Largest valid port number.
            pub const MAX: u8 = 99;

            /// Creates a new port identifier.
            ///
            /// # Errors
            ///
            /// Returns `ValueError::OutOfRange` if `value` is 0 or greater than 99.
            pub fn new(value: u8) -> Result<Self, ValueError> {
                if !(Self::MIN..=Self::MAX).contains(&value) {
                    return Err(ValueError::OutOfRange {
                        min: u16::from(Self::MIN),
                        max: u16::from(Self::MAX),
                        actual: u16::from(value),
                    });
                }
                Ok(Self(value))
            }

            /// Returns the numeric value.
            #[must_use]
            pub const fn value(&self) -> u8 {
                self.0
            }

            /// Returns the zero-padded two-digit form used on the wire.
            #[must_use]
            pub fn wire(&self) -> String {
                format!("{:02}", self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<u8> for $name {
            type Error = ValueError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for u8 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

port_id! {
    /// Identifier of a matrix output (a downstream display port).
    ///
    /// # Examples
    ///
    /// ```
    /// use blustream_lib::types::OutputId;
    ///
    /// let out = OutputId::new(3).unwrap();
    /// assert_eq!(out.value(), 3);
    /// assert_eq!(out.wire(), "03");
    /// assert!(OutputId::new(0).is_err());
    /// ```
    OutputId
}

port_id! {
    /// Identifier of a matrix input (an upstream source port).
    InputId
}
