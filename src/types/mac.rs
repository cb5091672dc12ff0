// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hardware address type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Hardware address of a matrix, used to derive its stable identifier.
///
/// Accepts the common spellings and always formats as lowercase
/// colon-separated hex, so the same device maps to the same identifier
/// regardless of how the address was entered.
///
/// # Examples
///
/// ```
/// use blustream_lib::types::MacAddress;
///
/// let a: MacAddress = "AA-BB-CC-DD-EE-FF".parse().unwrap();
/// let b: MacAddress = "aabb.ccdd.eeff".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "aa:bb:cc:dd:ee:ff");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Creates an address from raw octets.
    #[must_use]
    pub const fn from_octets(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Returns the raw octets.
    #[must_use]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidMacAddress(s.to_string());
        let trimmed = s.trim();

        // One separator kind per address: 6 groups of 2, 3 groups of 4, or none.
        let hex = match (trimmed.contains(':'), trimmed.contains('-'), trimmed.contains('.')) {
            (true, false, false) => join_groups(trimmed, ':', 6, 2),
            (false, true, false) => join_groups(trimmed, '-', 6, 2),
            (false, false, true) => join_groups(trimmed, '.', 3, 4),
            (false, false, false) => Some(trimmed.to_string()),
            _ => None,
        }
        .ok_or_else(invalid)?;

        if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self(octets))
    }
}

/// Joins `count` groups of `width` characters split on `separator`.
fn join_groups(s: &str, separator: char, count: usize, width: usize) -> Option<String> {
    let groups: Vec<&str> = s.split(separator).collect();
    if groups.len() != count || groups.iter().any(|g| g.len() != width) {
        return None;
    }
    Some(groups.concat())
}

impl TryFrom<String> for MacAddress {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({self})")
    }
}
