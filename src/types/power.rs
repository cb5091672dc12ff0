// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power and volume types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Observable power state of the matrix or one of its outputs.
///
/// `Unknown` stands for "no trustworthy telemetry": before the first status
/// report, after a disconnect, and whenever the matrix reports a value that
/// is neither `ON` nor `OFF`.
///
/// # Examples
///
/// ```
/// use blustream_lib::types::PowerState;
///
/// assert_eq!(PowerState::from_raw("ON"), PowerState::On);
/// assert_eq!(PowerState::from_raw("OFF"), PowerState::Off);
/// assert_eq!(PowerState::from_raw("STANDBY"), PowerState::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    /// Powered on.
    On,
    /// Powered off.
    Off,
    /// State cannot be determined.
    #[default]
    Unknown,
}

impl PowerState {
    /// Maps a raw power value reported by the matrix.
    ///
    /// Only the exact strings `"ON"` and `"OFF"` are recognized; anything
    /// else is `Unknown`.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "ON" => Self::On,
            "OFF" => Self::Off,
            _ => Self::Unknown,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns `true` if the state is known.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Direction of a single volume step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeDirection {
    /// One step louder.
    Up,
    /// One step quieter.
    Down,
}

impl fmt::Display for VolumeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}
