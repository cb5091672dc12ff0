// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Routing, power, and status commands.

use crate::command::Command;
use crate::types::{InputId, OutputId};

/// Command to route an input to an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteCommand {
    /// The output to switch.
    pub output: OutputId,
    /// The input to show on it.
    pub input: InputId,
}

impl Command for RouteCommand {
    fn name(&self) -> &'static str {
        "route"
    }

    fn to_wire(&self) -> String {
        format!("OUT{}FR{}", self.output.wire(), self.input.wire())
    }
}

/// Command to switch the whole matrix on or off.
///
/// # Examples
///
/// ```
/// use blustream_lib::command::{Command, SystemPowerCommand};
///
/// assert_eq!(SystemPowerCommand::from(true).to_wire(), "PON");
/// assert_eq!(SystemPowerCommand::Off.to_wire(), "POFF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemPowerCommand {
    /// Power on.
    On,
    /// Power off (standby).
    Off,
}

impl From<bool> for SystemPowerCommand {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl Command for SystemPowerCommand {
    fn name(&self) -> &'static str {
        "power"
    }

    fn to_wire(&self) -> String {
        match self {
            Self::On => "PON".to_string(),
            Self::Off => "POFF".to_string(),
        }
    }
}

/// Command to request a full status report.
///
/// The matrix answers with its power state and the current source of every
/// output, which the session turns into events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCommand;

impl Command for StatusCommand {
    fn name(&self) -> &'static str {
        "status"
    }

    fn to_wire(&self) -> String {
        "STATUS".to_string()
    }
}
