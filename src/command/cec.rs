// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HDMI-CEC side-channel commands.
//!
//! These are forwarded by the matrix to the display attached to an output.
//! The display gives no feedback, so none of them produces an event.

use std::fmt;

use crate::capabilities::Capabilities;
use crate::command::Command;
use crate::types::{OutputId, VolumeDirection};

/// What to ask the display to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CecAction {
    /// Wake the display.
    PowerOn,
    /// Put the display in standby.
    PowerOff,
    /// One volume step up.
    VolumeUp,
    /// One volume step down.
    VolumeDown,
    /// Toggle mute.
    Mute,
}

impl CecAction {
    /// Returns the wire keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PowerOn => "PWRON",
            Self::PowerOff => "PWROFF",
            Self::VolumeUp => "VOL+",
            Self::VolumeDown => "VOL-",
            Self::Mute => "MUTE",
        }
    }

    /// Returns the name of the capability this action needs.
    #[must_use]
    pub const fn capability_name(&self) -> &'static str {
        match self {
            Self::PowerOn | Self::PowerOff => "CEC power",
            Self::VolumeUp | Self::VolumeDown => "CEC volume",
            Self::Mute => "CEC mute",
        }
    }

    /// Returns whether the given capabilities allow this action.
    #[must_use]
    pub const fn is_supported_by(&self, capabilities: &Capabilities) -> bool {
        match self {
            Self::PowerOn | Self::PowerOff => capabilities.supports_output_power(),
            Self::VolumeUp | Self::VolumeDown => capabilities.supports_volume_step(),
            Self::Mute => capabilities.supports_mute(),
        }
    }

    /// Returns the power action for the given target state.
    #[must_use]
    pub const fn power(on: bool) -> Self {
        if on { Self::PowerOn } else { Self::PowerOff }
    }
}

impl From<VolumeDirection> for CecAction {
    fn from(direction: VolumeDirection) -> Self {
        match direction {
            VolumeDirection::Up => Self::VolumeUp,
            VolumeDirection::Down => Self::VolumeDown,
        }
    }
}

impl fmt::Display for CecAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CEC command addressed to the display on one output.
///
/// # Examples
///
/// ```
/// use blustream_lib::command::{CecAction, CecCommand, Command};
/// use blustream_lib::types::OutputId;
///
/// let cmd = CecCommand::new(OutputId::new(2).unwrap(), CecAction::VolumeUp);
/// assert_eq!(cmd.to_wire(), "OUT02 CEC VOL+");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CecCommand {
    /// Target output.
    pub output: OutputId,
    /// Requested action.
    pub action: CecAction,
}

impl CecCommand {
    /// Creates a CEC command.
    #[must_use]
    pub const fn new(output: OutputId, action: CecAction) -> Self {
        Self { output, action }
    }
}

impl Command for CecCommand {
    fn name(&self) -> &'static str {
        "cec"
    }

    fn to_wire(&self) -> String {
        format!("OUT{} CEC {}", self.output.wire(), self.action)
    }
}
