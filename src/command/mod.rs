// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Matrix command definitions.
//!
//! Typed representations of the ASCII commands understood by the matrix
//! control interface. Every command is a single line terminated by `\r`.
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Wire form |
//! |-------------|---------|-----------|
//! | [`RouteCommand`] | Route an input to an output | `OUT01FR02` |
//! | [`SystemPowerCommand`] | Matrix power | `PON` / `POFF` |
//! | [`StatusCommand`] | Full status report | `STATUS` |
//! | [`CecCommand`] | Display control over HDMI-CEC | `OUT01 CEC PWRON` |
//!
//! # Examples
//!
//! ```
//! use blustream_lib::command::{Command, RouteCommand};
//! use blustream_lib::types::{InputId, OutputId};
//!
//! let cmd = RouteCommand {
//!     output: OutputId::new(1).unwrap(),
//!     input: InputId::new(2).unwrap(),
//! };
//!
//! assert_eq!(cmd.to_wire(), "OUT01FR02");
//! assert_eq!(cmd.to_line(), "OUT01FR02\r");
//! ```

mod cec;
mod routing;

pub use cec::{CecAction, CecCommand};
pub use routing::{RouteCommand, StatusCommand, SystemPowerCommand};

/// A command that can be sent to the matrix.
pub trait Command {
    /// Returns a short name for logging.
    fn name(&self) -> &'static str;

    /// Returns the command text without line terminator.
    fn to_wire(&self) -> String;

    /// Returns the command text as written to the socket.
    fn to_line(&self) -> String {
        format!("{}\r", self.to_wire())
    }
}
