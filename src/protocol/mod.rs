// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport implementations for talking to the matrix.
//!
//! # Protocols
//!
//! - [`TcpClient`]: the matrix telnet control interface
//! - [`MemoryProtocol`]: an in-process stand-in that records commands and
//!   lets callers inject events, for hosts testing their own integration
//!
//! A protocol owns the connection and the read side of the session. Every
//! event it observes is delivered to the [`ListenerSlot`] attached with
//! [`Protocol::attach_listeners`].

mod line_parser;
mod memory;
mod tcp;

pub use line_parser::LineParser;
pub use memory::MemoryProtocol;
pub use tcp::{TcpClient, TcpClientBuilder};

use std::sync::Weak;

use crate::command::Command;
use crate::error::Error;
use crate::subscription::ListenerSlot;

/// Trait for transports that carry commands to a matrix and events back.
#[allow(async_fn_in_trait)]
pub trait Protocol: Send + Sync {
    /// Opens the connection.
    ///
    /// Connecting an already connected session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the connection cannot be established.
    async fn connect(&self) -> Result<(), Error>;

    /// Closes the connection.
    ///
    /// Emits `Disconnected` if the session was connected.
    async fn disconnect(&self);

    /// Writes a command to the matrix.
    ///
    /// Commands are serialized: at most one is written at a time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is down, or
    /// `ProtocolError` if the write fails or times out.
    async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<(), Error>;

    /// Returns `true` while the connection is up.
    fn is_connected(&self) -> bool;

    /// Sets the slot that receives the events of this session.
    fn attach_listeners(&self, listeners: Weak<ListenerSlot>);
}
