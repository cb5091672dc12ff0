// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process protocol that records commands instead of sending them.

use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::command::{Command, StatusCommand};
use crate::error::Error;
use crate::event::SessionEvent;
use crate::protocol::Protocol;
use crate::subscription::ListenerSlot;

/// A protocol that keeps everything in memory.
///
/// Sent commands are recorded in their wire form. A `STATUS` command replays
/// the configured status report to the listener, the way a real matrix
/// answers it. Events can also be injected directly with
/// [`emit`](Self::emit).
///
/// # Examples
///
/// ```
/// use blustream_lib::event::SessionEvent;
/// use blustream_lib::protocol::MemoryProtocol;
///
/// let protocol = MemoryProtocol::new()
///     .with_status_report(vec![SessionEvent::power_changed("ON")]);
/// assert!(protocol.sent().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryProtocol {
    listeners: RwLock<Weak<ListenerSlot>>,
    connected: AtomicBool,
    sent: Mutex<Vec<String>>,
    status_report: Mutex<Vec<SessionEvent>>,
}

impl MemoryProtocol {
    /// Creates a disconnected protocol with an empty status report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the events replayed when `STATUS` is sent.
    #[must_use]
    pub fn with_status_report(self, events: Vec<SessionEvent>) -> Self {
        *self.status_report.lock() = events;
        self
    }

    /// Replaces the events replayed when `STATUS` is sent.
    pub fn set_status_report(&self, events: Vec<SessionEvent>) {
        *self.status_report.lock() = events;
    }

    /// Returns the wire form of every command sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Forgets the recorded commands.
    pub fn clear_sent(&self) {
        self.sent.lock().clear();
    }

    /// Delivers an event as if it had been received from the matrix.
    pub fn emit(&self, event: &SessionEvent) {
        if let Some(slot) = self.listeners.read().upgrade() {
            slot.dispatch(event);
        }
    }

    /// Drops the connection as if the matrix had gone away.
    pub fn drop_connection(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.emit(&SessionEvent::Disconnected);
        }
    }
}

impl Protocol for MemoryProtocol {
    async fn connect(&self) -> Result<(), Error> {
        if !self.connected.swap(true, Ordering::SeqCst) {
            self.emit(&SessionEvent::Connected);
        }
        Ok(())
    }

    async fn disconnect(&self) {
        self.drop_connection();
    }

    async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<(), Error> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let wire = command.to_wire();
        let is_status = wire == StatusCommand.to_wire();
        self.sent.lock().push(wire);

        if is_status {
            let report = self.status_report.lock().clone();
            for event in &report {
                self.emit(event);
            }
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn attach_listeners(&self, listeners: Weak<ListenerSlot>) {
        *self.listeners.write() = listeners;
    }
}
