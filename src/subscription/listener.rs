// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session listener trait and its single-occupancy slot.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::SessionEvent;
use crate::types::{InputId, OutputId};

/// Receives the events of one matrix session.
///
/// Handlers run on the session's read-loop task. They must return quickly,
/// must not block, and must not call back into the session.
pub trait SessionListener: Send + Sync {
    /// An output now shows a different input.
    fn on_source_changed(&self, output: OutputId, input: InputId);

    /// The matrix acknowledged a routing command.
    fn on_source_change_requested(&self, _output: OutputId, _input: InputId) {}

    /// The matrix reported its power state.
    fn on_power_changed(&self, raw: &str);

    /// The session connected.
    fn on_connected(&self);

    /// The session lost its connection.
    fn on_disconnected(&self);

    /// The matrix or the transport reported an error.
    fn on_error(&self, message: &str);

    /// Dispatches an event to the matching handler.
    fn on_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::SourceChanged { output, input } => self.on_source_changed(*output, *input),
            SessionEvent::SourceChangeRequested { output, input } => {
                self.on_source_change_requested(*output, *input);
            }
            SessionEvent::PowerChanged { raw } => self.on_power_changed(raw),
            SessionEvent::Connected => self.on_connected(),
            SessionEvent::Disconnected => self.on_disconnected(),
            SessionEvent::Error { message } => self.on_error(message),
        }
    }
}

/// Holds the one listener of a session.
///
/// Installing a listener replaces the previous one. Dispatch clones the
/// listener handle and releases the lock before calling it, so a handler
/// may safely install or clear listeners.
#[derive(Default)]
pub struct ListenerSlot {
    listener: RwLock<Option<Arc<dyn SessionListener>>>,
}

impl ListenerSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a listener.
    ///
    /// Returns `true` if a previous listener was replaced.
    pub fn set(&self, listener: Arc<dyn SessionListener>) -> bool {
        self.listener.write().replace(listener).is_some()
    }

    /// Removes the listener.
    ///
    /// Returns `true` if a listener was installed.
    pub fn clear(&self) -> bool {
        self.listener.write().take().is_some()
    }

    /// Returns `true` if a listener is installed.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.listener.read().is_some()
    }

    /// Delivers an event to the listener.
    ///
    /// Returns `false` if no listener is installed and the event was dropped.
    pub fn dispatch(&self, event: &SessionEvent) -> bool {
        let listener = self.listener.read().clone();
        match listener {
            Some(listener) => {
                listener.on_event(event);
                true
            }
            None => {
                tracing::trace!(?event, "No session listener, dropping event");
                false
            }
        }
    }
}

impl std::fmt::Debug for ListenerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}
