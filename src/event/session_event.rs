// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session event type.

use crate::types::{InputId, OutputId};

/// Something the matrix session observed.
///
/// Output-scoped events name the output they concern; all other events
/// concern the session as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// An output now shows a different input.
    SourceChanged {
        /// The output that switched.
        output: OutputId,
        /// The input it now shows.
        input: InputId,
    },

    /// The matrix acknowledged a routing command before applying it.
    SourceChangeRequested {
        /// The output being switched.
        output: OutputId,
        /// The requested input.
        input: InputId,
    },

    /// The matrix reported its power state.
    ///
    /// The value is passed through as reported (upper-cased); mapping to
    /// [`PowerState`](crate::types::PowerState) is up to the listener.
    PowerChanged {
        /// Raw power value, normally `"ON"` or `"OFF"`.
        raw: String,
    },

    /// The session connected.
    Connected,

    /// The session lost its connection.
    Disconnected,

    /// The matrix or the transport reported an error.
    Error {
        /// Human-readable description.
        message: String,
    },
}

impl SessionEvent {
    /// Creates a source changed event.
    #[must_use]
    pub fn source_changed(output: OutputId, input: InputId) -> Self {
        Self::SourceChanged { output, input }
    }

    /// Creates a power changed event.
    #[must_use]
    pub fn power_changed(raw: impl Into<String>) -> Self {
        Self::PowerChanged { raw: raw.into() }
    }

    /// Creates an error event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns the output this event concerns, if any.
    #[must_use]
    pub fn output(&self) -> Option<OutputId> {
        match self {
            Self::SourceChanged { output, .. } | Self::SourceChangeRequested { output, .. } => {
                Some(*output)
            }
            _ => None,
        }
    }

    /// Returns `true` if this event concerns a single output.
    #[must_use]
    pub fn is_output_scoped(&self) -> bool {
        self.output().is_some()
    }

    /// Returns `true` if this is a connection event.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connected | Self::Disconnected)
    }
}
