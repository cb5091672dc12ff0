// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriber traits implemented by state holders.

use crate::types::{InputId, PowerState};

/// A state holder that tracks the matrix power state.
///
/// Implementations must be fast and non-blocking: they run on the session's
/// read loop and must not call back into the session.
pub trait StateSubscriber: Send + Sync {
    /// Replaces the observable power state.
    fn set_state(&self, state: PowerState);
}

/// A state holder for one output.
pub trait OutputSubscriber: StateSubscriber {
    /// Records that the output now shows `input`.
    ///
    /// Implementations resolve the id through their input catalog and keep
    /// the previous source if the id is unknown.
    fn set_source(&self, input: InputId);
}
