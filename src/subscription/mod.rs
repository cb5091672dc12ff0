// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener and subscriber contracts.
//!
//! Events travel in two hops:
//!
//! ```text
//! TCP read loop ──SessionEvent──▶ ListenerSlot ──▶ SessionListener (EventRouter)
//!                                                        │
//!                        ┌───────────────────────────────┴──────────────┐
//!                        ▼                                              ▼
//!               StateSubscriber (matrix entity)        OutputSubscriber (output entities)
//! ```
//!
//! - [`SessionListener`] - The one consumer of a session's events
//! - [`ListenerSlot`] - Holds at most one listener and dispatches to it
//! - [`StateSubscriber`] / [`OutputSubscriber`] - State holders fed by the router

mod listener;
mod subscriber;

pub use listener::{ListenerSlot, SessionListener};
pub use subscriber::{OutputSubscriber, StateSubscriber};
