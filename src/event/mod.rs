// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events emitted by a matrix session.
//!
//! A session produces [`SessionEvent`]s from its read loop (and from its own
//! lifecycle) and hands each one to its single registered
//! [`SessionListener`](crate::subscription::SessionListener).
//!
//! # Examples
//!
//! ```
//! use blustream_lib::event::SessionEvent;
//! use blustream_lib::types::{InputId, OutputId};
//!
//! let event = SessionEvent::SourceChanged {
//!     output: OutputId::new(1).unwrap(),
//!     input: InputId::new(2).unwrap(),
//! };
//! assert!(event.is_output_scoped());
//! assert!(!SessionEvent::Disconnected.is_output_scoped());
//! ```

mod session_event;

pub use session_event::SessionEvent;
