// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan-out of session events to state holders.
//!
//! The [`EventRouter`] is the single listener of a matrix session. It keeps
//! one subscriber per output and a list of whole-device subscribers, and
//! decides for every event which of them hear about it:
//!
//! | Event | Receivers |
//! |-------|-----------|
//! | source changed | the subscriber of that output, if any |
//! | power changed | every device and output subscriber |
//! | disconnected | every device and output subscriber (state unknown) |
//! | connected, error, source change requested | nobody |
//!
//! # Architecture
//!
//! ```text
//! Matrix read loop: [SUCCESS]Set output 02 connect from input 01.
//!                     ↓
//!         EventRouter.on_source_changed(2, 1)
//!                     ↓
//!        outputs[2].set_source(1)
//!                     ↓
//!     OutputEntity resolves "HDMI1" and publishes its state
//! ```
//!
//! The router only keeps weak references to its subscribers. Subscribers
//! own a handle to the session, and the session owns the router, so the
//! subscribers must be kept alive by whoever created them. Dropped
//! subscribers are pruned on the next event that would reach them.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::subscription::{OutputSubscriber, SessionListener, StateSubscriber};
use crate::types::{InputId, OutputId, PowerState};

#[derive(Default)]
struct Registry {
    outputs: HashMap<OutputId, Weak<dyn OutputSubscriber>>,
    /// Output ids in first-registration order.
    order: Vec<OutputId>,
    devices: Vec<Weak<dyn StateSubscriber>>,
}

impl Registry {
    /// Drops entries whose subscriber is gone.
    fn prune(&mut self) {
        let outputs = &mut self.outputs;
        self.order.retain(|id| {
            let alive = outputs.get(id).is_some_and(|weak| weak.strong_count() > 0);
            if !alive {
                outputs.remove(id);
                tracing::debug!(output = %id, "Cleaning up dropped output subscriber");
            }
            alive
        });
        self.devices.retain(|weak| weak.strong_count() > 0);
    }
}

/// Routes session events to output and device subscribers.
///
/// Registration normally happens once during setup, but is synchronized
/// against dispatch so subscribers may also be added while events flow.
/// Within one event, device subscribers are notified first and then output
/// subscribers, each in registration order.
#[derive(Default)]
pub struct EventRouter {
    registry: RwLock<Registry>,
}

impl EventRouter {
    /// Creates a router without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the subscriber for one output.
    ///
    /// A previous subscriber for the same output is replaced; the output
    /// keeps its original position in the notification order.
    pub fn register_output_subscriber<S>(&self, output: OutputId, subscriber: &Arc<S>)
    where
        S: OutputSubscriber + 'static,
    {
        let weak: Weak<dyn OutputSubscriber> = Arc::downgrade(subscriber) as Weak<S>;
        let mut registry = self.registry.write();
        if registry.outputs.insert(output, weak).is_some() {
            tracing::debug!(output = %output, "Replaced output subscriber");
        } else {
            registry.order.push(output);
            tracing::debug!(output = %output, "Registered output subscriber");
        }
    }

    /// Registers a whole-device subscriber.
    pub fn register_device_subscriber<S>(&self, subscriber: &Arc<S>)
    where
        S: StateSubscriber + 'static,
    {
        let weak: Weak<dyn StateSubscriber> = Arc::downgrade(subscriber) as Weak<S>;
        let mut registry = self.registry.write();
        registry.devices.push(weak);
        tracing::debug!(count = registry.devices.len(), "Registered device subscriber");
    }

    /// Returns the number of registered output subscribers.
    #[must_use]
    pub fn output_count(&self) -> usize {
        self.registry.read().outputs.len()
    }

    /// Returns the number of registered device subscribers.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.registry.read().devices.len()
    }

    /// Returns `true` if a live subscriber is registered for the output.
    #[must_use]
    pub fn has_output(&self, output: OutputId) -> bool {
        self.registry
            .read()
            .outputs
            .get(&output)
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Removes registrations whose subscriber has been dropped.
    ///
    /// This happens automatically during dispatch, but can be called
    /// manually to release memory.
    pub fn cleanup(&self) {
        self.registry.write().prune();
    }

    /// Sends a power state to every subscriber.
    fn broadcast(&self, state: PowerState) {
        let (devices, outputs) = self.snapshot();
        for device in &devices {
            device.set_state(state);
        }
        for output in &outputs {
            output.set_state(state);
        }
    }

    /// Upgrades the subscriber handles so no lock is held while notifying.
    fn snapshot(&self) -> (Vec<Arc<dyn StateSubscriber>>, Vec<Arc<dyn OutputSubscriber>>) {
        let (devices, outputs, registered) = {
            let registry = self.registry.read();
            let devices: Vec<_> = registry.devices.iter().filter_map(Weak::upgrade).collect();
            let outputs: Vec<_> = registry
                .order
                .iter()
                .filter_map(|id| registry.outputs.get(id).and_then(Weak::upgrade))
                .collect();
            (devices, outputs, registry.devices.len() + registry.order.len())
        };
        if devices.len() + outputs.len() < registered {
            self.cleanup();
        }
        (devices, outputs)
    }
}

impl SessionListener for EventRouter {
    fn on_source_changed(&self, output: OutputId, input: InputId) {
        let subscriber = self.registry.read().outputs.get(&output).map(Weak::upgrade);
        match subscriber {
            Some(Some(subscriber)) => {
                tracing::debug!(output = %output, input = %input, "Source changed");
                subscriber.set_source(input);
            }
            Some(None) => {
                tracing::debug!(output = %output, input = %input, "Output subscriber dropped, dropping source change");
                self.cleanup();
            }
            None => {
                tracing::debug!(output = %output, input = %input, "No subscriber for output, dropping source change");
            }
        }
    }

    fn on_source_change_requested(&self, output: OutputId, input: InputId) {
        tracing::trace!(output = %output, input = %input, "Source change requested");
    }

    fn on_power_changed(&self, raw: &str) {
        let state = PowerState::from_raw(raw);
        tracing::info!(raw = %raw, state = %state, "Power changed");
        self.broadcast(state);
    }

    fn on_connected(&self) {
        // State stays as is until the matrix reports it.
        tracing::debug!("Matrix connected");
    }

    fn on_disconnected(&self) {
        tracing::warn!("Matrix disconnected");
        self.broadcast(PowerState::Unknown);
    }

    fn on_error(&self, message: &str) {
        tracing::error!(message = %message, "Matrix error");
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("EventRouter")
            .field("outputs", &registry.order)
            .field("devices", &registry.devices.len())
            .finish()
    }
}
