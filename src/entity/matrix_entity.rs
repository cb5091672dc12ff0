// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity representing the matrix itself.

use std::sync::Arc;

use tokio::sync::watch;

use super::{ActionOutcome, DeviceInfo, EntityFeatures, EntityState, action_outcome};
use crate::error::Error;
use crate::matrix::Matrix;
use crate::protocol::Protocol;
use crate::subscription::StateSubscriber;
use crate::types::PowerState;

/// The whole matrix, with its power state.
#[derive(Debug)]
pub struct MatrixEntity<P: Protocol> {
    matrix: Arc<Matrix<P>>,
    unique_id: String,
    device_info: DeviceInfo,
    state: watch::Sender<EntityState>,
}

impl<P: Protocol> MatrixEntity<P> {
    /// Features of the matrix entity.
    pub const FEATURES: EntityFeatures = EntityFeatures(
        EntityFeatures::TURN_ON.bits() | EntityFeatures::TURN_OFF.bits(),
    );

    /// Creates the entity. Its power starts out unknown.
    #[must_use]
    pub fn new(matrix: Arc<Matrix<P>>) -> Self {
        let info = matrix.info();
        let unique_id = info.device_id();
        let device_info = DeviceInfo::for_matrix(info);
        let (state, _) = watch::channel(EntityState::default());
        Self {
            matrix,
            unique_id,
            device_info,
            state,
        }
    }

    /// Returns the stable identifier (the formatted MAC address).
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.device_info.name
    }

    /// Returns the device registry information.
    #[must_use]
    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> EntityState {
        self.state.borrow().clone()
    }

    /// Returns the current power state.
    #[must_use]
    pub fn power(&self) -> PowerState {
        self.state.borrow().power
    }

    /// Returns a receiver that observes state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EntityState> {
        self.state.subscribe()
    }

    /// Turns the matrix on.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be sent.
    pub async fn turn_on(&self) -> Result<ActionOutcome, Error> {
        action_outcome(&self.unique_id, "turn_on", self.matrix.set_power(true).await)
    }

    /// Turns the matrix off.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be sent.
    pub async fn turn_off(&self) -> Result<ActionOutcome, Error> {
        action_outcome(&self.unique_id, "turn_off", self.matrix.set_power(false).await)
    }
}

impl<P: Protocol> StateSubscriber for MatrixEntity<P> {
    fn set_state(&self, state: PowerState) {
        if self.state.send_if_modified(|current| current.apply_power(state)) {
            tracing::debug!(entity = %self.unique_id, state = %state, "Matrix state updated");
        }
    }
}
