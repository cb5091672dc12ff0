// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity representing one matrix output.

use std::sync::Arc;

use tokio::sync::watch;

use super::{ActionOutcome, DeviceInfo, EntityFeatures, EntityState, action_outcome};
use crate::error::Error;
use crate::matrix::Matrix;
use crate::protocol::Protocol;
use crate::subscription::{OutputSubscriber, StateSubscriber};
use crate::types::{InputId, OutputId, PowerState, VolumeDirection};

/// One output of the matrix and the display attached to it.
///
/// Displays give no power feedback, so the power state follows the matrix
/// and starts out unknown.
#[derive(Debug)]
pub struct OutputEntity<P: Protocol> {
    matrix: Arc<Matrix<P>>,
    output: OutputId,
    unique_id: String,
    device_info: DeviceInfo,
    source_list: Vec<String>,
    state: watch::Sender<EntityState>,
}

impl<P: Protocol> OutputEntity<P> {
    /// Features of an output entity.
    pub const FEATURES: EntityFeatures = EntityFeatures(
        EntityFeatures::SELECT_SOURCE.bits()
            | EntityFeatures::TURN_ON.bits()
            | EntityFeatures::TURN_OFF.bits()
            | EntityFeatures::VOLUME_STEP.bits()
            | EntityFeatures::VOLUME_MUTE.bits(),
    );

    /// Creates the entity for `output`, displayed as `name`.
    #[must_use]
    pub fn new(matrix: Arc<Matrix<P>>, output: OutputId, name: &str) -> Self {
        let info = matrix.info();
        let unique_id = info.output_unique_id(output);
        let device_info = DeviceInfo::for_output(info, output, name);
        let source_list = info.inputs.names();
        let (state, _) = watch::channel(EntityState::default());
        Self {
            matrix,
            output,
            unique_id,
            device_info,
            source_list,
            state,
        }
    }

    /// Returns the output this entity represents.
    #[must_use]
    pub fn output(&self) -> OutputId {
        self.output
    }

    /// Returns the stable identifier: `{device-id}-output{N}`.
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

    /// Returns the selectable source names, ordered by input id.
    #[must_use]
    pub fn source_list(&self) -> &[String] {
        &self.source_list
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

    /// Returns the name of the routed input, if known.
    #[must_use]
    pub fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    /// Returns a receiver that observes state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EntityState> {
        self.state.subscribe()
    }

    /// Routes the input called `source` to this output.
    ///
    /// An unknown name is logged and rejected without contacting the matrix.
    /// The displayed source only changes once the matrix confirms.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be sent.
    pub async fn select_source(&self, source: &str) -> Result<ActionOutcome, Error> {
        let Some(input) = self.matrix.info().inputs.id_by_name(source) else {
            tracing::error!(
                entity = %self.unique_id,
                source = %source,
                valid = ?self.source_list,
                "Invalid input source"
            );
            return Ok(ActionOutcome::Rejected);
        };
        let result = self.matrix.switch_source(self.output, input).await;
        action_outcome(&self.unique_id, "select_source", result)
    }

    /// Turns the attached display on.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be sent.
    pub async fn turn_on(&self) -> Result<ActionOutcome, Error> {
        let result = self.matrix.set_output_power(self.output, true).await;
        action_outcome(&self.unique_id, "turn_on", result)
    }

    /// Turns the attached display off.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be sent.
    pub async fn turn_off(&self) -> Result<ActionOutcome, Error> {
        let result = self.matrix.set_output_power(self.output, false).await;
        action_outcome(&self.unique_id, "turn_off", result)
    }

    /// Steps the display volume up.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be sent.
    pub async fn volume_up(&self) -> Result<ActionOutcome, Error> {
        let result = self.matrix.step_volume(self.output, VolumeDirection::Up).await;
        action_outcome(&self.unique_id, "volume_up", result)
    }

    /// Steps the display volume down.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be sent.
    pub async fn volume_down(&self) -> Result<ActionOutcome, Error> {
        let result = self.matrix.step_volume(self.output, VolumeDirection::Down).await;
        action_outcome(&self.unique_id, "volume_down", result)
    }

    /// Mutes or unmutes the display.
    ///
    /// CEC only knows a mute toggle, so both directions send the same command.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be sent.
    pub async fn mute_volume(&self, mute: bool) -> Result<ActionOutcome, Error> {
        tracing::debug!(entity = %self.unique_id, mute, "Toggling mute");
        let result = self.matrix.toggle_mute(self.output).await;
        action_outcome(&self.unique_id, "mute_volume", result)
    }
}

impl<P: Protocol> StateSubscriber for OutputEntity<P> {
    fn set_state(&self, state: PowerState) {
        if self.state.send_if_modified(|current| current.apply_power(state)) {
            tracing::debug!(entity = %self.unique_id, state = %state, "Output state updated");
        }
    }
}

impl<P: Protocol> OutputSubscriber for OutputEntity<P> {
    fn set_source(&self, input: InputId) {
        let Some(name) = self.matrix.info().inputs.name(input) else {
            tracing::debug!(entity = %self.unique_id, input = %input, "Unknown input, keeping current source");
            return;
        };
        if self.state.send_if_modified(|current| current.apply_source(name)) {
            tracing::debug!(entity = %self.unique_id, source = %name, "Output source updated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{Capabilities, CapabilitiesBuilder};
    use crate::config::MatrixConfig;
    use crate::protocol::MemoryProtocol;
    use crate::types::MacAddress;

    fn inp(n: u8) -> InputId {
        InputId::new(n).unwrap()
    }

    async fn entity(capabilities: Capabilities) -> OutputEntity<MemoryProtocol> {
        let output = OutputId::new(10).unwrap();
        let info = MatrixConfig::new("10.0.0.9", MacAddress::from_octets([1, 2, 3, 4, 5, 6]))
            .with_input(inp(1), "HDMI1")
            .with_input(inp(2), "HDMI2")
            .with_output(output, "Living Room")
            .validate()
            .unwrap();
        let matrix = Arc::new(Matrix::new(MemoryProtocol::new(), info, capabilities));
        matrix.connect().await.unwrap();
        OutputEntity::new(matrix, output, "Living Room")
    }

    fn sent(entity: &OutputEntity<MemoryProtocol>) -> Vec<String> {
        entity.matrix.protocol().sent()
    }

    #[tokio::test]
    async fn identity_and_sources() {
        let entity = entity(Capabilities::full()).await;
        assert_eq!(entity.unique_id(), "01:02:03:04:05:06-output10");
        assert_eq!(entity.name(), "Living Room");
        assert_eq!(entity.source_list(), ["HDMI1", "HDMI2"]);
        assert_eq!(entity.power(), PowerState::Unknown);
        assert_eq!(entity.source(), None);
        assert_eq!(OutputEntity::<MemoryProtocol>::FEATURES.bits(), 2048 | 128 | 256 | 1024 | 8);
    }

    #[tokio::test]
    async fn set_source_resolves_catalog_name() {
        let entity = entity(Capabilities::full()).await;
        entity.set_source(inp(2));
        assert_eq!(entity.source().as_deref(), Some("HDMI2"));
    }

    #[tokio::test]
    async fn set_source_with_unknown_input_keeps_previous() {
        let entity = entity(Capabilities::full()).await;
        entity.set_source(inp(1));
        let before = entity.state();

        entity.set_source(inp(9));
        assert_eq!(entity.state(), before);
    }

    #[tokio::test]
    async fn select_source_sends_one_route() {
        let entity = entity(Capabilities::full()).await;
        assert_eq!(entity.select_source("HDMI2").await.unwrap(), ActionOutcome::Sent);
        assert_eq!(sent(&entity), vec!["OUT10FR02"]);
        // Displayed source waits for the matrix to confirm.
        assert_eq!(entity.source(), None);
    }

    #[tokio::test]
    async fn select_unknown_source_makes_no_call() {
        let entity = entity(Capabilities::full()).await;
        entity.set_source(inp(1));

        assert_eq!(entity.select_source("Chromecast").await.unwrap(), ActionOutcome::Rejected);
        assert!(sent(&entity).is_empty());
        assert_eq!(entity.source().as_deref(), Some("HDMI1"));
    }

    #[tokio::test]
    async fn display_actions() {
        let entity = entity(Capabilities::full()).await;
        entity.turn_on().await.unwrap();
        entity.turn_off().await.unwrap();
        entity.volume_up().await.unwrap();
        entity.volume_down().await.unwrap();
        entity.mute_volume(true).await.unwrap();
        entity.mute_volume(false).await.unwrap();

        assert_eq!(
            sent(&entity),
            vec![
                "OUT10 CEC PWRON",
                "OUT10 CEC PWROFF",
                "OUT10 CEC VOL+",
                "OUT10 CEC VOL-",
                "OUT10 CEC MUTE",
                "OUT10 CEC MUTE",
            ]
        );
    }

    #[tokio::test]
    async fn unsupported_actions_are_no_ops() {
        let entity = entity(CapabilitiesBuilder::new().with_cec_power().build()).await;

        assert_eq!(entity.turn_on().await.unwrap(), ActionOutcome::Sent);
        assert_eq!(entity.volume_up().await.unwrap(), ActionOutcome::Unsupported);
        assert_eq!(entity.mute_volume(true).await.unwrap(), ActionOutcome::Unsupported);
        assert_eq!(sent(&entity), vec!["OUT10 CEC PWRON"]);
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let entity = entity(Capabilities::full()).await;
        entity.matrix.disconnect().await;
        assert!(matches!(entity.turn_on().await, Err(Error::NotConnected)));
    }
}
