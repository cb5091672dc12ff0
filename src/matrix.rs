// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level session with one HDMI matrix.
//!
//! [`Matrix`] validates identifiers and capabilities before anything reaches
//! the transport, and forwards every event the transport observes to the one
//! registered [`SessionListener`].

use std::sync::Arc;

use crate::capabilities::Capabilities;
use crate::catalog::MatrixInfo;
use crate::command::{CecAction, CecCommand, Command, RouteCommand, StatusCommand, SystemPowerCommand};
use crate::config::MatrixConfig;
use crate::error::{DeviceError, Error};
use crate::protocol::{Protocol, TcpClient};
use crate::subscription::{ListenerSlot, SessionListener};
use crate::types::{InputId, OutputId, VolumeDirection};

/// A session with one matrix switcher.
///
/// # Creating a Matrix
///
/// ```no_run
/// use blustream_lib::{Matrix, MatrixConfig};
/// use blustream_lib::types::{InputId, OutputId};
///
/// # async fn example() -> blustream_lib::Result<()> {
/// let config = MatrixConfig::new("192.168.1.40", "00:1a:2b:3c:4d:5e".parse()?)
///     .with_input(InputId::new(1)?, "Apple TV")
///     .with_output(OutputId::new(1)?, "Living Room");
///
/// let matrix = Matrix::tcp(&config)?;
/// matrix.connect().await?;
/// matrix.switch_source(OutputId::new(1)?, InputId::new(1)?).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Matrix<P: Protocol> {
    protocol: Arc<P>,
    info: MatrixInfo,
    capabilities: Capabilities,
    listeners: Arc<ListenerSlot>,
}

impl<P: Protocol> Matrix<P> {
    /// Creates a session over the given protocol.
    pub fn new(protocol: P, info: MatrixInfo, capabilities: Capabilities) -> Self {
        let listeners = Arc::new(ListenerSlot::new());
        protocol.attach_listeners(Arc::downgrade(&listeners));
        Self {
            protocol: Arc::new(protocol),
            info,
            capabilities,
            listeners,
        }
    }

    /// Returns the matrix identity and catalogs.
    #[must_use]
    pub fn info(&self) -> &MatrixInfo {
        &self.info
    }

    /// Returns the matrix capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the underlying protocol.
    #[must_use]
    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    /// Returns `true` while the session is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.protocol.is_connected()
    }

    /// Installs the listener that receives every session event.
    ///
    /// A session has exactly one listener; installing another replaces it.
    pub fn register_listener(&self, listener: Arc<dyn SessionListener>) {
        if self.listeners.set(listener) {
            tracing::warn!(matrix = %self.info.name, "Replaced existing session listener");
        } else {
            tracing::debug!(matrix = %self.info.name, "Registered session listener");
        }
    }

    /// Removes the session listener.
    pub fn clear_listener(&self) {
        self.listeners.clear();
    }

    // ========== Connection ==========

    /// Opens the connection.
    ///
    /// # Errors
    ///
    /// Returns error if the connection cannot be established.
    pub async fn connect(&self) -> Result<(), Error> {
        self.protocol.connect().await
    }

    /// Closes the connection.
    pub async fn disconnect(&self) {
        self.protocol.disconnect().await;
    }

    // ========== Routing ==========

    /// Routes an input to an output.
    ///
    /// # Errors
    ///
    /// Returns error if either port is not in the catalog or the command fails.
    pub async fn switch_source(&self, output: OutputId, input: InputId) -> Result<(), Error> {
        self.check_output(output)?;
        if !self.info.inputs.contains(input) {
            return Err(DeviceError::UnknownInput(input.value()).into());
        }
        tracing::debug!(output = %output, input = %input, "Switching source");
        self.send_command(&RouteCommand { output, input }).await
    }

    /// Asks the matrix to report its full state.
    ///
    /// The answer arrives as events: one power change and one source change
    /// per output.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn request_status_refresh(&self) -> Result<(), Error> {
        self.send_command(&StatusCommand).await
    }

    // ========== Power ==========

    /// Turns the whole matrix on or off.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_power(&self, on: bool) -> Result<(), Error> {
        self.send_command(&SystemPowerCommand::from(on)).await
    }

    /// Turns the display attached to an output on or off.
    ///
    /// # Errors
    ///
    /// Returns error if the output is unknown, the matrix lacks CEC power
    /// control, or the command fails.
    pub async fn set_output_power(&self, output: OutputId, on: bool) -> Result<(), Error> {
        self.send_cec(output, CecAction::power(on)).await
    }

    // ========== Volume ==========

    /// Steps the volume of the display attached to an output.
    ///
    /// # Errors
    ///
    /// Returns error if the output is unknown, the matrix lacks CEC volume
    /// control, or the command fails.
    pub async fn step_volume(&self, output: OutputId, direction: VolumeDirection) -> Result<(), Error> {
        self.send_cec(output, CecAction::from(direction)).await
    }

    /// Toggles mute on the display attached to an output.
    ///
    /// # Errors
    ///
    /// Returns error if the output is unknown, the matrix lacks CEC mute
    /// control, or the command fails.
    pub async fn toggle_mute(&self, output: OutputId) -> Result<(), Error> {
        self.send_cec(output, CecAction::Mute).await
    }

    // ========== Helpers ==========

    async fn send_cec(&self, output: OutputId, action: CecAction) -> Result<(), Error> {
        self.check_output(output)?;
        self.check_capability(action.capability_name(), action.is_supported_by(&self.capabilities))?;
        tracing::debug!(output = %output, action = %action, "Sending CEC command");
        self.send_command(&CecCommand::new(output, action)).await
    }

    async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<(), Error> {
        self.protocol.send_command(command).await
    }

    fn check_output(&self, output: OutputId) -> Result<(), Error> {
        if self.info.outputs.contains(output) {
            Ok(())
        } else {
            Err(DeviceError::UnknownOutput(output.value()).into())
        }
    }

    /// Checks if a capability is supported.
    // Uses &self for method call syntax consistency, even though it only needs the parameters.
    #[allow(clippy::unused_self)]
    fn check_capability(&self, name: &str, supported: bool) -> Result<(), Error> {
        if supported {
            Ok(())
        } else {
            Err(Error::Device(DeviceError::UnsupportedCapability {
                capability: name.to_string(),
            }))
        }
    }
}

// ========== TCP Matrix ==========

impl Matrix<TcpClient> {
    /// Creates a TCP session from a configuration. No connection is opened.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn tcp(config: &MatrixConfig) -> Result<Self, Error> {
        let info = config.validate()?;
        let client = TcpClient::from_config(config);
        Ok(Self::new(client, info, config.capabilities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MemoryProtocol;
    use crate::types::MacAddress;

    fn config() -> MatrixConfig {
        MatrixConfig::new("10.0.0.2", MacAddress::from_octets([0, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]))
            .with_input(InputId::new(1).unwrap(), "HDMI1")
            .with_input(InputId::new(2).unwrap(), "HDMI2")
            .with_output(OutputId::new(1).unwrap(), "Living Room")
    }

    async fn connected(capabilities: Capabilities) -> Matrix<MemoryProtocol> {
        let matrix = Matrix::new(MemoryProtocol::new(), config().validate().unwrap(), capabilities);
        matrix.connect().await.unwrap();
        matrix
    }

    fn out(n: u8) -> OutputId {
        OutputId::new(n).unwrap()
    }

    fn inp(n: u8) -> InputId {
        InputId::new(n).unwrap()
    }

    #[tokio::test]
    async fn switch_source_sends_route() {
        let matrix = connected(Capabilities::full()).await;
        matrix.switch_source(out(1), inp(2)).await.unwrap();
        assert_eq!(matrix.protocol().sent(), vec!["OUT01FR02"]);
    }

    #[tokio::test]
    async fn switch_source_rejects_unknown_ports() {
        let matrix = connected(Capabilities::full()).await;

        let err = matrix.switch_source(out(9), inp(1)).await.unwrap_err();
        assert!(matches!(err, Error::Device(DeviceError::UnknownOutput(9))));

        let err = matrix.switch_source(out(1), inp(7)).await.unwrap_err();
        assert!(matches!(err, Error::Device(DeviceError::UnknownInput(7))));

        assert!(matrix.protocol().sent().is_empty());
    }

    #[tokio::test]
    async fn power_and_cec_commands() {
        let matrix = connected(Capabilities::full()).await;
        matrix.set_power(true).await.unwrap();
        matrix.set_power(false).await.unwrap();
        matrix.set_output_power(out(1), true).await.unwrap();
        matrix.step_volume(out(1), VolumeDirection::Down).await.unwrap();
        matrix.toggle_mute(out(1)).await.unwrap();
        matrix.request_status_refresh().await.unwrap();

        assert_eq!(
            matrix.protocol().sent(),
            vec![
                "PON",
                "POFF",
                "OUT01 CEC PWRON",
                "OUT01 CEC VOL-",
                "OUT01 CEC MUTE",
                "STATUS"
            ]
        );
    }

    #[tokio::test]
    async fn missing_capability_sends_nothing() {
        let matrix = connected(Capabilities::routing_only()).await;

        let err = matrix.set_output_power(out(1), false).await.unwrap_err();
        assert!(err.is_unsupported());
        let err = matrix.step_volume(out(1), VolumeDirection::Up).await.unwrap_err();
        assert!(err.is_unsupported());
        let err = matrix.toggle_mute(out(1)).await.unwrap_err();
        assert!(err.is_unsupported());

        assert!(matrix.protocol().sent().is_empty());
    }

    #[tokio::test]
    async fn commands_fail_when_disconnected() {
        let matrix = Matrix::new(
            MemoryProtocol::new(),
            config().validate().unwrap(),
            Capabilities::full(),
        );
        assert!(!matrix.is_connected());
        assert!(matches!(
            matrix.set_power(true).await,
            Err(Error::NotConnected)
        ));
    }

    #[test]
    fn tcp_matrix_from_config() {
        let matrix = Matrix::tcp(&config().with_port(2323)).unwrap();
        assert_eq!(matrix.protocol().address(), "10.0.0.2:2323");
        assert_eq!(matrix.info().outputs.len(), 1);
        assert!(matrix.capabilities().has_cec());
    }
}
