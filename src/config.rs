// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Matrix configuration.
//!
//! A [`MatrixConfig`] can be built fluently or loaded from JSON. Calling
//! [`MatrixConfig::validate`] produces the immutable [`MatrixInfo`] the
//! session and entities work from.
//!
//! # Examples
//!
//! ```
//! use blustream_lib::MatrixConfig;
//! use blustream_lib::types::{InputId, OutputId};
//!
//! # fn main() -> blustream_lib::Result<()> {
//! let config = MatrixConfig::new("192.168.1.40", "00:1a:2b:3c:4d:5e".parse()?)
//!     .with_name("Rack Matrix")
//!     .with_input(InputId::new(1)?, "Apple TV")
//!     .with_output(OutputId::new(1)?, "Living Room");
//!
//! let info = config.validate()?;
//! assert_eq!(info.outputs.len(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::catalog::{InputCatalog, MatrixInfo, OutputCatalog};
use crate::error::{Error, ParseError, ProtocolError};
use crate::types::{InputId, MacAddress, OutputId};

/// Default telnet port of the matrix control interface.
pub const DEFAULT_PORT: u16 = 23;

/// Default command timeout in milliseconds.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 5000;

/// One named port in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEntry<I> {
    /// Port number.
    pub id: I,
    /// Display name.
    pub name: String,
}

/// Configuration of one matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Hostname or IP address of the matrix.
    pub host: String,
    /// TCP port of the control interface.
    #[serde(default = "default_port")]
    pub port: u16,
    /// User-facing name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Hardware address, used for the stable device identifier.
    pub mac: MacAddress,
    /// Model name.
    #[serde(default)]
    pub model: Option<String>,
    /// Firmware version.
    #[serde(default)]
    pub firmware_version: Option<String>,
    /// Inputs (source ports).
    #[serde(default)]
    pub inputs: Vec<PortEntry<InputId>>,
    /// Outputs (display ports).
    #[serde(default)]
    pub outputs: Vec<PortEntry<OutputId>>,
    /// Optional firmware features.
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Timeout for connecting and for each command, in milliseconds.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_name() -> String {
    "Blustream Matrix".to_string()
}

fn default_command_timeout_ms() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_MS
}

impl MatrixConfig {
    /// Creates a configuration with defaults for everything but the address.
    #[must_use]
    pub fn new(host: impl Into<String>, mac: MacAddress) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            name: default_name(),
            mac,
            model: None,
            firmware_version: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            capabilities: Capabilities::default(),
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the document is malformed or a value
    /// (port id, MAC address) fails validation.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Parse(ParseError::Json(e)))
    }

    /// Sets the TCP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the user-facing name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the firmware version.
    #[must_use]
    pub fn with_firmware_version(mut self, version: impl Into<String>) -> Self {
        self.firmware_version = Some(version.into());
        self
    }

    /// Adds an input.
    #[must_use]
    pub fn with_input(mut self, id: InputId, name: impl Into<String>) -> Self {
        self.inputs.push(PortEntry {
            id,
            name: name.into(),
        });
        self
    }

    /// Adds an output.
    #[must_use]
    pub fn with_output(mut self, id: OutputId, name: impl Into<String>) -> Self {
        self.outputs.push(PortEntry {
            id,
            name: name.into(),
        });
        self
    }

    /// Sets the firmware capabilities.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the command timeout.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the command timeout.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Returns the `host:port` address of the control interface.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration and builds the matrix description.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is empty, a port id is listed twice, or
    /// two inputs share a display name.
    pub fn validate(&self) -> Result<MatrixInfo, Error> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("empty host".to_string()).into());
        }
        check_unique("inputs", self.inputs.iter().map(|p| p.id.value()))?;
        check_unique("outputs", self.outputs.iter().map(|p| p.id.value()))?;

        let inputs = InputCatalog::new(self.inputs.iter().map(|p| (p.id, p.name.clone())))?;
        let outputs = OutputCatalog::new(self.outputs.iter().map(|p| (p.id, p.name.clone())));

        Ok(MatrixInfo {
            name: self.name.clone(),
            host: self.host.clone(),
            mac: self.mac,
            model: self.model.clone(),
            firmware_version: self.firmware_version.clone(),
            inputs,
            outputs,
        })
    }
}

fn check_unique(field: &str, ids: impl Iterator<Item = u8>) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ParseError::InvalidValue {
                field: field.to_string(),
                message: format!("port id {id} is listed more than once"),
            }
            .into());
        }
    }
    Ok(())
}
