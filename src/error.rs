// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `blustream_lib` crate.
//!
//! This module provides the error hierarchy used across the library: value
//! validation, transport communication, configuration parsing, and matrix
//! operations.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing configuration or device output.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during a matrix operation.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The matrix session is not connected.
    #[error("matrix is not connected")]
    NotConnected,
}

impl Error {
    /// Returns `true` if this error reports a missing device capability.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Device(DeviceError::UnsupportedCapability { .. }))
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A hardware address could not be parsed.
    #[error("invalid MAC address: {0}")]
    InvalidMacAddress(String),

    /// Two catalog entries share the same display name.
    #[error("duplicate name in catalog: {0}")]
    DuplicateName(String),
}

/// Errors related to the matrix transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection to the matrix failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid host or port.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to parsing configuration and matrix output.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to matrix operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The matrix firmware does not support the requested capability.
    #[error("matrix does not support {capability}")]
    UnsupportedCapability {
        /// The capability that is not supported.
        capability: String,
    },

    /// The output is not part of the matrix catalog.
    #[error("unknown output {0}")]
    UnknownOutput(u8),

    /// The input is not part of the matrix catalog.
    #[error("unknown input {0}")]
    UnknownInput(u8),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 1,
            max: 99,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [1, 99]");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidMacAddress("zz".to_string());
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::InvalidMacAddress(_))));
    }

    #[test]
    fn device_error_display() {
        let err = DeviceError::UnsupportedCapability {
            capability: "CEC power".to_string(),
        };
        assert_eq!(err.to_string(), "matrix does not support CEC power");
        assert_eq!(DeviceError::UnknownOutput(7).to_string(), "unknown output 7");
    }

    #[test]
    fn unsupported_detection() {
        let err = Error::Device(DeviceError::UnsupportedCapability {
            capability: "CEC mute".to_string(),
        });
        assert!(err.is_unsupported());
        assert!(!Error::NotConnected.is_unsupported());
    }

    #[test]
    fn timeout_display() {
        let err = ProtocolError::Timeout(5000);
        assert_eq!(err.to_string(), "request timed out after 5000 ms");
    }
}
