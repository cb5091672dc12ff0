// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device registry information.

use serde::Serialize;

use crate::catalog::MatrixInfo;
use crate::types::OutputId;

/// Manufacturer reported for every entity.
pub const MANUFACTURER: &str = "Blustream";

/// What the host's device registry needs to know about an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Stable device identifier.
    pub identifier: String,
    /// Device name.
    pub name: String,
    /// Manufacturer name.
    pub manufacturer: &'static str,
    /// Model name.
    pub model: Option<String>,
    /// Firmware version.
    pub sw_version: Option<String>,
    /// Web interface of the matrix.
    pub configuration_url: String,
    /// Identifier of the parent device, for outputs.
    pub via_device: Option<String>,
}

impl DeviceInfo {
    /// Describes the matrix itself.
    #[must_use]
    pub fn for_matrix(info: &MatrixInfo) -> Self {
        Self {
            identifier: info.device_id(),
            name: info.name.clone(),
            manufacturer: MANUFACTURER,
            model: info.model.clone(),
            sw_version: info.firmware_version.clone(),
            configuration_url: info.configuration_url(),
            via_device: None,
        }
    }

    /// Describes one output, attached to the matrix.
    #[must_use]
    pub fn for_output(info: &MatrixInfo, output: OutputId, name: &str) -> Self {
        Self {
            identifier: info.output_unique_id(output),
            name: name.to_string(),
            via_device: Some(info.device_id()),
            ..Self::for_matrix(info)
        }
    }
}
