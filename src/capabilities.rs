// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Matrix capability flags.
//!
//! Source routing and matrix power are always available. The per-output
//! commands travel over HDMI-CEC to the attached display and depend on the
//! matrix firmware, so each of them is gated by an explicit flag that is
//! checked before anything is written to the wire.

use serde::{Deserialize, Serialize};

/// Optional features of a matrix.
///
/// # Examples
///
/// ```
/// use blustream_lib::Capabilities;
///
/// let caps = Capabilities::default();
/// assert!(caps.cec_power);
///
/// let legacy = Capabilities::routing_only();
/// assert!(!legacy.has_cec());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
// Each flag is an independent firmware feature.
#[allow(clippy::struct_excessive_bools)]
#[serde(default)]
pub struct Capabilities {
    /// Can power attached displays on and off via CEC.
    pub cec_power: bool,

    /// Can step the volume of attached displays via CEC.
    pub cec_volume: bool,

    /// Can toggle mute on attached displays via CEC.
    pub cec_mute: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}

impl Capabilities {
    /// Creates capabilities for firmware with full CEC support.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            cec_power: true,
            cec_volume: true,
            cec_mute: true,
        }
    }

    /// Creates capabilities for firmware without any CEC commands.
    #[must_use]
    pub const fn routing_only() -> Self {
        Self {
            cec_power: false,
            cec_volume: false,
            cec_mute: false,
        }
    }

    /// Returns whether any CEC command is available.
    #[must_use]
    pub const fn has_cec(&self) -> bool {
        self.cec_power || self.cec_volume || self.cec_mute
    }

    /// Returns whether output power control is supported.
    #[must_use]
    pub const fn supports_output_power(&self) -> bool {
        self.cec_power
    }

    /// Returns whether volume stepping is supported.
    #[must_use]
    pub const fn supports_volume_step(&self) -> bool {
        self.cec_volume
    }

    /// Returns whether mute toggling is supported.
    #[must_use]
    pub const fn supports_mute(&self) -> bool {
        self.cec_mute
    }
}

/// Builder for creating custom capabilities.
///
/// Starts from [`Capabilities::routing_only`] and enables features one by one.
#[derive(Debug)]
pub struct CapabilitiesBuilder {
    inner: Capabilities,
}

impl Default for CapabilitiesBuilder {
    fn default() -> Self {
        Self {
            inner: Capabilities::routing_only(),
        }
    }
}

impl CapabilitiesBuilder {
    /// Creates a new builder with no optional features.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables CEC power control.
    #[must_use]
    pub fn with_cec_power(mut self) -> Self {
        self.inner.cec_power = true;
        self
    }

    /// Enables CEC volume stepping.
    #[must_use]
    pub fn with_cec_volume(mut self) -> Self {
        self.inner.cec_volume = true;
        self
    }

    /// Enables CEC mute toggling.
    #[must_use]
    pub fn with_cec_mute(mut self) -> Self {
        self.inner.cec_mute = true;
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> Capabilities {
        self.inner
    }
}
