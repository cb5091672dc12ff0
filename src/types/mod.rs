// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for matrix control.
//!
//! Each type ensures values are within their valid ranges at construction
//! time, so wire formatting and catalog lookups never see out-of-range data.
//!
//! # Types
//!
//! - [`OutputId`] / [`InputId`] - Port numbers (1-99)
//! - [`PowerState`] - Tri-state power (On/Off/Unknown)
//! - [`VolumeDirection`] - Volume step direction
//! - [`MacAddress`] - Normalized hardware address used for identity

mod ids;
mod mac;
mod power;

pub use ids::{InputId, OutputId};
pub use mac::MacAddress;
pub use power::{PowerState, VolumeDirection};
