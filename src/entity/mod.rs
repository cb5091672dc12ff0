// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing state holders.
//!
//! Every entity owns a `tokio::sync::watch` channel carrying its
//! [`EntityState`]. The router updates the state from session events; the
//! host observes it with `subscribe()` and re-renders whenever the value
//! changes. User actions go the other way: each action method translates
//! into exactly one matrix command.
//!
//! - [`MatrixEntity`] - The matrix as a whole (power only)
//! - [`OutputEntity`] - One output (power, routed source, display control)
//!
//! # Examples
//!
//! ```
//! use blustream_lib::entity::EntityFeatures;
//!
//! let features = EntityFeatures::TURN_ON | EntityFeatures::TURN_OFF;
//! assert!(features.contains(EntityFeatures::TURN_ON));
//! assert!(!features.contains(EntityFeatures::SELECT_SOURCE));
//! ```

mod device_info;
mod matrix_entity;
mod output_entity;

pub use device_info::{DeviceInfo, MANUFACTURER};
pub use matrix_entity::MatrixEntity;
pub use output_entity::OutputEntity;

use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::error::Error;
use crate::protocol::Protocol;
use crate::types::PowerState;

/// Device class reported for every entity.
pub const DEVICE_CLASS: &str = "receiver";

/// Observable state of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityState {
    /// Power state; `Unknown` until the matrix reports it.
    pub power: PowerState,
    /// Display name of the routed input (outputs only).
    pub source: Option<String>,
    /// When the state last changed.
    pub last_updated: Option<DateTime<Utc>>,
}

impl EntityState {
    /// Sets the power state.
    ///
    /// Returns `true` if the state changed.
    pub fn apply_power(&mut self, power: PowerState) -> bool {
        if self.power == power {
            return false;
        }
        self.power = power;
        self.last_updated = Some(Utc::now());
        true
    }

    /// Sets the routed source.
    ///
    /// Returns `true` if the state changed.
    pub fn apply_source(&mut self, source: &str) -> bool {
        if self.source.as_deref() == Some(source) {
            return false;
        }
        self.source = Some(source.to_string());
        self.last_updated = Some(Utc::now());
        true
    }
}

/// Feature flags advertised to the host.
///
/// Bit values match the host's media player feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct EntityFeatures(u32);

impl EntityFeatures {
    /// Mute can be toggled.
    pub const VOLUME_MUTE: Self = Self(8);
    /// Can be turned on.
    pub const TURN_ON: Self = Self(128);
    /// Can be turned off.
    pub const TURN_OFF: Self = Self(256);
    /// Volume can be stepped.
    pub const VOLUME_STEP: Self = Self(1024);
    /// A source can be selected.
    pub const SELECT_SOURCE: Self = Self(2048);

    /// Returns the empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns `true` if every flag in `other` is set.
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for EntityFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EntityFeatures {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// What happened to a user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The command was written to the matrix.
    Sent,
    /// The matrix lacks the capability; nothing was sent.
    Unsupported,
    /// The request was invalid; nothing was sent.
    Rejected,
}

/// Either kind of entity, as handed to the host.
#[derive(Debug)]
pub enum Entity<P: Protocol> {
    /// The matrix itself.
    Matrix(Arc<MatrixEntity<P>>),
    /// One output.
    Output(Arc<OutputEntity<P>>),
}

impl<P: Protocol> Entity<P> {
    /// Returns the stable identifier.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        match self {
            Self::Matrix(entity) => entity.unique_id(),
            Self::Output(entity) => entity.unique_id(),
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Matrix(entity) => entity.name(),
            Self::Output(entity) => entity.name(),
        }
    }

    /// Returns the device registry information.
    #[must_use]
    pub fn device_info(&self) -> &DeviceInfo {
        match self {
            Self::Matrix(entity) => entity.device_info(),
            Self::Output(entity) => entity.device_info(),
        }
    }

    /// Returns the supported features.
    #[must_use]
    pub fn features(&self) -> EntityFeatures {
        match self {
            Self::Matrix(_) => MatrixEntity::<P>::FEATURES,
            Self::Output(_) => OutputEntity::<P>::FEATURES,
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> EntityState {
        match self {
            Self::Matrix(entity) => entity.state(),
            Self::Output(entity) => entity.state(),
        }
    }

    /// Returns a receiver that observes state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EntityState> {
        match self {
            Self::Matrix(entity) => entity.subscribe(),
            Self::Output(entity) => entity.subscribe(),
        }
    }
}

impl<P: Protocol> Clone for Entity<P> {
    fn clone(&self) -> Self {
        match self {
            Self::Matrix(entity) => Self::Matrix(Arc::clone(entity)),
            Self::Output(entity) => Self::Output(Arc::clone(entity)),
        }
    }
}

/// Maps the result of a matrix call to an action outcome.
///
/// A missing capability is logged and reported as `Unsupported`; every
/// other error is returned.
fn action_outcome(entity: &str, action: &str, result: Result<(), Error>) -> Result<ActionOutcome, Error> {
    match result {
        Ok(()) => Ok(ActionOutcome::Sent),
        Err(e) if e.is_unsupported() => {
            tracing::error!(entity = %entity, action = %action, error = %e, "Action not supported by matrix");
            Ok(ActionOutcome::Unsupported)
        }
        Err(e) => Err(e),
    }
}
