// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wiring a matrix session to its entities.
//!
//! [`setup_entities`] performs the whole setup in a fixed order:
//!
//! 1. Install an [`EventRouter`] as the session listener
//! 2. Create the matrix entity and register it with the router
//! 3. Create one entity per output and register each with the router
//! 4. Ask the matrix for a status report
//! 5. Hand every entity to the host
//!
//! Registration completes before the status request, so every entity
//! receives at least one authoritative snapshot even if the session was
//! already connected and reporting before setup began.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use blustream_lib::{Capabilities, Matrix, MatrixConfig};
//! use blustream_lib::event::SessionEvent;
//! use blustream_lib::protocol::MemoryProtocol;
//! use blustream_lib::setup::{EntityCollection, setup_entities};
//! use blustream_lib::types::{InputId, OutputId, PowerState};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> blustream_lib::Result<()> {
//! let info = MatrixConfig::new("10.0.0.2", "00:1a:2b:3c:4d:5e".parse()?)
//!     .with_input(InputId::new(1)?, "HDMI1")
//!     .with_output(OutputId::new(1)?, "Living Room")
//!     .validate()?;
//! let protocol = MemoryProtocol::new()
//!     .with_status_report(vec![SessionEvent::power_changed("ON")]);
//!
//! let matrix = Arc::new(Matrix::new(protocol, info, Capabilities::full()));
//! matrix.connect().await?;
//!
//! let mut host = EntityCollection::new();
//! let setup = setup_entities(matrix, &mut host).await;
//!
//! assert_eq!(host.len(), 2);
//! assert_eq!(setup.matrix_entity().power(), PowerState::On);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::entity::{Entity, MatrixEntity, OutputEntity};
use crate::matrix::Matrix;
use crate::protocol::Protocol;
use crate::router::EventRouter;
use crate::types::OutputId;

/// The host's entity collection.
pub trait EntityHost<P: Protocol> {
    /// Publishes newly created entities.
    fn add_entities(&mut self, entities: Vec<Entity<P>>);
}

/// An in-memory entity collection.
#[derive(Debug)]
pub struct EntityCollection<P: Protocol> {
    entities: Vec<Entity<P>>,
}

impl<P: Protocol> Default for EntityCollection<P> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
        }
    }
}

impl<P: Protocol> EntityCollection<P> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over the entities in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &Entity<P>> {
        self.entities.iter()
    }

    /// Finds an entity by its unique id.
    #[must_use]
    pub fn get(&self, unique_id: &str) -> Option<&Entity<P>> {
        self.entities.iter().find(|e| e.unique_id() == unique_id)
    }
}

impl<P: Protocol> EntityHost<P> for EntityCollection<P> {
    fn add_entities(&mut self, entities: Vec<Entity<P>>) {
        self.entities.extend(entities);
    }
}

/// Everything created by [`setup_entities`].
///
/// The router only holds the entities weakly. They receive updates for as
/// long as this value or the host keeps them alive; once both are dropped
/// the matrix session is released and its connection closed.
#[derive(Debug)]
pub struct MatrixSetup<P: Protocol> {
    matrix: Arc<Matrix<P>>,
    router: Arc<EventRouter>,
    matrix_entity: Arc<MatrixEntity<P>>,
    outputs: Vec<Arc<OutputEntity<P>>>,
}

impl<P: Protocol> MatrixSetup<P> {
    /// Returns the matrix session.
    #[must_use]
    pub fn matrix(&self) -> &Arc<Matrix<P>> {
        &self.matrix
    }

    /// Returns the session listener.
    #[must_use]
    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    /// Returns the matrix entity.
    #[must_use]
    pub fn matrix_entity(&self) -> &Arc<MatrixEntity<P>> {
        &self.matrix_entity
    }

    /// Returns the output entities, ordered by output id.
    #[must_use]
    pub fn outputs(&self) -> &[Arc<OutputEntity<P>>] {
        &self.outputs
    }

    /// Returns the entity of one output.
    #[must_use]
    pub fn output(&self, output: OutputId) -> Option<&Arc<OutputEntity<P>>> {
        self.outputs.iter().find(|e| e.output() == output)
    }

    /// Detaches the router and closes the session.
    pub async fn unload(self) {
        tracing::debug!(matrix = %self.matrix.info().name, "Unloading matrix entities");
        self.matrix.clear_listener();
        self.matrix.disconnect().await;
    }
}

/// Creates and registers the entities of one matrix.
///
/// A failed status request is logged and does not abort setup; the
/// entities then show an unknown state until the matrix reports.
pub async fn setup_entities<P, H>(matrix: Arc<Matrix<P>>, host: &mut H) -> MatrixSetup<P>
where
    P: Protocol + 'static,
    H: EntityHost<P>,
{
    let info = matrix.info();
    tracing::debug!(matrix = %info.name, "Setting up matrix entities");

    let router = Arc::new(EventRouter::new());
    matrix.register_listener(router.clone());

    tracing::debug!("Setting up matrix entity");
    let matrix_entity = Arc::new(MatrixEntity::new(Arc::clone(&matrix)));
    router.register_device_subscriber(&matrix_entity);
    let mut entities = vec![Entity::Matrix(Arc::clone(&matrix_entity))];

    let mut outputs = Vec::with_capacity(info.outputs.len());
    for (output, name) in info.outputs.iter() {
        tracing::debug!(output = %output, name = %name, "Setting up output entity");
        let entity = Arc::new(OutputEntity::new(Arc::clone(&matrix), output, name));
        router.register_output_subscriber(output, &entity);
        entities.push(Entity::Output(Arc::clone(&entity)));
        outputs.push(entity);
    }

    tracing::info!("Refreshing status after setup");
    if let Err(e) = matrix.request_status_refresh().await {
        tracing::warn!(error = %e, "Status refresh failed, entities stay unknown until the matrix reports");
    }

    host.add_entities(entities);

    MatrixSetup {
        matrix,
        router,
        matrix_entity,
        outputs,
    }
}
