// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Blustream` Lib - A Rust library to control Blustream HDMI matrix switchers.
//!
//! This library talks to a matrix over its TCP control interface and keeps a
//! set of state holders (one for the matrix, one per output) consistent with
//! the single underlying connection.
//!
//! # Supported Features
//!
//! - **Routing**: Switch any input to any output
//! - **Power**: Matrix power on/off
//! - **Display control**: Per-output power, volume step, and mute over HDMI-CEC
//! - **Status**: Full status refresh, reported back as events
//! - **Entities**: Watchable per-output state with stable identifiers
//!
//! # Architecture
//!
//! ```text
//! Matrix ──▶ ListenerSlot ──▶ EventRouter ──┬──▶ MatrixEntity
//!                                           ├──▶ OutputEntity (output 1)
//!                                           └──▶ OutputEntity (output N)
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use blustream_lib::{Matrix, MatrixConfig};
//! use blustream_lib::setup::{EntityCollection, setup_entities};
//!
//! #[tokio::main]
//! async fn main() -> blustream_lib::Result<()> {
//!     let config = MatrixConfig::from_json(r#"{
//!         "host": "192.168.1.40",
//!         "mac": "00:1a:2b:3c:4d:5e",
//!         "inputs": [{ "id": 1, "name": "Apple TV" }, { "id": 2, "name": "Xbox" }],
//!         "outputs": [{ "id": 1, "name": "Living Room" }]
//!     }"#)?;
//!
//!     let matrix = Arc::new(Matrix::tcp(&config)?);
//!     matrix.connect().await?;
//!
//!     let mut host = EntityCollection::new();
//!     let setup = setup_entities(matrix, &mut host).await;
//!
//!     let living_room = &setup.outputs()[0];
//!     living_room.select_source("Xbox").await?;
//!
//!     let mut state = living_room.subscribe();
//!     state.changed().await.ok();
//!     println!("{:?}", *state.borrow());
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Listener
//!
//! A session has exactly one listener. Anything implementing
//! [`SessionListener`] can take the router's place:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use blustream_lib::{Matrix, MatrixConfig, SessionListener};
//! use blustream_lib::types::{InputId, OutputId};
//!
//! struct Printer;
//!
//! impl SessionListener for Printer {
//!     fn on_source_changed(&self, output: OutputId, input: InputId) {
//!         println!("output {output} now shows input {input}");
//!     }
//!     fn on_power_changed(&self, raw: &str) {
//!         println!("power {raw}");
//!     }
//!     fn on_connected(&self) {}
//!     fn on_disconnected(&self) {}
//!     fn on_error(&self, message: &str) {
//!         eprintln!("{message}");
//!     }
//! }
//!
//! # async fn example(config: MatrixConfig) -> blustream_lib::Result<()> {
//! let matrix = Matrix::tcp(&config)?;
//! matrix.register_listener(Arc::new(Printer));
//! matrix.connect().await?;
//! matrix.request_status_refresh().await?;
//! # Ok(())
//! # }
//! ```

mod capabilities;
pub mod catalog;
pub mod command;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
mod matrix;
pub mod protocol;
pub mod router;
pub mod setup;
pub mod subscription;
pub mod types;

pub use capabilities::{Capabilities, CapabilitiesBuilder};
pub use catalog::{InputCatalog, MatrixInfo, OutputCatalog};
pub use command::{CecAction, CecCommand, Command, RouteCommand, StatusCommand, SystemPowerCommand};
pub use config::MatrixConfig;
pub use entity::{ActionOutcome, Entity, EntityState, MatrixEntity, OutputEntity};
pub use error::{DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use event::SessionEvent;
pub use matrix::Matrix;
pub use protocol::{MemoryProtocol, Protocol, TcpClient, TcpClientBuilder};
pub use router::EventRouter;
pub use setup::{EntityCollection, EntityHost, MatrixSetup, setup_entities};
pub use subscription::{ListenerSlot, OutputSubscriber, SessionListener, StateSubscriber};
pub use types::{InputId, MacAddress, OutputId, PowerState, VolumeDirection};
