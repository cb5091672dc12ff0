// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Port catalogs and matrix identity.
//!
//! The catalogs are built once from configuration and never change while a
//! session is live. Entities resolve input ids to display names (and back)
//! through [`InputCatalog`].

use std::collections::{BTreeMap, HashMap};

use crate::error::ValueError;
use crate::types::{InputId, MacAddress, OutputId};

/// Immutable table of matrix inputs.
///
/// # Examples
///
/// ```
/// use blustream_lib::catalog::InputCatalog;
/// use blustream_lib::types::InputId;
///
/// let hdmi1 = InputId::new(1).unwrap();
/// let catalog = InputCatalog::new([(hdmi1, "HDMI1".to_string())]).unwrap();
///
/// assert_eq!(catalog.name(hdmi1), Some("HDMI1"));
/// assert_eq!(catalog.id_by_name("HDMI1"), Some(hdmi1));
/// assert_eq!(catalog.id_by_name("HDMI9"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputCatalog {
    by_id: BTreeMap<InputId, String>,
    by_name: HashMap<String, InputId>,
}

impl InputCatalog {
    /// Builds a catalog from `(id, name)` pairs.
    ///
    /// A repeated id keeps the last name given for it.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::DuplicateName` if two inputs share a display name,
    /// which would make source selection by name ambiguous.
    pub fn new(entries: impl IntoIterator<Item = (InputId, String)>) -> Result<Self, ValueError> {
        let by_id: BTreeMap<InputId, String> = entries.into_iter().collect();

        let mut by_name = HashMap::with_capacity(by_id.len());
        for (id, name) in &by_id {
            if by_name.insert(name.clone(), *id).is_some() {
                return Err(ValueError::DuplicateName(name.clone()));
            }
        }

        Ok(Self { by_id, by_name })
    }

    /// Returns the display name of an input.
    #[must_use]
    pub fn name(&self, id: InputId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Looks up an input by its display name.
    #[must_use]
    pub fn id_by_name(&self, name: &str) -> Option<InputId> {
        self.by_name.get(name).copied()
    }

    /// Returns all display names, ordered by input id.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.by_id.values().cloned().collect()
    }

    /// Returns `true` if the input exists.
    #[must_use]
    pub fn contains(&self, id: InputId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Iterates over `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (InputId, &str)> {
        self.by_id.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Returns the number of inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if there are no inputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Immutable table of matrix outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputCatalog {
    by_id: BTreeMap<OutputId, String>,
}

impl OutputCatalog {
    /// Builds a catalog from `(id, name)` pairs.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (OutputId, String)>) -> Self {
        Self {
            by_id: entries.into_iter().collect(),
        }
    }

    /// Returns the display name of an output.
    #[must_use]
    pub fn name(&self, id: OutputId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Returns `true` if the output exists.
    #[must_use]
    pub fn contains(&self, id: OutputId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Iterates over `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputId, &str)> {
        self.by_id.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Returns the number of outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if there are no outputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Identity, metadata, and port catalogs of one matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixInfo {
    /// User-facing name of the matrix.
    pub name: String,
    /// Hostname or IP address.
    pub host: String,
    /// Hardware address.
    pub mac: MacAddress,
    /// Model name reported by the device.
    pub model: Option<String>,
    /// Firmware version reported by the device.
    pub firmware_version: Option<String>,
    /// Input catalog.
    pub inputs: InputCatalog,
    /// Output catalog.
    pub outputs: OutputCatalog,
}

impl MatrixInfo {
    /// Returns the stable device identifier (the formatted MAC address).
    #[must_use]
    pub fn device_id(&self) -> String {
        self.mac.to_string()
    }

    /// Returns the stable identifier of one output: `{device-id}-output{N}`.
    #[must_use]
    pub fn output_unique_id(&self, output: OutputId) -> String {
        format!("{}-output{output}", self.device_id())
    }

    /// Returns the URL of the matrix web interface.
    #[must_use]
    pub fn configuration_url(&self) -> String {
        format!("http://{}", self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(n: u8) -> InputId {
        InputId::new(n).unwrap()
    }

    fn output(n: u8) -> OutputId {
        OutputId::new(n).unwrap()
    }

    #[test]
    fn input_catalog_lookups() {
        let catalog = InputCatalog::new([
            (input(2), "HDMI2".to_string()),
            (input(1), "HDMI1".to_string()),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name(input(2)), Some("HDMI2"));
        assert_eq!(catalog.name(input(3)), None);
        assert_eq!(catalog.id_by_name("HDMI1"), Some(input(1)));
        assert_eq!(catalog.names(), vec!["HDMI1", "HDMI2"]);
    }

    #[test]
    fn input_catalog_rejects_duplicate_names() {
        let result = InputCatalog::new([
            (input(1), "Apple TV".to_string()),
            (input(2), "Apple TV".to_string()),
        ]);
        assert_eq!(result, Err(ValueError::DuplicateName("Apple TV".to_string())));
    }

    #[test]
    fn name_lookup_is_exact() {
        let catalog = InputCatalog::new([(input(1), "HDMI1".to_string())]).unwrap();
        assert_eq!(catalog.id_by_name("hdmi1"), None);
    }

    #[test]
    fn output_catalog_iterates_in_id_order() {
        let catalog = OutputCatalog::new([
            (output(11), "Bedroom".to_string()),
            (output(10), "Living Room".to_string()),
        ]);
        let ids: Vec<u8> = catalog.iter().map(|(id, _)| id.value()).collect();
        assert_eq!(ids, vec![10, 11]);
        assert!(catalog.contains(output(10)));
        assert!(!catalog.contains(output(1)));
    }

    #[test]
    fn matrix_identity() {
        let info = MatrixInfo {
            name: "Rack".to_string(),
            host: "192.168.1.40".to_string(),
            mac: "00-1A-2B-3C-4D-5E".parse().unwrap(),
            model: Some("CMX88".to_string()),
            firmware_version: None,
            inputs: InputCatalog::default(),
            outputs: OutputCatalog::default(),
        };

        assert_eq!(info.device_id(), "00:1a:2b:3c:4d:5e");
        assert_eq!(info.output_unique_id(output(3)), "00:1a:2b:3c:4d:5e-output3");
        assert_eq!(info.configuration_url(), "http://192.168.1.40");
    }
}
