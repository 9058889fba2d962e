/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Interactive vector tile layers: features decoded client-side that can be
//! clicked, highlighted and described in a popup.

pub mod info_panel;
pub mod selection;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::layer::tile_source::TileOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorTileSource {
    pub url: String,
    #[serde(default)]
    pub options: TileOptions,
}

impl VectorTileSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            options: TileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TileOptions) -> Self {
        self.options = options;
        self
    }
}

/// Key used to address a feature's style inside one tile layer instance.
///
/// Uniqueness is a property of the upstream data. Two features sharing an id
/// are styled together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A rendered feature as delivered by a click on the vector layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorFeature {
    pub id: FeatureId,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl VectorFeature {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: FeatureId::new(id),
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.properties.get(key)? {
            Value::String(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// Numeric attribute; tile encoders are not consistent about emitting
    /// numbers versus numeric strings.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.properties.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}
