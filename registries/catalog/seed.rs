//! Built-in descriptor table.

use serde::Deserialize;

use super::descriptor::LayerDescriptor;
use super::group::GroupDefinition;
use super::order::OrderIndex;
use super::{AssembledCatalog, CatalogError, assemble};

const BUILTIN_LAYERS: &str = include_str!("../../resources/layers.toml");

/// The three inputs of [`assemble`] as they appear in one table file.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerTable {
    pub order: OrderIndex,
    #[serde(default, rename = "layer")]
    pub layers: Vec<LayerDescriptor>,
    #[serde(default, rename = "group")]
    pub groups: Vec<GroupDefinition>,
}

#[derive(Debug)]
pub enum SeedError {
    Parse(toml::de::Error),
    Catalog(CatalogError),
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(error) => write!(f, "layer table is not valid: {error}"),
            Self::Catalog(error) => write!(f, "layer table is inconsistent: {error}"),
        }
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(error) => Some(error),
            Self::Catalog(error) => Some(error),
        }
    }
}

impl From<toml::de::Error> for SeedError {
    fn from(error: toml::de::Error) -> Self {
        Self::Parse(error)
    }
}

impl From<CatalogError> for SeedError {
    fn from(error: CatalogError) -> Self {
        Self::Catalog(error)
    }
}

pub fn parse_layer_table(source: &str) -> Result<LayerTable, SeedError> {
    Ok(toml::from_str(source)?)
}

impl LayerTable {
    pub fn builtin() -> Result<Self, SeedError> {
        parse_layer_table(BUILTIN_LAYERS)
    }

    pub fn assemble(self) -> Result<AssembledCatalog, SeedError> {
        Ok(assemble(self.layers, &self.order, &self.groups)?)
    }
}

/// Catalog assembled from the table compiled into the binary.
pub fn core_seed() -> Result<AssembledCatalog, SeedError> {
    LayerTable::builtin()?.assemble()
}
