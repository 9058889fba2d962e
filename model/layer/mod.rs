/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Composite layer variants and their contract with the rendering backend.
//!
//! Every catalog entry's backend is one of four shapes ([`LayerBackend`]). The
//! map widget never branches on the shape: it asks for the entry's
//! [`RenderSource`] list and adds or removes all of them through a
//! [`LayerInstance`], which gives every variant the same toggle, rank and title.

pub mod instance;
pub mod multires;
pub mod tile_source;
pub mod wrapper;

use serde::{Deserialize, Serialize};

use crate::model::vector::VectorTileSource;
pub use instance::LayerInstance;
use multires::MultiResolutionSource;
use tile_source::TileSource;
use wrapper::WrapperComposite;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerBackend {
    Leaf(TileSource),
    MultiResolution(MultiResolutionSource),
    Wrapper(WrapperComposite),
    InteractiveVector(VectorTileSource),
}

impl LayerBackend {
    pub fn is_wrapper(&self) -> bool {
        matches!(self, Self::Wrapper(_))
    }

    pub fn is_interactive_vector(&self) -> bool {
        matches!(self, Self::InteractiveVector(_))
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::MultiResolution(_) => "multi_resolution",
            Self::Wrapper(_) => "wrapper",
            Self::InteractiveVector(_) => "interactive_vector",
        }
    }

    /// Reduce the backend to the ordered units the map has to mount. Empty when
    /// nothing (or, for a wrapper, not every sub-layer) can be shown.
    pub fn render_sources(&self, density: f64) -> Vec<RenderSource> {
        match self {
            Self::Leaf(source) => vec![RenderSource::Raster(source.clone())],
            Self::MultiResolution(source) => source
                .select(density)
                .map(|selection| RenderSource::Raster(selection.source))
                .into_iter()
                .collect(),
            Self::Wrapper(wrapper) => wrapper.render_sources(density).unwrap_or_default(),
            Self::InteractiveVector(source) => vec![RenderSource::VectorTiles(source.clone())],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderSource {
    Raster(TileSource),
    CoverageOverview {
        label: String,
        cutline: Option<String>,
        below_zoom: u8,
    },
    VectorTiles(VectorTileSource),
}

impl RenderSource {
    pub fn visible_at(&self, zoom: f64) -> bool {
        match self {
            Self::Raster(source) => {
                zoom >= f64::from(source.options.effective_min_zoom())
                    && zoom <= f64::from(source.options.effective_max_zoom())
            }
            Self::CoverageOverview { below_zoom, .. } => zoom < f64::from(*below_zoom),
            Self::VectorTiles(source) => {
                zoom >= f64::from(source.options.effective_min_zoom())
                    && zoom <= f64::from(source.options.effective_max_zoom())
            }
        }
    }
}

/// One independently mountable piece of a layer, in the layer's stacking slot.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderUnit {
    pub layer_title: String,
    pub z_order: u32,
    pub sub_index: usize,
    pub is_overlay: bool,
    pub is_transparent: bool,
    pub source: RenderSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError {
    pub reason: String,
}

impl SurfaceError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "map surface rejected unit: {}", self.reason)
    }
}

impl std::error::Error for SurfaceError {}

/// The map widget as seen from the catalog: something units can be added to
/// and removed from.
pub trait MapSurface {
    fn add_unit(&mut self, unit: &RenderUnit) -> Result<UnitHandle, SurfaceError>;
    fn remove_unit(&mut self, handle: UnitHandle);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    Rejected {
        layer: String,
        sub_index: usize,
        source: SurfaceError,
    },
    NoRenderableSource {
        layer: String,
    },
}

impl std::fmt::Display for LayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected {
                layer,
                sub_index,
                source,
            } => write!(
                f,
                "layer '{layer}' could not be added (sub-layer {sub_index}): {source}"
            ),
            Self::NoRenderableSource { layer } => {
                write!(f, "layer '{layer}' has no renderable source at this density")
            }
        }
    }
}

impl std::error::Error for LayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected { source, .. } => Some(source),
            Self::NoRenderableSource { .. } => None,
        }
    }
}
