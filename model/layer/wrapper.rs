use serde::{Deserialize, Serialize};

use super::multires::MultiResolutionSource;
use super::tile_source::TileSource;
use super::RenderSource;

/// Synthetic low-zoom layer that outlines where a detailed source has data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageOverview {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubLayer {
    Leaf(TileSource),
    MultiResolution(MultiResolutionSource),
    CoverageOverview(CoverageOverview),
}

/// Sub-layers that are always added to and removed from the map as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapperComposite {
    pub sublayers: Vec<SubLayer>,
}

impl WrapperComposite {
    pub fn new(sublayers: Vec<SubLayer>) -> Self {
        Self { sublayers }
    }

    /// Minimum zoom of the first data-bearing sub-layer. Coverage overviews
    /// render strictly below it.
    pub fn data_min_zoom(&self) -> u8 {
        self.sublayers
            .iter()
            .find_map(|sublayer| match sublayer {
                SubLayer::Leaf(source) => Some(source.options.effective_min_zoom()),
                SubLayer::MultiResolution(source) => Some(source.options.effective_min_zoom()),
                SubLayer::CoverageOverview(_) => None,
            })
            .unwrap_or(0)
    }

    /// Units in declared order, or `None` when a data sub-layer has nothing
    /// to show at this density. The composite is never reduced to a subset.
    pub(crate) fn render_sources(&self, density: f64) -> Option<Vec<RenderSource>> {
        let below_zoom = self.data_min_zoom();
        self.sublayers
            .iter()
            .map(|sublayer| match sublayer {
                SubLayer::Leaf(source) => Some(RenderSource::Raster(source.clone())),
                SubLayer::MultiResolution(source) => source
                    .select(density)
                    .map(|selection| RenderSource::Raster(selection.source)),
                SubLayer::CoverageOverview(overview) => Some(RenderSource::CoverageOverview {
                    label: overview.label.clone(),
                    cutline: overview.cutline.clone(),
                    below_zoom,
                }),
            })
            .collect()
    }
}
