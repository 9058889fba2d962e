use serde::{Deserialize, Serialize};

use super::tile_source::{TileOptions, TileSource};

/// One pixel-density tier of a [`MultiResolutionSource`].
///
/// A tier without `url` has no better source of its own; selection falls back
/// to the nearest lower tier that has one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DensityTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub overrides: TileOptions,
}

impl DensityTier {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            overrides: TileOptions::default(),
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn with_overrides(mut self, overrides: TileOptions) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Tiers ordered by output density: index 0 is standard (1x), index 1 is 2x
/// and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiResolutionSource {
    pub tiers: Vec<DensityTier>,
    #[serde(default)]
    pub options: TileOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierSelection {
    pub tier: usize,
    pub source: TileSource,
}

impl MultiResolutionSource {
    pub fn new(tiers: Vec<DensityTier>, options: TileOptions) -> Self {
        Self { tiers, options }
    }

    /// Pick the template for a display with the given device pixel ratio.
    ///
    /// The wanted tier is `round(density) - 1`, clamped to the tier list. Empty
    /// tiers defer to the nearest populated tier below; when nothing below is
    /// populated the nearest populated tier above is used. The overrides of the
    /// tier that supplied the template are layered over the shared options.
    pub fn select(&self, density: f64) -> Option<TierSelection> {
        if self.tiers.is_empty() {
            return None;
        }
        let wanted = wanted_tier(density, self.tiers.len());

        let chosen = (0..=wanted)
            .rev()
            .chain(wanted + 1..self.tiers.len())
            .find(|&index| self.tiers[index].url.is_some())?;

        let tier = &self.tiers[chosen];
        let url = tier.url.clone()?;
        Some(TierSelection {
            tier: chosen,
            source: TileSource {
                url,
                wms_layers: None,
                options: self.options.layered_with(&tier.overrides),
            },
        })
    }
}

fn wanted_tier(density: f64, tier_count: usize) -> usize {
    let density = if density.is_finite() && density > 0.0 {
        density
    } else {
        1.0
    };
    let last = tier_count.saturating_sub(1);
    let wanted = density.round().max(1.0) as usize - 1;
    wanted.min(last)
}
