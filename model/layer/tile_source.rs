use serde::{Deserialize, Serialize};

use crate::model::geo::LatLngBounds;

pub(crate) const DEFAULT_MAX_ZOOM: u8 = 18;

/// Rendering options shared by raster and vector tile sources.
///
/// Every field is optional so the same type doubles as a per-density override:
/// [`TileOptions::layered_with`] keeps `self` and lets the override's `Some`
/// fields win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_native_zoom: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tms: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_offset: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<LatLngBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_cors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutline: Option<String>,
}

impl TileOptions {
    pub fn layered_with(&self, overrides: &TileOptions) -> TileOptions {
        TileOptions {
            min_zoom: overrides.min_zoom.or(self.min_zoom),
            max_zoom: overrides.max_zoom.or(self.max_zoom),
            max_native_zoom: overrides.max_native_zoom.or(self.max_native_zoom),
            tms: overrides.tms.or(self.tms),
            tile_size: overrides.tile_size.or(self.tile_size),
            zoom_offset: overrides.zoom_offset.or(self.zoom_offset),
            subdomains: overrides
                .subdomains
                .clone()
                .or_else(|| self.subdomains.clone()),
            bounds: overrides.bounds.or(self.bounds),
            opacity: overrides.opacity.or(self.opacity),
            no_cors: overrides.no_cors.or(self.no_cors),
            cutline: overrides.cutline.clone().or_else(|| self.cutline.clone()),
        }
    }

    pub fn effective_min_zoom(&self) -> u8 {
        self.min_zoom.unwrap_or(0)
    }

    pub fn effective_max_zoom(&self) -> u8 {
        self.max_zoom.unwrap_or(DEFAULT_MAX_ZOOM)
    }

    /// Highest zoom the server actually renders; beyond it tiles are upscaled.
    pub fn effective_max_native_zoom(&self) -> u8 {
        self.max_native_zoom.unwrap_or(self.effective_max_zoom())
    }
}

/// One raster source: an XYZ URL template, or a WMS endpoint when
/// `wms_layers` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wms_layers: Option<String>,
    #[serde(default)]
    pub options: TileOptions,
}

impl TileSource {
    pub fn xyz(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            wms_layers: None,
            options: TileOptions::default(),
        }
    }

    pub fn wms(url: impl Into<String>, layers: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            wms_layers: Some(layers.into()),
            options: TileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_wms(&self) -> bool {
        self.wms_layers.is_some()
    }
}
