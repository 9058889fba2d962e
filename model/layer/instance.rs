use std::sync::Arc;

use super::tile_source::TileSource;
use super::{LayerBackend, LayerError, MapSurface, RenderSource, RenderUnit, UnitHandle};
use crate::model::vector::selection::VectorFeatureController;
use crate::registries::catalog::CatalogEntry;

/// A catalog entry bound to the live map.
///
/// Whatever the backend variant, an instance exposes one toggle, one rank and
/// one title. Adding is all-or-nothing: if the surface rejects any unit, the
/// units already mounted for this layer are removed again before the error is
/// returned.
#[derive(Debug)]
pub struct LayerInstance {
    entry: Arc<CatalogEntry>,
    mounted: Vec<UnitHandle>,
    features: Option<VectorFeatureController>,
}

impl LayerInstance {
    pub fn new(entry: Arc<CatalogEntry>) -> Self {
        let features = entry
            .descriptor
            .backend
            .is_interactive_vector()
            .then(VectorFeatureController::new);
        Self {
            entry,
            mounted: Vec::new(),
            features,
        }
    }

    pub fn entry(&self) -> &Arc<CatalogEntry> {
        &self.entry
    }

    pub fn title(&self) -> &str {
        &self.entry.meta.title
    }

    pub fn rank(&self) -> u32 {
        self.entry.order
    }

    pub fn is_enabled(&self) -> bool {
        !self.mounted.is_empty()
    }

    /// Selection state machine, present only for interactive vector layers.
    pub fn feature_controller(&self) -> Option<&VectorFeatureController> {
        self.features.as_ref()
    }

    pub fn feature_controller_mut(&mut self) -> Option<&mut VectorFeatureController> {
        self.features.as_mut()
    }

    pub fn enable(&mut self, surface: &mut dyn MapSurface, density: f64) -> Result<(), LayerError> {
        if self.is_enabled() {
            return Ok(());
        }
        let descriptor = &self.entry.descriptor;
        let sources = descriptor.backend.render_sources(density);
        if sources.is_empty() {
            return Err(LayerError::NoRenderableSource {
                layer: self.title().to_string(),
            });
        }

        let mut added = Vec::with_capacity(sources.len());
        for (sub_index, source) in sources.into_iter().enumerate() {
            let unit = RenderUnit {
                layer_title: self.entry.meta.title.clone(),
                z_order: self.entry.order,
                sub_index,
                is_overlay: descriptor.is_overlay,
                is_transparent: descriptor.is_overlay && descriptor.is_overlay_transparent,
                source,
            };
            match surface.add_unit(&unit) {
                Ok(handle) => added.push(handle),
                Err(source) => {
                    log::warn!(
                        "rolling back {} mounted unit(s) of '{}': {source}",
                        added.len(),
                        self.title()
                    );
                    for handle in added.into_iter().rev() {
                        surface.remove_unit(handle);
                    }
                    return Err(LayerError::Rejected {
                        layer: self.title().to_string(),
                        sub_index,
                        source,
                    });
                }
            }
        }

        self.mounted = added;
        Ok(())
    }

    /// Remove every mounted unit. A selected vector feature is forgotten: its
    /// popup goes away with the layer.
    pub fn disable(&mut self, surface: &mut dyn MapSurface) {
        for handle in self.mounted.drain(..).rev() {
            surface.remove_unit(handle);
        }
        if let Some(features) = self.features.as_mut() {
            features.discard();
        }
    }

    /// Flip the layer and report whether it is now on.
    pub fn toggle(
        &mut self,
        surface: &mut dyn MapSurface,
        density: f64,
    ) -> Result<bool, LayerError> {
        if self.is_enabled() {
            self.disable(surface);
            Ok(false)
        } else {
            self.enable(surface, density)?;
            Ok(true)
        }
    }

    /// Raster sources a print or export job should fetch for this layer.
    pub fn print_sources(&self, density: f64) -> Vec<TileSource> {
        let descriptor = &self.entry.descriptor;
        if !descriptor.print {
            return Vec::new();
        }
        if matches!(descriptor.backend, LayerBackend::InteractiveVector(_)) {
            return Vec::new();
        }
        descriptor
            .backend
            .render_sources(density)
            .into_iter()
            .filter_map(|source| match source {
                RenderSource::Raster(tile) => Some(tile),
                RenderSource::CoverageOverview { .. } | RenderSource::VectorTiles(_) => None,
            })
            .collect()
    }
}
