//! Click-driven feature selection, one state machine per vector layer
//! instance.
//!
//! ```text
//! Idle --select(id)--> Selected(id) --popup_closed--> Idle
//!                      Selected(a)  --select(b)-----> Selected(b)   (a keeps its highlight)
//! ```

use super::info_panel::{FeatureInfo, FeatureInfoError};
use super::{FeatureId, VectorFeature};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(FeatureId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStyle {
    pub color: &'static str,
    pub weight: f32,
    pub opacity: f32,
}

impl FeatureStyle {
    pub const HIGHLIGHT: FeatureStyle = FeatureStyle {
        color: "#ff0000",
        weight: 6.0,
        opacity: 1.0,
    };
}

/// Style mutation hook of the vector tile renderer, addressed by feature id.
pub trait FeatureStyler {
    fn set_feature_style(&mut self, id: &FeatureId, style: FeatureStyle);
    /// Back to whatever the layer's style function produces for the feature.
    fn reset_feature_style(&mut self, id: &FeatureId);
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOutcome {
    pub info: FeatureInfo,
    /// Previously selected feature whose highlight was left in place.
    pub replaced: Option<FeatureId>,
}

#[derive(Debug, Default)]
pub struct VectorFeatureController {
    state: SelectionState,
}

impl VectorFeatureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected(&self) -> Option<&FeatureId> {
        match &self.state {
            SelectionState::Idle => None,
            SelectionState::Selected(id) => Some(id),
        }
    }

    /// Handle a click on `feature`.
    ///
    /// Re-selecting the current feature rebuilds the popup without styling it
    /// again. Selecting another feature moves the selection and does not reset
    /// the previous highlight; the caller sees that feature in
    /// [`SelectOutcome::replaced`].
    pub fn select(
        &mut self,
        feature: &VectorFeature,
        styler: &mut dyn FeatureStyler,
        tracks_storage_url: &str,
    ) -> Result<SelectOutcome, FeatureInfoError> {
        let info = FeatureInfo::from_feature(feature, tracks_storage_url)?;

        let replaced = match std::mem::take(&mut self.state) {
            SelectionState::Selected(current) if current == feature.id => {
                self.state = SelectionState::Selected(current);
                return Ok(SelectOutcome {
                    info,
                    replaced: None,
                });
            }
            SelectionState::Selected(current) => Some(current),
            SelectionState::Idle => None,
        };

        if let Some(previous) = &replaced {
            log::debug!(
                "feature '{}' replaces selection '{previous}' without reset",
                feature.id
            );
        }
        styler.set_feature_style(&feature.id, FeatureStyle::HIGHLIGHT);
        self.state = SelectionState::Selected(feature.id.clone());
        Ok(SelectOutcome { info, replaced })
    }

    /// The popup for the current selection was dismissed.
    pub fn popup_closed(&mut self, styler: &mut dyn FeatureStyler) {
        if let SelectionState::Selected(id) = std::mem::take(&mut self.state) {
            styler.reset_feature_style(&id);
        }
    }

    /// Forget the selection without touching styles, for when the layer
    /// itself leaves the map.
    pub fn discard(&mut self) {
        self.state = SelectionState::Idle;
    }
}
