use serde::{Deserialize, Serialize};

use crate::model::layer::LayerBackend;

/// Static definition of one selectable layer as authored in the descriptor
/// table. `title` is the identity everything else refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_overlay: bool,
    /// Only meaningful for overlays.
    #[serde(default)]
    pub is_overlay_transparent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<char>,
    #[serde(default)]
    pub scale_dependent: bool,
    #[serde(default)]
    pub print: bool,
    #[serde(default)]
    pub jnx: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    pub backend: LayerBackend,
}

impl LayerDescriptor {
    pub fn new(title: impl Into<String>, code: impl Into<String>, backend: LayerBackend) -> Self {
        Self {
            title: title.into(),
            code: code.into(),
            is_default: false,
            is_overlay: false,
            is_overlay_transparent: false,
            description: None,
            short_name: None,
            hotkey: None,
            scale_dependent: false,
            print: false,
            jnx: false,
            attribution: None,
            backend,
        }
    }

    pub fn overlay(mut self, is_overlay: bool) -> Self {
        self.is_overlay = is_overlay;
        self
    }

    pub fn transparent(mut self) -> Self {
        self.is_overlay_transparent = true;
        self
    }

    pub fn printable(mut self) -> Self {
        self.print = true;
        self
    }

    pub fn default_enabled(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn is_wrapper(&self) -> bool {
        self.backend.is_wrapper()
    }

    pub fn is_base_layer(&self) -> bool {
        !self.is_overlay
    }
}
