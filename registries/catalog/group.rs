use serde::{Deserialize, Serialize};

/// A named picker section. Member order is the section's own and is kept
/// independent of the global rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub title: String,
    pub layers: Vec<String>,
}

impl GroupDefinition {
    pub fn new<I, T>(title: impl Into<String>, layers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            title: title.into(),
            layers: layers.into_iter().map(Into::into).collect(),
        }
    }
}
