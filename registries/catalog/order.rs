use serde::{Deserialize, Serialize};

pub const CUSTOM_TOP: &str = "#custom-top";
pub const CUSTOM_BOTTOM: &str = "#custom-bottom";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEntry {
    Layer(String),
    /// Boundary above which user-imported layers are stacked.
    CustomTop,
    /// Boundary below which user-imported layers are stacked.
    CustomBottom,
}

impl OrderEntry {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Layer(title) => title,
            Self::CustomTop => CUSTOM_TOP,
            Self::CustomBottom => CUSTOM_BOTTOM,
        }
    }
}

impl From<String> for OrderEntry {
    fn from(title: String) -> Self {
        match title.as_str() {
            CUSTOM_TOP => Self::CustomTop,
            CUSTOM_BOTTOM => Self::CustomBottom,
            _ => Self::Layer(title),
        }
    }
}

impl From<&str> for OrderEntry {
    fn from(title: &str) -> Self {
        Self::from(title.to_string())
    }
}

/// Total display order. Rank is the 1-based position in this list; sentinels
/// occupy positions too, so real ranks skip over them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct OrderIndex {
    entries: Vec<OrderEntry>,
}

impl OrderIndex {
    pub fn new<I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OrderEntry>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entries(&self) -> &[OrderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(rank, entry)` pairs, rank starting at 1.
    pub fn ranked(&self) -> impl Iterator<Item = (u32, &OrderEntry)> {
        (1u32..).zip(self.entries.iter())
    }

    pub fn custom_layers_order(&self) -> CustomLayersOrder {
        let mut order = CustomLayersOrder::default();
        for (rank, entry) in self.ranked() {
            match entry {
                OrderEntry::CustomTop => order.top = order.top.or(Some(rank)),
                OrderEntry::CustomBottom => order.bottom = order.bottom.or(Some(rank)),
                OrderEntry::Layer(_) => {}
            }
        }
        order
    }
}

impl From<Vec<String>> for OrderIndex {
    fn from(titles: Vec<String>) -> Self {
        Self::new(titles)
    }
}

impl From<OrderIndex> for Vec<String> {
    fn from(index: OrderIndex) -> Self {
        index
            .entries
            .into_iter()
            .map(|entry| match entry {
                OrderEntry::Layer(title) => title,
                sentinel => sentinel.as_str().to_string(),
            })
            .collect()
    }
}

/// Where the UI inserts user-imported layers relative to the static ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CustomLayersOrder {
    pub top: Option<u32>,
    pub bottom: Option<u32>,
}
