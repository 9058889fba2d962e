/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Layer catalog assembly.
//!
//! Three independently authored lists go in: the descriptor table, the total
//! display order and the picker groups. [`assemble`] cross-checks them and
//! returns an immutable [`AssembledCatalog`]. There is no partially valid
//! catalog; any inconsistency is a configuration error.

pub mod descriptor;
pub mod group;
pub mod order;
pub mod seed;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use descriptor::LayerDescriptor;
use group::GroupDefinition;
use order::{CustomLayersOrder, OrderEntry, OrderIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerMeta {
    pub title: String,
}

/// A descriptor after assembly: its rank in the display order and the display
/// metadata copied from the title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub descriptor: LayerDescriptor,
    pub order: u32,
    pub meta: LayerMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogGroup {
    pub title: String,
    pub layers: Vec<Arc<CatalogEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    MissingFromOrder { title: String },
    UnknownGroupMember { group: String, title: String },
    DuplicateTitle { title: String },
    DuplicateOrderEntry { title: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFromOrder { title } => {
                write!(f, "layer title not found in order list: {title}")
            }
            Self::UnknownGroupMember { group, title } => {
                write!(f, "group '{group}' lists unknown layer: {title}")
            }
            Self::DuplicateTitle { title } => write!(f, "layer title defined twice: {title}"),
            Self::DuplicateOrderEntry { title } => {
                write!(f, "order list names the same entry twice: {title}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledCatalog {
    groups: Vec<CatalogGroup>,
    #[serde(skip)]
    entries: Vec<Arc<CatalogEntry>>,
    #[serde(skip)]
    by_title: HashMap<String, usize>,
    custom_layers_order: CustomLayersOrder,
}

/// Cross-link descriptors, display order and groups.
///
/// Every descriptor must appear in `order`; every group member must name a
/// descriptor. Order entries without a descriptor are tolerated. A title may
/// be listed in several groups.
pub fn assemble(
    descriptors: Vec<LayerDescriptor>,
    order: &OrderIndex,
    groups: &[GroupDefinition],
) -> Result<AssembledCatalog, CatalogError> {
    let mut rank_by_title = HashMap::<&str, u32>::with_capacity(order.len());
    for (rank, entry) in order.ranked() {
        if rank_by_title.insert(entry.as_str(), rank).is_some() {
            return Err(CatalogError::DuplicateOrderEntry {
                title: entry.as_str().to_string(),
            });
        }
    }

    let mut seen = HashSet::with_capacity(descriptors.len());
    let mut entries = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if !seen.insert(descriptor.title.clone()) {
            return Err(CatalogError::DuplicateTitle {
                title: descriptor.title,
            });
        }
        let Some(&rank) = rank_by_title.get(descriptor.title.as_str()) else {
            return Err(CatalogError::MissingFromOrder {
                title: descriptor.title,
            });
        };
        entries.push(Arc::new(CatalogEntry {
            meta: LayerMeta {
                title: descriptor.title.clone(),
            },
            order: rank,
            descriptor,
        }));
    }
    entries.sort_by_key(|entry| entry.order);

    let by_title: HashMap<String, usize> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| (entry.meta.title.clone(), index))
        .collect();

    let groups = groups
        .iter()
        .map(|group| -> Result<CatalogGroup, CatalogError> {
            let layers = group
                .layers
                .iter()
                .map(|title| {
                    by_title
                        .get(title)
                        .map(|&index| Arc::clone(&entries[index]))
                        .ok_or_else(|| CatalogError::UnknownGroupMember {
                            group: group.title.clone(),
                            title: title.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CatalogGroup {
                title: group.title.clone(),
                layers,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let ungrouped = entries
        .iter()
        .filter(|entry| {
            !groups
                .iter()
                .any(|group| group.layers.iter().any(|member| Arc::ptr_eq(member, entry)))
        })
        .count();
    if ungrouped > 0 {
        log::debug!("{ungrouped} catalog layer(s) are not listed in any group");
    }

    let unused_order_titles = order
        .entries()
        .iter()
        .filter(|entry| matches!(entry, OrderEntry::Layer(title) if !by_title.contains_key(title)))
        .count();
    if unused_order_titles > 0 {
        log::debug!("order entries without a descriptor: {unused_order_titles}");
    }

    log::info!(
        "assembled layer catalog: {} layers in {} groups",
        entries.len(),
        groups.len()
    );

    Ok(AssembledCatalog {
        groups,
        entries,
        by_title,
        custom_layers_order: order.custom_layers_order(),
    })
}

impl AssembledCatalog {
    pub fn groups(&self) -> &[CatalogGroup] {
        &self.groups
    }

    pub fn group(&self, title: &str) -> Option<&CatalogGroup> {
        self.groups.iter().find(|group| group.title == title)
    }

    pub fn get(&self, title: &str) -> Option<&Arc<CatalogEntry>> {
        self.by_title.get(title).map(|&index| &self.entries[index])
    }

    /// Every entry, lowest rank first.
    pub fn entries_by_rank(&self) -> &[Arc<CatalogEntry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Codes are not required to be unique; the lowest-ranked match wins.
    pub fn find_by_code(&self, code: &str) -> Option<&Arc<CatalogEntry>> {
        self.entries
            .iter()
            .find(|entry| entry.descriptor.code == code)
    }

    pub fn default_titles(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.descriptor.is_default)
            .map(|entry| entry.meta.title.as_str())
            .collect()
    }

    pub fn custom_layers_order(&self) -> CustomLayersOrder {
        self.custom_layers_order
    }

    /// Resolve a `/`-separated code list such as `O/Wp`, as stored in a
    /// shared link. Unknown codes are skipped.
    pub fn decode_codes(&self, codes: &str) -> Vec<Arc<CatalogEntry>> {
        codes
            .split('/')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .filter_map(|code| {
                let found = self.find_by_code(code).cloned();
                if found.is_none() {
                    log::warn!("ignoring unknown layer code '{code}'");
                }
                found
            })
            .collect()
    }

    pub fn encode_codes<'a>(&self, titles: impl IntoIterator<Item = &'a str>) -> String {
        titles
            .into_iter()
            .filter_map(|title| self.get(title))
            .map(|entry| entry.descriptor.code.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::model::layer::LayerBackend;
    use crate::model::layer::tile_source::TileSource;
    use order::{CUSTOM_BOTTOM, CUSTOM_TOP};

    fn leaf(title: &str, code: &str) -> LayerDescriptor {
        LayerDescriptor::new(
            title,
            code,
            LayerBackend::Leaf(TileSource::xyz(format!(
                "https://tiles.example/{code}/{{z}}/{{x}}/{{y}}.png"
            ))),
        )
    }

    fn small_catalog() -> AssembledCatalog {
        assemble(
            vec![
                leaf("Topo", "T").overlay(true),
                leaf("A", "O").default_enabled(),
                leaf("Passes", "Wp").overlay(true).transparent().default_enabled(),
            ],
            &OrderIndex::new(["Satellite", CUSTOM_BOTTOM, "A", "Topo", CUSTOM_TOP, "Passes"]),
            &[
                GroupDefinition::new("Base", ["A"]),
                GroupDefinition::new("Overlays", ["Passes", "Topo"]),
            ],
        )
        .expect("consistent inputs assemble")
    }

    #[test]
    fn group_member_takes_rank_from_order_position() {
        let catalog = small_catalog();

        let base = catalog.group("Base").expect("group exists");
        assert_eq!(base.layers[0].order, 3);
        assert_eq!(base.layers[0].meta.title, "A");
    }

    #[test]
    fn groups_keep_their_declared_order() {
        let catalog = small_catalog();
        let overlays = catalog.group("Overlays").expect("group exists");

        let titles: Vec<_> = overlays.layers.iter().map(|e| e.meta.title.as_str()).collect();
        assert_eq!(titles, vec!["Passes", "Topo"]);
        assert!(overlays.layers[0].order > overlays.layers[1].order);
    }

    #[test]
    fn descriptor_absent_from_order_is_fatal() {
        let err = assemble(
            vec![leaf("A", "O"), leaf("Lost", "L")],
            &OrderIndex::new(["A"]),
            &[],
        )
        .expect_err("missing title must fail");
        assert_eq!(
            err,
            CatalogError::MissingFromOrder {
                title: "Lost".to_string()
            }
        );
        assert!(err.to_string().contains("Lost"));
    }

    #[test]
    fn group_member_without_descriptor_is_fatal() {
        let err = assemble(
            vec![leaf("A", "O")],
            &OrderIndex::new(["A", "Ghost"]),
            &[GroupDefinition::new("Base", ["A", "Ghost"])],
        )
        .expect_err("unknown member must fail");
        assert_eq!(
            err,
            CatalogError::UnknownGroupMember {
                group: "Base".to_string(),
                title: "Ghost".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_titles_are_rejected() {
        let duplicate_descriptor = assemble(
            vec![leaf("A", "O"), leaf("A", "P")],
            &OrderIndex::new(["A"]),
            &[],
        );
        assert!(matches!(
            duplicate_descriptor,
            Err(CatalogError::DuplicateTitle { .. })
        ));

        let duplicate_order = assemble(vec![leaf("A", "O")], &OrderIndex::new(["A", "A"]), &[]);
        assert!(matches!(
            duplicate_order,
            Err(CatalogError::DuplicateOrderEntry { .. })
        ));
    }

    #[test]
    fn a_layer_may_sit_in_several_groups() {
        let catalog = assemble(
            vec![leaf("A", "O")],
            &OrderIndex::new(["A"]),
            &[
                GroupDefinition::new("One", ["A"]),
                GroupDefinition::new("Two", ["A"]),
            ],
        )
        .expect("shared membership is allowed");

        let one = &catalog.group("One").expect("group").layers[0];
        let two = &catalog.group("Two").expect("group").layers[0];
        assert!(Arc::ptr_eq(one, two));
    }

    #[test]
    fn queries_resolve_codes_defaults_and_insertion_points() {
        let catalog = small_catalog();

        assert_eq!(
            catalog.custom_layers_order(),
            CustomLayersOrder {
                top: Some(5),
                bottom: Some(2),
            }
        );
        assert_eq!(catalog.default_titles(), vec!["A", "Passes"]);
        assert_eq!(
            catalog.find_by_code("Wp").map(|entry| entry.meta.title.as_str()),
            Some("Passes")
        );

        let decoded: Vec<_> = catalog
            .decode_codes("O/nope/Wp")
            .iter()
            .map(|entry| entry.meta.title.clone())
            .collect();
        assert_eq!(decoded, vec!["A".to_string(), "Passes".to_string()]);
        assert_eq!(catalog.encode_codes(["A", "Passes"]), "O/Wp");

        let ranks: Vec<_> = catalog.entries_by_rank().iter().map(|e| e.order).collect();
        assert_eq!(ranks, vec![3, 4, 6]);
    }

    proptest! {
        #[test]
        fn ranks_follow_order_positions(
            count in 1usize..24,
            shuffle in proptest::collection::vec(any::<u32>(), 24),
        ) {
            let mut titles: Vec<String> = (0..count).map(|i| format!("layer-{i}")).collect();
            titles.sort_by_key(|title| {
                let i: usize = title[6..].parse().unwrap_or(0);
                shuffle[i]
            });
            let order = OrderIndex::new(titles.iter().map(String::as_str));
            let descriptors = (0..count)
                .map(|i| leaf(&format!("layer-{i}"), &format!("c{i}")))
                .collect();

            let catalog = assemble(descriptors, &order, &[]).expect("complete order");

            for (position, title) in titles.iter().enumerate() {
                let entry = catalog.get(title).expect("every title is present");
                prop_assert_eq!(entry.order as usize, position + 1);
            }
            let ranks: Vec<_> = catalog.entries_by_rank().iter().map(|e| e.order).collect();
            prop_assert!(ranks.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}
