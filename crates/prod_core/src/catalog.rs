//! Read-only registries of every ore, mineral, component and finished good.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Component, FinishedGood, Mineral, Ore, ResourceId};

/// The four registries, keyed by registry id. Built once at load time and
/// shared by `Arc` between stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub ores: BTreeMap<ResourceId, Ore>,
    pub minerals: BTreeMap<ResourceId, Mineral>,
    pub components: BTreeMap<ResourceId, Component>,
    pub finished_goods: BTreeMap<ResourceId, FinishedGood>,
}

impl Catalog {
    /// Builds a catalog from entry lists, keying each entry by its own id.
    /// Later duplicates replace earlier ones; loaders reject duplicates before
    /// calling this.
    pub fn from_entries(
        ores: Vec<Ore>,
        minerals: Vec<Mineral>,
        components: Vec<Component>,
        finished_goods: Vec<FinishedGood>,
    ) -> Self {
        Self {
            ores: ores.into_iter().map(|o| (o.id, o)).collect(),
            minerals: minerals.into_iter().map(|m| (m.id, m)).collect(),
            components: components.into_iter().map(|c| (c.id, c)).collect(),
            finished_goods: finished_goods.into_iter().map(|g| (g.id, g)).collect(),
        }
    }

    pub fn ore(&self, id: ResourceId) -> Option<&Ore> {
        self.ores.get(&id)
    }

    pub fn mineral(&self, id: ResourceId) -> Option<&Mineral> {
        self.minerals.get(&id)
    }

    pub fn component(&self, id: ResourceId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn finished_good(&self, id: ResourceId) -> Option<&FinishedGood> {
        self.finished_goods.get(&id)
    }

    /// Display name of a mineral, falling back to `Mineral {id}`.
    pub fn mineral_name(&self, id: ResourceId) -> String {
        self.mineral(id)
            .map_or_else(|| format!("Mineral {id}"), |m| m.name().to_string())
    }

    /// Display name of a component, falling back to `Component {id}`.
    pub fn component_name(&self, id: ResourceId) -> String {
        self.component(id)
            .map_or_else(|| format!("Component {id}"), |c| c.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_catalog;

    #[test]
    fn lookups_by_registry() {
        let catalog = base_catalog();
        assert_eq!(catalog.ore(0).unwrap().name(), "Pyrogen");
        assert_eq!(catalog.mineral(3).unwrap().name(), "Copper");
        assert_eq!(catalog.component(0).unwrap().name(), "Basic Circuit Board");
        assert_eq!(catalog.finished_good(1).unwrap().name(), "Mining Laser");
        assert!(catalog.ore(99).is_none());
    }

    #[test]
    fn names_fall_back_for_unknown_ids() {
        let catalog = base_catalog();
        assert_eq!(catalog.mineral_name(0), "Iron");
        assert_eq!(catalog.mineral_name(42), "Mineral 42");
        assert_eq!(catalog.component_name(42), "Component 42");
    }

    #[test]
    fn component_and_commodity_ids_are_separate() {
        let catalog = base_catalog();
        let board = catalog.component(0).unwrap();
        assert_eq!(board.id, 0);
        assert_eq!(board.resource.id(), 100);
    }

    #[test]
    fn catalog_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
