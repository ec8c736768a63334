use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::formulas::accumulate;
use crate::{PurityLevel, Resource, ResourceId, ResourceMap};

fn unit_difficulty() -> f64 {
    1.0
}

/// Raw ore as mined. Refines into the minerals listed in `mineral_yield`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ore {
    /// Registry id; equal to the commodity id for ores.
    pub id: ResourceId,
    #[serde(flatten)]
    pub resource: Resource,
    /// `(mineral_id, base fraction per unit of ore)`.
    pub mineral_yield: Vec<(ResourceId, f64)>,
    pub purity: PurityLevel,
    #[serde(default = "unit_difficulty")]
    pub refining_difficulty: f64,
    #[serde(default = "unit_difficulty")]
    pub extraction_difficulty: f64,
    /// Region name → relative abundance.
    #[serde(default)]
    pub region_availability: BTreeMap<String, f64>,
    /// Waste id → per-unit waste rate at `Medium` purity.
    #[serde(default)]
    pub base_waste: ResourceMap,
}

/// Fraction of the listed mineral content actually recoverable at each purity.
pub fn purity_yield_fraction(purity: PurityLevel) -> f64 {
    match purity {
        PurityLevel::Raw => 0.5,
        PurityLevel::Low => 0.6,
        PurityLevel::Medium => 0.7,
        PurityLevel::High => 0.85,
        PurityLevel::Ultra => 0.95,
    }
}

/// Waste multiplier per purity: dirtier ore leaves more behind.
pub fn purity_waste_factor(purity: PurityLevel) -> f64 {
    match purity {
        PurityLevel::Raw => 1.4,
        PurityLevel::Low => 1.2,
        PurityLevel::Medium => 1.0,
        PurityLevel::High => 0.8,
        PurityLevel::Ultra => 0.6,
    }
}

impl Ore {
    pub fn name(&self) -> &str {
        self.resource.name()
    }

    /// Mineral id → recoverable fraction per unit, after purity.
    pub fn mineral_yields(&self) -> ResourceMap {
        let fraction = purity_yield_fraction(self.purity);
        let mut yields = ResourceMap::new();
        for &(mineral_id, base_yield) in &self.mineral_yield {
            accumulate(&mut yields, mineral_id, base_yield * fraction);
        }
        yields
    }

    /// Waste id → per-unit waste rate, after purity.
    pub fn waste_products(&self) -> ResourceMap {
        let factor = purity_waste_factor(self.purity);
        self.base_waste
            .iter()
            .map(|(id, rate)| (*id, rate * factor))
            .collect()
    }

    /// Copy of this ore template at another purity, with fresh market state.
    pub fn with_purity(&self, purity: PurityLevel) -> Ore {
        let mut ore = self.clone();
        ore.purity = purity;
        ore.resource = Resource::new(
            self.resource.commodity.clone(),
            self.resource.production_stage,
        );
        ore
    }

    pub fn higher_purity_version(&self) -> Option<Ore> {
        self.purity.next().map(|purity| self.with_purity(purity))
    }
}

impl PartialEq for Ore {
    fn eq(&self, other: &Self) -> bool {
        self.resource.id() == other.resource.id() && self.purity == other.purity
    }
}

impl Eq for Ore {}

impl Hash for Ore {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.resource.id(), self.purity).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_catalog;
    use std::collections::HashSet;

    #[test]
    fn yields_follow_purity_table() {
        let catalog = base_catalog();
        let pyrogen = catalog.ore(0).unwrap().with_purity(PurityLevel::Raw);
        let yields = pyrogen.mineral_yields();
        assert!((yields[&0] - 0.4 * 0.5).abs() < 1e-12);
        assert!((yields[&1] - 0.3 * 0.5).abs() < 1e-12);

        let ultra = pyrogen.with_purity(PurityLevel::Ultra);
        assert!(ultra.mineral_yields()[&0] > yields[&0]);
    }

    #[test]
    fn duplicate_yield_entries_are_summed() {
        let mut ore = base_catalog().ore(0).unwrap().with_purity(PurityLevel::High);
        ore.mineral_yield = vec![(0, 0.2), (0, 0.2)];
        assert!((ore.mineral_yields()[&0] - 0.4 * 0.85).abs() < 1e-12);
    }

    #[test]
    fn waste_shrinks_with_purity() {
        let ore = base_catalog().ore(0).unwrap().clone();
        let raw = ore.with_purity(PurityLevel::Raw).waste_products();
        let ultra = ore.with_purity(PurityLevel::Ultra).waste_products();
        for (id, rate) in &raw {
            assert!(ultra[id] < *rate);
        }
    }

    #[test]
    fn purity_distinguishes_map_keys() {
        let ore = base_catalog().ore(0).unwrap().clone();
        let mut set = HashSet::new();
        set.insert(ore.with_purity(PurityLevel::Low));
        set.insert(ore.with_purity(PurityLevel::High));
        set.insert(ore.with_purity(PurityLevel::Low));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn higher_purity_stops_at_ultra() {
        let ore = base_catalog().ore(0).unwrap().with_purity(PurityLevel::High);
        let ultra = ore.higher_purity_version().unwrap();
        assert_eq!(ultra.purity, PurityLevel::Ultra);
        assert!(ultra.higher_purity_version().is_none());
    }
}
