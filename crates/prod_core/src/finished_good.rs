use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::formulas::round2;
use crate::{FinishedGoodQuality, FinishedGoodType, Resource, ResourceId, ResourceMap};

/// Waste id reported for assembly offcuts.
pub const ASSEMBLY_WASTE_ID: ResourceId = 3;

fn unit() -> f64 {
    1.0
}

fn first_tech_level() -> u32 {
    1
}

/// End product of the chain, assembled from components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishedGood {
    /// Registry id (independent of the commodity id).
    pub id: ResourceId,
    #[serde(flatten)]
    pub resource: Resource,
    pub quality: FinishedGoodQuality,
    pub good_type: FinishedGoodType,
    #[serde(default = "unit")]
    pub assembly_complexity: f64,
    /// Component id → quantity per good.
    pub required_components: ResourceMap,
    #[serde(default = "first_tech_level")]
    pub tech_level: u32,
    /// Hours between services; 0 means maintenance-free.
    #[serde(default)]
    pub maintenance_interval: f64,
    #[serde(default)]
    pub maintenance_cost: f64,
    #[serde(default)]
    pub special_effects: BTreeMap<String, f64>,
}

pub fn finished_good_value_multiplier(quality: FinishedGoodQuality) -> f64 {
    match quality {
        FinishedGoodQuality::Economy => 0.7,
        FinishedGoodQuality::Standard => 1.0,
        FinishedGoodQuality::Premium => 1.8,
        FinishedGoodQuality::Luxury => 3.0,
        FinishedGoodQuality::Military => 2.5,
    }
}

/// Waste multiplier per finished-good quality, shared with the assembly stage.
pub fn finished_good_waste_multiplier(quality: FinishedGoodQuality) -> f64 {
    match quality {
        FinishedGoodQuality::Economy => 0.8,
        FinishedGoodQuality::Standard => 1.0,
        FinishedGoodQuality::Premium => 1.2,
        FinishedGoodQuality::Luxury => 1.5,
        FinishedGoodQuality::Military => 1.3,
    }
}

impl FinishedGood {
    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn is_military(&self) -> bool {
        self.good_type == FinishedGoodType::Military
    }

    pub fn value(&self) -> f64 {
        let complexity_factor = 1.0 + (self.assembly_complexity - 1.0) * 0.3;
        let tech_factor = 1.0 + (f64::from(self.tech_level) - 1.0) * 0.2;
        round2(
            self.resource.base_value()
                * finished_good_value_multiplier(self.quality)
                * complexity_factor
                * tech_factor,
        )
    }

    /// Next rung on the good's ladder. Military goods climb
    /// Standard → Premium → Military; everything else tops out at Luxury.
    pub fn higher_quality_version(&self) -> Option<FinishedGood> {
        use FinishedGoodQuality as Q;
        let next = match (self.is_military(), self.quality) {
            (false, Q::Economy) => Q::Standard,
            (_, Q::Standard) => Q::Premium,
            (false, Q::Premium) => Q::Luxury,
            (true, Q::Premium) => Q::Military,
            _ => return None,
        };
        let mut upgraded = self.clone();
        upgraded.quality = next;
        upgraded.resource = Resource::new(
            self.resource.commodity.clone(),
            self.resource.production_stage,
        );
        Some(upgraded)
    }

    pub fn waste_products(&self) -> ResourceMap {
        let complexity_factor = 1.0 + (self.assembly_complexity - 1.0) * 0.1;
        let rate = 0.05 * finished_good_waste_multiplier(self.quality) * complexity_factor;
        ResourceMap::from([(ASSEMBLY_WASTE_ID, round2(rate))])
    }
}

impl PartialEq for FinishedGood {
    fn eq(&self, other: &Self) -> bool {
        self.resource.id() == other.resource.id() && self.quality == other.quality
    }
}

impl Eq for FinishedGood {}

impl Hash for FinishedGood {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.resource.id(), self.quality).hash(state);
    }
}
