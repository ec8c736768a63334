use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::formulas::round2;
use crate::{ComponentQuality, ComponentType, Resource, ResourceId, ResourceMap};

/// Waste id reported for component manufacturing scrap.
pub const MANUFACTURING_WASTE_ID: ResourceId = 2;

fn unit() -> f64 {
    1.0
}

fn first_tech_level() -> u32 {
    1
}

/// Manufactured part built from minerals and consumed by assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Registry id (independent of the commodity id).
    pub id: ResourceId,
    #[serde(flatten)]
    pub resource: Resource,
    pub quality: ComponentQuality,
    pub component_type: ComponentType,
    #[serde(default = "unit")]
    pub manufacturing_complexity: f64,
    /// Mineral id → quantity per component.
    pub required_minerals: ResourceMap,
    #[serde(default = "first_tech_level")]
    pub tech_level: u32,
    #[serde(default = "unit")]
    pub durability: f64,
    #[serde(default = "unit")]
    pub efficiency: f64,
    #[serde(default)]
    pub compatible_ship_classes: Vec<String>,
    #[serde(default)]
    pub power_requirement: f64,
}

pub fn component_value_multiplier(quality: ComponentQuality) -> f64 {
    match quality {
        ComponentQuality::Basic => 0.8,
        ComponentQuality::Standard => 1.0,
        ComponentQuality::Advanced => 1.5,
        ComponentQuality::Premium => 2.5,
        ComponentQuality::Prototype => 4.0,
    }
}

fn component_waste_multiplier(quality: ComponentQuality) -> f64 {
    match quality {
        ComponentQuality::Basic => 0.8,
        ComponentQuality::Standard => 1.0,
        ComponentQuality::Advanced => 1.2,
        ComponentQuality::Premium => 1.5,
        ComponentQuality::Prototype => 2.0,
    }
}

impl Component {
    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn value(&self) -> f64 {
        let complexity_factor = 1.0 + (self.manufacturing_complexity - 1.0) * 0.2;
        let tech_factor = 1.0 + (f64::from(self.tech_level) - 1.0) * 0.15;
        round2(
            self.resource.base_value()
                * component_value_multiplier(self.quality)
                * complexity_factor
                * tech_factor,
        )
    }

    pub fn higher_quality_version(&self) -> Option<Component> {
        let next = match self.quality {
            ComponentQuality::Basic => ComponentQuality::Standard,
            ComponentQuality::Standard => ComponentQuality::Advanced,
            ComponentQuality::Advanced => ComponentQuality::Premium,
            ComponentQuality::Premium => ComponentQuality::Prototype,
            ComponentQuality::Prototype => return None,
        };
        let mut upgraded = self.clone();
        upgraded.quality = next;
        upgraded.resource = Resource::new(
            self.resource.commodity.clone(),
            self.resource.production_stage,
        );
        Some(upgraded)
    }

    /// Per-unit scrap rate, tighter tolerances waste more.
    pub fn waste_products(&self) -> ResourceMap {
        let complexity_factor = 1.0 + (self.manufacturing_complexity - 1.0) * 0.1;
        let rate = 0.15 * component_waste_multiplier(self.quality) * complexity_factor;
        ResourceMap::from([(MANUFACTURING_WASTE_ID, round2(rate))])
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.resource.id() == other.resource.id() && self.quality == other.quality
    }
}

impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.resource.id(), self.quality).hash(state);
    }
}
