use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::formulas::round2;
use crate::{MaterialCategory, MineralQuality, Resource, ResourceId};

/// Quality proxy used when a mineral carries no purity figure.
pub const DEFAULT_MINERAL_PURITY: f64 = 0.8;

/// Refined mineral, the output of refining and the input of manufacturing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mineral {
    /// Registry id; equal to the commodity id for minerals.
    pub id: ResourceId,
    #[serde(flatten)]
    pub resource: Resource,
    #[serde(default = "standard_quality")]
    pub quality: MineralQuality,
    pub material_category: MaterialCategory,
    #[serde(default)]
    pub purity: Option<f64>,
}

fn standard_quality() -> MineralQuality {
    MineralQuality::Standard
}

pub fn mineral_value_multiplier(quality: MineralQuality) -> f64 {
    match quality {
        MineralQuality::Standard => 1.0,
        MineralQuality::HighGrade => 1.75,
        MineralQuality::Specialized => 3.0,
    }
}

impl Mineral {
    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn value(&self) -> f64 {
        round2(self.resource.base_value() * mineral_value_multiplier(self.quality))
    }

    /// Quality proxy for manufacturing input.
    pub fn input_quality(&self) -> f64 {
        self.purity.unwrap_or(DEFAULT_MINERAL_PURITY)
    }

    /// One grade up; higher grades pack slightly denser.
    pub fn higher_quality_version(&self) -> Option<Mineral> {
        let next = match self.quality {
            MineralQuality::Standard => MineralQuality::HighGrade,
            MineralQuality::HighGrade => MineralQuality::Specialized,
            MineralQuality::Specialized => return None,
        };
        let mut commodity = self.resource.commodity.clone();
        commodity.volume_per_unit *= 0.95;
        Some(Mineral {
            id: self.id,
            resource: Resource::new(commodity, self.resource.production_stage),
            quality: next,
            material_category: self.material_category,
            purity: self.purity,
        })
    }
}

impl PartialEq for Mineral {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.quality == other.quality
    }
}

impl Eq for Mineral {}

impl Hash for Mineral {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.id, self.quality).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_catalog;

    #[test]
    fn value_scales_with_grade() {
        let iron = base_catalog().mineral(0).unwrap().clone();
        assert!((iron.value() - 75.0).abs() < 1e-9);
        let high = iron.higher_quality_version().unwrap();
        assert!((high.value() - 131.25).abs() < 1e-9);
        assert!(high.resource.volume() < iron.resource.volume());
        let special = high.higher_quality_version().unwrap();
        assert!(special.higher_quality_version().is_none());
        assert_ne!(iron, high);
    }

    #[test]
    fn missing_purity_defaults() {
        let mut iron = base_catalog().mineral(0).unwrap().clone();
        iron.purity = None;
        assert!((iron.input_quality() - DEFAULT_MINERAL_PURITY).abs() < 1e-12);
        iron.purity = Some(0.95);
        assert!((iron.input_quality() - 0.95).abs() < 1e-12);
    }
}
