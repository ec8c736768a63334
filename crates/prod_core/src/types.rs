//! Type definitions for `prod_core`.
//!
//! Map aliases, catalog enums, and the result envelope every stage returns.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::formulas::{bounded, round_map};

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// Registry id. Ore, mineral, component and finished-good ids are separate
/// keyspaces; the caller tracks which registry an id belongs to.
pub type ResourceId = u32;

/// Resource id → quantity. Ordered so iteration (and therefore greedy
/// allocation across competing recipes) is ascending by id.
pub type ResourceMap = BTreeMap<ResourceId, f64>;

/// Skill name → level, nominally in [0, 1].
pub type SkillMap = HashMap<String, f64>;

// ---------------------------------------------------------------------------
// Commodity enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    RawMaterial,
    RefinedGood,
    ManufacturedGood,
    Component,
    Fuel,
    Consumable,
}

/// Position of a resource in the production chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductionStageKind {
    Raw,
    Refined,
    Component,
    Finished,
}

// ---------------------------------------------------------------------------
// Tier enums
// ---------------------------------------------------------------------------

/// Ore purity. Declaration order is the refining progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PurityLevel {
    Raw,
    Low,
    Medium,
    High,
    Ultra,
}

impl PurityLevel {
    pub const ALL: [PurityLevel; 5] = [
        PurityLevel::Raw,
        PurityLevel::Low,
        PurityLevel::Medium,
        PurityLevel::High,
        PurityLevel::Ultra,
    ];

    /// Next tier up, or `None` at `Ultra`.
    pub fn next(self) -> Option<PurityLevel> {
        match self {
            PurityLevel::Raw => Some(PurityLevel::Low),
            PurityLevel::Low => Some(PurityLevel::Medium),
            PurityLevel::Medium => Some(PurityLevel::High),
            PurityLevel::High => Some(PurityLevel::Ultra),
            PurityLevel::Ultra => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MineralQuality {
    Standard,
    HighGrade,
    Specialized,
}

/// Condensation band of a mineral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialCategory {
    HighTemp,
    MidTemp,
    LowTemp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentQuality {
    Basic,
    Standard,
    Advanced,
    Premium,
    Prototype,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    Structural,
    Electronic,
    Mechanical,
    Power,
    Propulsion,
    LifeSupport,
    Weapons,
    Shields,
    Sensors,
}

/// Finished-good quality. `Military` sits outside the civilian ladder and is
/// only reachable for `FinishedGoodType::Military` goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinishedGoodQuality {
    Economy,
    Standard,
    Premium,
    Luxury,
    Military,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinishedGoodType {
    Consumer,
    Industrial,
    Military,
    Medical,
    Scientific,
    Luxury,
    ShipEquipment,
}

// ---------------------------------------------------------------------------
// Result envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductionResult {
    Success,
    PartialSuccess,
    Failure,
    InsufficientResources,
    /// Not produced by any stage yet; kept for equipment breakdown handling.
    EquipmentFailure,
}

pub const MIN_EFFICIENCY: f64 = 0.0;
pub const MAX_EFFICIENCY: f64 = 1.0;
pub const MIN_QUALITY_MODIFIER: f64 = 0.1;
pub const MAX_QUALITY_MODIFIER: f64 = 2.0;

/// Outcome of one stage invocation.
///
/// Fields are private so the rounding and clamping done in the constructors
/// cannot be bypassed. Serialize-only for the same reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionOutput {
    products: ResourceMap,
    waste_products: ResourceMap,
    result: ProductionResult,
    efficiency: f64,
    quality_modifier: f64,
    message: String,
}

impl ProductionOutput {
    /// Builds an envelope, rounding every quantity to 3 decimals and clamping
    /// efficiency and quality modifier. Waste entries that round to zero are
    /// dropped.
    pub fn new(
        products: &ResourceMap,
        waste_products: &ResourceMap,
        result: ProductionResult,
        efficiency: f64,
        quality_modifier: f64,
        message: impl Into<String>,
    ) -> Self {
        let products = round_map(products);
        let waste_products = round_map(waste_products)
            .into_iter()
            .filter(|(_, qty)| *qty > 0.0)
            .collect();
        Self {
            products,
            waste_products,
            result,
            efficiency: bounded(efficiency, MIN_EFFICIENCY, MAX_EFFICIENCY),
            quality_modifier: bounded(
                quality_modifier,
                MIN_QUALITY_MODIFIER,
                MAX_QUALITY_MODIFIER,
            ),
            message: message.into(),
        }
    }

    /// Empty-handed envelope used by every failure path.
    pub fn rejected(result: ProductionResult, message: impl Into<String>) -> Self {
        Self::new(
            &ResourceMap::new(),
            &ResourceMap::new(),
            result,
            0.0,
            0.0,
            message,
        )
    }

    pub fn products(&self) -> &ResourceMap {
        &self.products
    }

    pub fn waste_products(&self) -> &ResourceMap {
        &self.waste_products
    }

    pub fn result(&self) -> ProductionResult {
        self.result
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn quality_modifier(&self) -> f64 {
        self.quality_modifier
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for `Success` and `PartialSuccess`.
    pub fn is_productive(&self) -> bool {
        matches!(
            self.result,
            ProductionResult::Success | ProductionResult::PartialSuccess
        )
    }

    pub fn into_parts(self) -> (ResourceMap, ResourceMap) {
        (self.products, self.waste_products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purity_progression_is_ordered() {
        let mut tier = PurityLevel::Raw;
        let mut steps = 0;
        while let Some(next) = tier.next() {
            assert!(next > tier);
            tier = next;
            steps += 1;
        }
        assert_eq!(tier, PurityLevel::Ultra);
        assert_eq!(steps, 4);
    }

    #[test]
    fn output_rounds_and_clamps() {
        let products = ResourceMap::from([(0, 1.234_567)]);
        let waste = ResourceMap::from([(2, 0.000_1), (3, 0.5)]);
        let out = ProductionOutput::new(
            &products,
            &waste,
            ProductionResult::Success,
            1.7,
            5.0,
            "ok",
        );
        assert!((out.products()[&0] - 1.235).abs() < 1e-12);
        assert!(!out.waste_products().contains_key(&2), "zero waste is dropped");
        assert!((out.efficiency() - 1.0).abs() < 1e-12);
        assert!((out.quality_modifier() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn output_maps_nan_scores_to_their_floors() {
        let out = ProductionOutput::new(
            &ResourceMap::new(),
            &ResourceMap::new(),
            ProductionResult::Failure,
            f64::NAN,
            f64::NAN,
            "nan",
        );
        assert!(out.efficiency().abs() < 1e-12);
        assert!((out.quality_modifier() - MIN_QUALITY_MODIFIER).abs() < 1e-12);
    }

    #[test]
    fn rejected_output_is_empty_and_in_range() {
        let out = ProductionOutput::rejected(ProductionResult::Failure, "nope");
        assert!(out.products().is_empty());
        assert!(out.waste_products().is_empty());
        assert!(out.efficiency().abs() < 1e-12);
        assert!((out.quality_modifier() - MIN_QUALITY_MODIFIER).abs() < 1e-12);
        assert!(!out.is_productive());
    }

    #[test]
    fn output_serializes_with_result_tag() {
        let out = ProductionOutput::rejected(ProductionResult::InsufficientResources, "empty");
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["result"], "InsufficientResources");
        assert_eq!(json["message"], "empty");
    }
}
