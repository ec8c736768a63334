//! `prod_core`: deterministic production-chain stages.
//!
//! No IO. Stages are pure functions of their arguments and a shared
//! read-only [`Catalog`].

mod assembly;
mod catalog;
mod component;
mod error;
mod finished_good;
pub mod formulas;
mod manufacturing;
mod mineral;
mod ore;
mod refining;
mod resource;
mod stage;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use assembly::{
    assembly_type_waste_modifier, component_input_quality, AssemblyInfo, AssemblyStage,
    ComponentRequirementInfo, DEFAULT_ASSEMBLY_COST_PER_HOUR, DEFAULT_TECH_LEVEL,
};
pub use catalog::Catalog;
pub use component::{component_value_multiplier, Component, MANUFACTURING_WASTE_ID};
pub use error::InputError;
pub use finished_good::{
    finished_good_value_multiplier, finished_good_waste_multiplier, FinishedGood,
    ASSEMBLY_WASTE_ID,
};
pub use manufacturing::{
    manufacturing_type_waste_modifier, ComponentManufacturingStage, ManufacturingInfo,
    MineralRequirementInfo, ProductionInfo, Recipe, RecipeOutput,
    DEFAULT_MANUFACTURING_COST_PER_HOUR,
};
pub use mineral::{mineral_value_multiplier, Mineral, DEFAULT_MINERAL_PURITY};
pub use ore::{purity_waste_factor, purity_yield_fraction, Ore};
pub use refining::{
    refining_purity_modifier, MineralYieldInfo, RefiningInfo, RefiningStage,
    DEFAULT_REFINING_COST_PER_HOUR,
};
pub use resource::{Commodity, Resource, PRICE_HISTORY_CAP};
pub use stage::{ProductionStage, StageInfo};
pub use types::*;

#[cfg(test)]
mod tests;
