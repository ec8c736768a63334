use super::*;
use crate::test_fixtures::{base_catalog, make_rng, uniform_skills};
use std::sync::Arc;

mod chain;
mod properties;

// --- Shared test helpers ------------------------------------------------

fn test_catalog() -> Arc<Catalog> {
    Arc::new(base_catalog())
}

fn full_skills() -> SkillMap {
    uniform_skills(1.0)
}

fn no_skills() -> SkillMap {
    SkillMap::new()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Every stage behind the trait object, for properties that hold for all.
fn all_stages(catalog: &Arc<Catalog>) -> Vec<Box<dyn ProductionStage>> {
    vec![
        Box::new(RefiningStage::new(Arc::clone(catalog))),
        Box::new(ComponentManufacturingStage::new(Arc::clone(catalog))),
        Box::new(AssemblyStage::new(Arc::clone(catalog))),
    ]
}
