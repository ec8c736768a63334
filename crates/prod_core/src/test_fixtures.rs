//! Shared test fixtures for prod_core and downstream crates.
//!
//! `base_catalog()` mirrors the shipped `content/` catalog so scenario tests
//! and content-validation tests agree on ids, prices and recipes.
//! `minimal_catalog()` holds one entry per stage for focused tests.

use crate::{
    Catalog, Category, Commodity, Component, ComponentQuality, ComponentType, FinishedGood,
    FinishedGoodQuality, FinishedGoodType, MaterialCategory, Mineral, MineralQuality, Ore,
    ProductionStageKind, PurityLevel, Resource, ResourceId, ResourceMap, SkillMap,
};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

fn commodity(
    id: ResourceId,
    name: &str,
    category: Category,
    base_price: f64,
    price_volatility: f64,
    volume_per_unit: f64,
    mass_per_unit: f64,
) -> Commodity {
    Commodity {
        id,
        name: name.to_string(),
        category,
        base_price,
        price_volatility,
        volatility_range: (0.0, 0.0),
        description: String::new(),
        volume_per_unit,
        mass_per_unit,
    }
}

fn map(pairs: &[(ResourceId, f64)]) -> ResourceMap {
    pairs.iter().copied().collect()
}

fn regions(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

struct OreRow {
    id: ResourceId,
    name: &'static str,
    price: f64,
    volume: f64,
    mass: f64,
    yields: &'static [(ResourceId, f64)],
    purity: PurityLevel,
    difficulty: f64,
    waste: &'static [(ResourceId, f64)],
    regions: &'static [(&'static str, f64)],
}

const ORES: [OreRow; 9] = [
    OreRow { id: 0, name: "Pyrogen", price: 29.0, volume: 0.3, mass: 0.9, yields: &[(0, 0.4), (1, 0.3)], purity: PurityLevel::Medium, difficulty: 1.0, waste: &[(0, 0.2), (1, 0.1)], regions: &[("inner_belt", 0.8), ("outer_belt", 0.3)] },
    OreRow { id: 1, name: "Ascorbon", price: 16.0, volume: 0.15, mass: 0.4, yields: &[(1, 0.5), (4, 0.2)], purity: PurityLevel::Low, difficulty: 1.1, waste: &[(0, 0.15), (1, 0.15)], regions: &[("inner_belt", 0.6), ("outer_belt", 0.7)] },
    OreRow { id: 2, name: "Angion", price: 55.0, volume: 0.35, mass: 1.0, yields: &[(2, 0.4), (5, 0.3)], purity: PurityLevel::Medium, difficulty: 1.2, waste: &[(0, 0.25)], regions: &[("inner_belt", 0.5)] },
    OreRow { id: 3, name: "Varite", price: 18.0, volume: 0.1, mass: 0.3, yields: &[(3, 0.35), (4, 0.25)], purity: PurityLevel::Low, difficulty: 1.0, waste: &[(1, 0.2)], regions: &[("outer_belt", 0.9)] },
    OreRow { id: 4, name: "Oxynite", price: 3500.0, volume: 16.0, mass: 40.0, yields: &[(9, 0.15), (11, 0.05)], purity: PurityLevel::High, difficulty: 2.0, waste: &[(0, 0.3), (1, 0.2)], regions: &[("deep_space", 0.1)] },
    OreRow { id: 5, name: "Cyclon", price: 600.0, volume: 2.0, mass: 5.0, yields: &[(6, 0.4), (7, 0.2)], purity: PurityLevel::Medium, difficulty: 1.5, waste: &[(0, 0.2), (1, 0.1)], regions: &[("outer_belt", 0.4)] },
    OreRow { id: 6, name: "Heron", price: 1200.0, volume: 3.0, mass: 7.0, yields: &[(8, 0.3), (10, 0.2)], purity: PurityLevel::High, difficulty: 1.7, waste: &[(0, 0.2)], regions: &[("outer_belt", 0.2), ("deep_space", 0.3)] },
    OreRow { id: 7, name: "Jonnite", price: 7250.0, volume: 16.0, mass: 45.0, yields: &[(11, 0.2), (10, 0.15)], purity: PurityLevel::Ultra, difficulty: 2.5, waste: &[(0, 0.35), (1, 0.15)], regions: &[("deep_space", 0.05)] },
    OreRow { id: 8, name: "Magneton", price: 580.0, volume: 1.2, mass: 3.5, yields: &[(8, 0.25), (7, 0.3)], purity: PurityLevel::Medium, difficulty: 1.4, waste: &[(0, 0.2), (1, 0.1)], regions: &[("inner_belt", 0.3), ("outer_belt", 0.4)] },
];

const MINERALS: [(ResourceId, &str, f64, f64, f64, MaterialCategory); 12] = [
    (0, "Iron", 75.0, 0.2, 1.57, MaterialCategory::HighTemp),
    (1, "Carbon", 45.0, 0.1, 0.22, MaterialCategory::LowTemp),
    (2, "Silicon", 90.0, 0.15, 0.35, MaterialCategory::HighTemp),
    (3, "Copper", 110.0, 0.25, 2.24, MaterialCategory::MidTemp),
    (4, "Zinc", 85.0, 0.2, 1.43, MaterialCategory::MidTemp),
    (5, "Aluminum", 95.0, 0.18, 0.49, MaterialCategory::HighTemp),
    (6, "Titanium", 200.0, 0.3, 1.35, MaterialCategory::HighTemp),
    (7, "Nickel", 150.0, 0.22, 1.96, MaterialCategory::HighTemp),
    (8, "Neodymium", 300.0, 0.25, 1.75, MaterialCategory::HighTemp),
    (9, "Gold", 500.0, 0.1, 1.93, MaterialCategory::HighTemp),
    (10, "Rare Earth Elements", 450.0, 0.15, 1.0, MaterialCategory::HighTemp),
    (11, "Exotic Materials", 1200.0, 0.5, 2.5, MaterialCategory::HighTemp),
];

fn ore(row: &OreRow) -> Ore {
    Ore {
        id: row.id,
        resource: Resource::new(
            commodity(row.id, row.name, Category::RawMaterial, row.price, 0.2, row.volume, row.mass),
            ProductionStageKind::Raw,
        ),
        mineral_yield: row.yields.to_vec(),
        purity: row.purity,
        refining_difficulty: row.difficulty,
        extraction_difficulty: row.difficulty,
        region_availability: regions(row.regions),
        base_waste: map(row.waste),
    }
}

fn mineral(
    (id, name, price, volume, mass, material_category): (ResourceId, &str, f64, f64, f64, MaterialCategory),
) -> Mineral {
    Mineral {
        id,
        resource: Resource::new(
            commodity(id, name, Category::RefinedGood, price, 0.1, volume, mass),
            ProductionStageKind::Refined,
        ),
        quality: MineralQuality::Standard,
        material_category,
        purity: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn component(
    id: ResourceId,
    resource: Commodity,
    quality: ComponentQuality,
    component_type: ComponentType,
    manufacturing_complexity: f64,
    required_minerals: &[(ResourceId, f64)],
    tech_level: u32,
    power_requirement: f64,
) -> Component {
    Component {
        id,
        resource: Resource::new(resource, ProductionStageKind::Component),
        quality,
        component_type,
        manufacturing_complexity,
        required_minerals: map(required_minerals),
        tech_level,
        durability: 1.0,
        efficiency: 1.0,
        compatible_ship_classes: Vec::new(),
        power_requirement,
    }
}

#[allow(clippy::too_many_arguments)]
fn finished_good(
    id: ResourceId,
    resource: Commodity,
    quality: FinishedGoodQuality,
    good_type: FinishedGoodType,
    assembly_complexity: f64,
    required_components: &[(ResourceId, f64)],
    tech_level: u32,
    maintenance_interval: f64,
) -> FinishedGood {
    FinishedGood {
        id,
        resource: Resource::new(resource, ProductionStageKind::Finished),
        quality,
        good_type,
        assembly_complexity,
        required_components: map(required_components),
        tech_level,
        maintenance_interval,
        maintenance_cost: 0.0,
        special_effects: BTreeMap::new(),
    }
}

fn components() -> Vec<Component> {
    let part = |id, name, price, volatility, volume, mass| {
        commodity(id, name, Category::Component, price, volatility, volume, mass)
    };
    vec![
        component(0, part(100, "Basic Circuit Board", 250.0, 0.2, 0.05, 0.1), ComponentQuality::Basic, ComponentType::Electronic, 1.2, &[(3, 0.2), (2, 0.3)], 1, 0.5),
        component(1, part(101, "Steel Frame", 180.0, 0.1, 0.4, 2.0), ComponentQuality::Standard, ComponentType::Structural, 1.0, &[(0, 0.8), (1, 0.1)], 1, 0.0),
        component(2, part(102, "Power Converter", 350.0, 0.25, 0.2, 0.8), ComponentQuality::Advanced, ComponentType::Power, 1.8, &[(3, 0.3), (8, 0.2), (5, 0.2)], 2, 0.0),
        component(3, part(103, "Thruster Nozzle", 420.0, 0.15, 0.3, 1.5), ComponentQuality::Standard, ComponentType::Propulsion, 1.5, &[(6, 0.5), (5, 0.3)], 2, 0.0),
        component(4, part(104, "Sensor Array", 580.0, 0.3, 0.15, 0.4), ComponentQuality::Premium, ComponentType::Sensors, 2.2, &[(10, 0.2), (3, 0.3), (2, 0.4)], 3, 2.0),
        component(5, part(105, "Shield Emitter", 1200.0, 0.4, 0.25, 1.2), ComponentQuality::Prototype, ComponentType::Shields, 3.0, &[(11, 0.1), (8, 0.3), (10, 0.4)], 4, 8.0),
    ]
}

fn finished_goods() -> Vec<FinishedGood> {
    let good = |id, name, price, volume, mass| {
        commodity(id, name, Category::ManufacturedGood, price, 0.15, volume, mass)
    };
    vec![
        finished_good(0, good(200, "Personal Computer", 800.0, 0.1, 0.5), FinishedGoodQuality::Standard, FinishedGoodType::Consumer, 1.5, &[(0, 2.0), (1, 1.0), (2, 1.0)], 2, 0.0),
        finished_good(1, good(201, "Mining Laser", 1500.0, 0.3, 1.2), FinishedGoodQuality::Standard, FinishedGoodType::Industrial, 2.0, &[(0, 1.0), (2, 2.0), (3, 1.0)], 2, 500.0),
        finished_good(2, good(202, "Medical Scanner", 2200.0, 0.2, 0.8), FinishedGoodQuality::Premium, FinishedGoodType::Medical, 2.5, &[(0, 3.0), (2, 1.0), (4, 2.0)], 3, 1000.0),
        finished_good(3, good(203, "Shield Generator", 5000.0, 0.5, 2.5), FinishedGoodQuality::Military, FinishedGoodType::Military, 3.0, &[(0, 2.0), (2, 3.0), (5, 2.0)], 4, 250.0),
        finished_good(4, good(204, "Luxury Wristwatch", 3500.0, 0.01, 0.05), FinishedGoodQuality::Luxury, FinishedGoodType::Luxury, 2.2, &[(0, 1.0), (1, 0.1)], 2, 0.0),
        finished_good(5, good(205, "Research Instrument", 4200.0, 0.3, 1.0), FinishedGoodQuality::Premium, FinishedGoodType::Scientific, 2.8, &[(0, 4.0), (2, 2.0), (4, 3.0)], 3, 750.0),
    ]
}

/// Full catalog: nine ores, twelve minerals, six components, six finished
/// goods. Matches `content/` at the workspace root.
pub fn base_catalog() -> Catalog {
    Catalog::from_entries(
        ORES.iter().map(ore).collect(),
        MINERALS.iter().copied().map(mineral).collect(),
        components(),
        finished_goods(),
    )
}

/// Pyrogen, Iron, Carbon, Copper, Silicon, the circuit board and the
/// luxury wristwatch: just enough for one trip down the chain.
pub fn minimal_catalog() -> Catalog {
    let mut catalog = base_catalog();
    catalog.ores.retain(|id, _| *id == 0);
    catalog.minerals.retain(|id, _| [0, 1, 2, 3].contains(id));
    catalog.components.retain(|id, _| [0, 1].contains(id));
    catalog.finished_goods.retain(|id, _| *id == 4);
    catalog
}

/// Every refining, manufacturing and assembly skill at `level`.
pub fn uniform_skills(level: f64) -> SkillMap {
    [
        "engineering",
        "chemistry",
        "materials_science",
        "equipment_operation",
        "manufacturing",
        "precision_work",
        "quality_control",
        "assembly",
        "project_management",
    ]
    .iter()
    .map(|name| ((*name).to_string(), level))
    .collect()
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
