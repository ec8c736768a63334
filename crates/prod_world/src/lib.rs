//! Catalog loading shared between prod_cli and the content tests.
//!
//! Reads `ores.json`, `minerals.json`, `components.json` and
//! `finished_goods.json` from a content directory, rejects duplicate ids, and
//! validates cross-references before handing out a [`Catalog`].

use anyhow::{ensure, Context, Result};
use prod_core::{
    Catalog, Component, FinishedGood, FinishedGoodQuality, FinishedGoodType, Mineral, Ore,
    ProductionStageKind, ResourceId,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

#[derive(Deserialize)]
struct OresFile {
    ores: Vec<Ore>,
}

#[derive(Deserialize)]
struct MineralsFile {
    minerals: Vec<Mineral>,
}

#[derive(Deserialize)]
struct ComponentsFile {
    components: Vec<Component>,
}

#[derive(Deserialize)]
struct FinishedGoodsFile {
    finished_goods: Vec<FinishedGood>,
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    serde_json::from_str(
        &std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?,
    )
    .with_context(|| format!("parsing {file}"))
}

fn ensure_unique_ids(kind: &str, ids: impl IntoIterator<Item = ResourceId>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        ensure!(seen.insert(id), "duplicate {kind} id {id}");
    }
    Ok(())
}

pub fn load_catalog(content_dir: &str) -> Result<Catalog> {
    let dir = Path::new(content_dir);
    let ores: OresFile = read_json(dir, "ores.json")?;
    let minerals: MineralsFile = read_json(dir, "minerals.json")?;
    let components: ComponentsFile = read_json(dir, "components.json")?;
    let finished_goods: FinishedGoodsFile = read_json(dir, "finished_goods.json")?;

    ensure_unique_ids("ore", ores.ores.iter().map(|o| o.id))?;
    ensure_unique_ids("mineral", minerals.minerals.iter().map(|m| m.id))?;
    ensure_unique_ids("component", components.components.iter().map(|c| c.id))?;
    ensure_unique_ids(
        "finished good",
        finished_goods.finished_goods.iter().map(|g| g.id),
    )?;

    let catalog = Catalog::from_entries(
        ores.ores,
        minerals.minerals,
        components.components,
        finished_goods.finished_goods,
    );
    validate_catalog(&catalog).with_context(|| format!("validating {content_dir}"))?;
    info!(
        ores = catalog.ores.len(),
        minerals = catalog.minerals.len(),
        components = catalog.components.len(),
        finished_goods = catalog.finished_goods.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Validates cross-references and ranges in a catalog, failing on the first
/// authoring error.
///
/// Catches mistakes like an ore yielding an unknown mineral, a finished good
/// requiring a component that doesn't exist, or a `Military` quality on a
/// civilian good.
pub fn validate_catalog(catalog: &Catalog) -> Result<()> {
    for ore in catalog.ores.values() {
        validate_ore(catalog, ore)?;
    }
    for mineral in catalog.minerals.values() {
        validate_mineral(mineral)?;
    }
    for component in catalog.components.values() {
        validate_component(catalog, component)?;
    }
    for good in catalog.finished_goods.values() {
        validate_finished_good(catalog, good)?;
    }
    Ok(())
}

fn validate_ore(catalog: &Catalog, ore: &Ore) -> Result<()> {
    let name = ore.name();
    ensure!(
        ore.id == ore.resource.id(),
        "ore '{name}' registry id {} differs from commodity id {}",
        ore.id,
        ore.resource.id()
    );
    ensure!(
        ore.resource.production_stage == ProductionStageKind::Raw,
        "ore '{name}' is not at the Raw production stage"
    );
    ensure!(
        ore.resource.base_value() > 0.0,
        "ore '{name}' has non-positive base price"
    );
    ensure!(
        ore.refining_difficulty >= 1.0,
        "ore '{name}' refining difficulty {} is below 1",
        ore.refining_difficulty
    );
    let mut total_yield = 0.0;
    for (mineral_id, fraction) in &ore.mineral_yield {
        ensure!(
            catalog.mineral(*mineral_id).is_some(),
            "ore '{name}' yields mineral {mineral_id}, which is not a known mineral"
        );
        ensure!(
            *fraction > 0.0,
            "ore '{name}' yield of mineral {mineral_id} is not positive"
        );
        total_yield += fraction;
    }
    ensure!(
        total_yield <= 1.0 + 1e-9,
        "ore '{name}' yields {total_yield} per unit, more than the ore itself"
    );
    for (waste_id, rate) in &ore.base_waste {
        ensure!(
            *rate >= 0.0,
            "ore '{name}' waste {waste_id} has negative rate {rate}"
        );
    }
    Ok(())
}

fn validate_mineral(mineral: &Mineral) -> Result<()> {
    let name = mineral.name();
    ensure!(
        mineral.id == mineral.resource.id(),
        "mineral '{name}' registry id {} differs from commodity id {}",
        mineral.id,
        mineral.resource.id()
    );
    ensure!(
        mineral.resource.production_stage == ProductionStageKind::Refined,
        "mineral '{name}' is not at the Refined production stage"
    );
    ensure!(
        mineral.resource.base_value() > 0.0,
        "mineral '{name}' has non-positive base price"
    );
    if let Some(purity) = mineral.purity {
        ensure!(
            (0.0..=1.0).contains(&purity),
            "mineral '{name}' purity {purity} is outside [0, 1]"
        );
    }
    Ok(())
}

fn validate_component(catalog: &Catalog, component: &Component) -> Result<()> {
    let name = component.name();
    ensure!(
        component.resource.production_stage == ProductionStageKind::Component,
        "component '{name}' is not at the Component production stage"
    );
    ensure!(
        component.manufacturing_complexity >= 1.0,
        "component '{name}' complexity {} is below 1",
        component.manufacturing_complexity
    );
    ensure!(component.tech_level >= 1, "component '{name}' has tech level 0");
    for (mineral_id, quantity) in &component.required_minerals {
        ensure!(
            catalog.mineral(*mineral_id).is_some(),
            "component '{name}' requires mineral {mineral_id}, which is not a known mineral"
        );
        ensure!(
            *quantity > 0.0,
            "component '{name}' requirement for mineral {mineral_id} is not positive"
        );
    }
    Ok(())
}

fn validate_finished_good(catalog: &Catalog, good: &FinishedGood) -> Result<()> {
    let name = good.name();
    ensure!(
        good.resource.production_stage == ProductionStageKind::Finished,
        "finished good '{name}' is not at the Finished production stage"
    );
    ensure!(
        good.assembly_complexity >= 1.0,
        "finished good '{name}' complexity {} is below 1",
        good.assembly_complexity
    );
    ensure!(good.tech_level >= 1, "finished good '{name}' has tech level 0");
    ensure!(
        good.quality != FinishedGoodQuality::Military || good.good_type == FinishedGoodType::Military,
        "finished good '{name}' has Military quality but is not a Military good"
    );
    for (component_id, quantity) in &good.required_components {
        ensure!(
            catalog.component(*component_id).is_some(),
            "finished good '{name}' requires component {component_id}, which is not a known component"
        );
        ensure!(
            *quantity > 0.0,
            "finished good '{name}' requirement for component {component_id} is not positive"
        );
    }
    Ok(())
}
