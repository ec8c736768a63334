//! Mineral → component manufacturing, plus the recipe-driven timed path used
//! by station fabricators.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::MANUFACTURING_WASTE_ID;
use crate::formulas::{accumulate, max_units, round3, round_map, validate_input_resources};
use crate::stage::{classify, invalid_input};
use crate::{
    Catalog, Component, ComponentQuality, ComponentType, ProductionOutput, ProductionResult,
    ProductionStage, ResourceId, ResourceMap, SkillMap,
};

const BASE_EFFICIENCY: f64 = 0.7;
const RELEVANT_SKILLS: &[&str] = &[
    "engineering",
    "manufacturing",
    "precision_work",
    "quality_control",
    "equipment_operation",
];

const PARTIAL_SUCCESS_BELOW: f64 = 0.6;
const AVERAGE_EFFICIENCY: f64 = 0.7;
const BASE_WASTE_RATE: f64 = 0.15;

pub const DEFAULT_MANUFACTURING_COST_PER_HOUR: f64 = 150.0;
const OPTIMAL_MANUFACTURING_BATCH: f64 = 5.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Scrap multiplier per component type; precision work wastes more.
pub fn manufacturing_type_waste_modifier(component_type: ComponentType) -> f64 {
    match component_type {
        ComponentType::Structural => 1.0,
        ComponentType::Mechanical => 1.1,
        ComponentType::Propulsion => 1.2,
        ComponentType::Electronic | ComponentType::LifeSupport | ComponentType::Sensors => 1.3,
        ComponentType::Power | ComponentType::Shields => 1.4,
        ComponentType::Weapons => 1.5,
    }
}

/// A fabricator recipe: mineral id → quantity per component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: ResourceMap,
}

/// Components made and minerals scrapped by [`ComponentManufacturingStage::process_by_recipe`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecipeOutput {
    pub products: ResourceMap,
    pub waste: ResourceMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MineralRequirementInfo {
    pub required_quantity: f64,
    pub base_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManufacturingInfo {
    pub component_name: String,
    pub component_type: ComponentType,
    pub quality: ComponentQuality,
    pub manufacturing_complexity: f64,
    pub tech_level: u32,
    pub required_minerals: BTreeMap<String, MineralRequirementInfo>,
    pub base_value: f64,
    pub estimated_waste_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionInfo {
    pub stage_id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub efficiency: f64,
    pub recipes: usize,
    pub available_components: Vec<ResourceId>,
}

/// One component's run before rounding.
struct Run {
    produced: f64,
    waste: ResourceMap,
    efficiency: f64,
    quality_modifier: f64,
}

pub struct ComponentManufacturingStage {
    catalog: Arc<Catalog>,
    recipes: BTreeMap<ResourceId, Recipe>,
}

impl ComponentManufacturingStage {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            recipes: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) the fabricator recipe for `component_id`.
    pub fn add_recipe(&mut self, component_id: ResourceId, recipe: Recipe) {
        self.recipes.insert(component_id, recipe);
    }

    pub fn recipes(&self) -> &BTreeMap<ResourceId, Recipe> {
        &self.recipes
    }

    /// Manufactures `target`, or with no target every component the minerals
    /// allow, in ascending component id order.
    pub fn manufacture(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
        batch_size: f64,
        target: Option<ResourceId>,
    ) -> ProductionOutput {
        if let Err(err) = validate_input_resources(input) {
            return invalid_input(&err);
        }
        match target {
            Some(component_id) => {
                let Some(component) = self.catalog.component(component_id) else {
                    return ProductionOutput::rejected(
                        ProductionResult::Failure,
                        format!("Unknown component ID: {component_id}"),
                    );
                };
                self.manufacture_specific(input, equipment_quality, skills, batch_size, component)
            }
            None => self.manufacture_available(input, equipment_quality, skills, batch_size),
        }
    }

    fn manufacture_specific(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
        batch_size: f64,
        component: &Component,
    ) -> ProductionOutput {
        let run = match self.run_component(input, equipment_quality, skills, batch_size, component) {
            Ok(run) => run,
            Err(rejection) => return rejection,
        };
        let result = classify(run.produced > 0.0, run.efficiency, PARTIAL_SUCCESS_BELOW);
        let name = component.name();
        let message = match result {
            ProductionResult::Failure => format!("Manufacturing failed for {name}"),
            ProductionResult::PartialSuccess => format!("Low efficiency manufacturing of {name}"),
            _ => format!("Successfully manufactured {name}"),
        };
        ProductionOutput::new(
            &ResourceMap::from([(component.id, run.produced)]),
            &run.waste,
            result,
            run.efficiency,
            run.quality_modifier,
            message,
        )
    }

    fn run_component(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
        batch_size: f64,
        component: &Component,
    ) -> Result<Run, ProductionOutput> {
        let required = &component.required_minerals;
        if required.is_empty() {
            return Err(ProductionOutput::rejected(
                ProductionResult::Failure,
                format!("No mineral requirements defined for {}", component.name()),
            ));
        }
        if let Some(missing) = required.keys().find(|id| !input.contains_key(id)) {
            return Err(ProductionOutput::rejected(
                ProductionResult::InsufficientResources,
                format!(
                    "Missing required mineral: {}",
                    self.catalog.mineral_name(*missing)
                ),
            ));
        }
        let max_components = max_units(input, required).unwrap_or(0.0);
        if max_components <= 0.0 {
            return Err(ProductionOutput::rejected(
                ProductionResult::InsufficientResources,
                "Insufficient minerals for component manufacturing",
            ));
        }

        let actual = max_components.min(batch_size);
        let complexity = component.manufacturing_complexity;
        let efficiency = self.calculate_efficiency(equipment_quality, skills, batch_size)
            * (1.0 - (complexity - 1.0) * 0.1).max(0.5);
        let quality_modifier = self.calculate_quality_modifier(
            equipment_quality,
            skills,
            self.input_quality(input, required),
        );
        let input_used: f64 = required.values().map(|per_unit| per_unit * actual).sum();

        Ok(Run {
            produced: actual * efficiency,
            waste: manufacturing_waste(component, input_used, efficiency),
            efficiency,
            quality_modifier,
        })
    }

    fn manufacture_available(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
        batch_size: f64,
    ) -> ProductionOutput {
        let manufacturable = self.manufacturable(input);
        if manufacturable.is_empty() {
            return ProductionOutput::rejected(
                ProductionResult::InsufficientResources,
                "No components can be manufactured with available minerals",
            );
        }

        let mut remaining = input.clone();
        let mut products = ResourceMap::new();
        let mut waste = ResourceMap::new();
        let mut efficiency_total = 0.0;
        let mut quality_total = 0.0;
        let mut made: Vec<&str> = Vec::new();

        for (component, max_quantity) in manufacturable {
            let run = match self.run_component(
                &remaining,
                equipment_quality,
                skills,
                max_quantity.min(batch_size),
                component,
            ) {
                Ok(run) if run.produced > 0.0 => run,
                _ => {
                    debug!(component_id = component.id, "component skipped, minerals exhausted");
                    continue;
                }
            };

            accumulate(&mut products, component.id, run.produced);
            for (waste_id, qty) in &run.waste {
                accumulate(&mut waste, *waste_id, *qty);
            }
            efficiency_total += run.efficiency;
            quality_total += run.quality_modifier;
            made.push(component.name());

            for (mineral_id, per_unit) in &component.required_minerals {
                if let Some(have) = remaining.get_mut(mineral_id) {
                    *have -= per_unit * run.produced;
                    if *have <= 0.0 {
                        remaining.remove(mineral_id);
                    }
                }
            }
        }

        if made.is_empty() {
            return ProductionOutput::rejected(
                ProductionResult::Failure,
                "No components were successfully manufactured",
            );
        }
        let count = made.len() as f64;
        let efficiency = efficiency_total / count;
        let names = made.join(", ");
        let (result, message) = if efficiency < PARTIAL_SUCCESS_BELOW {
            (
                ProductionResult::PartialSuccess,
                format!("Low efficiency manufacturing of {names}"),
            )
        } else {
            (
                ProductionResult::Success,
                format!("Successfully manufactured {names}"),
            )
        };
        ProductionOutput::new(
            &products,
            &waste,
            result,
            efficiency,
            quality_total / count,
            message,
        )
    }

    /// Components whose every mineral is on hand, with the most units the
    /// input supports. Ascending id.
    fn manufacturable(&self, input: &ResourceMap) -> Vec<(&Component, f64)> {
        self.catalog
            .components
            .values()
            .filter(|component| !component.required_minerals.is_empty())
            .filter_map(|component| {
                max_units(input, &component.required_minerals)
                    .filter(|max| *max > 0.0)
                    .map(|max| (component, max))
            })
            .collect()
    }

    /// Requirement-weighted purity of the minerals on hand.
    fn input_quality(&self, input: &ResourceMap, required: &ResourceMap) -> f64 {
        let (total, weight) = required
            .iter()
            .filter(|(id, _)| input.contains_key(id))
            .filter_map(|(id, qty)| self.catalog.mineral(*id).map(|m| (m.input_quality(), *qty)))
            .fold((0.0, 0.0), |(total, weight), (quality, qty)| {
                (total + quality * qty, weight + qty)
            });
        if weight > 0.0 {
            total / weight
        } else {
            1.0
        }
    }

    /// Minerals for `output_quantity` units of `component_id` at average
    /// efficiency. Empty for unknown components.
    pub fn required_resources_for(
        &self,
        output_quantity: f64,
        component_id: ResourceId,
    ) -> ResourceMap {
        let Some(component) = self.catalog.component(component_id) else {
            return ResourceMap::new();
        };
        let adjusted = output_quantity / AVERAGE_EFFICIENCY;
        component
            .required_minerals
            .iter()
            .map(|(id, per_unit)| (*id, round3(per_unit * adjusted)))
            .collect()
    }

    /// Runs every registered recipe for `duration_secs`. Each recipe draws on
    /// the full `materials` map independently; production is the recipe's
    /// maximum units at base efficiency, prorated per hour.
    pub fn process_by_recipe(&self, materials: &ResourceMap, duration_secs: f64) -> RecipeOutput {
        let mut output = RecipeOutput::default();
        for (component_id, recipe) in &self.recipes {
            let max_possible = recipe
                .inputs
                .iter()
                .filter(|(_, required)| **required > 0.0)
                .map(|(id, required)| materials.get(id).copied().unwrap_or(0.0) / required)
                .fold(f64::INFINITY, f64::min);
            if max_possible <= 0.0 || max_possible.is_infinite() {
                debug!(component_id, "recipe skipped, no usable inputs");
                continue;
            }
            let produced =
                max_possible * BASE_EFFICIENCY * (duration_secs / SECONDS_PER_HOUR);
            if produced <= 0.0 {
                continue;
            }
            accumulate(&mut output.products, *component_id, produced);
            for (mineral_id, required) in &recipe.inputs {
                let scrapped = required * produced * (1.0 - BASE_EFFICIENCY);
                if scrapped > 0.0 {
                    accumulate(&mut output.waste, *mineral_id, scrapped);
                }
            }
        }
        output
    }

    /// Whether `available` covers the average-efficiency requirement for
    /// `quantity` units. Unknown components cannot be produced.
    pub fn can_produce(
        &self,
        component_id: ResourceId,
        quantity: f64,
        available: &ResourceMap,
    ) -> bool {
        if self.catalog.component(component_id).is_none() {
            return false;
        }
        self.required_resources_for(quantity, component_id)
            .iter()
            .all(|(id, needed)| available.get(id).copied().unwrap_or(0.0) >= *needed)
    }

    /// Recipe name, then catalog name, then `Component {id}`.
    pub fn component_name(&self, component_id: ResourceId) -> String {
        self.recipes
            .get(&component_id)
            .and_then(|recipe| recipe.name.clone())
            .unwrap_or_else(|| self.catalog.component_name(component_id))
    }

    pub fn manufacturing_info(&self, component_id: ResourceId) -> Option<ManufacturingInfo> {
        let component = self.catalog.component(component_id)?;
        let required_minerals = component
            .required_minerals
            .iter()
            .filter_map(|(id, qty)| {
                self.catalog.mineral(*id).map(|mineral| {
                    (
                        mineral.name().to_string(),
                        MineralRequirementInfo {
                            required_quantity: *qty,
                            base_value: mineral.resource.base_value(),
                        },
                    )
                })
            })
            .collect();
        Some(ManufacturingInfo {
            component_name: component.name().to_string(),
            component_type: component.component_type,
            quality: component.quality,
            manufacturing_complexity: component.manufacturing_complexity,
            tech_level: component.tech_level,
            required_minerals,
            base_value: component.resource.base_value(),
            estimated_waste_rate: BASE_WASTE_RATE
                * (1.0 + (component.manufacturing_complexity - 1.0) * 0.2),
        })
    }

    /// One hour per unit, slowed by poor equipment and complexity.
    pub fn estimate_manufacturing_cost(
        &self,
        component_id: ResourceId,
        quantity: f64,
        equipment_quality: f64,
        cost_per_hour: f64,
    ) -> f64 {
        let Some(component) = self.catalog.component(component_id) else {
            return 0.0;
        };
        let hours = quantity * (2.0 - equipment_quality) * component.manufacturing_complexity;
        hours * cost_per_hour
    }

    pub fn optimal_batch_size(&self, component_id: ResourceId) -> f64 {
        let Some(component) = self.catalog.component(component_id) else {
            return 1.0;
        };
        (OPTIMAL_MANUFACTURING_BATCH * (2.0 - component.manufacturing_complexity) / 2.0).max(1.0)
    }

    pub fn production_info(&self) -> ProductionInfo {
        ProductionInfo {
            stage_id: "component_manufacturing",
            name: self.name(),
            kind: "manufacturing",
            efficiency: BASE_EFFICIENCY,
            recipes: self.recipes.len(),
            available_components: self.recipes.keys().copied().collect(),
        }
    }
}

fn manufacturing_waste(component: &Component, input_used: f64, efficiency: f64) -> ResourceMap {
    let efficiency_factor = 1.5 - efficiency * 0.5;
    let complexity_factor = 1.0 + (component.manufacturing_complexity - 1.0) * 0.2;
    let total = input_used
        * BASE_WASTE_RATE
        * efficiency_factor
        * complexity_factor
        * manufacturing_type_waste_modifier(component.component_type);
    if total > 0.0 {
        ResourceMap::from([(MANUFACTURING_WASTE_ID, total)])
    } else {
        ResourceMap::new()
    }
}

impl ProductionStage for ComponentManufacturingStage {
    fn name(&self) -> &'static str {
        "Component Manufacturing"
    }

    fn base_efficiency(&self) -> f64 {
        BASE_EFFICIENCY
    }

    fn relevant_skills(&self) -> &'static [&'static str] {
        RELEVANT_SKILLS
    }

    fn process(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
        batch_size: f64,
    ) -> ProductionOutput {
        self.manufacture(input, equipment_quality, skills, batch_size, None)
    }

    /// Without a target component there is nothing to plan for.
    fn required_resources(&self, _output_quantity: f64) -> ResourceMap {
        ResourceMap::new()
    }

    fn expected_output(&self, input: &ResourceMap) -> ResourceMap {
        let expected: ResourceMap = self
            .manufacturable(input)
            .into_iter()
            .map(|(component, max)| (component.id, max * AVERAGE_EFFICIENCY))
            .collect();
        round_map(&expected)
    }
}
