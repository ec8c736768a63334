//! Component → finished-good assembly, gated by tech level.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::finished_good::{finished_good_waste_multiplier, ASSEMBLY_WASTE_ID};
use crate::formulas::{accumulate, max_units, round3, round_map, validate_input_resources};
use crate::stage::{classify, invalid_input};
use crate::{
    Catalog, ComponentQuality, FinishedGood, FinishedGoodQuality, FinishedGoodType,
    ProductionOutput, ProductionResult, ProductionStage, ResourceId, ResourceMap, SkillMap,
    MAX_EFFICIENCY, MAX_QUALITY_MODIFIER,
};

const BASE_EFFICIENCY: f64 = 0.8;
const RELEVANT_SKILLS: &[&str] = &[
    "engineering",
    "assembly",
    "quality_control",
    "precision_work",
    "project_management",
];

const PARTIAL_SUCCESS_BELOW: f64 = 0.7;
const AVERAGE_EFFICIENCY: f64 = 0.8;
const BASE_WASTE_RATE: f64 = 0.05;

/// Tech level assumed when the caller does not give one.
pub const DEFAULT_TECH_LEVEL: u32 = 1;

pub const DEFAULT_ASSEMBLY_COST_PER_HOUR: f64 = 200.0;
const OPTIMAL_ASSEMBLY_BATCH: f64 = 3.0;

/// Numeric quality of a component fed into assembly.
pub fn component_input_quality(quality: ComponentQuality) -> f64 {
    match quality {
        ComponentQuality::Basic => 0.6,
        ComponentQuality::Standard => 1.0,
        ComponentQuality::Advanced => 1.4,
        ComponentQuality::Premium => 1.8,
        ComponentQuality::Prototype => 2.0,
    }
}

pub fn assembly_type_waste_modifier(good_type: FinishedGoodType) -> f64 {
    match good_type {
        FinishedGoodType::Consumer => 1.0,
        FinishedGoodType::Industrial => 1.1,
        FinishedGoodType::Scientific => 1.2,
        FinishedGoodType::Medical | FinishedGoodType::ShipEquipment => 1.3,
        FinishedGoodType::Military => 1.4,
        FinishedGoodType::Luxury => 1.5,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentRequirementInfo {
    pub required_quantity: f64,
    pub base_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyInfo {
    pub product_name: String,
    pub product_type: FinishedGoodType,
    pub quality: FinishedGoodQuality,
    pub assembly_complexity: f64,
    pub tech_level: u32,
    pub required_components: BTreeMap<String, ComponentRequirementInfo>,
    pub base_value: f64,
    pub estimated_waste_rate: f64,
}

struct Run {
    produced: f64,
    waste: ResourceMap,
    efficiency: f64,
    quality_modifier: f64,
}

pub struct AssemblyStage {
    catalog: Arc<Catalog>,
}

impl AssemblyStage {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Assembles `target`, or with no target every good the components and
    /// `tech_level` allow, in ascending id order.
    pub fn assemble(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
        batch_size: f64,
        target: Option<ResourceId>,
        tech_level: u32,
    ) -> ProductionOutput {
        if let Err(err) = validate_input_resources(input) {
            return invalid_input(&err);
        }
        match target {
            Some(product_id) => {
                let Some(product) = self.catalog.finished_good(product_id) else {
                    return ProductionOutput::rejected(
                        ProductionResult::Failure,
                        format!("Unknown finished good ID: {product_id}"),
                    );
                };
                self.assemble_specific(input, equipment_quality, skills, batch_size, product, tech_level)
            }
            None => self.assemble_available(input, equipment_quality, skills, batch_size, tech_level),
        }
    }

    fn assemble_specific(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
        batch_size: f64,
        product: &FinishedGood,
        tech_level: u32,
    ) -> ProductionOutput {
        let run = match self.run_product(input, equipment_quality, skills, batch_size, product, tech_level) {
            Ok(run) => run,
            Err(rejection) => return rejection,
        };
        let result = classify(run.produced > 0.0, run.efficiency, PARTIAL_SUCCESS_BELOW);
        let name = product.name();
        let message = match result {
            ProductionResult::Failure => format!("Assembly failed for {name}"),
            ProductionResult::PartialSuccess => format!("Low efficiency assembly of {name}"),
            _ => format!("Successfully assembled {name}"),
        };
        ProductionOutput::new(
            &ResourceMap::from([(product.id, run.produced)]),
            &run.waste,
            result,
            run.efficiency,
            run.quality_modifier,
            message,
        )
    }

    fn run_product(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
        batch_size: f64,
        product: &FinishedGood,
        tech_level: u32,
    ) -> Result<Run, ProductionOutput> {
        if tech_level < product.tech_level {
            return Err(ProductionOutput::rejected(
                ProductionResult::Failure,
                format!(
                    "Insufficient tech level for {} (requires {}, have {tech_level})",
                    product.name(),
                    product.tech_level
                ),
            ));
        }
        let required = &product.required_components;
        if required.is_empty() {
            return Err(ProductionOutput::rejected(
                ProductionResult::Failure,
                format!("No component requirements defined for {}", product.name()),
            ));
        }
        if let Some(missing) = required.keys().find(|id| !input.contains_key(id)) {
            return Err(ProductionOutput::rejected(
                ProductionResult::InsufficientResources,
                format!(
                    "Missing required component: {}",
                    self.catalog.component_name(*missing)
                ),
            ));
        }
        let max_products = max_units(input, required).unwrap_or(0.0);
        if max_products <= 0.0 {
            return Err(ProductionOutput::rejected(
                ProductionResult::InsufficientResources,
                "Insufficient components for assembly",
            ));
        }

        let actual = max_products.min(batch_size);
        let complexity = product.assembly_complexity;
        let tech_surplus = f64::from(tech_level - product.tech_level);

        let efficiency = (self.calculate_efficiency(equipment_quality, skills, batch_size)
            * (1.0 - (complexity - 1.0) * 0.15).max(0.4)
            * (1.0 + tech_surplus * 0.05).min(1.2))
        .min(MAX_EFFICIENCY);

        let quality_modifier = (self.calculate_quality_modifier(
            equipment_quality,
            skills,
            self.input_quality(input, required),
        ) * (1.0 + tech_surplus * 0.03).min(1.15))
        .min(MAX_QUALITY_MODIFIER);

        let input_used: f64 = required.values().map(|per_unit| per_unit * actual).sum();

        Ok(Run {
            produced: actual * efficiency,
            waste: assembly_waste(product, input_used, efficiency),
            efficiency,
            quality_modifier,
        })
    }

    fn assemble_available(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
        batch_size: f64,
        tech_level: u32,
    ) -> ProductionOutput {
        let assemblable = self.assemblable(input, tech_level);
        if assemblable.is_empty() {
            return ProductionOutput::rejected(
                ProductionResult::InsufficientResources,
                "No finished goods can be assembled with available components",
            );
        }

        let mut remaining = input.clone();
        let mut products = ResourceMap::new();
        let mut waste = ResourceMap::new();
        let mut efficiency_total = 0.0;
        let mut quality_total = 0.0;
        let mut made: Vec<&str> = Vec::new();

        for (product, max_quantity) in assemblable {
            let run = match self.run_product(
                &remaining,
                equipment_quality,
                skills,
                max_quantity.min(batch_size),
                product,
                tech_level,
            ) {
                Ok(run) if run.produced > 0.0 => run,
                _ => {
                    debug!(product_id = product.id, "finished good skipped, components exhausted");
                    continue;
                }
            };

            accumulate(&mut products, product.id, run.produced);
            for (waste_id, qty) in &run.waste {
                accumulate(&mut waste, *waste_id, *qty);
            }
            efficiency_total += run.efficiency;
            quality_total += run.quality_modifier;
            made.push(product.name());

            for (component_id, per_unit) in &product.required_components {
                if let Some(have) = remaining.get_mut(component_id) {
                    *have -= per_unit * run.produced;
                    if *have <= 0.0 {
                        remaining.remove(component_id);
                    }
                }
            }
        }

        if made.is_empty() {
            return ProductionOutput::rejected(
                ProductionResult::Failure,
                "No finished goods were successfully assembled",
            );
        }
        let count = made.len() as f64;
        let efficiency = efficiency_total / count;
        let names = made.join(", ");
        let (result, message) = if efficiency < PARTIAL_SUCCESS_BELOW {
            (
                ProductionResult::PartialSuccess,
                format!("Low efficiency assembly of {names}"),
            )
        } else {
            (
                ProductionResult::Success,
                format!("Successfully assembled {names}"),
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

    /// Goods within `tech_level` whose every component is on hand, with the
    /// most units the input supports. Ascending id.
    fn assemblable(&self, input: &ResourceMap, tech_level: u32) -> Vec<(&FinishedGood, f64)> {
        self.catalog
            .finished_goods
            .values()
            .filter(|product| {
                if product.tech_level > tech_level {
                    debug!(product_id = product.id, "finished good above tech level");
                    return false;
                }
                !product.required_components.is_empty()
            })
            .filter_map(|product| {
                max_units(input, &product.required_components)
                    .filter(|max| *max > 0.0)
                    .map(|max| (product, max))
            })
            .collect()
    }

    /// Requirement-weighted quality of the components on hand.
    fn input_quality(&self, input: &ResourceMap, required: &ResourceMap) -> f64 {
        let (total, weight) = required
            .iter()
            .filter(|(id, _)| input.contains_key(id))
            .filter_map(|(id, qty)| {
                self.catalog
                    .component(*id)
                    .map(|c| (component_input_quality(c.quality), *qty))
            })
            .fold((0.0, 0.0), |(total, weight), (quality, qty)| {
                (total + quality * qty, weight + qty)
            });
        if weight > 0.0 {
            total / weight
        } else {
            1.0
        }
    }

    /// Components for `output_quantity` units of `product_id` at average
    /// efficiency. Empty for unknown goods.
    pub fn required_resources_for(&self, output_quantity: f64, product_id: ResourceId) -> ResourceMap {
        let Some(product) = self.catalog.finished_good(product_id) else {
            return ResourceMap::new();
        };
        let adjusted = output_quantity / AVERAGE_EFFICIENCY;
        product
            .required_components
            .iter()
            .map(|(id, per_unit)| (*id, round3(per_unit * adjusted)))
            .collect()
    }

    pub fn expected_output_at(&self, input: &ResourceMap, tech_level: u32) -> ResourceMap {
        let expected: ResourceMap = self
            .assemblable(input, tech_level)
            .into_iter()
            .map(|(product, max)| (product.id, max * AVERAGE_EFFICIENCY))
            .collect();
        round_map(&expected)
    }

    pub fn assembly_info(&self, product_id: ResourceId) -> Option<AssemblyInfo> {
        let product = self.catalog.finished_good(product_id)?;
        let required_components = product
            .required_components
            .iter()
            .filter_map(|(id, qty)| {
                self.catalog.component(*id).map(|component| {
                    (
                        component.name().to_string(),
                        ComponentRequirementInfo {
                            required_quantity: *qty,
                            base_value: component.resource.base_value(),
                        },
                    )
                })
            })
            .collect();
        Some(AssemblyInfo {
            product_name: product.name().to_string(),
            product_type: product.good_type,
            quality: product.quality,
            assembly_complexity: product.assembly_complexity,
            tech_level: product.tech_level,
            required_components,
            base_value: product.resource.base_value(),
            estimated_waste_rate: BASE_WASTE_RATE
                * (1.0 + (product.assembly_complexity - 1.0) * 0.1),
        })
    }

    /// An hour and a half per unit, slowed by poor equipment, complexity and
    /// tech level.
    pub fn estimate_assembly_cost(
        &self,
        product_id: ResourceId,
        quantity: f64,
        equipment_quality: f64,
        cost_per_hour: f64,
    ) -> f64 {
        let Some(product) = self.catalog.finished_good(product_id) else {
            return 0.0;
        };
        let tech_factor = 1.0 + (f64::from(product.tech_level) - 1.0) * 0.1;
        let hours = quantity
            * 1.5
            * (2.0 - equipment_quality)
            * product.assembly_complexity
            * tech_factor;
        hours * cost_per_hour
    }

    pub fn optimal_batch_size(&self, product_id: ResourceId) -> f64 {
        let Some(product) = self.catalog.finished_good(product_id) else {
            return 1.0;
        };
        let complexity_factor = (2.5 - product.assembly_complexity) / 2.5;
        let tech_factor = (1.0 - (f64::from(product.tech_level) - 1.0) * 0.1).max(0.5);
        (OPTIMAL_ASSEMBLY_BATCH * complexity_factor * tech_factor).max(1.0)
    }
}

fn assembly_waste(product: &FinishedGood, input_used: f64, efficiency: f64) -> ResourceMap {
    let efficiency_factor = 1.3 - efficiency * 0.3;
    let complexity_factor = 1.0 + (product.assembly_complexity - 1.0) * 0.1;
    let total = input_used
        * BASE_WASTE_RATE
        * efficiency_factor
        * complexity_factor
        * assembly_type_waste_modifier(product.good_type)
        * finished_good_waste_multiplier(product.quality);
    if total > 0.0 {
        ResourceMap::from([(ASSEMBLY_WASTE_ID, total)])
    } else {
        ResourceMap::new()
    }
}

impl ProductionStage for AssemblyStage {
    fn name(&self) -> &'static str {
        "Finished Goods Assembly"
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
        self.assemble(input, equipment_quality, skills, batch_size, None, DEFAULT_TECH_LEVEL)
    }

    fn required_resources(&self, _output_quantity: f64) -> ResourceMap {
        ResourceMap::new()
    }

    fn expected_output(&self, input: &ResourceMap) -> ResourceMap {
        self.expected_output_at(input, DEFAULT_TECH_LEVEL)
    }
}
