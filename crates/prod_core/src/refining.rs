//! Ore → mineral refining.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::formulas::{accumulate, round_map, validate_input_resources};
use crate::stage::{classify, invalid_input};
use crate::{
    Catalog, Ore, ProductionOutput, ProductionResult, ProductionStage, PurityLevel, ResourceId,
    ResourceMap, SkillMap,
};

const BASE_EFFICIENCY: f64 = 0.75;
const RELEVANT_SKILLS: &[&str] = &[
    "engineering",
    "chemistry",
    "materials_science",
    "equipment_operation",
];

/// Efficiency below which a refining run is only a partial success.
const PARTIAL_SUCCESS_BELOW: f64 = 0.5;

/// Efficiency assumed by the planning estimates.
const AVERAGE_EFFICIENCY: f64 = 0.6;
const AVERAGE_YIELD: f64 = 0.5;

pub const DEFAULT_REFINING_COST_PER_HOUR: f64 = 100.0;
const OPTIMAL_REFINING_BATCH: f64 = 10.0;

/// Refinery-side yield multiplier per purity, on top of the ore's own
/// recoverable fraction. Ultra-pure ore beats nominal yield.
pub fn refining_purity_modifier(purity: PurityLevel) -> f64 {
    match purity {
        PurityLevel::Raw => 0.5,
        PurityLevel::Low => 0.65,
        PurityLevel::Medium => 0.8,
        PurityLevel::High => 1.0,
        PurityLevel::Ultra => 1.2,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MineralYieldInfo {
    pub yield_rate: f64,
    pub base_value: f64,
}

/// What refining one ore involves, keyed by mineral name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefiningInfo {
    pub ore_name: String,
    pub purity: PurityLevel,
    pub refining_difficulty: f64,
    pub mineral_yields: BTreeMap<String, MineralYieldInfo>,
    pub waste_products: ResourceMap,
    pub purity_modifier: f64,
}

pub struct RefiningStage {
    catalog: Arc<Catalog>,
}

impl RefiningStage {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn refining_info(&self, ore_id: ResourceId) -> Option<RefiningInfo> {
        let ore = self.catalog.ore(ore_id)?;
        let mineral_yields = ore
            .mineral_yields()
            .into_iter()
            .filter_map(|(mineral_id, yield_rate)| {
                self.catalog.mineral(mineral_id).map(|mineral| {
                    (
                        mineral.name().to_string(),
                        MineralYieldInfo {
                            yield_rate,
                            base_value: mineral.resource.base_value(),
                        },
                    )
                })
            })
            .collect();
        Some(RefiningInfo {
            ore_name: ore.name().to_string(),
            purity: ore.purity,
            refining_difficulty: ore.refining_difficulty,
            mineral_yields,
            waste_products: ore.waste_products(),
            purity_modifier: refining_purity_modifier(ore.purity),
        })
    }

    /// Operating cost of refining `input`: half an hour per unit, slowed by
    /// poor equipment and by difficult ores (weighted by share of input).
    pub fn estimate_refining_cost(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        cost_per_hour: f64,
    ) -> f64 {
        let total_input: f64 = input.values().sum();
        if total_input <= 0.0 {
            return 0.0;
        }
        let complexity = input.iter().fold(1.0, |acc, (ore_id, quantity)| {
            match self.catalog.ore(*ore_id) {
                Some(ore) => acc + (ore.refining_difficulty - 1.0) * (quantity / total_input) * 0.2,
                None => acc,
            }
        });
        let hours = total_input * 0.5 * (2.0 - equipment_quality) * complexity;
        hours * cost_per_hour
    }

    /// Harder ores refine better in smaller batches. Never below 1.
    pub fn optimal_batch_size(&self, ore_ids: &[ResourceId]) -> f64 {
        let difficulties: Vec<f64> = ore_ids
            .iter()
            .filter_map(|id| self.catalog.ore(*id))
            .map(|ore| ore.refining_difficulty)
            .collect();
        if difficulties.is_empty() {
            return 1.0;
        }
        let average = difficulties.iter().sum::<f64>() / difficulties.len() as f64;
        (OPTIMAL_REFINING_BATCH * (2.0 - average) / 2.0).max(1.0)
    }

    fn ore_waste(ore: &Ore, quantity: f64, efficiency: f64) -> ResourceMap {
        let efficiency_factor = 1.5 - efficiency * 0.5;
        let difficulty_factor = 1.0 + (ore.refining_difficulty - 1.0) * 0.2;
        ore.waste_products()
            .into_iter()
            .map(|(waste_id, rate)| (waste_id, rate * quantity * efficiency_factor * difficulty_factor))
            .filter(|(_, qty)| *qty > 0.0)
            .collect()
    }
}

impl ProductionStage for RefiningStage {
    fn name(&self) -> &'static str {
        "Ore Refining"
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
        if let Err(err) = validate_input_resources(input) {
            return invalid_input(&err);
        }

        let efficiency = self.calculate_efficiency(equipment_quality, skills, batch_size);
        let quality_modifier = self.calculate_quality_modifier(equipment_quality, skills, 1.0);

        let mut products = ResourceMap::new();
        let mut waste = ResourceMap::new();
        let mut refined: Vec<&str> = Vec::new();

        for (&ore_id, &quantity) in input {
            let Some(ore) = self.catalog.ore(ore_id) else {
                debug!(ore_id, "skipping unknown ore");
                continue;
            };
            let purity_modifier = refining_purity_modifier(ore.purity);
            for (mineral_id, base_yield) in ore.mineral_yields() {
                if self.catalog.mineral(mineral_id).is_none() {
                    debug!(ore_id, mineral_id, "skipping unknown mineral in ore yield");
                    continue;
                }
                let produced = base_yield * quantity * efficiency * purity_modifier;
                if produced > 0.0 {
                    accumulate(&mut products, mineral_id, produced);
                }
            }
            for (waste_id, qty) in Self::ore_waste(ore, quantity, efficiency) {
                accumulate(&mut waste, waste_id, qty);
            }
            refined.push(ore.name());
        }

        let result = classify(!products.is_empty(), efficiency, PARTIAL_SUCCESS_BELOW);
        let names = refined.join(", ");
        let message = match result {
            ProductionResult::Failure => "No minerals produced from input ores".to_string(),
            ProductionResult::PartialSuccess => format!("Low efficiency refining of {names}"),
            _ => format!("Successfully refined {names}"),
        };
        ProductionOutput::new(&products, &waste, result, efficiency, quality_modifier, message)
    }

    /// Ore 0 needed for `output_quantity` minerals, assuming average
    /// efficiency and composition.
    fn required_resources(&self, output_quantity: f64) -> ResourceMap {
        round_map(&ResourceMap::from([(
            0,
            output_quantity / (AVERAGE_EFFICIENCY * AVERAGE_YIELD),
        )]))
    }

    fn expected_output(&self, input: &ResourceMap) -> ResourceMap {
        let mut expected = ResourceMap::new();
        for (&ore_id, &quantity) in input {
            let Some(ore) = self.catalog.ore(ore_id) else {
                continue;
            };
            let purity_modifier = refining_purity_modifier(ore.purity);
            for (mineral_id, base_yield) in ore.mineral_yields() {
                accumulate(
                    &mut expected,
                    mineral_id,
                    base_yield * quantity * AVERAGE_EFFICIENCY * purity_modifier,
                );
            }
        }
        round_map(&expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_catalog;

    fn stage() -> RefiningStage {
        RefiningStage::new(Arc::new(base_catalog()))
    }

    #[test]
    fn required_resources_assume_average_yield() {
        let required = stage().required_resources(3.0);
        assert_eq!(required.len(), 1);
        assert!((required[&0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn expected_output_skips_unknown_ores() {
        // Pyrogen at Medium: 0.28 × 10 × 0.6 × 0.8, 0.21 × 10 × 0.6 × 0.8
        let expected = stage().expected_output(&ResourceMap::from([(0, 10.0), (77, 5.0)]));
        assert!((expected[&0] - 1.344).abs() < 1e-9);
        assert!((expected[&1] - 1.008).abs() < 1e-9);
        assert_eq!(expected.len(), 2);
    }

    #[test]
    fn info_reports_yields_by_mineral_name() {
        let info = stage().refining_info(0).unwrap();
        assert_eq!(info.ore_name, "Pyrogen");
        assert_eq!(info.purity, PurityLevel::Medium);
        assert!((info.mineral_yields["Iron"].yield_rate - 0.28).abs() < 1e-9);
        assert!((info.purity_modifier - 0.8).abs() < 1e-12);
        assert!(stage().refining_info(99).is_none());
    }

    #[test]
    fn cost_grows_with_difficulty_and_worse_equipment() {
        let stage = stage();
        let easy = ResourceMap::from([(0, 10.0)]);
        let hard = ResourceMap::from([(7, 10.0)]);
        let easy_cost = stage.estimate_refining_cost(&easy, 1.0, DEFAULT_REFINING_COST_PER_HOUR);
        assert!((easy_cost - 500.0).abs() < 1e-9);
        assert!(stage.estimate_refining_cost(&hard, 1.0, DEFAULT_REFINING_COST_PER_HOUR) > easy_cost);
        assert!(stage.estimate_refining_cost(&easy, 0.0, DEFAULT_REFINING_COST_PER_HOUR) > easy_cost);
    }

    #[test]
    fn optimal_batch_shrinks_for_hard_ores() {
        let stage = stage();
        assert!((stage.optimal_batch_size(&[0]) - 5.0).abs() < 1e-12);
        // Jonnite difficulty 2.5 would go negative; floor at 1
        assert!((stage.optimal_batch_size(&[7]) - 1.0).abs() < 1e-12);
        assert!((stage.optimal_batch_size(&[]) - 1.0).abs() < 1e-12);
        assert!((stage.optimal_batch_size(&[99]) - 1.0).abs() < 1e-12);
    }
}
