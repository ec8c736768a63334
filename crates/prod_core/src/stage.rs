//! The contract every production stage implements.

use serde::Serialize;

use crate::formulas;
use crate::{InputError, ProductionOutput, ProductionResult, ResourceMap, SkillMap};

/// Name, base efficiency and skills of a stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageInfo {
    pub name: String,
    pub base_efficiency: f64,
    pub relevant_skills: Vec<String>,
}

/// One step of the production chain. Implementors supply the identity and
/// the three chain operations; the shared efficiency/quality/time math comes
/// from the default methods.
pub trait ProductionStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn base_efficiency(&self) -> f64;

    /// Skill names averaged into the skill modifiers.
    fn relevant_skills(&self) -> &'static [&'static str];

    /// Transforms `input` into this stage's products.
    fn process(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
        batch_size: f64,
    ) -> ProductionOutput;

    /// Inputs needed for `output_quantity` units of output.
    fn required_resources(&self, output_quantity: f64) -> ResourceMap;

    /// Estimated products for `input` at the stage's average efficiency.
    fn expected_output(&self, input: &ResourceMap) -> ResourceMap;

    fn calculate_efficiency(&self, equipment_quality: f64, skills: &SkillMap, batch_size: f64) -> f64 {
        formulas::efficiency(
            self.base_efficiency(),
            equipment_quality,
            skills,
            self.relevant_skills(),
            batch_size,
        )
    }

    fn calculate_quality_modifier(
        &self,
        equipment_quality: f64,
        skills: &SkillMap,
        input_quality: f64,
    ) -> f64 {
        formulas::quality_modifier(equipment_quality, skills, self.relevant_skills(), input_quality)
    }

    fn calculate_waste_generation(
        &self,
        input_quantity: f64,
        efficiency: f64,
        complexity: f64,
    ) -> ResourceMap {
        formulas::waste_generation(input_quantity, efficiency, complexity)
    }

    /// Hours to process `input`, estimated at batch size 1.
    fn estimate_production_time(
        &self,
        input: &ResourceMap,
        equipment_quality: f64,
        skills: &SkillMap,
    ) -> f64 {
        let efficiency = self.calculate_efficiency(equipment_quality, skills, 1.0);
        formulas::production_time(input, efficiency)
    }

    fn stage_info(&self) -> StageInfo {
        StageInfo {
            name: self.name().to_string(),
            base_efficiency: self.base_efficiency(),
            relevant_skills: self
                .relevant_skills()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Envelope returned when input validation fails.
pub(crate) fn invalid_input(err: &InputError) -> ProductionOutput {
    ProductionOutput::rejected(
        ProductionResult::InsufficientResources,
        format!("Invalid input: {err}"),
    )
}

/// Picks the result tier for a productive run.
pub(crate) fn classify(produced: bool, efficiency: f64, partial_below: f64) -> ProductionResult {
    if !produced {
        ProductionResult::Failure
    } else if efficiency < partial_below {
        ProductionResult::PartialSuccess
    } else {
        ProductionResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Kiln;

    impl ProductionStage for Kiln {
        fn name(&self) -> &'static str {
            "Kiln"
        }

        fn base_efficiency(&self) -> f64 {
            0.5
        }

        fn relevant_skills(&self) -> &'static [&'static str] {
            &["firing"]
        }

        fn process(
            &self,
            input: &ResourceMap,
            _equipment_quality: f64,
            _skills: &SkillMap,
            _batch_size: f64,
        ) -> ProductionOutput {
            match formulas::validate_input_resources(input) {
                Ok(()) => ProductionOutput::new(
                    input,
                    &ResourceMap::new(),
                    ProductionResult::Success,
                    1.0,
                    1.0,
                    "fired",
                ),
                Err(err) => invalid_input(&err),
            }
        }

        fn required_resources(&self, output_quantity: f64) -> ResourceMap {
            ResourceMap::from([(0, output_quantity)])
        }

        fn expected_output(&self, input: &ResourceMap) -> ResourceMap {
            input.clone()
        }
    }

    #[test]
    fn default_methods_use_stage_identity() {
        let kiln = Kiln;
        let skills = SkillMap::from([("firing".to_string(), 1.0)]);
        // 0.5 × 1.0 × 1.2 × 1.1
        assert!((kiln.calculate_efficiency(1.0, &skills, 10.0) - 0.66).abs() < 1e-12);
        let info = kiln.stage_info();
        assert_eq!(info.name, "Kiln");
        assert_eq!(info.relevant_skills, vec!["firing".to_string()]);
    }

    #[test]
    fn production_time_uses_unit_batch() {
        let kiln = Kiln;
        let skills = SkillMap::new();
        // efficiency = 0.5 × 1.0 × 0.8 × 0.82 = 0.328
        let hours = kiln.estimate_production_time(&ResourceMap::from([(0, 4.0)]), 1.0, &skills);
        assert!((hours - 4.0 * 0.5 * (2.0 - 0.328)).abs() < 1e-9);
    }

    #[test]
    fn invalid_input_names_the_problem() {
        let out = Kiln.process(&ResourceMap::new(), 1.0, &SkillMap::new(), 1.0);
        assert_eq!(out.result(), ProductionResult::InsufficientResources);
        assert_eq!(out.message(), "Invalid input: No input resources provided");
    }

    #[test]
    fn classify_tiers() {
        assert_eq!(classify(false, 0.9, 0.5), ProductionResult::Failure);
        assert_eq!(classify(true, 0.4, 0.5), ProductionResult::PartialSuccess);
        assert_eq!(classify(true, 0.5, 0.5), ProductionResult::Success);
    }
}
