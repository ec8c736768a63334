//! Efficiency, quality, batch and waste math shared by every stage.
//!
//! Pure functions of primitive inputs and a relevant-skill list. Stages reach
//! these through the default methods on [`crate::ProductionStage`].

use crate::{InputError, ResourceMap, SkillMap};

/// Batch size at which the batch modifier peaks.
pub const OPTIMAL_BATCH_SIZE: f64 = 10.0;

/// Efficiency modifier applied when none of the relevant skills are supplied.
pub const NO_SKILL_EFFICIENCY_PENALTY: f64 = 0.8;

/// Quality factor applied when none of the relevant skills are supplied.
pub const NO_SKILL_QUALITY_PENALTY: f64 = 0.9;

/// Rounds half-to-even at 3 decimals.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}

/// Rounds half-to-even at 2 decimals (prices).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn round_map(map: &ResourceMap) -> ResourceMap {
    map.iter().map(|(id, qty)| (*id, round3(*qty))).collect()
}

/// Clamps `value` to `[min, max]`, sending NaN to `min`.
pub fn bounded(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Adds `qty` to the entry for `id`.
pub(crate) fn accumulate(map: &mut ResourceMap, id: u32, qty: f64) {
    *map.entry(id).or_insert(0.0) += qty;
}

/// Rejects an empty map, a non-finite quantity, or a quantity ≤ 0.
pub fn validate_input_resources(input: &ResourceMap) -> Result<(), InputError> {
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    for (&id, &quantity) in input {
        if !quantity.is_finite() {
            return Err(InputError::NonNumeric { id, quantity });
        }
        if quantity <= 0.0 {
            return Err(InputError::NonPositive { id, quantity });
        }
    }
    Ok(())
}

/// Average level over the relevant skills present in `skills`, or `None`
/// when none of them are.
fn average_relevant_skill(skills: &SkillMap, relevant: &[&str]) -> Option<f64> {
    let (total, count) = relevant
        .iter()
        .filter_map(|name| skills.get(*name))
        .fold((0.0, 0_u32), |(total, count), level| (total + level, count + 1));
    (count > 0).then(|| total / f64::from(count))
}

/// Skill contribution to efficiency, 0.5–1.2 for skills in [0, 1].
pub fn skill_modifier(skills: &SkillMap, relevant: &[&str]) -> f64 {
    if relevant.is_empty() {
        return 1.0;
    }
    match average_relevant_skill(skills, relevant) {
        Some(avg) => 0.5 + avg * 0.7,
        None => NO_SKILL_EFFICIENCY_PENALTY,
    }
}

/// Skill contribution to output quality, 0.7–1.3 for skills in [0, 1].
pub fn skill_quality_factor(skills: &SkillMap, relevant: &[&str]) -> f64 {
    if relevant.is_empty() {
        return 1.0;
    }
    match average_relevant_skill(skills, relevant) {
        Some(avg) => 0.7 + avg * 0.6,
        None => NO_SKILL_QUALITY_PENALTY,
    }
}

/// Ramps 0.8 → 1.0 below the optimal batch; at the optimal batch the full
/// 1.1 applies, losing up to 10% for oversized batches. Non-positive batches
/// stop production.
pub fn batch_modifier(batch_size: f64) -> f64 {
    if batch_size <= 0.0 {
        return 0.0;
    }
    if batch_size < OPTIMAL_BATCH_SIZE {
        0.8 + (batch_size / OPTIMAL_BATCH_SIZE) * 0.2
    } else {
        let excess = batch_size - OPTIMAL_BATCH_SIZE;
        let penalty = (excess / OPTIMAL_BATCH_SIZE * 0.1).min(0.1);
        1.1 - penalty
    }
}

/// `base × equipment × skill × batch`, clamped to [0, 1].
pub fn efficiency(
    base_efficiency: f64,
    equipment_quality: f64,
    skills: &SkillMap,
    relevant: &[&str],
    batch_size: f64,
) -> f64 {
    let equipment_modifier = 0.5 + equipment_quality * 0.5;
    let value = base_efficiency
        * equipment_modifier
        * skill_modifier(skills, relevant)
        * batch_modifier(batch_size);
    bounded(value, 0.0, 1.0)
}

/// `input_quality × equipment × skill`, clamped to [0.1, 2.0].
pub fn quality_modifier(
    equipment_quality: f64,
    skills: &SkillMap,
    relevant: &[&str],
    input_quality: f64,
) -> f64 {
    let equipment_factor = 0.8 + equipment_quality * 0.4;
    let value = input_quality * equipment_factor * skill_quality_factor(skills, relevant);
    bounded(value, 0.1, 2.0)
}

/// Generic waste estimate for stages without their own waste model:
/// 10–30% of the input depending on efficiency, scaled by complexity,
/// reported under waste id 0.
pub fn waste_generation(input_quantity: f64, efficiency: f64, complexity: f64) -> ResourceMap {
    let base_rate = 0.1 + 0.2 * (1.0 - efficiency);
    let complexity_factor = 1.0 + (complexity - 1.0) * 0.1;
    let total = input_quantity * base_rate * complexity_factor;
    if total > 0.0 {
        ResourceMap::from([(0, round3(total))])
    } else {
        ResourceMap::new()
    }
}

/// Hours to process `input`: half an hour per unit, slowed by up to 2×
/// at zero efficiency.
pub fn production_time(input: &ResourceMap, efficiency: f64) -> f64 {
    let total: f64 = input.values().sum();
    total * 0.5 * (2.0 - efficiency)
}

/// Largest whole-or-fractional number of units `available` can support,
/// or `None` if a required id is missing.
pub(crate) fn max_units(available: &ResourceMap, required: &ResourceMap) -> Option<f64> {
    required.iter().try_fold(f64::INFINITY, |max, (id, per_unit)| {
        available.get(id).map(|have| max.min(have / per_unit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKILLS: [&str; 2] = ["engineering", "chemistry"];

    fn skills(pairs: &[(&str, f64)]) -> SkillMap {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn bounded_sends_nan_to_the_floor() {
        assert!((bounded(f64::NAN, 0.1, 2.0) - 0.1).abs() < 1e-12);
        assert!((bounded(3.0, 0.1, 2.0) - 2.0).abs() < 1e-12);
        assert!((bounded(0.5, 0.1, 2.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn batch_modifier_peaks_at_optimal() {
        assert!((batch_modifier(10.0) - 1.1).abs() < 1e-12);
        assert!(batch_modifier(0.0).abs() < 1e-12);
        assert!(batch_modifier(-3.0).abs() < 1e-12);
        assert!(batch_modifier(20.0) < batch_modifier(10.0));
    }

    #[test]
    fn batch_modifier_ramps_below_optimal() {
        assert!((batch_modifier(5.0) - 0.9).abs() < 1e-12);
        assert!((batch_modifier(1.0) - 0.82).abs() < 1e-12);
        assert!(batch_modifier(9.99) < 1.0);
    }

    #[test]
    fn batch_penalty_caps_at_ten_percent() {
        assert!((batch_modifier(15.0) - 1.05).abs() < 1e-12);
        assert!((batch_modifier(1_000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn skill_modifier_penalizes_missing_skills() {
        let none = skills(&[("piloting", 1.0)]);
        assert!((skill_modifier(&none, &SKILLS) - 0.8).abs() < 1e-12);
        assert!((skill_quality_factor(&none, &SKILLS) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn skill_modifier_averages_only_present_relevant_skills() {
        // chemistry missing: average is engineering alone
        let partial = skills(&[("engineering", 0.5), ("piloting", 0.0)]);
        assert!((skill_modifier(&partial, &SKILLS) - 0.85).abs() < 1e-12);
        assert!((skill_quality_factor(&partial, &SKILLS) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn skill_ranges_at_extremes() {
        let zero = skills(&[("engineering", 0.0), ("chemistry", 0.0)]);
        let full = skills(&[("engineering", 1.0), ("chemistry", 1.0)]);
        assert!((skill_modifier(&zero, &SKILLS) - 0.5).abs() < 1e-12);
        assert!((skill_modifier(&full, &SKILLS) - 1.2).abs() < 1e-12);
        assert!((skill_quality_factor(&zero, &SKILLS) - 0.7).abs() < 1e-12);
        assert!((skill_quality_factor(&full, &SKILLS) - 1.3).abs() < 1e-12);
    }

    #[test]
    fn empty_relevant_list_is_neutral() {
        let full = skills(&[("engineering", 1.0)]);
        assert!((skill_modifier(&full, &[]) - 1.0).abs() < 1e-12);
        assert!((skill_quality_factor(&full, &[]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn efficiency_is_clamped() {
        let full = skills(&[("engineering", 1.0), ("chemistry", 1.0)]);
        assert!((efficiency(1.0, 1.0, &full, &SKILLS, 10.0) - 1.0).abs() < 1e-12);
        assert!(efficiency(0.75, 1.0, &full, &SKILLS, 0.0).abs() < 1e-12);
    }

    #[test]
    fn quality_modifier_clamps_extremes() {
        let full = skills(&[("engineering", 1.0)]);
        assert!((quality_modifier(1.0, &full, &SKILLS, 1e9) - 2.0).abs() < 1e-12);
        assert!((quality_modifier(1.0, &full, &SKILLS, -1e9) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn validation_rejects_bad_maps() {
        assert_eq!(
            validate_input_resources(&ResourceMap::new()),
            Err(InputError::Empty)
        );
        assert!(matches!(
            validate_input_resources(&ResourceMap::from([(1, 0.0)])),
            Err(InputError::NonPositive { id: 1, .. })
        ));
        assert!(matches!(
            validate_input_resources(&ResourceMap::from([(2, f64::NAN)])),
            Err(InputError::NonNumeric { id: 2, .. })
        ));
        assert!(validate_input_resources(&ResourceMap::from([(0, 0.5)])).is_ok());
    }

    #[test]
    fn round3_is_half_even() {
        assert!((round3(1.234_49) - 1.234).abs() < 1e-12);
        assert!((round3(2.0) - 2.0).abs() < 1e-12);
        assert!((round3(0.000_4)).abs() < 1e-12);
    }

    #[test]
    fn waste_generation_scales_with_inefficiency() {
        let perfect = waste_generation(10.0, 1.0, 1.0);
        let sloppy = waste_generation(10.0, 0.0, 1.0);
        assert!((perfect[&0] - 1.0).abs() < 1e-12);
        assert!((sloppy[&0] - 3.0).abs() < 1e-12);
        assert!(waste_generation(0.0, 0.5, 1.0).is_empty());
    }

    #[test]
    fn max_units_is_bounded_by_scarcest_input() {
        let available = ResourceMap::from([(3, 1.0), (2, 1.0)]);
        let required = ResourceMap::from([(3, 0.2), (2, 0.3)]);
        let max = max_units(&available, &required).unwrap();
        assert!((max - 1.0 / 0.3).abs() < 1e-9);
        assert!(max_units(&available, &ResourceMap::from([(9, 1.0)])).is_none());
    }
}
