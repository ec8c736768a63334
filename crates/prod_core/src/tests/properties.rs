//! Seeded sweeps over the ranges every stage must respect.

use super::*;
use rand::Rng;

const SWEEPS: usize = 200;

fn is_rounded(value: f64) -> bool {
    ((value * 1000.0).round() - value * 1000.0).abs() < 1e-6
}

fn random_skills(rng: &mut impl Rng) -> SkillMap {
    let mut skills = SkillMap::new();
    for name in [
        "engineering",
        "chemistry",
        "manufacturing",
        "assembly",
        "precision_work",
    ] {
        if rng.gen_bool(0.7) {
            skills.insert(name.to_string(), rng.gen_range(0.0..=1.0));
        }
    }
    skills
}

fn random_input(rng: &mut impl Rng) -> ResourceMap {
    let entries = rng.gen_range(1..=6);
    (0..entries)
        .map(|_| (rng.gen_range(0..12), rng.gen_range(0.01..100.0)))
        .collect()
}

#[test]
fn test_efficiency_monotone_in_equipment_quality() {
    let catalog = test_catalog();
    let mut rng = make_rng();
    for stage in all_stages(&catalog) {
        for _ in 0..SWEEPS {
            let skills = random_skills(&mut rng);
            let batch = rng.gen_range(0.0..30.0);
            let a: f64 = rng.gen_range(0.0..=1.0);
            let b: f64 = rng.gen_range(0.0..=1.0);
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let e_low = stage.calculate_efficiency(low, &skills, batch);
            let e_high = stage.calculate_efficiency(high, &skills, batch);
            assert!(e_low <= e_high + 1e-12, "{}: {e_low} > {e_high}", stage.name());
            assert!((0.0..=1.0).contains(&e_high));
        }
    }
}

#[test]
fn test_quality_modifier_clamped_for_extreme_inputs() {
    let catalog = test_catalog();
    let mut rng = make_rng();
    for stage in all_stages(&catalog) {
        for _ in 0..SWEEPS {
            let skills = random_skills(&mut rng);
            let equipment = rng.gen_range(0.0..=1.0);
            let input_quality = rng.gen_range(-1e6..1e6);
            let q = stage.calculate_quality_modifier(equipment, &skills, input_quality);
            assert!((0.1..=2.0).contains(&q), "{}: {q}", stage.name());
        }
    }
}

#[test]
fn test_outputs_stay_in_range_and_rounded() {
    let catalog = test_catalog();
    let mut rng = make_rng();
    for stage in all_stages(&catalog) {
        for _ in 0..SWEEPS {
            let input = random_input(&mut rng);
            let skills = random_skills(&mut rng);
            let out = stage.process(
                &input,
                rng.gen_range(0.0..=1.0),
                &skills,
                rng.gen_range(0.5..20.0),
            );
            assert!((0.0..=1.0).contains(&out.efficiency()));
            assert!((0.1..=2.0).contains(&out.quality_modifier()));
            for qty in out.products().values().chain(out.waste_products().values()) {
                assert!(is_rounded(*qty), "{}: {qty} not rounded", stage.name());
            }
            assert!(out.waste_products().values().all(|q| *q > 0.0));
        }
    }
}

#[test]
fn test_empty_and_non_positive_inputs_are_rejected() {
    let catalog = test_catalog();
    let bad_inputs = [
        ResourceMap::new(),
        ResourceMap::from([(0, 0.0)]),
        ResourceMap::from([(0, 5.0), (1, -2.0)]),
        ResourceMap::from([(0, f64::INFINITY)]),
    ];
    for stage in all_stages(&catalog) {
        for input in &bad_inputs {
            let out = stage.process(input, 1.0, &full_skills(), 10.0);
            assert_eq!(out.result(), ProductionResult::InsufficientResources);
            assert!(out.products().is_empty());
            assert!(out.waste_products().is_empty());
            assert!(out.message().starts_with("Invalid input: "));
        }
    }
}

#[test]
fn test_zero_waste_leaves_waste_map_empty() {
    let stage = ComponentManufacturingStage::new(test_catalog());
    let out = stage.manufacture(
        &ResourceMap::from([(3, 1.0), (2, 1.0)]),
        1.0,
        &full_skills(),
        0.0,
        Some(0),
    );
    assert!(out.waste_products().is_empty());
}

#[test]
fn test_available_mode_is_deterministic() {
    let catalog = test_catalog();
    let mut rng = make_rng();
    for _ in 0..50 {
        let input = random_input(&mut rng);
        let skills = random_skills(&mut rng);
        for stage in all_stages(&catalog) {
            let first = stage.process(&input, 0.7, &skills, 5.0);
            let second = stage.process(&input, 0.7, &skills, 5.0);
            assert_eq!(first, second);
        }
    }
}

#[test]
fn test_nan_skill_and_input_quality_stay_in_range() {
    let catalog = test_catalog();
    let mut skills = full_skills();
    skills.insert("engineering".to_string(), f64::NAN);
    let inputs = [
        ResourceMap::from([(0, 10.0)]),
        ResourceMap::from([(2, 1.0), (3, 1.0)]),
        ResourceMap::from([(0, 4.0), (1, 2.0), (2, 2.0)]),
    ];
    for stage in all_stages(&catalog) {
        let e = stage.calculate_efficiency(1.0, &skills, 10.0);
        assert!((0.0..=1.0).contains(&e), "{}: {e}", stage.name());
        let q = stage.calculate_quality_modifier(1.0, &full_skills(), f64::NAN);
        assert!((q - 0.1).abs() < 1e-12, "{}: {q}", stage.name());
        for input in &inputs {
            let out = stage.process(input, 1.0, &skills, 10.0);
            assert!((0.0..=1.0).contains(&out.efficiency()), "{}", stage.name());
            assert!((0.1..=2.0).contains(&out.quality_modifier()), "{}", stage.name());
            assert!(out.products().values().all(|q| q.is_finite()));
            assert!(out.waste_products().values().all(|q| q.is_finite()));
        }
    }
}
