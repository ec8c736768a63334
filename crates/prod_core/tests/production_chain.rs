//! Integration test: mined ore → refinery → fabricator → assembler, with the
//! caller keeping inventory between stages.

use prod_core::test_fixtures::{base_catalog, uniform_skills};
use prod_core::*;
use std::sync::Arc;

/// Removes what a stage consumed, as a cargo hold would.
fn consume(inventory: &mut ResourceMap, used: &ResourceMap) {
    for (id, qty) in used {
        if let Some(have) = inventory.get_mut(id) {
            *have -= qty;
            if *have <= 1e-9 {
                inventory.remove(id);
            }
        }
    }
}

#[test]
fn full_chain_builds_a_personal_computer() {
    let catalog = Arc::new(base_catalog());
    let refinery = RefiningStage::new(Arc::clone(&catalog));
    let fabricator = ComponentManufacturingStage::new(Arc::clone(&catalog));
    let assembler = AssemblyStage::new(Arc::clone(&catalog));
    let skills = uniform_skills(0.8);

    // Pyrogen, Angion, Varite, Magneton: everything a computer needs.
    let ores = ResourceMap::from([(0, 200.0), (2, 200.0), (3, 200.0), (8, 200.0)]);
    let refined = refinery.process(&ores, 0.9, &skills, 10.0);
    assert_eq!(refined.result(), ProductionResult::Success);
    let mut minerals = refined.products().clone();

    // Targeted runs, so the computer's three parts each get built.
    let mut components = ResourceMap::new();
    for (component_id, units) in [(0, 4.0), (1, 2.0), (2, 2.0)] {
        let out = fabricator.manufacture(&minerals, 0.9, &skills, units, Some(component_id));
        assert!(out.is_productive(), "{}", out.message());
        let used: ResourceMap = catalog
            .component(component_id)
            .unwrap()
            .required_minerals
            .iter()
            .map(|(id, per_unit)| (*id, per_unit * units))
            .collect();
        consume(&mut minerals, &used);
        for (id, qty) in out.products() {
            *components.entry(*id).or_insert(0.0) += qty;
        }
    }

    let goods = assembler.assemble(&components, 0.9, &skills, 1.0, Some(0), 2);
    assert!(goods.is_productive(), "{}", goods.message());
    assert!(goods.products()[&0] > 0.0);
    assert!(goods.waste_products()[&ASSEMBLY_WASTE_ID] > 0.0);
}

#[test]
fn planning_estimates_do_not_touch_the_catalog() {
    let catalog = Arc::new(base_catalog());
    let assembler = AssemblyStage::new(Arc::clone(&catalog));
    let before = catalog.finished_good(0).unwrap().clone();

    let needed = assembler.required_resources_for(3.0, 0);
    let preview = assembler.expected_output_at(&needed, 2);
    assert!((preview[&0] - 3.0).abs() < 1e-2);

    let after = catalog.finished_good(0).unwrap();
    assert_eq!(before.required_components, after.required_components);
    assert_eq!(Arc::strong_count(&catalog), 2);
}

#[test]
fn stages_work_behind_trait_objects_across_threads() {
    let catalog = Arc::new(base_catalog());
    let stage: Arc<dyn ProductionStage> = Arc::new(RefiningStage::new(Arc::clone(&catalog)));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let stage = Arc::clone(&stage);
            std::thread::spawn(move || {
                let input = ResourceMap::from([(i, 10.0)]);
                stage.process(&input, 1.0, &uniform_skills(1.0), 10.0)
            })
        })
        .collect();
    for handle in handles {
        let out = handle.join().unwrap();
        assert!(out.is_productive());
    }
}
