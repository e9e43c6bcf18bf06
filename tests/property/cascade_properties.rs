use std::collections::BTreeSet;

use glycopilot_lib::cascade::{CascadeEngine, PolicyProfile};
use glycopilot_lib::models::{
    ActionKind, AlbuminuriaCategory, Comorbidities, DiabetesType, DrugClass, PatientInput,
    PatientSnapshot, Plan, RiskFlags, StageKind,
};
use proptest::prelude::*;

fn engines() -> [CascadeEngine; 2] {
    let knowledge = std::sync::Arc::new(glycopilot_lib::KnowledgeBase::builtin().unwrap());
    [PolicyProfile::canonical(), PolicyProfile::conservative()].map(|policy| {
        CascadeEngine::new(knowledge.clone(), std::sync::Arc::new(policy)).unwrap()
    })
}

fn regimen_from_mask(mask: u16) -> Vec<DrugClass> {
    DrugClass::ALL
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, c)| *c)
        .collect()
}

/// Apply the plan's actions to the starting regimen one by one, checking the
/// presence invariant on the way, and return the resulting set.
fn replay(regimen: &[DrugClass], plan: &Plan) -> Result<BTreeSet<DrugClass>, String> {
    let mut state: BTreeSet<DrugClass> = regimen.iter().copied().collect();
    for action in &plan.actions {
        match action.kind {
            ActionKind::Stop { class } => {
                if !state.remove(&class) {
                    return Err(format!("stop of absent {class}"));
                }
            }
            ActionKind::Start { class } => {
                if !state.insert(class) {
                    return Err(format!("start of present {class}"));
                }
            }
            ActionKind::Switch { from, to } => {
                if !state.remove(&from) || !state.insert(to) {
                    return Err(format!("bad switch {from} -> {to}"));
                }
            }
            ActionKind::Alert { .. } => {}
        }
    }
    Ok(state)
}

prop_compose! {
    fn patient()(
        age in 18u32..=100,
        weight_kg in 40.0f64..=250.0,
        height_cm in 100.0f64..=240.0,
        hba1c in 4.0f64..=18.0,
        target in prop::sample::select(vec![6.5, 7.0, 7.5, 8.0]),
        egfr in 5.0f64..=140.0,
        albuminuria in prop::sample::select(AlbuminuriaCategory::ALL.to_vec()),
        diabetes_type in prop::sample::select(DiabetesType::ALL.to_vec()),
        flags in prop::array::uniform8(any::<bool>()),
    ) -> PatientSnapshot {
        PatientInput {
            age,
            weight_kg,
            height_cm,
            hba1c,
            target_hba1c: target,
            egfr,
            albuminuria,
            diabetes_type,
            comorbidities: Comorbidities { ascvd: flags[0], hf: flags[1], ckd: flags[2] },
            risk_flags: RiskFlags {
                newly_diagnosed: flags[3],
                catabolic: flags[4],
                ketosis: flags[5],
                acute_illness: flags[6],
                suspected_type1: flags[7],
            },
        }
        .validate()
        .unwrap()
    }
}

fn regimen() -> impl Strategy<Value = Vec<DrugClass>> {
    (0u16..(1 << DrugClass::ALL.len())).prop_map(regimen_from_mask)
}

proptest! {
    #[test]
    fn evaluation_is_total_and_consistent(snapshot in patient(), regimen in regimen()) {
        for engine in engines() {
            let plan = match engine.evaluate(&snapshot, &regimen) {
                Ok(plan) => plan,
                Err(e) => return Err(TestCaseError::fail(e.to_string())),
            };

            let replayed = replay(&regimen, &plan).map_err(TestCaseError::fail)?;
            let final_state: BTreeSet<DrugClass> = plan.final_state.iter().collect();
            prop_assert_eq!(replayed, final_state);

            let stages: Vec<StageKind> = plan.actions.iter().map(|a| a.stage).collect();
            let mut sorted = stages.clone();
            sorted.sort();
            prop_assert_eq!(stages, sorted);
        }
    }

    #[test]
    fn identical_inputs_give_identical_json(snapshot in patient(), regimen in regimen()) {
        for engine in engines() {
            let first = serde_json::to_string(&engine.evaluate(&snapshot, &regimen).unwrap()).unwrap();
            let second = serde_json::to_string(&engine.evaluate(&snapshot, &regimen).unwrap()).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn re_evaluation_does_not_flap(snapshot in patient(), regimen in regimen()) {
        for engine in engines() {
            let first = engine.evaluate(&snapshot, &regimen).unwrap();
            let second = engine
                .evaluate(&snapshot, &first.final_state.to_vec())
                .unwrap();

            let stopped_first = first.stopped_classes();
            let started_first = first.started_classes();
            for class in second.started_classes() {
                prop_assert!(
                    !stopped_first.contains(&class),
                    "{} stopped then restarted", class
                );
            }
            for class in second.stopped_classes() {
                prop_assert!(
                    !started_first.contains(&class),
                    "{} started then stopped", class
                );
            }
        }
    }

    #[test]
    fn above_target_always_gets_an_action(snapshot in patient(), regimen in regimen()) {
        prop_assume!(snapshot.glycemic_gap() > 0.0);
        let [engine, _] = engines();
        let plan = engine.evaluate(&snapshot, &regimen).unwrap();
        prop_assert!(plan.actions_from(StageKind::Glycemic).count() >= 1);
    }

    #[test]
    fn de_escalation_never_changes_the_regimen(snapshot in patient(), regimen in regimen()) {
        let [engine, _] = engines();
        let plan = engine.evaluate(&snapshot, &regimen).unwrap();
        for action in plan.actions_from(StageKind::DeEscalation) {
            prop_assert!(!action.kind.changes_regimen());
        }
    }
}

/// Every combination of comorbidity and risk flags against every regimen,
/// at one lab profile per renal band. The profiles only diverge below the
/// SGLT2 floor at this BMI, so the conservative one runs there alone.
#[test]
fn every_flag_and_regimen_combination_is_handled() {
    let [canonical, conservative] = engines();
    for egfr in [15.0, 35.0, 80.0] {
        let engines: Vec<&CascadeEngine> = if egfr < 20.0 {
            vec![&canonical, &conservative]
        } else {
            vec![&canonical]
        };
        for flags in 0u8..=u8::MAX {
            let bit = |n: u8| flags & (1 << n) != 0;
            let snapshot = PatientInput {
                hba1c: if bit(7) { 11.0 } else { 8.2 },
                egfr,
                comorbidities: Comorbidities { ascvd: bit(0), hf: bit(1), ckd: bit(2) },
                risk_flags: RiskFlags {
                    newly_diagnosed: bit(3),
                    catabolic: bit(4),
                    ketosis: bit(5),
                    acute_illness: bit(6),
                    suspected_type1: false,
                },
                ..Default::default()
            }
            .validate()
            .unwrap();

            for mask in 0u16..(1 << DrugClass::ALL.len()) {
                let regimen = regimen_from_mask(mask);
                for engine in &engines {
                    let plan = engine.evaluate(&snapshot, &regimen).unwrap_or_else(|e| {
                        panic!("egfr {egfr}, flags {flags:08b}, regimen {regimen:?}: {e}")
                    });
                    replay(&regimen, &plan).unwrap();
                }
            }
        }
    }
}
