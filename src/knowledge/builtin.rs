//! Built-in agent table (ADA/EASD 2022 consensus report, table 1).

use std::collections::BTreeSet;

use crate::models::{CostTier, DrugClass, EfficacyTier, OutcomeEffect, WeightEffect};

use super::capability::DrugCapability;

fn conflicts(classes: &[DrugClass]) -> BTreeSet<DrugClass> {
    classes.iter().copied().collect()
}

fn notes(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

pub fn builtin_capabilities() -> Vec<DrugCapability> {
    use DrugClass::*;

    vec![
        DrugCapability {
            class: Metformin,
            efficacy: EfficacyTier::High,
            hypoglycemia_risk: false,
            weight_effect: WeightEffect::Neutral,
            cardiovascular_effect: OutcomeEffect::PotentialBenefit,
            heart_failure_effect: OutcomeEffect::Neutral,
            renal_effect: OutcomeEffect::Neutral,
            contraindication_below_egfr: Some(30.0),
            caution_below_egfr: Some(45.0),
            initiation_floor_egfr: Some(30.0),
            conflicts: BTreeSet::new(),
            cost: CostTier::Low,
            route: "oral".into(),
            dosing_note: "Contraindicated with eGFR < 30. Monitor vitamin B12.".into(),
            clinical_considerations: notes(&[
                "Frequent GI side effects (diarrhea, nausea).",
                "Consider extended-release formulations and dosing with food.",
                "Potential vitamin B12 deficiency with long-term use.",
            ]),
        },
        DrugCapability {
            class: Sglt2Inhibitor,
            efficacy: EfficacyTier::Intermediate,
            hypoglycemia_risk: false,
            weight_effect: WeightEffect::Loss,
            cardiovascular_effect: OutcomeEffect::Benefit,
            heart_failure_effect: OutcomeEffect::Benefit,
            renal_effect: OutcomeEffect::Benefit,
            contraindication_below_egfr: None,
            caution_below_egfr: None,
            initiation_floor_egfr: Some(20.0),
            conflicts: BTreeSet::new(),
            cost: CostTier::High,
            route: "oral".into(),
            dosing_note: "Glucose-lowering efficacy falls at low eGFR; renal benefit is retained."
                .into(),
            clinical_considerations: notes(&[
                "Rare risk of (euglycemic) DKA. Hold 3-4 days before surgery.",
                "Increased risk of genital mycotic infections.",
                "Rare risk of Fournier's gangrene.",
                "Watch volume status (hypotension) with concurrent diuretics.",
            ]),
        },
        DrugCapability {
            class: Glp1ReceptorAgonist,
            efficacy: EfficacyTier::High,
            hypoglycemia_risk: false,
            weight_effect: WeightEffect::Loss,
            cardiovascular_effect: OutcomeEffect::Benefit,
            heart_failure_effect: OutcomeEffect::Neutral,
            renal_effect: OutcomeEffect::Benefit,
            contraindication_below_egfr: None,
            caution_below_egfr: None,
            initiation_floor_egfr: None,
            conflicts: conflicts(&[DualGipGlp1Agonist, Dpp4Inhibitor]),
            cost: CostTier::High,
            route: "subcutaneous / oral (semaglutide)".into(),
            dosing_note: "Renal dose adjustment for lixisenatide and exenatide only.".into(),
            clinical_considerations: notes(&[
                "Thyroid C-cell tumour risk in rodents. Contraindicated in MEN2.",
                "Frequent GI side effects. Titrate slowly.",
                "Possible pancreatitis and gallbladder disease.",
                "Retinopathy associated with rapid glucose lowering.",
            ]),
        },
        DrugCapability {
            class: DualGipGlp1Agonist,
            efficacy: EfficacyTier::VeryHigh,
            hypoglycemia_risk: false,
            weight_effect: WeightEffect::Loss,
            cardiovascular_effect: OutcomeEffect::UnderInvestigation,
            heart_failure_effect: OutcomeEffect::UnderInvestigation,
            renal_effect: OutcomeEffect::UnderInvestigation,
            contraindication_below_egfr: None,
            caution_below_egfr: None,
            initiation_floor_egfr: None,
            conflicts: conflicts(&[Glp1ReceptorAgonist, Dpp4Inhibitor]),
            cost: CostTier::High,
            route: "subcutaneous".into(),
            dosing_note: "No renal dose adjustment. Monitor renal function with GI adverse events."
                .into(),
            clinical_considerations: notes(&[
                "GI profile similar to GLP-1 RA (nausea, vomiting).",
                "Greater weight and glucose lowering than GLP-1 RA.",
                "Contraindicated with history of medullary thyroid cancer or MEN2.",
                "Watch for cholelithiasis and cholecystitis.",
            ]),
        },
        DrugCapability {
            class: Dpp4Inhibitor,
            efficacy: EfficacyTier::Intermediate,
            hypoglycemia_risk: false,
            weight_effect: WeightEffect::Neutral,
            cardiovascular_effect: OutcomeEffect::Neutral,
            heart_failure_effect: OutcomeEffect::Neutral,
            renal_effect: OutcomeEffect::Neutral,
            contraindication_below_egfr: None,
            caution_below_egfr: None,
            initiation_floor_egfr: None,
            conflicts: conflicts(&[Glp1ReceptorAgonist, DualGipGlp1Agonist]),
            cost: CostTier::High,
            route: "oral".into(),
            dosing_note: "Renal dose adjustment required (except linagliptin).".into(),
            clinical_considerations: notes(&[
                "Generally well tolerated.",
                "Pancreatitis reported rarely.",
                "Joint pain.",
                "Bullous pemphigoid (rare).",
            ]),
        },
        DrugCapability {
            class: Sulfonylurea,
            efficacy: EfficacyTier::High,
            hypoglycemia_risk: true,
            weight_effect: WeightEffect::Gain,
            cardiovascular_effect: OutcomeEffect::Neutral,
            heart_failure_effect: OutcomeEffect::Neutral,
            renal_effect: OutcomeEffect::Neutral,
            contraindication_below_egfr: None,
            caution_below_egfr: None,
            initiation_floor_egfr: None,
            conflicts: conflicts(&[BasalInsulin, PrandialInsulin]),
            cost: CostTier::Low,
            route: "oral".into(),
            dosing_note: "Glyburide not recommended in CKD; glipizide and glimepiride preferred."
                .into(),
            clinical_considerations: notes(&[
                "Hypoglycemia risk, especially in older adults.",
                "Limited durability of glycemic effect.",
                "FDA warning on cardiovascular mortality based on older tolbutamide studies.",
            ]),
        },
        DrugCapability {
            class: Thiazolidinedione,
            efficacy: EfficacyTier::High,
            hypoglycemia_risk: false,
            weight_effect: WeightEffect::Gain,
            cardiovascular_effect: OutcomeEffect::PotentialBenefit,
            heart_failure_effect: OutcomeEffect::IncreasedRisk,
            renal_effect: OutcomeEffect::Neutral,
            contraindication_below_egfr: None,
            caution_below_egfr: None,
            initiation_floor_egfr: None,
            conflicts: BTreeSet::new(),
            cost: CostTier::Low,
            route: "oral".into(),
            dosing_note: "Not recommended in renal impairment due to fluid retention.".into(),
            clinical_considerations: notes(&[
                "Heart failure risk (edema).",
                "Benefit in NASH.",
                "Increased fracture risk.",
                "Weight gain.",
            ]),
        },
        DrugCapability {
            class: BasalInsulin,
            efficacy: EfficacyTier::VeryHigh,
            hypoglycemia_risk: true,
            weight_effect: WeightEffect::Gain,
            cardiovascular_effect: OutcomeEffect::Neutral,
            heart_failure_effect: OutcomeEffect::Neutral,
            renal_effect: OutcomeEffect::Neutral,
            contraindication_below_egfr: None,
            caution_below_egfr: None,
            initiation_floor_egfr: None,
            conflicts: conflicts(&[Sulfonylurea]),
            cost: CostTier::Variable,
            route: "subcutaneous".into(),
            dosing_note: "Lower doses needed at low eGFR (higher hypoglycemia risk).".into(),
            clinical_considerations: notes(&[
                "Most potent glucose-lowering agent.",
                "Injection-site reactions.",
                "Lower hypoglycemia risk with analogues than human insulin.",
                "Requires structured patient education.",
            ]),
        },
        DrugCapability {
            class: PrandialInsulin,
            efficacy: EfficacyTier::VeryHigh,
            hypoglycemia_risk: true,
            weight_effect: WeightEffect::Gain,
            cardiovascular_effect: OutcomeEffect::Neutral,
            heart_failure_effect: OutcomeEffect::Neutral,
            renal_effect: OutcomeEffect::Neutral,
            contraindication_below_egfr: None,
            caution_below_egfr: None,
            initiation_floor_egfr: None,
            conflicts: conflicts(&[Sulfonylurea]),
            cost: CostTier::Variable,
            route: "subcutaneous / inhaled".into(),
            dosing_note: "Lower doses needed at low eGFR (higher hypoglycemia risk).".into(),
            clinical_considerations: notes(&[
                "Start with one injection before the largest meal.",
                "Highest hypoglycemia risk of all classes.",
                "Requires structured patient education.",
            ]),
        },
    ]
}
