use crate::config::GUIDELINE;
use crate::models::{Citation, DrugClass, RuleId};

/// Text attached to an action: what to do, why, and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNote {
    pub rule: RuleId,
    pub message: String,
    pub reason: String,
    pub citation: Citation,
}

fn note(rule: RuleId, message: String, reason: String, section: &str) -> RuleNote {
    RuleNote {
        rule,
        message,
        reason,
        citation: Citation {
            source: GUIDELINE.to_string(),
            section: section.to_string(),
        },
    }
}

/// Message template builder for every rule the cascade can fire.
/// Wording is addressed to the prescriber, not the patient.
pub struct RuleTemplates;

impl RuleTemplates {
    // ── Safety ──────────────────────────────────────────────

    pub fn metformin_contraindicated(egfr: f64, threshold: f64) -> RuleNote {
        note(
            RuleId::MetforminContraindicated,
            "Stop metformin".into(),
            format!("eGFR {egfr:.1} is below the contraindication threshold of {threshold:.0} mL/min/1.73m²."),
            "Table 1: contraindications",
        )
    }

    pub fn metformin_dose_reduction(egfr: f64, threshold: f64) -> RuleNote {
        note(
            RuleId::MetforminDoseReduction,
            "Reduce metformin dose".into(),
            format!("eGFR {egfr:.1} is below {threshold:.0}; dose adjustment is required."),
            "Table 1: considerations",
        )
    }

    pub fn sglt2_below_floor_continue(egfr: f64, floor: f64) -> RuleNote {
        note(
            RuleId::Sglt2BelowInitiationFloor,
            "Do not newly initiate SGLT2 inhibitor; continue only if tolerated".into(),
            format!("eGFR {egfr:.1} is below the initiation floor of {floor:.0}. Renal and heart-failure benefit may persist on continued therapy."),
            "Renal considerations (DAPA-CKD criteria)",
        )
    }

    pub fn sglt2_below_floor_stop(egfr: f64, floor: f64) -> RuleNote {
        note(
            RuleId::Sglt2BelowInitiationFloor,
            "Stop SGLT2 inhibitor".into(),
            format!("eGFR {egfr:.1} is below the initiation floor of {floor:.0}."),
            "Renal considerations (DAPA-CKD criteria)",
        )
    }

    pub fn tzd_heart_failure() -> RuleNote {
        note(
            RuleId::TzdHeartFailure,
            "Stop thiazolidinedione".into(),
            "Fluid retention may worsen heart failure.".into(),
            "Table 1: increased heart-failure risk",
        )
    }

    pub fn redundant_incretin(agonist: DrugClass) -> RuleNote {
        note(
            RuleId::RedundantIncretin,
            "Stop DPP-4 inhibitor".into(),
            format!("Redundant incretin mechanism with {}.", agonist.label()),
            "Combination therapy: redundant mechanisms",
        )
    }

    pub fn sglt2_acute_risk_pause() -> RuleNote {
        note(
            RuleId::Sglt2AcuteRiskPause,
            "Consider temporary suspension of SGLT2 inhibitor".into(),
            "Ketosis or acute illness raises the risk of euglycemic DKA.".into(),
            "Table 1: DKA risk, sick-day guidance",
        )
    }

    // ── Red flags ───────────────────────────────────────────

    pub fn red_flag_basal() -> RuleNote {
        note(
            RuleId::RedFlagBasalInsulin,
            "Start basal insulin".into(),
            "Catabolic features, ketosis, acute illness or possible type 1 diabetes call for insulin ahead of stepwise escalation.".into(),
            "Insulin indications: catabolism, suspected type 1",
        )
    }

    pub fn red_flag_sulfonylurea() -> RuleNote {
        note(
            RuleId::RedFlagSulfonylurea,
            "Stop sulfonylurea".into(),
            "Hypoglycemia risk when combined with insulin.".into(),
            "Table 1: hypoglycemia",
        )
    }

    pub fn rapid_intensification(hba1c: f64, threshold: f64) -> RuleNote {
        note(
            RuleId::RapidIntensification,
            "Consider rapid intensification with prandial insulin".into(),
            format!("HbA1c {hba1c:.1}% is at or above {threshold:.1}% with red-flag features."),
            "Figure 5: intensification to injectable therapies",
        )
    }

    // ── Organ protection ────────────────────────────────────

    pub fn heart_failure_sglt2() -> RuleNote {
        note(
            RuleId::HeartFailureSglt2,
            "Start SGLT2 inhibitor".into(),
            "Proven heart-failure benefit (empagliflozin, dapagliflozin, canagliflozin, ertugliflozin), independent of HbA1c.".into(),
            "Table 1: cardiovascular effects (HF)",
        )
    }

    pub fn kidney_sglt2() -> RuleNote {
        note(
            RuleId::KidneySglt2,
            "Start SGLT2 inhibitor".into(),
            "Slows progression of diabetic kidney disease, independent of HbA1c.".into(),
            "Table 1: renal effects",
        )
    }

    pub fn kidney_glp1_fallback(egfr: f64, floor: f64) -> RuleNote {
        note(
            RuleId::KidneyGlp1Fallback,
            "Start GLP-1 receptor agonist".into(),
            format!("eGFR {egfr:.1} is below the SGLT2 inhibitor initiation floor of {floor:.0}; GLP-1 RA offers albuminuria benefit without renal restriction."),
            "Table 1: renal effects",
        )
    }

    pub fn ascvd_protection(chosen: DrugClass, bmi: f64, cutoff: f64) -> RuleNote {
        let tie_break = if chosen == DrugClass::Glp1ReceptorAgonist {
            format!("BMI {bmi:.1} is above {cutoff:.0}, favouring GLP-1 RA.")
        } else {
            format!("BMI {bmi:.1} is at or below {cutoff:.0}, favouring SGLT2 inhibitor.")
        };
        note(
            RuleId::AscvdProtection,
            format!("Start {}", chosen.label()),
            format!("Proven MACE benefit in established ASCVD. {tie_break}"),
            "Table 1: cardiovascular effects",
        )
    }

    // ── Glycemic ────────────────────────────────────────────

    pub fn early_combination(age: u32) -> RuleNote {
        note(
            RuleId::EarlyCombination,
            "Consider early combination therapy".into(),
            format!("Age {age}: younger patients tend to progress faster and may benefit from earlier combination."),
            "Text: age below 40",
        )
    }

    pub fn initial_combination(gap: f64) -> RuleNote {
        note(
            RuleId::InitialCombination,
            "Consider initial combination therapy".into(),
            format!("Newly diagnosed with HbA1c {gap:.1} points above target."),
            "Text: initial combination therapy",
        )
    }

    pub fn metformin_first_line() -> RuleNote {
        note(
            RuleId::MetforminFirstLine,
            "Add metformin".into(),
            "High efficacy, low cost.".into(),
            "Table 1",
        )
    }

    pub fn weight_priority(bmi: f64) -> RuleNote {
        note(
            RuleId::WeightPriority,
            "Add dual GIP/GLP-1 receptor agonist".into(),
            format!("BMI {bmi:.1}: very high efficacy for weight loss."),
            "Table 1: weight change",
        )
    }

    pub fn dpp4_upgrade(gap: f64) -> RuleNote {
        note(
            RuleId::Dpp4Upgrade,
            "Switch DPP-4 inhibitor to GLP-1 receptor agonist".into(),
            format!("HbA1c {gap:.1} points above target: upgrade efficacy from intermediate to high."),
            "Table 1: efficacy",
        )
    }

    pub fn dpp4_upgrade_stop(gap: f64, agonist: DrugClass) -> RuleNote {
        note(
            RuleId::Dpp4Upgrade,
            "Stop DPP-4 inhibitor".into(),
            format!("HbA1c {gap:.1} points above target and {} is already in place; the DPP-4 inhibitor adds no efficacy.", agonist.label()),
            "Table 1: efficacy",
        )
    }

    pub fn glp1_before_insulin() -> RuleNote {
        note(
            RuleId::InjectableIntensification,
            "Start GLP-1 receptor agonist before insulin".into(),
            "Efficacy similar to basal insulin without hypoglycemia or weight gain.".into(),
            "Figure 5",
        )
    }

    pub fn insulin_first(hba1c: f64) -> RuleNote {
        note(
            RuleId::InjectableIntensification,
            "Start basal insulin".into(),
            format!("HbA1c {hba1c:.1}%: very high efficacy required."),
            "Figure 5",
        )
    }

    pub fn basal_add_on() -> RuleNote {
        note(
            RuleId::BasalAddOn,
            "Add basal insulin".into(),
            "Above target despite incretin agonist therapy.".into(),
            "Figure 5",
        )
    }

    pub fn prandial_add_on() -> RuleNote {
        note(
            RuleId::PrandialAddOn,
            "Add prandial insulin".into(),
            "Above target despite basal insulin.".into(),
            "Figure 5",
        )
    }

    pub fn regimen_exhausted() -> RuleNote {
        note(
            RuleId::RegimenExhausted,
            "Consider specialist referral".into(),
            "Above target with every escalation step already in place.".into(),
            "Figure 5",
        )
    }

    /// Stop that follows from starting a conflicting class.
    pub fn conflict_stop(started: DrugClass, removed: DrugClass) -> RuleNote {
        if started.is_insulin() && removed == DrugClass::Sulfonylurea {
            return note(
                RuleId::InsulinSulfonylureaConflict,
                "Stop sulfonylurea".into(),
                format!("Hypoglycemia risk when combined with {}.", started.label().to_lowercase()),
                "Table 1: hypoglycemia",
            );
        }
        if removed == DrugClass::Dpp4Inhibitor && started.is_incretin_agonist() {
            return Self::redundant_incretin(started);
        }
        note(
            RuleId::ConflictingClass,
            format!("Stop {}", removed.label()),
            format!("Not to be combined with {}.", started.label()),
            "Combination therapy: redundant mechanisms",
        )
    }

    // ── De-escalation ───────────────────────────────────────

    pub fn sulfonylurea_taper(hba1c: f64) -> RuleNote {
        note(
            RuleId::SulfonylureaTaper,
            "Consider tapering or stopping sulfonylurea".into(),
            format!("HbA1c {hba1c:.1}%: hypoglycemia risk outweighs further lowering."),
            "Table 1: hypoglycemia",
        )
    }

    pub fn basal_dose_reduction(hba1c: f64) -> RuleNote {
        note(
            RuleId::BasalDoseReduction,
            "Reduce basal insulin dose by about 10-20%".into(),
            format!("HbA1c {hba1c:.1}%: risk of overbasalization and hypoglycemia."),
            "Figure 5: insulin titration",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insulin_start_removes_sulfonylurea_with_hypoglycemia_rule() {
        let note = RuleTemplates::conflict_stop(DrugClass::BasalInsulin, DrugClass::Sulfonylurea);
        assert_eq!(note.rule, RuleId::InsulinSulfonylureaConflict);
        assert!(note.reason.contains("basal insulin"));
    }

    #[test]
    fn agonist_start_removes_dpp4_as_redundant_incretin() {
        let note =
            RuleTemplates::conflict_stop(DrugClass::DualGipGlp1Agonist, DrugClass::Dpp4Inhibitor);
        assert_eq!(note.rule, RuleId::RedundantIncretin);
    }

    #[test]
    fn other_conflicts_fall_back_to_generic_rule() {
        let note = RuleTemplates::conflict_stop(
            DrugClass::DualGipGlp1Agonist,
            DrugClass::Glp1ReceptorAgonist,
        );
        assert_eq!(note.rule, RuleId::ConflictingClass);
        assert_eq!(note.message, "Stop GLP-1 receptor agonist");
    }

    #[test]
    fn citations_name_the_guideline() {
        let note = RuleTemplates::metformin_contraindicated(25.0, 30.0);
        assert_eq!(note.citation.source, GUIDELINE);
        assert!(note.reason.contains("eGFR 25"));
    }

    #[test]
    fn patient_egfr_is_not_rounded_up_to_the_threshold() {
        let note = RuleTemplates::metformin_contraindicated(29.6, 30.0);
        assert!(note.reason.starts_with("eGFR 29.6 is below"));
        assert!(note.reason.contains("threshold of 30 "));
    }
}
