use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{CostTier, DrugClass, EfficacyTier, OutcomeEffect, WeightEffect};

/// What one drug class does, per the guideline's agent table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugCapability {
    pub class: DrugClass,
    pub efficacy: EfficacyTier,
    pub hypoglycemia_risk: bool,
    pub weight_effect: WeightEffect,
    /// MACE outcome.
    pub cardiovascular_effect: OutcomeEffect,
    pub heart_failure_effect: OutcomeEffect,
    /// Progression of diabetic kidney disease.
    pub renal_effect: OutcomeEffect,
    /// Below this eGFR the class must be stopped.
    #[serde(default)]
    pub contraindication_below_egfr: Option<f64>,
    /// Below this eGFR the dose must be reviewed.
    #[serde(default)]
    pub caution_below_egfr: Option<f64>,
    /// Below this eGFR the class must not be newly started.
    #[serde(default)]
    pub initiation_floor_egfr: Option<f64>,
    /// Classes that must not be co-administered with this one.
    #[serde(default)]
    pub conflicts: BTreeSet<DrugClass>,
    pub cost: CostTier,
    pub route: String,
    #[serde(default)]
    pub dosing_note: String,
    #[serde(default)]
    pub clinical_considerations: Vec<String>,
}

impl DrugCapability {
    pub fn contraindicated_at(&self, egfr: f64) -> bool {
        self.contraindication_below_egfr.is_some_and(|t| egfr < t)
    }

    pub fn caution_at(&self, egfr: f64) -> bool {
        self.caution_below_egfr.is_some_and(|t| egfr < t)
    }

    /// eGFR allows starting the class.
    pub fn can_initiate_at(&self, egfr: f64) -> bool {
        let above_floor = self.initiation_floor_egfr.map_or(true, |f| egfr >= f);
        above_floor && !self.contraindicated_at(egfr)
    }

    pub fn conflicts_with(&self, other: DrugClass) -> bool {
        self.conflicts.contains(&other)
    }
}

// ---------------------------------------------------------------------------
// Head-to-head comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub attribute: &'static str,
    pub left: String,
    pub right: String,
}

impl ComparisonRow {
    pub fn differs(&self) -> bool {
        self.left != self.right
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityComparison {
    pub left: DrugClass,
    pub right: DrugClass,
    pub rows: Vec<ComparisonRow>,
}

impl CapabilityComparison {
    pub fn between(left: &DrugCapability, right: &DrugCapability) -> Self {
        let row = |attribute, l: String, r: String| ComparisonRow {
            attribute,
            left: l,
            right: r,
        };
        let yes_no = |b: bool| if b { "yes".to_string() } else { "no".to_string() };

        Self {
            left: left.class,
            right: right.class,
            rows: vec![
                row("efficacy", left.efficacy.to_string(), right.efficacy.to_string()),
                row(
                    "hypoglycemia_risk",
                    yes_no(left.hypoglycemia_risk),
                    yes_no(right.hypoglycemia_risk),
                ),
                row("weight", left.weight_effect.to_string(), right.weight_effect.to_string()),
                row(
                    "cardiovascular",
                    left.cardiovascular_effect.to_string(),
                    right.cardiovascular_effect.to_string(),
                ),
                row(
                    "heart_failure",
                    left.heart_failure_effect.to_string(),
                    right.heart_failure_effect.to_string(),
                ),
                row("renal", left.renal_effect.to_string(), right.renal_effect.to_string()),
                row("cost", left.cost.to_string(), right.cost.to_string()),
                row("route", left.route.clone(), right.route.clone()),
            ],
        }
    }

    pub fn differing(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(|r| r.differs())
    }
}
