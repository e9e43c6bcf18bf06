use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::validation::InputValidationError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Parsing is case-insensitive; extra `| "alias"` literals are accepted on input
/// but the canonical string is always what gets serialized.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal $(| $alias:literal)*),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InputValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s $(| $alias)* => Ok(Self::$variant)),+,
                    _ => Err(InputValidationError::UnknownValue {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// Declaration order is the canonical order of a regimen and of the final state.
str_enum!(DrugClass {
    Metformin => "metformin",
    Sglt2Inhibitor => "sglt2_inhibitor" | "sglt2i" | "sglt2",
    Glp1ReceptorAgonist => "glp1_receptor_agonist" | "glp1_ra" | "glp1ra" | "glp-1 ra",
    DualGipGlp1Agonist => "dual_gip_glp1_agonist" | "gip_glp1" | "tirzepatide",
    Dpp4Inhibitor => "dpp4_inhibitor" | "dpp4i" | "dpp-4i",
    Sulfonylurea => "sulfonylurea" | "su" | "sulfonylureas",
    Thiazolidinedione => "tzd" | "thiazolidinedione" | "thiazolidinediones",
    BasalInsulin => "basal_insulin" | "insulin_basal" | "insulin",
    PrandialInsulin => "prandial_insulin" | "insulin_prandial",
});

impl DrugClass {
    /// Human-readable class name used in action messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Metformin => "Metformin",
            Self::Sglt2Inhibitor => "SGLT2 inhibitor",
            Self::Glp1ReceptorAgonist => "GLP-1 receptor agonist",
            Self::DualGipGlp1Agonist => "Dual GIP/GLP-1 receptor agonist",
            Self::Dpp4Inhibitor => "DPP-4 inhibitor",
            Self::Sulfonylurea => "Sulfonylurea",
            Self::Thiazolidinedione => "Thiazolidinedione (TZD)",
            Self::BasalInsulin => "Basal insulin",
            Self::PrandialInsulin => "Prandial insulin",
        }
    }

    /// GLP-1 RA or the dual GIP/GLP-1 agonist. DPP-4 inhibitors are incretin
    /// enhancers, not agonists, and are excluded.
    pub fn is_incretin_agonist(&self) -> bool {
        matches!(self, Self::Glp1ReceptorAgonist | Self::DualGipGlp1Agonist)
    }

    pub fn is_insulin(&self) -> bool {
        matches!(self, Self::BasalInsulin | Self::PrandialInsulin)
    }
}

str_enum!(EfficacyTier {
    Low => "low",
    Intermediate => "intermediate",
    High => "high",
    VeryHigh => "very_high",
});

str_enum!(WeightEffect {
    Loss => "loss",
    Neutral => "neutral",
    Gain => "gain",
});

str_enum!(OutcomeEffect {
    Benefit => "benefit",
    PotentialBenefit => "potential_benefit",
    Neutral => "neutral",
    IncreasedRisk => "increased_risk",
    UnderInvestigation => "under_investigation",
});

str_enum!(CostTier {
    Low => "low",
    High => "high",
    Variable => "variable",
});

str_enum!(AlbuminuriaCategory {
    A1 => "a1" | "normal",
    A2 => "a2" | "moderate" | "microalbuminuria",
    A3 => "a3" | "severe" | "macroalbuminuria",
});

str_enum!(DiabetesType {
    Type2 => "type_2" | "type2" | "t2d",
    Type1 => "type_1" | "type1" | "t1d",
    Other => "other",
});

str_enum!(StageKind {
    Safety => "safety",
    RedFlag => "red_flag",
    OrganProtection => "organ_protection",
    Glycemic => "glycemic",
    DeEscalation => "de_escalation",
});

str_enum!(RuleId {
    MetforminContraindicated => "metformin_contraindicated",
    MetforminDoseReduction => "metformin_dose_reduction",
    Sglt2BelowInitiationFloor => "sglt2_below_initiation_floor",
    TzdHeartFailure => "tzd_heart_failure",
    RedundantIncretin => "redundant_incretin",
    Sglt2AcuteRiskPause => "sglt2_acute_risk_pause",
    RedFlagBasalInsulin => "red_flag_basal_insulin",
    RedFlagSulfonylurea => "red_flag_sulfonylurea",
    RapidIntensification => "rapid_intensification",
    HeartFailureSglt2 => "heart_failure_sglt2",
    KidneySglt2 => "kidney_sglt2",
    KidneyGlp1Fallback => "kidney_glp1_fallback",
    AscvdProtection => "ascvd_protection",
    EarlyCombination => "early_combination",
    InitialCombination => "initial_combination",
    MetforminFirstLine => "metformin_first_line",
    WeightPriority => "weight_priority",
    Dpp4Upgrade => "dpp4_upgrade",
    InjectableIntensification => "injectable_intensification",
    BasalAddOn => "basal_add_on",
    PrandialAddOn => "prandial_add_on",
    RegimenExhausted => "regimen_exhausted",
    InsulinSulfonylureaConflict => "insulin_sulfonylurea_conflict",
    ConflictingClass => "conflicting_class",
    SulfonylureaTaper => "sulfonylurea_taper",
    BasalDoseReduction => "basal_dose_reduction",
});

str_enum!(Sglt2LowEgfrPolicy {
    ContinueWithAlert => "continue_with_alert",
    Discontinue => "discontinue" | "force_stop",
});
