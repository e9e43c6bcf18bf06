//! Named rule variants.
//!
//! The guideline sources disagree on a few decisions. Each disagreement is a
//! field here so the cascade never hard-codes one side. Which profile is
//! clinically authoritative has to be settled against the governing guideline
//! before production use; the default is only the canonical reading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{read_json, ConfigError};
use crate::models::validation::HBA1C_RANGE;
use crate::models::Sglt2LowEgfrPolicy;

pub const CANONICAL_PROFILE: &str = "ada-easd-2022";
pub const CONSERVATIVE_PROFILE: &str = "conservative";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyProfile {
    pub name: String,
    /// Active SGLT2 inhibitor below its initiation floor.
    pub sglt2_low_egfr: Sglt2LowEgfrPolicy,
    /// ASCVD tie-break: BMI strictly above this picks GLP-1 RA over SGLT2i.
    pub ascvd_bmi_cutoff: f64,
    /// BMI at or above this prioritizes the dual agonist for weight.
    pub weight_priority_bmi: f64,
    /// Glycemic gap above which a DPP-4 inhibitor is upgraded.
    pub dpp4_switch_gap: f64,
    /// HbA1c at or above which lowering must be fast: insulin first in
    /// glycemic escalation, rapid-intensification alert on red flags.
    pub very_high_hba1c: f64,
    /// Patients younger than this are flagged for early combination.
    pub early_combination_age: u32,
    /// Gap at diagnosis at or above which initial combination is suggested.
    pub initial_combination_gap: f64,
    /// HbA1c below which sulfonylurea taper is suggested.
    pub sulfonylurea_taper_hba1c: f64,
    /// HbA1c at or below which basal insulin dose reduction is suggested.
    pub basal_reduction_hba1c: f64,
}

impl Default for PolicyProfile {
    fn default() -> Self {
        Self::canonical()
    }
}

impl PolicyProfile {
    /// Continue SGLT2i with an alert at low eGFR; ASCVD BMI cutoff 27.
    pub fn canonical() -> Self {
        Self {
            name: CANONICAL_PROFILE.into(),
            sglt2_low_egfr: Sglt2LowEgfrPolicy::ContinueWithAlert,
            ascvd_bmi_cutoff: 27.0,
            weight_priority_bmi: 30.0,
            dpp4_switch_gap: 0.5,
            very_high_hba1c: 10.0,
            early_combination_age: 40,
            initial_combination_gap: 1.5,
            sulfonylurea_taper_hba1c: 6.5,
            basal_reduction_hba1c: 6.0,
        }
    }

    /// Stop SGLT2i below the initiation floor; ASCVD BMI cutoff 30.
    pub fn conservative() -> Self {
        Self {
            name: CONSERVATIVE_PROFILE.into(),
            sglt2_low_egfr: Sglt2LowEgfrPolicy::Discontinue,
            ascvd_bmi_cutoff: 30.0,
            ..Self::canonical()
        }
    }

    pub fn named(name: &str) -> Result<Self, ConfigError> {
        match name {
            CANONICAL_PROFILE => Ok(Self::canonical()),
            CONSERVATIVE_PROFILE => Ok(Self::conservative()),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }

    /// Load a profile from JSON. `name` is required so a plan never reports
    /// a built-in profile it did not run; other missing fields fall back to
    /// the canonical profile's values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: serde_json::Value = read_json(path)?;
        if raw.get("name").is_none() {
            return Err(ConfigError::InvalidPolicy {
                field: "name",
                reason: "must be set in a policy file".into(),
            });
        }
        let profile: Self = serde_json::from_value(raw)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))?;
        profile.validate()?;
        tracing::info!(path = %path.display(), profile = %profile.name, "Policy profile loaded");
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| ConfigError::InvalidPolicy { field, reason };

        if self.name.trim().is_empty() {
            return Err(invalid("name", "must not be empty".into()));
        }
        for (field, bmi) in [
            ("ascvd_bmi_cutoff", self.ascvd_bmi_cutoff),
            ("weight_priority_bmi", self.weight_priority_bmi),
        ] {
            if !(15.0..=60.0).contains(&bmi) {
                return Err(invalid(field, format!("{bmi} is not a plausible BMI cutoff")));
            }
        }
        for (field, gap) in [
            ("dpp4_switch_gap", self.dpp4_switch_gap),
            ("initial_combination_gap", self.initial_combination_gap),
        ] {
            if !(0.0..=5.0).contains(&gap) {
                return Err(invalid(field, format!("{gap} must be within [0, 5]")));
            }
        }
        for (field, value) in [
            ("very_high_hba1c", self.very_high_hba1c),
            ("sulfonylurea_taper_hba1c", self.sulfonylurea_taper_hba1c),
            ("basal_reduction_hba1c", self.basal_reduction_hba1c),
        ] {
            HBA1C_RANGE
                .check(value)
                .map_err(|e| invalid(field, e.to_string()))?;
        }
        if self.basal_reduction_hba1c > self.sulfonylurea_taper_hba1c {
            return Err(invalid(
                "basal_reduction_hba1c",
                "must not exceed sulfonylurea_taper_hba1c".into(),
            ));
        }
        if !(18..=100).contains(&self.early_combination_age) {
            return Err(invalid(
                "early_combination_age",
                format!("{} is outside [18, 100]", self.early_combination_age),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_profiles_validate() {
        for name in [CANONICAL_PROFILE, CONSERVATIVE_PROFILE] {
            let profile = PolicyProfile::named(name).unwrap();
            assert_eq!(profile.name, name);
            profile.validate().unwrap();
        }
    }

    #[test]
    fn profiles_differ_only_on_variant_fields() {
        let canonical = PolicyProfile::canonical();
        let conservative = PolicyProfile::conservative();
        assert_eq!(canonical.sglt2_low_egfr, Sglt2LowEgfrPolicy::ContinueWithAlert);
        assert_eq!(conservative.sglt2_low_egfr, Sglt2LowEgfrPolicy::Discontinue);
        assert_eq!(canonical.ascvd_bmi_cutoff, 27.0);
        assert_eq!(conservative.ascvd_bmi_cutoff, 30.0);
        assert_eq!(canonical.dpp4_switch_gap, conservative.dpp4_switch_gap);
    }

    #[test]
    fn unknown_profile_name() {
        assert!(matches!(
            PolicyProfile::named("experimental"),
            Err(ConfigError::UnknownProfile(_))
        ));
    }

    #[test]
    fn partial_file_overrides_named_fields_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(
            &path,
            r#"{ "name": "site-a", "sglt2_low_egfr": "force_stop" }"#,
        )
        .unwrap();

        let profile = PolicyProfile::load(&path).unwrap();
        assert_eq!(profile.name, "site-a");
        assert_eq!(profile.sglt2_low_egfr, Sglt2LowEgfrPolicy::Discontinue);
        assert_eq!(profile.ascvd_bmi_cutoff, 27.0);
    }

    #[test]
    fn load_rejects_implausible_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{ "name": "site-a", "ascvd_bmi_cutoff": 270 }"#).unwrap();
        assert!(matches!(
            PolicyProfile::load(&path),
            Err(ConfigError::InvalidPolicy { field: "ascvd_bmi_cutoff", .. })
        ));
    }

    #[test]
    fn load_rejects_file_without_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(
            &path,
            r#"{ "sglt2_low_egfr": "force_stop", "ascvd_bmi_cutoff": 30 }"#,
        )
        .unwrap();
        assert!(matches!(
            PolicyProfile::load(&path),
            Err(ConfigError::InvalidPolicy { field: "name", .. })
        ));
    }

    #[test]
    fn basal_threshold_cannot_exceed_taper_threshold() {
        let profile = PolicyProfile {
            basal_reduction_hba1c: 7.0,
            ..PolicyProfile::canonical()
        };
        assert!(profile.validate().is_err());
    }
}
