use serde::{Deserialize, Serialize};

use super::enums::{AlbuminuriaCategory, DiabetesType};
use super::validation::{
    InputValidationError, AGE_RANGE, EGFR_RANGE, HBA1C_RANGE, HEIGHT_RANGE, WEIGHT_RANGE,
};

impl Default for AlbuminuriaCategory {
    fn default() -> Self {
        Self::A1
    }
}

impl Default for DiabetesType {
    fn default() -> Self {
        Self::Type2
    }
}

// ---------------------------------------------------------------------------
// TargetHba1c
// ---------------------------------------------------------------------------

/// Individualized HbA1c goal. Only the four guideline steps are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum TargetHba1c {
    /// 6.5%
    Tight,
    /// 7.0%
    Standard,
    /// 7.5%
    Relaxed,
    /// 8.0%
    Lenient,
}

impl TargetHba1c {
    pub const ALL: [Self; 4] = [Self::Tight, Self::Standard, Self::Relaxed, Self::Lenient];

    pub fn value(&self) -> f64 {
        match self {
            Self::Tight => 6.5,
            Self::Standard => 7.0,
            Self::Relaxed => 7.5,
            Self::Lenient => 8.0,
        }
    }
}

impl TryFrom<f64> for TargetHba1c {
    type Error = InputValidationError;

    fn try_from(raw: f64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| (t.value() - raw).abs() < 1e-9)
            .ok_or(InputValidationError::UnsupportedTarget(raw))
    }
}

impl From<TargetHba1c> for f64 {
    fn from(target: TargetHba1c) -> Self {
        target.value()
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Comorbidities {
    pub ascvd: bool,
    pub hf: bool,
    pub ckd: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFlags {
    pub newly_diagnosed: bool,
    pub catabolic: bool,
    pub ketosis: bool,
    pub acute_illness: bool,
    pub suspected_type1: bool,
}

impl RiskFlags {
    /// Ketosis or intercurrent acute illness: SGLT2 inhibitors should not be
    /// started and existing therapy may need to be paused.
    pub fn acute_risk(&self) -> bool {
        self.ketosis || self.acute_illness
    }
}

// ---------------------------------------------------------------------------
// PatientInput: raw, unvalidated fields as received from the caller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub hba1c: f64,
    pub target_hba1c: f64,
    pub egfr: f64,
    #[serde(default)]
    pub albuminuria: AlbuminuriaCategory,
    #[serde(default)]
    pub diabetes_type: DiabetesType,
    #[serde(default)]
    pub comorbidities: Comorbidities,
    #[serde(default)]
    pub risk_flags: RiskFlags,
}

impl Default for PatientInput {
    /// Adult with type 2 diabetes above a 7.0% target and moderately reduced
    /// renal function, no comorbidities and no risk flags.
    fn default() -> Self {
        Self {
            age: 55,
            weight_kg: 95.0,
            height_cm: 175.0,
            hba1c: 8.2,
            target_hba1c: 7.0,
            egfr: 45.0,
            albuminuria: AlbuminuriaCategory::A1,
            diabetes_type: DiabetesType::Type2,
            comorbidities: Comorbidities::default(),
            risk_flags: RiskFlags::default(),
        }
    }
}

impl PatientInput {
    /// Validate every field and build the immutable snapshot.
    pub fn validate(self) -> Result<PatientSnapshot, InputValidationError> {
        PatientSnapshot::try_from(self)
    }
}

// ---------------------------------------------------------------------------
// PatientSnapshot
// ---------------------------------------------------------------------------

/// Validated, immutable patient record. Only constructible through
/// [`PatientInput::validate`], so every value is inside its declared range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSnapshot {
    age: u32,
    weight_kg: f64,
    height_cm: f64,
    bmi: f64,
    hba1c: f64,
    target_hba1c: TargetHba1c,
    egfr: f64,
    albuminuria: AlbuminuriaCategory,
    diabetes_type: DiabetesType,
    comorbidities: Comorbidities,
    risk_flags: RiskFlags,
}

impl TryFrom<PatientInput> for PatientSnapshot {
    type Error = InputValidationError;

    fn try_from(input: PatientInput) -> Result<Self, Self::Error> {
        AGE_RANGE.check(f64::from(input.age))?;
        let weight_kg = WEIGHT_RANGE.check(input.weight_kg)?;
        let height_cm = HEIGHT_RANGE.check(input.height_cm)?;
        let hba1c = HBA1C_RANGE.check(input.hba1c)?;
        let target_hba1c = TargetHba1c::try_from(input.target_hba1c)?;
        let egfr = EGFR_RANGE.check(input.egfr)?;

        let height_m = height_cm / 100.0;
        let bmi = weight_kg / (height_m * height_m);

        Ok(Self {
            age: input.age,
            weight_kg,
            height_cm,
            bmi,
            hba1c,
            target_hba1c,
            egfr,
            albuminuria: input.albuminuria,
            diabetes_type: input.diabetes_type,
            comorbidities: input.comorbidities,
            risk_flags: input.risk_flags,
        })
    }
}

impl PatientSnapshot {
    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn hba1c(&self) -> f64 {
        self.hba1c
    }

    pub fn target_hba1c(&self) -> TargetHba1c {
        self.target_hba1c
    }

    pub fn egfr(&self) -> f64 {
        self.egfr
    }

    pub fn albuminuria(&self) -> AlbuminuriaCategory {
        self.albuminuria
    }

    pub fn diabetes_type(&self) -> DiabetesType {
        self.diabetes_type
    }

    pub fn comorbidities(&self) -> Comorbidities {
        self.comorbidities
    }

    pub fn risk_flags(&self) -> RiskFlags {
        self.risk_flags
    }

    /// HbA1c minus target. Positive means above goal.
    pub fn glycemic_gap(&self) -> f64 {
        self.hba1c - self.target_hba1c.value()
    }

    /// CKD flagged by the caller, or albuminuria at A2/A3.
    pub fn has_kidney_disease(&self) -> bool {
        self.comorbidities.ckd || self.albuminuria != AlbuminuriaCategory::A1
    }

    /// Any presentation that calls for insulin ahead of stepwise escalation.
    pub fn has_red_flag(&self) -> bool {
        let flags = &self.risk_flags;
        flags.suspected_type1
            || flags.ketosis
            || flags.catabolic
            || flags.acute_illness
            || self.diabetes_type == DiabetesType::Type1
    }
}
