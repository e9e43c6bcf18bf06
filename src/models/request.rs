use serde::{Deserialize, Serialize};

use super::enums::DrugClass;
use super::snapshot::{PatientInput, PatientSnapshot};
use super::validation::InputValidationError;

/// Transport-level request: raw patient fields plus the current regimen by
/// name. Regimen names are parsed case-insensitively and accept the short
/// codes (`SGLT2i`, `GLP1_RA`, `SU`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub patient: PatientInput,
    #[serde(default)]
    pub regimen: Vec<String>,
}

impl EvaluationRequest {
    /// Validate the patient and resolve every regimen name. The first bad
    /// field or unknown name aborts the whole request.
    pub fn into_parts(self) -> Result<(PatientSnapshot, Vec<DrugClass>), InputValidationError> {
        let snapshot = self.patient.validate()?;
        let regimen = self
            .regimen
            .iter()
            .map(|name| name.parse::<DrugClass>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok((snapshot, regimen))
    }
}
