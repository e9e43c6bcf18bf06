use thiserror::Error;

/// Rejection of a caller-supplied value. Evaluation is aborted and no
/// partial plan is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputValidationError {
    #[error("{field} = {value} is outside the accepted range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Target HbA1c {0} is not one of 6.5, 7.0, 7.5, 8.0")]
    UnsupportedTarget(f64),

    #[error("Unknown {field} value: {value}")]
    UnknownValue { field: &'static str, value: String },
}

/// Inclusive range bound for a numeric snapshot field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub const fn new(field: &'static str, min: f64, max: f64) -> Self {
        Self { field, min, max }
    }

    /// NaN never satisfies the range.
    pub fn check(&self, value: f64) -> Result<f64, InputValidationError> {
        if (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(InputValidationError::OutOfRange {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

pub const AGE_RANGE: FieldRange = FieldRange::new("age", 18.0, 100.0);
pub const WEIGHT_RANGE: FieldRange = FieldRange::new("weight_kg", 40.0, 250.0);
pub const HEIGHT_RANGE: FieldRange = FieldRange::new("height_cm", 100.0, 240.0);
pub const HBA1C_RANGE: FieldRange = FieldRange::new("hba1c", 4.0, 18.0);
pub const EGFR_RANGE: FieldRange = FieldRange::new("egfr", 5.0, 140.0);
