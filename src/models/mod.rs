pub mod action;
pub mod enums;
pub mod request;
pub mod snapshot;
pub mod state;
pub mod validation;

pub use action::{Action, ActionCounts, ActionKind, Citation, Plan, PlanStatus, Rationale};
pub use enums::{
    AlbuminuriaCategory, CostTier, DiabetesType, DrugClass, EfficacyTier, OutcomeEffect, RuleId,
    Sglt2LowEgfrPolicy, StageKind, WeightEffect,
};
pub use request::EvaluationRequest;
pub use snapshot::{Comorbidities, PatientInput, PatientSnapshot, RiskFlags, TargetHba1c};
pub use state::MedicationState;
pub use validation::InputValidationError;
