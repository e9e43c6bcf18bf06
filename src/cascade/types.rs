use thiserror::Error;

use crate::config::ConfigError;
use crate::knowledge::{DrugCapability, KnowledgeBase};
use crate::models::{
    Action, DrugClass, InputValidationError, MedicationState, PatientSnapshot, RuleId, StageKind,
};

use super::policy::PolicyProfile;

// ---------------------------------------------------------------------------
// CascadeError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputValidationError),

    /// A rule tried to stop an absent class or start a present one.
    #[error("Stage {stage}, rule {rule}: {class} is {found} in the simulated regimen")]
    ActionInvariant {
        stage: StageKind,
        rule: RuleId,
        class: DrugClass,
        found: &'static str,
    },
}

// ---------------------------------------------------------------------------
// StageContext
// ---------------------------------------------------------------------------

/// Read-only inputs shared by every stage of one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub snapshot: &'a PatientSnapshot,
    pub knowledge: &'a KnowledgeBase,
    pub policy: &'a PolicyProfile,
}

impl<'a> StageContext<'a> {
    pub fn capability(&self, class: DrugClass) -> Result<&'a DrugCapability, ConfigError> {
        self.knowledge.capability_of(class)
    }

    /// SGLT2i may be newly started: eGFR at or above its initiation floor and
    /// no ketosis or acute illness.
    pub fn sglt2_eligible(&self) -> Result<bool, ConfigError> {
        let sglt2 = self.capability(DrugClass::Sglt2Inhibitor)?;
        Ok(sglt2.can_initiate_at(self.snapshot.egfr()) && !self.snapshot.risk_flags().acute_risk())
    }
}

// ---------------------------------------------------------------------------
// Stage trait
// ---------------------------------------------------------------------------

/// What a stage hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    pub actions: Vec<Action>,
    pub state: MedicationState,
}

/// One step of the rule cascade.
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    /// Consume the current state, return the emitted actions and the new state.
    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        state: MedicationState,
    ) -> Result<StageOutcome, CascadeError>;
}
