use crate::cascade::messages::RuleTemplates;
use crate::cascade::run::StageRun;
use crate::cascade::types::{CascadeError, Stage, StageContext, StageOutcome};
use crate::models::{DrugClass, MedicationState, StageKind};

/// Puts insulin in place ahead of stepwise escalation when the presentation
/// suggests insulin deficiency.
pub struct RedFlagStage;

impl Stage for RedFlagStage {
    fn kind(&self) -> StageKind {
        StageKind::RedFlag
    }

    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        state: MedicationState,
    ) -> Result<StageOutcome, CascadeError> {
        let snapshot = ctx.snapshot;
        let mut run = StageRun::new(self.kind(), state);
        if !snapshot.has_red_flag() {
            return Ok(run.finish());
        }

        if !run.has(DrugClass::BasalInsulin) {
            run.start(DrugClass::BasalInsulin, RuleTemplates::red_flag_basal())?;
        }
        if run.has(DrugClass::Sulfonylurea) {
            run.stop(DrugClass::Sulfonylurea, RuleTemplates::red_flag_sulfonylurea())?;
        }

        let threshold = ctx.policy.very_high_hba1c;
        if snapshot.hba1c() >= threshold && !run.has(DrugClass::PrandialInsulin) {
            run.alert(
                Some(DrugClass::PrandialInsulin),
                RuleTemplates::rapid_intensification(snapshot.hba1c(), threshold),
            );
        }

        Ok(run.finish())
    }
}
