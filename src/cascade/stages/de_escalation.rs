use crate::cascade::messages::RuleTemplates;
use crate::cascade::run::StageRun;
use crate::cascade::types::{CascadeError, Stage, StageContext, StageOutcome};
use crate::models::{DrugClass, MedicationState, StageKind};

/// Flags overtreatment. Advisory only: nothing is removed here.
pub struct DeEscalationStage;

impl Stage for DeEscalationStage {
    fn kind(&self) -> StageKind {
        StageKind::DeEscalation
    }

    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        state: MedicationState,
    ) -> Result<StageOutcome, CascadeError> {
        let hba1c = ctx.snapshot.hba1c();
        let policy = ctx.policy;
        let mut run = StageRun::new(self.kind(), state);

        if hba1c < policy.sulfonylurea_taper_hba1c {
            if run.has(DrugClass::Sulfonylurea) {
                run.alert(
                    Some(DrugClass::Sulfonylurea),
                    RuleTemplates::sulfonylurea_taper(hba1c),
                );
            }
            if hba1c <= policy.basal_reduction_hba1c && run.has(DrugClass::BasalInsulin) {
                run.alert(
                    Some(DrugClass::BasalInsulin),
                    RuleTemplates::basal_dose_reduction(hba1c),
                );
            }
        }

        Ok(run.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::stages::test_support::{run_canonical, snapshot};
    use crate::models::RuleId;

    const SU_AND_BASAL: [DrugClass; 2] = [DrugClass::Sulfonylurea, DrugClass::BasalInsulin];

    #[test]
    fn low_hba1c_flags_both_hypoglycemic_agents() {
        let s = snapshot(|p| p.hba1c = 6.0);
        let outcome = run_canonical(&DeEscalationStage, &s, &SU_AND_BASAL);

        assert_eq!(outcome.actions.len(), 2);
        assert!(outcome.actions[0].is_alert_for(DrugClass::Sulfonylurea));
        assert!(outcome.actions[1].is_alert_for(DrugClass::BasalInsulin));
        assert_eq!(outcome.actions[1].rule(), RuleId::BasalDoseReduction);
        assert_eq!(outcome.state.to_vec(), SU_AND_BASAL.to_vec());
    }

    #[test]
    fn taper_band_only_flags_sulfonylurea() {
        let s = snapshot(|p| p.hba1c = 6.3);
        let outcome = run_canonical(&DeEscalationStage, &s, &SU_AND_BASAL);
        assert_eq!(outcome.actions.len(), 1);
        assert_eq!(outcome.actions[0].rule(), RuleId::SulfonylureaTaper);
    }

    #[test]
    fn at_taper_threshold_nothing_fires() {
        let s = snapshot(|p| p.hba1c = 6.5);
        assert!(run_canonical(&DeEscalationStage, &s, &SU_AND_BASAL)
            .actions
            .is_empty());
    }
}
