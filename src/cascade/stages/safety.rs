use crate::cascade::messages::RuleTemplates;
use crate::cascade::run::StageRun;
use crate::cascade::types::{CascadeError, Stage, StageContext, StageOutcome};
use crate::models::{DrugClass, MedicationState, Sglt2LowEgfrPolicy, StageKind};

/// Removes or flags classes the current snapshot makes unsafe.
///
/// Runs first so that no later stage builds on a contraindicated regimen.
pub struct SafetyStage;

impl Stage for SafetyStage {
    fn kind(&self) -> StageKind {
        StageKind::Safety
    }

    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        state: MedicationState,
    ) -> Result<StageOutcome, CascadeError> {
        let snapshot = ctx.snapshot;
        let egfr = snapshot.egfr();
        let mut run = StageRun::new(self.kind(), state);

        if run.has(DrugClass::Metformin) {
            let metformin = ctx.capability(DrugClass::Metformin)?;
            if let Some(threshold) = metformin.contraindication_below_egfr.filter(|t| egfr < *t) {
                run.stop(
                    DrugClass::Metformin,
                    RuleTemplates::metformin_contraindicated(egfr, threshold),
                )?;
            } else if let Some(threshold) = metformin.caution_below_egfr.filter(|t| egfr < *t) {
                run.alert(
                    Some(DrugClass::Metformin),
                    RuleTemplates::metformin_dose_reduction(egfr, threshold),
                );
            }
        }

        if run.has(DrugClass::Sglt2Inhibitor) {
            let sglt2 = ctx.capability(DrugClass::Sglt2Inhibitor)?;
            if let Some(floor) = sglt2.initiation_floor_egfr.filter(|f| egfr < *f) {
                match ctx.policy.sglt2_low_egfr {
                    Sglt2LowEgfrPolicy::ContinueWithAlert => run.alert(
                        Some(DrugClass::Sglt2Inhibitor),
                        RuleTemplates::sglt2_below_floor_continue(egfr, floor),
                    ),
                    Sglt2LowEgfrPolicy::Discontinue => run.stop(
                        DrugClass::Sglt2Inhibitor,
                        RuleTemplates::sglt2_below_floor_stop(egfr, floor),
                    )?,
                }
            }
        }

        if snapshot.comorbidities().hf && run.has(DrugClass::Thiazolidinedione) {
            run.stop(DrugClass::Thiazolidinedione, RuleTemplates::tzd_heart_failure())?;
        }

        if run.has(DrugClass::Dpp4Inhibitor) {
            let agonist = [DrugClass::Glp1ReceptorAgonist, DrugClass::DualGipGlp1Agonist]
                .into_iter()
                .find(|c| run.has(*c));
            if let Some(agonist) = agonist {
                run.stop(
                    DrugClass::Dpp4Inhibitor,
                    RuleTemplates::redundant_incretin(agonist),
                )?;
            }
        }

        if run.has(DrugClass::Sglt2Inhibitor) && snapshot.risk_flags().acute_risk() {
            run.alert(
                Some(DrugClass::Sglt2Inhibitor),
                RuleTemplates::sglt2_acute_risk_pause(),
            );
        }

        Ok(run.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::policy::PolicyProfile;
    use crate::cascade::stages::test_support::{run_canonical, run_stage, snapshot};
    use crate::models::{ActionKind, RuleId};

    #[test]
    fn metformin_stopped_below_contraindication() {
        let s = snapshot(|p| p.egfr = 25.0);
        let outcome = run_canonical(&SafetyStage, &s, &[DrugClass::Metformin]);

        assert_eq!(outcome.actions.len(), 1);
        assert!(outcome.actions[0].is_stop_of(DrugClass::Metformin));
        assert_eq!(outcome.actions[0].rule(), RuleId::MetforminContraindicated);
        assert!(outcome.state.is_empty());
    }

    #[test]
    fn metformin_dose_alert_in_caution_band() {
        let s = snapshot(|p| p.egfr = 35.0);
        let outcome = run_canonical(&SafetyStage, &s, &[DrugClass::Metformin]);

        assert_eq!(outcome.actions.len(), 1);
        assert!(outcome.actions[0].is_alert_for(DrugClass::Metformin));
        assert!(outcome.state.contains(DrugClass::Metformin));
    }

    #[test]
    fn metformin_untouched_at_caution_threshold() {
        let s = snapshot(|p| p.egfr = 45.0);
        let outcome = run_canonical(&SafetyStage, &s, &[DrugClass::Metformin]);
        assert!(outcome.actions.is_empty());
    }

    #[test]
    fn low_egfr_sglt2_follows_policy() {
        let s = snapshot(|p| p.egfr = 15.0);
        let regimen = [DrugClass::Sglt2Inhibitor];

        let kept = run_canonical(&SafetyStage, &s, &regimen);
        assert!(kept.actions[0].is_alert_for(DrugClass::Sglt2Inhibitor));
        assert!(kept.state.contains(DrugClass::Sglt2Inhibitor));

        let stopped = run_stage(&SafetyStage, &s, &regimen, &PolicyProfile::conservative());
        assert!(stopped.actions[0].is_stop_of(DrugClass::Sglt2Inhibitor));
        assert!(stopped.state.is_empty());
    }

    #[test]
    fn tzd_stopped_only_with_heart_failure() {
        let regimen = [DrugClass::Thiazolidinedione];

        let plain = run_canonical(&SafetyStage, &snapshot(|_| {}), &regimen);
        assert!(plain.actions.is_empty());

        let hf = snapshot(|p| p.comorbidities.hf = true);
        let outcome = run_canonical(&SafetyStage, &hf, &regimen);
        assert_eq!(outcome.actions[0].rule(), RuleId::TzdHeartFailure);
        assert!(outcome.state.is_empty());
    }

    #[test]
    fn dpp4_removed_next_to_either_agonist() {
        for agonist in [DrugClass::Glp1ReceptorAgonist, DrugClass::DualGipGlp1Agonist] {
            let outcome = run_canonical(
                &SafetyStage,
                &snapshot(|_| {}),
                &[DrugClass::Dpp4Inhibitor, agonist],
            );
            assert_eq!(outcome.actions.len(), 1);
            assert_eq!(outcome.actions[0].rule(), RuleId::RedundantIncretin);
            assert_eq!(outcome.state.to_vec(), vec![agonist]);
        }
    }

    #[test]
    fn acute_illness_pauses_sglt2_without_removal() {
        let s = snapshot(|p| {
            p.egfr = 60.0;
            p.risk_flags.acute_illness = true;
        });
        let outcome = run_canonical(&SafetyStage, &s, &[DrugClass::Sglt2Inhibitor]);

        assert_eq!(outcome.actions.len(), 1);
        assert_eq!(
            outcome.actions[0].kind,
            ActionKind::Alert {
                subject: Some(DrugClass::Sglt2Inhibitor)
            }
        );
        assert_eq!(outcome.actions[0].rule(), RuleId::Sglt2AcuteRiskPause);
        assert!(outcome.state.contains(DrugClass::Sglt2Inhibitor));
    }

    #[test]
    fn stopped_sglt2_gets_no_pause_alert() {
        let s = snapshot(|p| {
            p.egfr = 15.0;
            p.risk_flags.ketosis = true;
        });
        let outcome = run_stage(
            &SafetyStage,
            &s,
            &[DrugClass::Sglt2Inhibitor],
            &PolicyProfile::conservative(),
        );
        assert_eq!(outcome.actions.len(), 1);
        assert!(outcome.actions[0].is_stop_of(DrugClass::Sglt2Inhibitor));
    }
}
