use crate::cascade::messages::RuleTemplates;
use crate::cascade::run::StageRun;
use crate::cascade::types::{CascadeError, Stage, StageContext, StageOutcome};
use crate::models::{DrugClass, MedicationState, StageKind};

/// Stepwise escalation toward the HbA1c target.
///
/// Runs only above target. At most one next agent is chosen per evaluation
/// (first matching step wins); informational alerts are raised alongside it.
/// When every step is already in place a referral alert is raised instead,
/// so a patient above target always gets at least one action.
pub struct GlycemicStage;

impl GlycemicStage {
    fn advisories(ctx: &StageContext<'_>, run: &mut StageRun, gap: f64) {
        let snapshot = ctx.snapshot;
        let policy = ctx.policy;

        if snapshot.age() < policy.early_combination_age && run.state().len() < 2 {
            run.alert(None, RuleTemplates::early_combination(snapshot.age()));
        }
        if snapshot.risk_flags().newly_diagnosed && gap >= policy.initial_combination_gap {
            run.alert(None, RuleTemplates::initial_combination(gap));
        }
    }

    fn next_agent(
        ctx: &StageContext<'_>,
        run: &mut StageRun,
        gap: f64,
    ) -> Result<(), CascadeError> {
        let snapshot = ctx.snapshot;
        let policy = ctx.policy;
        let knowledge = ctx.knowledge;

        let metformin = ctx.capability(DrugClass::Metformin)?;
        if !run.has(DrugClass::Metformin) && metformin.can_initiate_at(snapshot.egfr()) {
            return run.start(DrugClass::Metformin, RuleTemplates::metformin_first_line());
        }

        let weight_effective = run.state().contains_any(&[
            DrugClass::Glp1ReceptorAgonist,
            DrugClass::DualGipGlp1Agonist,
            DrugClass::Sglt2Inhibitor,
        ]);
        if snapshot.bmi() >= policy.weight_priority_bmi && !weight_effective {
            return run.start_with_cascade(
                DrugClass::DualGipGlp1Agonist,
                RuleTemplates::weight_priority(snapshot.bmi()),
                knowledge,
            );
        }

        if run.has(DrugClass::Dpp4Inhibitor) && gap > policy.dpp4_switch_gap {
            let agonist = run.state().iter().find(DrugClass::is_incretin_agonist);
            return match agonist {
                Some(agonist) => run.stop(
                    DrugClass::Dpp4Inhibitor,
                    RuleTemplates::dpp4_upgrade_stop(gap, agonist),
                ),
                None => run.switch(
                    DrugClass::Dpp4Inhibitor,
                    DrugClass::Glp1ReceptorAgonist,
                    RuleTemplates::dpp4_upgrade(gap),
                ),
            };
        }

        let has_agonist = run.state().has_incretin_agonist();
        let has_basal = run.has(DrugClass::BasalInsulin);

        if !has_agonist && !has_basal {
            return if snapshot.hba1c() < policy.very_high_hba1c {
                run.start_with_cascade(
                    DrugClass::Glp1ReceptorAgonist,
                    RuleTemplates::glp1_before_insulin(),
                    knowledge,
                )
            } else {
                run.start_with_cascade(
                    DrugClass::BasalInsulin,
                    RuleTemplates::insulin_first(snapshot.hba1c()),
                    knowledge,
                )
            };
        }

        if has_agonist && !has_basal {
            return run.start_with_cascade(
                DrugClass::BasalInsulin,
                RuleTemplates::basal_add_on(),
                knowledge,
            );
        }

        if has_basal && !run.has(DrugClass::PrandialInsulin) {
            return run.start_with_cascade(
                DrugClass::PrandialInsulin,
                RuleTemplates::prandial_add_on(),
                knowledge,
            );
        }

        run.alert(None, RuleTemplates::regimen_exhausted());
        Ok(())
    }
}

impl Stage for GlycemicStage {
    fn kind(&self) -> StageKind {
        StageKind::Glycemic
    }

    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        state: MedicationState,
    ) -> Result<StageOutcome, CascadeError> {
        let mut run = StageRun::new(self.kind(), state);
        let gap = ctx.snapshot.glycemic_gap();
        if gap <= 0.0 {
            return Ok(run.finish());
        }

        Self::advisories(ctx, &mut run, gap);
        Self::next_agent(ctx, &mut run, gap)?;
        Ok(run.finish())
    }
}
