use crate::cascade::messages::RuleTemplates;
use crate::cascade::run::StageRun;
use crate::cascade::types::{CascadeError, Stage, StageContext, StageOutcome};
use crate::models::{DrugClass, MedicationState, StageKind};

/// Adds agents with proven heart, kidney or cardiovascular benefit,
/// regardless of whether the patient is at glycemic target.
pub struct OrganProtectionStage;

impl OrganProtectionStage {
    fn heart_and_kidney(
        ctx: &StageContext<'_>,
        run: &mut StageRun,
    ) -> Result<(), CascadeError> {
        if run.has(DrugClass::Sglt2Inhibitor) {
            return Ok(());
        }
        let snapshot = ctx.snapshot;
        let eligible = ctx.sglt2_eligible()?;
        let kidney = snapshot.has_kidney_disease();

        if snapshot.comorbidities().hf && eligible {
            run.start(DrugClass::Sglt2Inhibitor, RuleTemplates::heart_failure_sglt2())?;
        } else if kidney && eligible {
            run.start(DrugClass::Sglt2Inhibitor, RuleTemplates::kidney_sglt2())?;
        } else if kidney && !run.state().has_incretin_agonist() {
            let sglt2 = ctx.capability(DrugClass::Sglt2Inhibitor)?;
            if let Some(floor) = sglt2
                .initiation_floor_egfr
                .filter(|f| snapshot.egfr() < *f)
            {
                run.start_with_cascade(
                    DrugClass::Glp1ReceptorAgonist,
                    RuleTemplates::kidney_glp1_fallback(snapshot.egfr(), floor),
                    ctx.knowledge,
                )?;
            }
        }
        Ok(())
    }

    fn atherosclerotic(ctx: &StageContext<'_>, run: &mut StageRun) -> Result<(), CascadeError> {
        let snapshot = ctx.snapshot;
        if !snapshot.comorbidities().ascvd {
            return Ok(());
        }
        let protected = run.state().contains_any(&[
            DrugClass::Sglt2Inhibitor,
            DrugClass::Glp1ReceptorAgonist,
            DrugClass::DualGipGlp1Agonist,
        ]);
        if protected {
            return Ok(());
        }

        let cutoff = ctx.policy.ascvd_bmi_cutoff;
        let chosen = if snapshot.bmi() <= cutoff && ctx.sglt2_eligible()? {
            DrugClass::Sglt2Inhibitor
        } else {
            DrugClass::Glp1ReceptorAgonist
        };
        run.start_with_cascade(
            chosen,
            RuleTemplates::ascvd_protection(chosen, snapshot.bmi(), cutoff),
            ctx.knowledge,
        )
    }
}

impl Stage for OrganProtectionStage {
    fn kind(&self) -> StageKind {
        StageKind::OrganProtection
    }

    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        state: MedicationState,
    ) -> Result<StageOutcome, CascadeError> {
        let mut run = StageRun::new(self.kind(), state);
        Self::heart_and_kidney(ctx, &mut run)?;
        Self::atherosclerotic(ctx, &mut run)?;
        Ok(run.finish())
    }
}
