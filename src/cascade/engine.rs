use std::sync::Arc;
use std::time::Instant;

use crate::knowledge::KnowledgeBase;
use crate::models::{
    DrugClass, EvaluationRequest, MedicationState, PatientSnapshot, Plan, StageKind,
};

use super::policy::PolicyProfile;
use super::stages::default_stages;
use super::types::{CascadeError, Stage, StageContext};

/// Runs the stage cascade over one patient and regimen.
///
/// The engine owns nothing mutable: the knowledge base and policy are shared
/// read-only and every call threads its own `MedicationState` through the
/// stages, so one engine can serve many threads at once.
pub struct CascadeEngine {
    knowledge: Arc<KnowledgeBase>,
    policy: Arc<PolicyProfile>,
    stages: Vec<Box<dyn Stage>>,
}

impl CascadeEngine {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        policy: Arc<PolicyProfile>,
    ) -> Result<Self, CascadeError> {
        policy.validate()?;
        Ok(Self {
            knowledge,
            policy,
            stages: default_stages(),
        })
    }

    /// Built-in knowledge base under the canonical profile.
    pub fn with_builtin() -> Result<Self, CascadeError> {
        Self::new(
            Arc::new(KnowledgeBase::builtin()?),
            Arc::new(PolicyProfile::canonical()),
        )
    }

    pub fn policy(&self) -> &PolicyProfile {
        &self.policy
    }

    pub fn stage_order(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    /// Single pass over the stages. Later stages see earlier mutations,
    /// never the reverse; the pass is not repeated to a fixpoint.
    pub fn evaluate(
        &self,
        snapshot: &PatientSnapshot,
        regimen: &[DrugClass],
    ) -> Result<Plan, CascadeError> {
        let start = Instant::now();
        let ctx = StageContext {
            snapshot,
            knowledge: &self.knowledge,
            policy: &self.policy,
        };

        let mut state: MedicationState = regimen.iter().copied().collect();
        let mut actions = Vec::new();
        for stage in &self.stages {
            let outcome = stage.evaluate(&ctx, state)?;
            tracing::debug!(
                stage = %stage.kind(),
                emitted = outcome.actions.len(),
                active = outcome.state.len(),
                "Stage complete"
            );
            actions.extend(outcome.actions);
            state = outcome.state;
        }

        let at_target = snapshot.hba1c() <= snapshot.target_hba1c().value();
        let plan = Plan::new(self.policy.name.clone(), actions, state, at_target);
        let counts = plan.counts();

        tracing::info!(
            profile = %plan.profile,
            status = ?plan.status,
            stops = counts.stops,
            starts = counts.starts,
            switches = counts.switches,
            alerts = counts.alerts,
            processing_us = start.elapsed().as_micros() as u64,
            "Cascade evaluation complete"
        );

        Ok(plan)
    }

    /// Validate a transport request, then evaluate it.
    pub fn evaluate_request(&self, request: EvaluationRequest) -> Result<Plan, CascadeError> {
        let (snapshot, regimen) = request.into_parts()?;
        self.evaluate(&snapshot, &regimen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::models::{InputValidationError, PatientInput, PlanStatus, RuleId};

    fn engine() -> CascadeEngine {
        CascadeEngine::with_builtin().unwrap()
    }

    #[test]
    fn runs_stages_in_order() {
        assert_eq!(
            engine().stage_order(),
            vec![
                StageKind::Safety,
                StageKind::RedFlag,
                StageKind::OrganProtection,
                StageKind::Glycemic,
                StageKind::DeEscalation,
            ]
        );
    }

    #[test]
    fn controlled_patient_gets_empty_plan() {
        let snapshot = PatientInput {
            hba1c: 6.8,
            egfr: 80.0,
            ..Default::default()
        }
        .validate()
        .unwrap();
        let plan = engine()
            .evaluate(&snapshot, &[DrugClass::Metformin])
            .unwrap();
        assert!(plan.actions.is_empty());
        assert_eq!(plan.status, PlanStatus::Controlled);
        assert_eq!(plan.final_state.to_vec(), vec![DrugClass::Metformin]);
        assert_eq!(plan.profile, "ada-easd-2022");
    }

    #[test]
    fn later_stages_see_earlier_removals() {
        // Safety stops metformin; glycemic must not restart it.
        let snapshot = PatientInput {
            egfr: 25.0,
            ..Default::default()
        }
        .validate()
        .unwrap();
        let plan = engine()
            .evaluate(&snapshot, &[DrugClass::Metformin])
            .unwrap();

        assert_eq!(plan.actions[0].stage, StageKind::Safety);
        assert!(plan.actions[0].is_stop_of(DrugClass::Metformin));
        assert!(!plan.started_classes().contains(&DrugClass::Metformin));
        assert_eq!(plan.status, PlanStatus::RegimenChanged);
    }

    #[test]
    fn actions_are_grouped_by_stage_order() {
        let snapshot = PatientInput {
            egfr: 35.0,
            hba1c: 11.0,
            comorbidities: crate::models::Comorbidities {
                hf: true,
                ..Default::default()
            },
            ..Default::default()
        }
        .validate()
        .unwrap();
        let plan = engine()
            .evaluate(&snapshot, &[DrugClass::Metformin, DrugClass::Thiazolidinedione])
            .unwrap();

        let stages: Vec<StageKind> = plan.actions.iter().map(|a| a.stage).collect();
        let mut sorted = stages.clone();
        sorted.sort();
        assert_eq!(stages, sorted);
        assert!(plan.actions.iter().any(|a| a.rule() == RuleId::TzdHeartFailure));
        assert!(plan.actions.iter().any(|a| a.rule() == RuleId::HeartFailureSglt2));
    }

    #[test]
    fn request_validation_errors_surface() {
        let request = EvaluationRequest {
            patient: PatientInput {
                target_hba1c: 6.0,
                ..Default::default()
            },
            regimen: vec![],
        };
        let err = engine().evaluate_request(request).unwrap_err();
        assert!(matches!(
            err,
            CascadeError::InvalidInput(InputValidationError::UnsupportedTarget(_))
        ));
    }

    #[test]
    fn builtin_engine_runs_the_canonical_profile() {
        assert_eq!(engine().policy().name, crate::cascade::CANONICAL_PROFILE);
    }

    #[test]
    fn invalid_policy_rejected_at_construction() {
        let policy = PolicyProfile {
            name: String::new(),
            ..PolicyProfile::canonical()
        };
        let result = CascadeEngine::new(
            Arc::new(KnowledgeBase::builtin().unwrap()),
            Arc::new(policy),
        );
        assert!(matches!(
            result,
            Err(CascadeError::Config(ConfigError::InvalidPolicy { field: "name", .. }))
        ));
    }

    #[test]
    fn concurrent_evaluations_match_sequential() {
        let engine = &engine();
        let cases: Vec<(PatientSnapshot, Vec<DrugClass>)> = (0..8u32)
            .map(|i| {
                let snapshot = PatientInput {
                    egfr: 15.0 + 15.0 * f64::from(i),
                    hba1c: 6.0 + 0.7 * f64::from(i),
                    ..Default::default()
                }
                .validate()
                .unwrap();
                let regimen = DrugClass::ALL[..(i as usize + 1)].to_vec();
                (snapshot, regimen)
            })
            .collect();

        let sequential: Vec<Plan> = cases
            .iter()
            .map(|(s, r)| engine.evaluate(s, r).unwrap())
            .collect();

        let concurrent: Vec<Plan> = std::thread::scope(|scope| {
            let handles: Vec<_> = cases
                .iter()
                .map(|(s, r)| scope.spawn(move || engine.evaluate(s, r).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sequential, concurrent);
    }
}
