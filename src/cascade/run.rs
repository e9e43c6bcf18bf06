use crate::knowledge::KnowledgeBase;
use crate::models::{Action, ActionKind, DrugClass, MedicationState, Rationale, StageKind};

use super::messages::{RuleNote, RuleTemplates};
use super::types::{CascadeError, StageOutcome};

/// Working buffer for one stage: the state it is mutating and the actions
/// it has emitted so far.
///
/// Every mutation goes through here so that the presence/absence invariant
/// is checked at emission time: a stop needs the class present, a start
/// needs it absent.
pub struct StageRun {
    stage: StageKind,
    state: MedicationState,
    actions: Vec<Action>,
}

impl StageRun {
    pub fn new(stage: StageKind, state: MedicationState) -> Self {
        Self {
            stage,
            state,
            actions: Vec::new(),
        }
    }

    pub fn state(&self) -> &MedicationState {
        &self.state
    }

    pub fn has(&self, class: DrugClass) -> bool {
        self.state.contains(class)
    }

    pub fn stop(&mut self, class: DrugClass, note: RuleNote) -> Result<(), CascadeError> {
        if !self.state.remove(class) {
            return Err(self.invariant(&note, class, "absent"));
        }
        self.push(ActionKind::Stop { class }, note);
        Ok(())
    }

    pub fn start(&mut self, class: DrugClass, note: RuleNote) -> Result<(), CascadeError> {
        if !self.state.insert(class) {
            return Err(self.invariant(&note, class, "already present"));
        }
        self.push(ActionKind::Start { class }, note);
        Ok(())
    }

    /// Start `class`, then stop every active class the knowledge base lists
    /// as conflicting with it.
    pub fn start_with_cascade(
        &mut self,
        class: DrugClass,
        note: RuleNote,
        knowledge: &KnowledgeBase,
    ) -> Result<(), CascadeError> {
        self.start(class, note)?;
        let displaced: Vec<DrugClass> = knowledge
            .capability_of(class)?
            .conflicts
            .iter()
            .copied()
            .filter(|c| self.state.contains(*c))
            .collect();
        for removed in displaced {
            self.stop(removed, RuleTemplates::conflict_stop(class, removed))?;
        }
        Ok(())
    }

    pub fn switch(
        &mut self,
        from: DrugClass,
        to: DrugClass,
        note: RuleNote,
    ) -> Result<(), CascadeError> {
        if !self.state.contains(from) {
            return Err(self.invariant(&note, from, "absent"));
        }
        if self.state.contains(to) {
            return Err(self.invariant(&note, to, "already present"));
        }
        self.state.remove(from);
        self.state.insert(to);
        self.push(ActionKind::Switch { from, to }, note);
        Ok(())
    }

    /// Advisory only; the state is untouched.
    pub fn alert(&mut self, subject: Option<DrugClass>, note: RuleNote) {
        self.push(ActionKind::Alert { subject }, note);
    }

    pub fn finish(self) -> StageOutcome {
        StageOutcome {
            actions: self.actions,
            state: self.state,
        }
    }

    fn push(&mut self, kind: ActionKind, note: RuleNote) {
        tracing::trace!(stage = %self.stage, rule = %note.rule, kind = kind.as_str(), "Action emitted");
        self.actions.push(Action {
            kind,
            stage: self.stage,
            message: note.message,
            rationale: Rationale {
                rule: note.rule,
                reason: note.reason,
            },
            citation: note.citation,
        });
    }

    fn invariant(&self, note: &RuleNote, class: DrugClass, found: &'static str) -> CascadeError {
        CascadeError::ActionInvariant {
            stage: self.stage,
            rule: note.rule,
            class,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleId;

    fn state(classes: &[DrugClass]) -> MedicationState {
        MedicationState::from(classes)
    }

    #[test]
    fn stop_of_absent_class_is_rejected() {
        let mut run = StageRun::new(StageKind::Safety, state(&[]));
        let err = run
            .stop(DrugClass::Metformin, RuleTemplates::metformin_contraindicated(25.0, 30.0))
            .unwrap_err();
        assert!(matches!(
            err,
            CascadeError::ActionInvariant {
                class: DrugClass::Metformin,
                found: "absent",
                ..
            }
        ));
        assert!(run.finish().actions.is_empty());
    }

    #[test]
    fn start_of_present_class_is_rejected() {
        let mut run = StageRun::new(StageKind::Glycemic, state(&[DrugClass::Metformin]));
        assert!(run
            .start(DrugClass::Metformin, RuleTemplates::metformin_first_line())
            .is_err());
    }

    #[test]
    fn cascade_removes_conflicting_classes_after_start() {
        let kb = KnowledgeBase::builtin().unwrap();
        let mut run = StageRun::new(
            StageKind::Glycemic,
            state(&[DrugClass::Metformin, DrugClass::Sulfonylurea]),
        );
        run.start_with_cascade(DrugClass::BasalInsulin, RuleTemplates::basal_add_on(), &kb)
            .unwrap();
        let outcome = run.finish();

        assert_eq!(outcome.actions.len(), 2);
        assert!(outcome.actions[0].is_start_of(DrugClass::BasalInsulin));
        assert!(outcome.actions[1].is_stop_of(DrugClass::Sulfonylurea));
        assert_eq!(outcome.actions[1].rule(), RuleId::InsulinSulfonylureaConflict);
        assert_eq!(
            outcome.state.to_vec(),
            vec![DrugClass::Metformin, DrugClass::BasalInsulin]
        );
    }

    #[test]
    fn switch_moves_membership() {
        let mut run = StageRun::new(StageKind::Glycemic, state(&[DrugClass::Dpp4Inhibitor]));
        run.switch(
            DrugClass::Dpp4Inhibitor,
            DrugClass::Glp1ReceptorAgonist,
            RuleTemplates::dpp4_upgrade(1.0),
        )
        .unwrap();
        let outcome = run.finish();
        assert_eq!(outcome.state.to_vec(), vec![DrugClass::Glp1ReceptorAgonist]);
        assert_eq!(outcome.actions[0].stage, StageKind::Glycemic);
    }

    #[test]
    fn alert_leaves_state_untouched() {
        let mut run = StageRun::new(StageKind::Safety, state(&[DrugClass::Sglt2Inhibitor]));
        run.alert(
            Some(DrugClass::Sglt2Inhibitor),
            RuleTemplates::sglt2_acute_risk_pause(),
        );
        let outcome = run.finish();
        assert_eq!(outcome.state.to_vec(), vec![DrugClass::Sglt2Inhibitor]);
        assert!(outcome.actions[0].is_alert_for(DrugClass::Sglt2Inhibitor));
    }
}
