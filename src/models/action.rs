use serde::{Deserialize, Serialize};

use super::enums::{DrugClass, RuleId, StageKind};
use super::state::MedicationState;

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// What the action asks the prescriber to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    Stop { class: DrugClass },
    Start { class: DrugClass },
    Switch { from: DrugClass, to: DrugClass },
    /// Advisory. Never changes the regimen.
    Alert { subject: Option<DrugClass> },
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop { .. } => "stop",
            Self::Start { .. } => "start",
            Self::Switch { .. } => "switch",
            Self::Alert { .. } => "alert",
        }
    }

    /// Classes the action refers to. For a switch: `[from, to]`.
    pub fn subject_classes(&self) -> Vec<DrugClass> {
        match *self {
            Self::Stop { class } | Self::Start { class } => vec![class],
            Self::Switch { from, to } => vec![from, to],
            Self::Alert { subject } => subject.into_iter().collect(),
        }
    }

    pub fn changes_regimen(&self) -> bool {
        !matches!(self, Self::Alert { .. })
    }
}

// ---------------------------------------------------------------------------
// Rationale & Citation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rationale {
    /// Rule that fired.
    pub rule: RuleId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub section: String,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,
    pub stage: StageKind,
    pub message: String,
    pub rationale: Rationale,
    pub citation: Citation,
}

impl Action {
    pub fn rule(&self) -> RuleId {
        self.rationale.rule
    }

    pub fn is_stop_of(&self, class: DrugClass) -> bool {
        matches!(self.kind, ActionKind::Stop { class: c } if c == class)
    }

    pub fn is_start_of(&self, class: DrugClass) -> bool {
        matches!(self.kind, ActionKind::Start { class: c } if c == class)
    }

    /// Alert about `class`.
    pub fn is_alert_for(&self, class: DrugClass) -> bool {
        matches!(self.kind, ActionKind::Alert { subject: Some(c) } if c == class)
    }

    /// Classes this action takes out of the regimen.
    pub fn removed_class(&self) -> Option<DrugClass> {
        match self.kind {
            ActionKind::Stop { class } => Some(class),
            ActionKind::Switch { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Class this action adds to the regimen.
    pub fn added_class(&self) -> Option<DrugClass> {
        match self.kind {
            ActionKind::Start { class } => Some(class),
            ActionKind::Switch { to, .. } => Some(to),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ActionCounts & PlanStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub stops: usize,
    pub starts: usize,
    pub switches: usize,
    pub alerts: usize,
}

impl ActionCounts {
    pub fn total(&self) -> usize {
        self.stops + self.starts + self.switches + self.alerts
    }
}

/// Overall verdict, for callers that only need a headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// No actions and HbA1c at or below target: continue monitoring.
    Controlled,
    /// Only alerts were raised; the regimen is unchanged.
    AdvisoryOnly,
    /// At least one stop, start or switch.
    RegimenChanged,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Result of one evaluation. Actions are in stage order, then emission order
/// within a stage, and are never re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Name of the policy profile the cascade ran under.
    pub profile: String,
    pub status: PlanStatus,
    pub actions: Vec<Action>,
    pub final_state: MedicationState,
}

impl Plan {
    pub fn new(
        profile: String,
        actions: Vec<Action>,
        final_state: MedicationState,
        at_target: bool,
    ) -> Self {
        let status = if actions.is_empty() && at_target {
            PlanStatus::Controlled
        } else if actions.iter().any(|a| a.kind.changes_regimen()) {
            PlanStatus::RegimenChanged
        } else {
            PlanStatus::AdvisoryOnly
        };
        Self {
            profile,
            status,
            actions,
            final_state,
        }
    }

    pub fn counts(&self) -> ActionCounts {
        let mut counts = ActionCounts::default();
        for action in &self.actions {
            match action.kind {
                ActionKind::Stop { .. } => counts.stops += 1,
                ActionKind::Start { .. } => counts.starts += 1,
                ActionKind::Switch { .. } => counts.switches += 1,
                ActionKind::Alert { .. } => counts.alerts += 1,
            }
        }
        counts
    }

    /// Actions emitted by one stage, in order.
    pub fn actions_from(&self, stage: StageKind) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(move |a| a.stage == stage)
    }

    /// Classes started (or switched to) anywhere in the plan.
    pub fn started_classes(&self) -> Vec<DrugClass> {
        self.actions.iter().filter_map(Action::added_class).collect()
    }

    /// Classes stopped (or switched from) anywhere in the plan.
    pub fn stopped_classes(&self) -> Vec<DrugClass> {
        self.actions.iter().filter_map(Action::removed_class).collect()
    }
}
