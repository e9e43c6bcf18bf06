//! The five rule stages, in cascade order.

pub mod de_escalation;
pub mod glycemic;
pub mod organ_protection;
pub mod red_flag;
pub mod safety;

pub use de_escalation::DeEscalationStage;
pub use glycemic::GlycemicStage;
pub use organ_protection::OrganProtectionStage;
pub use red_flag::RedFlagStage;
pub use safety::SafetyStage;

use super::types::Stage;

/// Safety → Red-Flag → Organ Protection → Glycemic → De-Escalation.
pub fn default_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(SafetyStage),
        Box::new(RedFlagStage),
        Box::new(OrganProtectionStage),
        Box::new(GlycemicStage),
        Box::new(DeEscalationStage),
    ]
}
