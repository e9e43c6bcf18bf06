//! Staged rule cascade: Safety, Red-Flag Escalation, Organ Protection,
//! Glycemic Intensification, De-Escalation.

pub mod engine;
pub mod messages;
pub mod policy;
pub mod run;
pub mod stages;
pub mod types;

pub use engine::CascadeEngine;
pub use policy::{PolicyProfile, CANONICAL_PROFILE, CONSERVATIVE_PROFILE};
pub use types::{CascadeError, Stage, StageContext, StageOutcome};
