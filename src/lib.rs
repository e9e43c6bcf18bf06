pub mod cascade;
pub mod config;
pub mod knowledge;
pub mod models;

pub use cascade::{CascadeEngine, CascadeError, PolicyProfile};
pub use knowledge::KnowledgeBase;
pub use models::{
    Action, ActionKind, DrugClass, EvaluationRequest, MedicationState, PatientInput,
    PatientSnapshot, Plan,
};

use tracing_subscriber::EnvFilter;

/// Install the global subscriber: `RUST_LOG` if set, otherwise the crate
/// default filter. Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}
