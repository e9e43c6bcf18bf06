use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::DrugClass;

/// Application-level constants
pub const APP_NAME: &str = "Glycopilot";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Guideline the built-in knowledge base and rules encode.
pub const GUIDELINE: &str = "ADA/EASD 2022 Consensus Report";

/// Log filter used when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "glycopilot=info,glycopilot_lib=info"
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Startup-time failure. Fatal: the engine is never built on a bad table.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Knowledge base has no entry for drug class {0}")]
    MissingEntry(DrugClass),

    #[error("Knowledge base lists drug class {0} more than once")]
    DuplicateEntry(DrugClass),

    #[error("Knowledge base: {class} conflicts with {other} but not the reverse")]
    AsymmetricConflict { class: DrugClass, other: DrugClass },

    #[error("Knowledge base: {class} threshold {field} = {value} is not a valid eGFR")]
    InvalidThreshold {
        class: DrugClass,
        field: &'static str,
        value: f64,
    },

    #[error("Invalid policy value {field}: {reason}")]
    InvalidPolicy { field: &'static str, reason: String },

    #[error("Unknown policy profile: {0}")]
    UnknownProfile(String),

    #[error("Config load failed ({0}): {1}")]
    Load(String, String),

    #[error("Config parse failed ({0}): {1}")]
    Parse(String, String),
}

/// Read and deserialize a JSON config file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&raw)
        .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))
}
