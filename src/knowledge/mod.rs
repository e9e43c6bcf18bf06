pub mod base;
pub mod builtin;
pub mod capability;

pub use base::KnowledgeBase;
pub use capability::{CapabilityComparison, ComparisonRow, DrugCapability};
