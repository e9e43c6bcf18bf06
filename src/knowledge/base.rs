use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{read_json, ConfigError};
use crate::models::DrugClass;

use super::builtin::builtin_capabilities;
use super::capability::{CapabilityComparison, DrugCapability};

/// Read-only capability table, one entry per [`DrugClass`].
///
/// Construction checks that the table is complete, has no duplicate
/// entries, lists conflicts symmetrically and carries sane eGFR thresholds.
/// A `KnowledgeBase` that exists is therefore always usable by every rule.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: BTreeMap<DrugClass, DrugCapability>,
}

impl KnowledgeBase {
    /// The guideline table compiled into the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_entries(builtin_capabilities())
    }

    /// Load a table from a JSON array of capabilities.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let entries: Vec<DrugCapability> = read_json(path)?;
        let kb = Self::from_entries(entries)?;
        tracing::info!(path = %path.display(), classes = kb.entries.len(), "Knowledge base loaded");
        Ok(kb)
    }

    pub fn from_entries(entries: Vec<DrugCapability>) -> Result<Self, ConfigError> {
        let mut table = BTreeMap::new();
        for entry in entries {
            validate_thresholds(&entry)?;
            let class = entry.class;
            if table.insert(class, entry).is_some() {
                return Err(ConfigError::DuplicateEntry(class));
            }
        }

        for class in DrugClass::ALL {
            if !table.contains_key(class) {
                return Err(ConfigError::MissingEntry(*class));
            }
        }

        for (class, entry) in &table {
            for other in &entry.conflicts {
                let reciprocal = table
                    .get(other)
                    .is_some_and(|o: &DrugCapability| o.conflicts_with(*class));
                if !reciprocal {
                    return Err(ConfigError::AsymmetricConflict {
                        class: *class,
                        other: *other,
                    });
                }
            }
        }

        Ok(Self { entries: table })
    }

    pub fn capability_of(&self, class: DrugClass) -> Result<&DrugCapability, ConfigError> {
        self.entries
            .get(&class)
            .ok_or(ConfigError::MissingEntry(class))
    }

    /// All entries in class order.
    pub fn entries(&self) -> impl Iterator<Item = &DrugCapability> {
        self.entries.values()
    }

    /// Head-to-head comparison of two classes.
    pub fn compare(
        &self,
        left: DrugClass,
        right: DrugClass,
    ) -> Result<CapabilityComparison, ConfigError> {
        Ok(CapabilityComparison::between(
            self.capability_of(left)?,
            self.capability_of(right)?,
        ))
    }
}

fn validate_thresholds(entry: &DrugCapability) -> Result<(), ConfigError> {
    let thresholds = [
        ("contraindication_below_egfr", entry.contraindication_below_egfr),
        ("caution_below_egfr", entry.caution_below_egfr),
        ("initiation_floor_egfr", entry.initiation_floor_egfr),
    ];
    for (field, value) in thresholds {
        if let Some(value) = value {
            if !(0.0..=200.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold {
                    class: entry.class,
                    field,
                    value,
                });
            }
        }
    }
    if let (Some(contra), Some(caution)) =
        (entry.contraindication_below_egfr, entry.caution_below_egfr)
    {
        if caution < contra {
            return Err(ConfigError::InvalidThreshold {
                class: entry.class,
                field: "caution_below_egfr",
                value: caution,
            });
        }
    }
    Ok(())
}
