use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::enums::DrugClass;

/// Active drug classes during one evaluation.
///
/// Seeded from the reported regimen, threaded through the stages by value,
/// and returned as the plan's final state. Iteration order is the
/// [`DrugClass`] declaration order, so two states with the same members
/// always serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicationState {
    active: BTreeSet<DrugClass>,
}

impl MedicationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class: DrugClass) -> bool {
        self.active.contains(&class)
    }

    pub fn contains_any(&self, classes: &[DrugClass]) -> bool {
        classes.iter().any(|c| self.active.contains(c))
    }

    /// GLP-1 RA or dual GIP/GLP-1 agonist present.
    pub fn has_incretin_agonist(&self) -> bool {
        self.active.iter().any(DrugClass::is_incretin_agonist)
    }

    /// Returns false if the class was already active.
    pub fn insert(&mut self, class: DrugClass) -> bool {
        self.active.insert(class)
    }

    /// Returns false if the class was not active.
    pub fn remove(&mut self, class: DrugClass) -> bool {
        self.active.remove(&class)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DrugClass> + '_ {
        self.active.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<DrugClass> {
        self.iter().collect()
    }
}

impl FromIterator<DrugClass> for MedicationState {
    fn from_iter<I: IntoIterator<Item = DrugClass>>(iter: I) -> Self {
        Self {
            active: iter.into_iter().collect(),
        }
    }
}

impl From<&[DrugClass]> for MedicationState {
    fn from(regimen: &[DrugClass]) -> Self {
        regimen.iter().copied().collect()
    }
}
