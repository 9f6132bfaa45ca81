// --- File: crates/careslot_booking/src/directory.rs ---
//! Caregiver lookup by name, insensitive to case and diacritics.

use careslot_common::{config_error, CareslotError};
use careslot_config::CaregiverConfig;
use serde::Serialize;
use std::collections::HashMap;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caregiver {
    pub name: String,
    pub calendar_id: String,
    pub email: String,
}

/// Folds a name to its lookup key: decomposed, marks stripped, lower-cased,
/// inner whitespace collapsed.
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone)]
pub struct CaregiverDirectory {
    caregivers: Vec<Caregiver>,
    index: HashMap<String, usize>,
}

impl CaregiverDirectory {
    /// Builds the directory; two names folding to the same key are rejected.
    pub fn from_config(entries: &[CaregiverConfig]) -> Result<Self, CareslotError> {
        let mut caregivers = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());

        for entry in entries {
            let key = normalize_name(&entry.name);
            if key.is_empty() {
                return Err(config_error("caregiver names must not be empty"));
            }
            if index.insert(key, caregivers.len()).is_some() {
                return Err(config_error(format!(
                    "caregiver '{}' is configured more than once",
                    entry.name
                )));
            }
            caregivers.push(Caregiver {
                name: entry.name.trim().to_string(),
                calendar_id: entry.calendar_id.trim().to_string(),
                email: entry.email.trim().to_string(),
            });
        }

        Ok(Self { caregivers, index })
    }

    pub fn lookup(&self, name: &str) -> Option<&Caregiver> {
        self.index
            .get(&normalize_name(name))
            .and_then(|&position| self.caregivers.get(position))
    }

    /// Display names in configuration order.
    pub fn names(&self) -> Vec<String> {
        self.caregivers.iter().map(|c| c.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Caregiver> {
        self.caregivers.iter()
    }

    pub fn len(&self) -> usize {
        self.caregivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caregivers.is_empty()
    }

    pub fn is_caregiver_calendar(&self, calendar_id: &str) -> bool {
        self.caregivers
            .iter()
            .any(|c| c.calendar_id == calendar_id.trim())
    }
}
