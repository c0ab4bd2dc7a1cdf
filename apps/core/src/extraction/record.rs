//! Clinical Record - Output structure of an extraction.
//!
//! Always serializes with the three keys `medicines`, `activities` and
//! `vitals`, each an array, even when nothing was found.

use serde::{Deserialize, Serialize};

use crate::error::AppResult;

/// A medication mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    /// Title-cased drug name
    pub name: String,
}

/// Activity subcategory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityCategory {
    Exercise,
    Medical,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Exercise => "Exercise",
            ActivityCategory::Medical => "Medical",
        }
    }
}

/// A treatment, procedure or lifestyle activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Title-cased mention
    pub title: String,
    pub category: ActivityCategory,
}

/// A vital-sign reading, kept as the literal text found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vital {
    pub label: String,
    pub value: String,
}

impl Vital {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Structured facts extracted from one text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub medicines: Vec<Medication>,
    pub activities: Vec<Activity>,
    pub vitals: Vec<Vital>,
}

impl ClinicalRecord {
    /// The canonical empty record
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.medicines.is_empty() && self.activities.is_empty() && self.vitals.is_empty()
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON
    pub fn to_json_pretty(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Medicines: {}, Activities: {}, Vitals: {}",
            self.medicines.len(),
            self.activities.len(),
            self.vitals.len()
        )
    }
}
