//! Output of the entity extractor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::candidate::{CandidateField, ExtractedPerson};
use super::location::City;
use super::project::{ProjectStatus, ProjectType};

/// Fields whose provenance is tracked for the confidence score.
pub const TRACKED_FIELDS: [CandidateField; 6] = [
    CandidateField::Name,
    CandidateField::City,
    CandidateField::ProjectType,
    CandidateField::Developer,
    CandidateField::Status,
    CandidateField::EstimatedValue,
];

/// Structured fields pulled out of free text.
///
/// Every field has a value; fields that fell back to a default are listed in
/// `defaulted` so downstream review can tell "not found" from a real match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProject {
    pub name: String,
    pub project_type: ProjectType,
    pub city: City,
    pub region: String,
    /// SAR; 0 when no monetary phrase was found
    pub estimated_value: f64,
    pub developer: String,
    pub contractor: Option<String>,
    pub consultant: Option<String>,
    pub operator: Option<String>,
    pub status: ProjectStatus,
    pub target_opening: Option<String>,
    pub relevance_notes: Option<String>,
    pub people: Vec<ExtractedPerson>,
    pub summary: String,
    pub defaulted: BTreeSet<CandidateField>,
}

impl ExtractedProject {
    /// True if the field fell back to its default.
    pub fn is_defaulted(&self, field: CandidateField) -> bool {
        self.defaulted.contains(&field)
    }

    /// Share of tracked fields that were actually matched in the text.
    pub fn confidence(&self) -> f32 {
        let matched = TRACKED_FIELDS
            .iter()
            .filter(|f| !self.defaulted.contains(f))
            .count();
        matched as f32 / TRACKED_FIELDS.len() as f32
    }

    /// Estimated value, with the 0 sentinel mapped to "unknown".
    pub fn known_value(&self) -> Option<f64> {
        if self.estimated_value > 0.0 {
            Some(self.estimated_value)
        } else {
            None
        }
    }
}
