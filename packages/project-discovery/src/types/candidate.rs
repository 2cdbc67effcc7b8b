//! Staging units: potential projects awaiting human review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use super::extraction::ExtractedProject;
use super::location::City;
use super::project::{ProjectId, ProjectStatus, ProjectType};

/// Temporary identifier for a staged candidate.
///
/// UUIDv7, so ids are never reused within (or across) sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub Uuid);

impl CandidateId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review bucket assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    New,
    Backlog,
    Review,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::New => "New",
            Classification::Backlog => "Backlog",
            Classification::Review => "Review",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate fields that can fall back to a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateField {
    Name,
    City,
    ProjectType,
    Developer,
    Status,
    EstimatedValue,
}

impl CandidateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateField::Name => "name",
            CandidateField::City => "city",
            CandidateField::ProjectType => "type",
            CandidateField::Developer => "developer",
            CandidateField::Status => "status",
            CandidateField::EstimatedValue => "value",
        }
    }
}

/// A person named in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPerson {
    pub name: String,
    pub role: String,
}

/// Where a candidate was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub url: String,
    pub title: String,
    pub publish_date: DateTime<Utc>,
}

impl SourceDocument {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        publish_date: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            publish_date,
        }
    }
}

/// A potential project waiting in staging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProject {
    pub id: CandidateId,
    pub project_name: String,
    pub project_type: ProjectType,
    pub city: City,
    pub region: String,
    pub developer: String,
    pub contractor: Option<String>,
    pub consultant: Option<String>,
    pub operator: Option<String>,
    pub status: ProjectStatus,
    pub target_opening: Option<String>,
    /// SAR; `None` when the source gave no figure
    pub estimated_value: Option<f64>,
    pub source_url: String,
    pub source_title: String,
    pub publish_date: DateTime<Utc>,
    pub summary: String,
    pub classification: Classification,
    pub is_duplicate: bool,
    pub existing_project_id: Option<ProjectId>,
    pub kitchen_notes: Option<String>,
    #[serde(default)]
    pub extracted_people: Vec<ExtractedPerson>,
    #[serde(default)]
    pub defaulted_fields: BTreeSet<CandidateField>,
}

impl CandidateProject {
    /// Build a candidate from extractor output and its source.
    pub fn from_extraction(
        extracted: ExtractedProject,
        source: SourceDocument,
        classification: Classification,
    ) -> Self {
        let estimated_value = extracted.known_value();
        Self {
            id: CandidateId::new(),
            project_name: extracted.name,
            project_type: extracted.project_type,
            city: extracted.city,
            region: extracted.region,
            developer: extracted.developer,
            contractor: extracted.contractor,
            consultant: extracted.consultant,
            operator: extracted.operator,
            status: extracted.status,
            target_opening: extracted.target_opening,
            estimated_value,
            source_url: source.url,
            source_title: source.title,
            publish_date: source.publish_date,
            summary: extracted.summary,
            classification,
            is_duplicate: false,
            existing_project_id: None,
            kitchen_notes: extracted.relevance_notes,
            extracted_people: extracted.people,
            defaulted_fields: extracted.defaulted,
        }
    }

    /// Operator attention needed before import.
    pub fn needs_review(&self) -> bool {
        self.classification == Classification::Review || !self.defaulted_fields.is_empty()
    }

    /// Developer usable as a match key (present and not a fallback).
    pub fn known_developer(&self) -> Option<&str> {
        let developer = self.developer.trim();
        if developer.is_empty() || self.defaulted_fields.contains(&CandidateField::Developer) {
            None
        } else {
            Some(developer)
        }
    }
}
