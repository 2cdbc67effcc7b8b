use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::jobs::JobId;
use crate::types::candidate::{CandidateId, Classification};
use crate::types::project::ProjectId;

/// Facts about what the discovery pipeline did.
///
/// Emitted to an [`crate::traits::sink::EventSink`]; the pipeline itself never
/// reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscoveryEvent {
    // ============================================================================
    // Job events
    // ============================================================================
    JobStarted {
        job_id: JobId,
        source: String,
    },

    FetchAttempted {
        job_id: JobId,
        url: String,
        fetcher: String,
    },

    FetchFailed {
        job_id: JobId,
        url: String,
        error: String,
    },

    PageParsed {
        job_id: JobId,
        title: String,
        text_chars: usize,
        content_hash: Option<String>,
    },

    EntitiesExtracted {
        job_id: JobId,
        project_name: String,
        confidence: f32,
        defaulted_fields: Vec<String>,
    },

    CandidateClassified {
        job_id: JobId,
        candidate_id: CandidateId,
        classification: Classification,
        publish_date: DateTime<Utc>,
    },

    JobCompleted {
        job_id: JobId,
        candidate_id: CandidateId,
    },

    JobFailed {
        job_id: JobId,
        error: String,
    },

    // ============================================================================
    // Staging events
    // ============================================================================
    CandidatesStaged {
        count: usize,
        total: usize,
    },

    DuplicatesReconciled {
        changed: usize,
        duplicates: usize,
    },

    CandidatesDismissed {
        count: usize,
    },

    CandidateEdited {
        candidate_id: CandidateId,
    },

    // ============================================================================
    // Import events
    // ============================================================================
    ProjectCreated {
        candidate_id: CandidateId,
        project_id: ProjectId,
        name: String,
    },

    ProjectMerged {
        candidate_id: CandidateId,
        project_id: ProjectId,
        old_status: String,
        new_status: String,
    },

    ImportSkipped {
        candidate_id: CandidateId,
        reason: String,
    },

    // ============================================================================
    // Alerts
    // ============================================================================
    NewProjectAlert {
        project_id: ProjectId,
        name: String,
        city: String,
    },

    HighValueProject {
        project_id: ProjectId,
        name: String,
        value_sar: f64,
    },
}

impl DiscoveryEvent {
    /// Snake-case event name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            DiscoveryEvent::JobStarted { .. } => "job_started",
            DiscoveryEvent::FetchAttempted { .. } => "fetch_attempted",
            DiscoveryEvent::FetchFailed { .. } => "fetch_failed",
            DiscoveryEvent::PageParsed { .. } => "page_parsed",
            DiscoveryEvent::EntitiesExtracted { .. } => "entities_extracted",
            DiscoveryEvent::CandidateClassified { .. } => "candidate_classified",
            DiscoveryEvent::JobCompleted { .. } => "job_completed",
            DiscoveryEvent::JobFailed { .. } => "job_failed",
            DiscoveryEvent::CandidatesStaged { .. } => "candidates_staged",
            DiscoveryEvent::DuplicatesReconciled { .. } => "duplicates_reconciled",
            DiscoveryEvent::CandidatesDismissed { .. } => "candidates_dismissed",
            DiscoveryEvent::CandidateEdited { .. } => "candidate_edited",
            DiscoveryEvent::ProjectCreated { .. } => "project_created",
            DiscoveryEvent::ProjectMerged { .. } => "project_merged",
            DiscoveryEvent::ImportSkipped { .. } => "import_skipped",
            DiscoveryEvent::NewProjectAlert { .. } => "new_project_alert",
            DiscoveryEvent::HighValueProject { .. } => "high_value_project",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DiscoveryEvent::FetchFailed { .. }
                | DiscoveryEvent::JobFailed { .. }
                | DiscoveryEvent::ImportSkipped { .. }
        )
    }
}
