//! Import of reviewed candidates into the registry.
//!
//! Each selected candidate either merges into the record it was matched to or
//! becomes a new record. Work is all-or-nothing per candidate but not across
//! the batch: a candidate whose link went stale, or that the registry rejects,
//! is skipped and stays staged while the rest carry on.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::events::DiscoveryEvent;
use crate::traits::registry::ProjectRegistry;
use crate::types::candidate::{CandidateId, CandidateProject};
use crate::types::config::{AlertPolicy, ImportConfig};
use crate::types::location::City;
use crate::types::project::{
    ChangeLogEntry, ContactInfo, NewsItem, ProjectId, ProjectRecord, ProjectStatus,
};

/// Who is importing, when, and with which settings.
#[derive(Debug, Clone)]
pub struct ImportContext {
    pub actor: String,
    pub now: DateTime<Utc>,
    pub config: ImportConfig,
}

impl ImportContext {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            now: Utc::now(),
            config: ImportConfig::default(),
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }
}

/// Why a selected candidate was left in staging.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The linked record is no longer in the registry.
    StaleLink { project_id: ProjectId },
    /// The registry refused the write.
    Rejected { message: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::StaleLink { project_id } => {
                write!(f, "linked project {project_id} no longer exists")
            }
            SkipReason::Rejected { message } => write!(f, "registry rejected write: {message}"),
        }
    }
}

/// What happened to one selected candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportAction {
    Created {
        candidate_id: CandidateId,
        project_id: ProjectId,
        name: String,
        city: City,
        value_sar: f64,
    },
    Merged {
        candidate_id: CandidateId,
        project_id: ProjectId,
        old_status: ProjectStatus,
        new_status: ProjectStatus,
    },
    Skipped {
        candidate_id: CandidateId,
        reason: SkipReason,
    },
}

/// Per-candidate results, in staging order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub actions: Vec<ImportAction>,
}

impl ImportReport {
    pub fn created(&self) -> usize {
        self.count(|a| matches!(a, ImportAction::Created { .. }))
    }

    pub fn merged(&self) -> usize {
        self.count(|a| matches!(a, ImportAction::Merged { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| matches!(a, ImportAction::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&ImportAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }

    /// Events describing the import, alerts included per `policy`.
    pub fn events(&self, policy: &AlertPolicy) -> Vec<DiscoveryEvent> {
        let mut events = Vec::new();
        for action in &self.actions {
            match action {
                ImportAction::Created {
                    candidate_id,
                    project_id,
                    name,
                    city,
                    value_sar,
                } => {
                    events.push(DiscoveryEvent::ProjectCreated {
                        candidate_id: *candidate_id,
                        project_id: project_id.clone(),
                        name: name.clone(),
                    });
                    if policy.notify_on_new_project {
                        events.push(DiscoveryEvent::NewProjectAlert {
                            project_id: project_id.clone(),
                            name: name.clone(),
                            city: city.to_string(),
                        });
                    }
                    if policy.is_high_value(*value_sar) {
                        events.push(DiscoveryEvent::HighValueProject {
                            project_id: project_id.clone(),
                            name: name.clone(),
                            value_sar: *value_sar,
                        });
                    }
                }
                ImportAction::Merged {
                    candidate_id,
                    project_id,
                    old_status,
                    new_status,
                } => events.push(DiscoveryEvent::ProjectMerged {
                    candidate_id: *candidate_id,
                    project_id: project_id.clone(),
                    old_status: old_status.to_string(),
                    new_status: new_status.to_string(),
                }),
                ImportAction::Skipped {
                    candidate_id,
                    reason,
                } => events.push(DiscoveryEvent::ImportSkipped {
                    candidate_id: *candidate_id,
                    reason: reason.to_string(),
                }),
            }
        }
        events
    }
}

/// Report plus the candidates that stay staged.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub report: ImportReport,
    /// Unselected and skipped candidates, in their original order
    pub remaining: Vec<CandidateProject>,
}

/// Merge or create a registry record for every selected candidate.
pub fn import_candidates<R: ProjectRegistry + ?Sized>(
    selected: &HashSet<CandidateId>,
    candidates: Vec<CandidateProject>,
    registry: &R,
    ctx: &ImportContext,
) -> ImportOutcome {
    let mut report = ImportReport::default();
    let mut remaining = Vec::new();

    for candidate in candidates {
        if !selected.contains(&candidate.id) {
            remaining.push(candidate);
            continue;
        }

        let result = match (candidate.is_duplicate, candidate.existing_project_id.clone()) {
            (true, Some(project_id)) => merge_candidate(&candidate, project_id, registry, ctx),
            _ => create_candidate(&candidate, registry, ctx),
        };

        match result {
            Ok(action) => report.actions.push(action),
            Err(reason) => {
                warn!(
                    candidate_id = %candidate.id,
                    name = %candidate.project_name,
                    reason = %reason,
                    "import skipped, candidate stays staged"
                );
                report.actions.push(ImportAction::Skipped {
                    candidate_id: candidate.id,
                    reason,
                });
                remaining.push(candidate);
            }
        }
    }

    info!(
        created = report.created(),
        merged = report.merged(),
        skipped = report.skipped(),
        remaining = remaining.len(),
        "import finished"
    );

    ImportOutcome { report, remaining }
}

fn merge_candidate<R: ProjectRegistry + ?Sized>(
    candidate: &CandidateProject,
    project_id: ProjectId,
    registry: &R,
    ctx: &ImportContext,
) -> Result<ImportAction, SkipReason> {
    let existing = registry
        .get_project(&project_id)
        .map_err(|e| SkipReason::Rejected {
            message: e.to_string(),
        })?
        .ok_or_else(|| SkipReason::StaleLink {
            project_id: project_id.clone(),
        })?;

    let old_status = existing.status;
    let merged = merge_into(existing, candidate, ctx);
    registry
        .update_project(merged)
        .map_err(|e| SkipReason::Rejected {
            message: e.to_string(),
        })?;

    info!(candidate_id = %candidate.id, project_id = %project_id, "merged candidate");
    Ok(ImportAction::Merged {
        candidate_id: candidate.id,
        project_id,
        old_status,
        new_status: candidate.status,
    })
}

fn create_candidate<R: ProjectRegistry + ?Sized>(
    candidate: &CandidateProject,
    registry: &R,
    ctx: &ImportContext,
) -> Result<ImportAction, SkipReason> {
    let record = create_record(candidate, ctx);
    let action = ImportAction::Created {
        candidate_id: candidate.id,
        project_id: record.id.clone(),
        name: record.name.clone(),
        city: record.city,
        value_sar: record.estimated_value_sar,
    };
    registry
        .add_project(record)
        .map_err(|e| SkipReason::Rejected {
            message: e.to_string(),
        })?;

    info!(candidate_id = %candidate.id, name = %candidate.project_name, "created project");
    Ok(action)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn news_item(candidate: &CandidateProject, config: &ImportConfig) -> NewsItem {
    NewsItem {
        id: format!("n-{}", Uuid::now_v7()),
        title: candidate.source_title.clone(),
        source: config.news_source.clone(),
        date: candidate.publish_date.date_naive().to_string(),
        snippet: candidate.summary.clone(),
        url: candidate.source_url.clone(),
        confidence_score: config.news_confidence,
    }
}

/// Apply a candidate's observations to an existing record.
///
/// Status is always taken from the candidate; contractor and consultant only
/// when the candidate actually names one.
pub fn merge_into(
    mut record: ProjectRecord,
    candidate: &CandidateProject,
    ctx: &ImportContext,
) -> ProjectRecord {
    let old_status = record.status;
    record.status = candidate.status;
    if let Some(contractor) = non_empty(&candidate.contractor) {
        record.contractor = Some(contractor);
    }
    if let Some(consultant) = non_empty(&candidate.consultant) {
        record.consultant = Some(consultant);
    }
    record.last_updated = ctx.now;
    record.news.push(news_item(candidate, &ctx.config));
    record.history.push(ChangeLogEntry {
        date: ctx.now,
        field: "status".to_string(),
        old_value: old_status.to_string(),
        new_value: candidate.status.to_string(),
        user: ctx.actor.clone(),
    });
    record
}

/// Build a fresh registry record from a candidate.
pub fn create_record(candidate: &CandidateProject, ctx: &ImportContext) -> ProjectRecord {
    let config = &ctx.config;
    ProjectRecord {
        id: ProjectId::crawled(),
        name: candidate.project_name.clone(),
        project_type: candidate.project_type,
        city: candidate.city,
        region: candidate.region.clone(),
        developer: candidate.developer.clone(),
        contractor: non_empty(&candidate.contractor),
        consultant: non_empty(&candidate.consultant),
        designer: None,
        operator: non_empty(&candidate.operator),
        status: candidate.status,
        estimated_value_sar: candidate.estimated_value.unwrap_or(0.0),
        kl_scope_value_sar: None,
        expected_completion: candidate
            .target_opening
            .clone()
            .unwrap_or_else(|| config.unknown_completion.clone()),
        confidence_score: config.crawled_confidence,
        tags: vec![
            candidate.classification.to_string(),
            config.created_tag.clone(),
        ],
        last_updated: ctx.now,
        news: vec![news_item(candidate, config)],
        history: Vec::new(),
        description: candidate.summary.clone(),
        notes: candidate.kitchen_notes.clone(),
        contacts: candidate
            .extracted_people
            .iter()
            .map(|p| ContactInfo {
                name: p.name.clone(),
                role: p.role.clone(),
                email: None,
                phone: None,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryRegistry;
    use crate::testing::{candidate, record};
    use crate::types::candidate::{Classification, ExtractedPerson};

    fn ctx() -> ImportContext {
        ImportContext::new("Analyst")
    }

    fn linked(name: &str, project_id: &str) -> CandidateProject {
        let mut c = candidate(name, City::Jeddah, "Al Khozama");
        c.is_duplicate = true;
        c.existing_project_id = Some(ProjectId::from(project_id));
        c
    }

    #[test]
    fn test_remaining_keeps_unselected_in_order() {
        let registry = MemoryRegistry::new();
        let batch = vec![
            candidate("A", City::Riyadh, "X"),
            candidate("B", City::Riyadh, "X"),
            candidate("C", City::Riyadh, "X"),
            candidate("D", City::Riyadh, "X"),
        ];
        let selected = HashSet::from([batch[1].id, batch[3].id]);

        let outcome = import_candidates(&selected, batch, &registry, &ctx());

        let remaining: Vec<_> = outcome.remaining.iter().map(|c| c.project_name.as_str()).collect();
        assert_eq!(remaining, vec!["A", "C"]);
        assert_eq!(outcome.report.created(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_merge_keeps_contractor_when_candidate_has_none() {
        let mut existing = record("3", "Tower", City::Jeddah, "Al Khozama");
        existing.contractor = Some("Unknown".to_string());
        let registry = MemoryRegistry::from_records(vec![existing]).unwrap();

        let mut c = linked("Tower", "3");
        c.contractor = Some("   ".to_string());
        c.status = ProjectStatus::Ongoing;
        let selected = HashSet::from([c.id]);

        let outcome = import_candidates(&selected, vec![c], &registry, &ctx());
        assert_eq!(outcome.report.merged(), 1);

        let stored = registry.get_project(&ProjectId::from("3")).unwrap().unwrap();
        assert_eq!(stored.contractor.as_deref(), Some("Unknown"));
        assert_eq!(stored.status, ProjectStatus::Ongoing);
    }

    #[test]
    fn test_merge_replaces_contractor_and_logs_history() {
        let registry =
            MemoryRegistry::from_records(vec![record("3", "Tower", City::Jeddah, "Al Khozama")])
                .unwrap();

        let mut c = linked("Tower", "3");
        c.contractor = Some("Saudi Binladin Group".to_string());
        c.status = ProjectStatus::Awarded;
        let selected = HashSet::from([c.id]);

        import_candidates(&selected, vec![c], &registry, &ctx());

        let stored = registry.get_project(&ProjectId::from("3")).unwrap().unwrap();
        assert_eq!(stored.contractor.as_deref(), Some("Saudi Binladin Group"));
        assert_eq!(stored.news.len(), 1);
        assert_eq!(stored.news[0].source, "Crawler");
        assert_eq!(stored.news[0].confidence_score, 1.0);

        let entry = stored.history.last().unwrap();
        assert_eq!(entry.field, "status");
        assert_eq!(entry.old_value, "Tender");
        assert_eq!(entry.new_value, "Awarded");
        assert_eq!(entry.user, "Analyst");
    }

    #[test]
    fn test_stale_link_is_skipped_and_stays_staged() {
        let registry = MemoryRegistry::new();
        let stale = linked("Ghost", "deleted");
        let fresh = candidate("Fresh", City::Abha, "Someone");
        let selected = HashSet::from([stale.id, fresh.id]);

        let outcome = import_candidates(&selected, vec![stale, fresh], &registry, &ctx());

        assert_eq!(outcome.report.skipped(), 1);
        assert_eq!(outcome.report.created(), 1);
        assert_eq!(outcome.remaining.len(), 1);
        assert_eq!(outcome.remaining[0].project_name, "Ghost");
        assert!(matches!(
            outcome.report.actions[0],
            ImportAction::Skipped {
                reason: SkipReason::StaleLink { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_created_record_fields() {
        let mut c = candidate("Qiddiya Water Park Resort", City::Riyadh, "Qiddiya Investment Company");
        c.classification = Classification::Backlog;
        c.estimated_value = None;
        c.target_opening = None;
        c.kitchen_notes = Some("Detected keywords: kitchen".to_string());
        c.operator = Some("Six Flags".to_string());
        c.extracted_people = vec![ExtractedPerson {
            name: "Philippe Gas".to_string(),
            role: "CEO".to_string(),
        }];

        let record = create_record(&c, &ctx());

        assert!(record.id.as_str().starts_with("crawled-"));
        assert_eq!(record.confidence_score, 0.85);
        assert_eq!(record.tags, vec!["Backlog".to_string(), "Crawled".to_string()]);
        assert_eq!(record.estimated_value_sar, 0.0);
        assert_eq!(record.expected_completion, "TBD");
        assert_eq!(record.notes.as_deref(), Some("Detected keywords: kitchen"));
        assert_eq!(record.operator.as_deref(), Some("Six Flags"));
        assert_eq!(record.contacts.len(), 1);
        assert_eq!(record.news.len(), 1);
        assert!(record.history.is_empty());
        assert_eq!(record.description, c.summary);
    }

    #[test]
    fn test_high_value_creation_raises_alerts() {
        let registry = MemoryRegistry::new();
        let mut c = candidate("Mega Resort", City::RedSea, "Red Sea Global");
        c.estimated_value = Some(2_500_000_000.0);
        let selected = HashSet::from([c.id]);

        let outcome = import_candidates(&selected, vec![c], &registry, &ctx());
        let kinds: Vec<_> = outcome
            .report
            .events(&AlertPolicy::default())
            .iter()
            .map(|e| e.kind())
            .collect();

        assert_eq!(
            kinds,
            vec!["project_created", "new_project_alert", "high_value_project"]
        );
    }
}
