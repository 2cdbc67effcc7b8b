//! One operator's discovery session.
//!
//! Owns the staging store and holds an injected registry. Whenever staging or
//! the registry changes through the session, duplicate flags are re-derived so
//! staged candidates always reflect the current registry.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::events::DiscoveryEvent;
use crate::pipeline::dedup::reconcile_duplicates;
use crate::pipeline::extract::Extractor;
use crate::pipeline::jobs::{DiscoveryJob, JobOutcome, JobRunner};
use crate::pipeline::reconcile::{import_candidates, ImportContext, ImportReport};
use crate::stores::StagingStore;
use crate::traits::fetcher::PageFetcher;
use crate::traits::registry::ProjectRegistry;
use crate::traits::sink::{EventSink, TracingSink};
use crate::types::candidate::{CandidateId, CandidateProject};
use crate::types::config::DiscoveryConfig;

/// Identity recorded in change history when none is configured.
pub const DEFAULT_ACTOR: &str = "Crawler Bot";

pub struct DiscoverySession<R: ?Sized> {
    registry: Arc<R>,
    staging: StagingStore,
    sink: Arc<dyn EventSink>,
    config: DiscoveryConfig,
    actor: String,
}

impl<R: ProjectRegistry + ?Sized> DiscoverySession<R> {
    pub fn new(registry: Arc<R>) -> Self {
        Self {
            registry,
            staging: StagingStore::new(),
            sink: Arc::new(TracingSink),
            config: DiscoveryConfig::default(),
            actor: DEFAULT_ACTOR.to_string(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_config(mut self, config: DiscoveryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    pub fn staging(&self) -> &StagingStore {
        &self.staging
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Stage a batch ahead of existing candidates, then re-run the matcher.
    ///
    /// Returns how many candidates were actually added.
    pub fn stage(&mut self, batch: Vec<CandidateProject>) -> Result<usize> {
        let added = self.staging.add_batch(batch);
        self.sink.emit(DiscoveryEvent::CandidatesStaged {
            count: added,
            total: self.staging.len(),
        });
        self.refresh_duplicates()?;
        Ok(added)
    }

    /// Re-derive duplicate flags against the current registry.
    ///
    /// Returns the number of candidates whose flag or link changed.
    pub fn refresh_duplicates(&mut self) -> Result<usize> {
        let registry = self.registry.list_projects()?;
        let outcome = reconcile_duplicates(self.staging.items(), &registry);
        if outcome.is_unchanged() {
            return Ok(0);
        }

        let changed = outcome.changed;
        self.staging.replace_all(outcome.candidates)?;
        debug!(changed, "duplicate flags refreshed");
        self.sink.emit(DiscoveryEvent::DuplicatesReconciled {
            changed,
            duplicates: self.staging.duplicates().len(),
        });
        Ok(changed)
    }

    /// Discard candidates without importing them.
    pub fn dismiss(&mut self, ids: &HashSet<CandidateId>) -> Vec<CandidateProject> {
        let removed = self.staging.remove(ids);
        if !removed.is_empty() {
            self.sink.emit(DiscoveryEvent::CandidatesDismissed {
                count: removed.len(),
            });
        }
        removed
    }

    /// Apply an operator edit to one staged candidate.
    pub fn update_candidate(&mut self, candidate: CandidateProject) -> Result<()> {
        let candidate_id = candidate.id;
        self.staging.update(candidate)?;
        self.sink.emit(DiscoveryEvent::CandidateEdited { candidate_id });
        self.refresh_duplicates()?;
        Ok(())
    }

    /// Import the selected candidates and drop them from staging.
    ///
    /// Links are re-derived first, since the registry may have changed behind
    /// the session's back. Skipped candidates stay staged; see
    /// [`import_candidates`].
    pub fn import(&mut self, selected: &HashSet<CandidateId>) -> Result<ImportReport> {
        self.refresh_duplicates()?;

        let ctx = ImportContext::new(self.actor.clone())
            .with_now(Utc::now())
            .with_config(self.config.import.clone());
        let staged = self.staging.items().to_vec();

        let outcome = import_candidates(selected, staged, self.registry.as_ref(), &ctx);
        self.staging.replace_all(outcome.remaining)?;

        for event in outcome.report.events(&self.config.alerts) {
            self.sink.emit(event);
        }
        self.refresh_duplicates()?;
        Ok(outcome.report)
    }

    /// Run jobs one after another and stage every candidate they produce.
    pub async fn run_jobs<F: PageFetcher + ?Sized>(
        &mut self,
        fetcher: Arc<F>,
        jobs: &[DiscoveryJob],
    ) -> Result<Vec<JobOutcome>> {
        let runner = JobRunner::new(fetcher, self.sink.clone())
            .with_extractor(Extractor::new(self.config.extractor.clone()))
            .with_classifier(self.config.classifier.clone());

        let outcomes = runner.run_all(jobs, Utc::now()).await;
        let candidates: Vec<CandidateProject> = outcomes
            .iter()
            .filter_map(|o| o.candidate().cloned())
            .collect();
        if !candidates.is_empty() {
            self.stage(candidates)?;
        }
        Ok(outcomes)
    }
}
