//! Discovery jobs: one source in, one candidate out.
//!
//! A job fetches (if needed), parses, extracts and classifies a single source,
//! reporting each step to an [`EventSink`]. Jobs never touch staging or the
//! registry; the session decides what to do with the candidate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::events::DiscoveryEvent;
use crate::html::{page_text, published_date};
use crate::pipeline::classify::{classify, ScanMode};
use crate::pipeline::extract::Extractor;
use crate::traits::fetcher::PageFetcher;
use crate::traits::sink::EventSink;
use crate::types::candidate::{CandidateProject, SourceDocument};
use crate::types::config::ClassifierConfig;

const FETCHED_TITLE: &str = "Extracted Page";
const MANUAL_TITLE: &str = "Manual Import";
const NO_URL: &str = "#";

/// Unique identifier for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a job reads.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSource {
    /// Fetch and parse a page.
    Url(Url),
    /// Pasted or uploaded plain text.
    Text {
        text: String,
        title: Option<String>,
        source_url: Option<String>,
    },
    /// An HTML document already on hand.
    Html {
        html: String,
        source_url: Option<String>,
    },
}

impl JobSource {
    fn describe(&self) -> String {
        match self {
            JobSource::Url(url) => url.to_string(),
            JobSource::Text { .. } => "raw text".to_string(),
            JobSource::Html { .. } => "html document".to_string(),
        }
    }
}

/// A single extraction job.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryJob {
    pub id: JobId,
    pub source: JobSource,
    /// Overrides any date found in the document; defaults to "now".
    pub publish_date: Option<DateTime<Utc>>,
    pub mode: ScanMode,
}

impl DiscoveryJob {
    pub fn new(source: JobSource) -> Self {
        Self {
            id: JobId::new(),
            source,
            publish_date: None,
            mode: ScanMode::default(),
        }
    }

    pub fn url(url: Url) -> Self {
        Self::new(JobSource::Url(url))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(JobSource::Text {
            text: text.into(),
            title: None,
            source_url: None,
        })
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self::new(JobSource::Html {
            html: html.into(),
            source_url: None,
        })
    }

    /// Title hint for text jobs. Ignored for other sources.
    pub fn with_title(mut self, new_title: impl Into<String>) -> Self {
        if let JobSource::Text { title, .. } = &mut self.source {
            *title = Some(new_title.into());
        }
        self
    }

    /// Source URL recorded for text and HTML jobs.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        match &mut self.source {
            JobSource::Text { source_url, .. } | JobSource::Html { source_url, .. } => {
                *source_url = Some(url.into());
            }
            JobSource::Url(_) => {}
        }
        self
    }

    pub fn with_publish_date(mut self, date: DateTime<Utc>) -> Self {
        self.publish_date = Some(date);
        self
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Result of running one job.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Staged(CandidateProject),
    Failed { job_id: JobId, error: String },
}

impl JobOutcome {
    pub fn candidate(&self) -> Option<&CandidateProject> {
        match self {
            JobOutcome::Staged(candidate) => Some(candidate),
            JobOutcome::Failed { .. } => None,
        }
    }

    pub fn into_candidate(self) -> Option<CandidateProject> {
        match self {
            JobOutcome::Staged(candidate) => Some(candidate),
            JobOutcome::Failed { .. } => None,
        }
    }
}

/// Text ready for extraction.
struct Document {
    text: String,
    title: String,
    title_hint: Option<String>,
    source_url: String,
    publish_date: Option<DateTime<Utc>>,
}

/// Runs discovery jobs one at a time.
pub struct JobRunner<F: ?Sized> {
    fetcher: Arc<F>,
    sink: Arc<dyn EventSink>,
    extractor: Extractor,
    classifier: ClassifierConfig,
}

impl<F: PageFetcher + ?Sized> JobRunner<F> {
    pub fn new(fetcher: Arc<F>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            fetcher,
            sink,
            extractor: Extractor::default(),
            classifier: ClassifierConfig::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run one job. Failures are reported as events and as
    /// [`JobOutcome::Failed`]; there is no retry.
    pub async fn run(&self, job: &DiscoveryJob, now: DateTime<Utc>) -> JobOutcome {
        self.sink.emit(DiscoveryEvent::JobStarted {
            job_id: job.id,
            source: job.source.describe(),
        });

        let document = match self.load(job).await {
            Ok(document) => document,
            Err(error) => return self.fail(job.id, error),
        };

        if document.text.trim().is_empty() {
            return self.fail(job.id, "source has no readable text".to_string());
        }

        let extracted = self
            .extractor
            .extract(&document.text, document.title_hint.as_deref());
        self.sink.emit(DiscoveryEvent::EntitiesExtracted {
            job_id: job.id,
            project_name: extracted.name.clone(),
            confidence: extracted.confidence(),
            defaulted_fields: extracted
                .defaulted
                .iter()
                .map(|f| f.as_str().to_string())
                .collect(),
        });

        let publish_date = job
            .publish_date
            .or(document.publish_date)
            .unwrap_or(now);
        let classification = classify(publish_date, job.mode, now, &self.classifier);
        let candidate = CandidateProject::from_extraction(
            extracted,
            SourceDocument::new(document.source_url, document.title, publish_date),
            classification,
        );

        self.sink.emit(DiscoveryEvent::CandidateClassified {
            job_id: job.id,
            candidate_id: candidate.id,
            classification,
            publish_date,
        });
        self.sink.emit(DiscoveryEvent::JobCompleted {
            job_id: job.id,
            candidate_id: candidate.id,
        });
        info!(
            job_id = %job.id,
            candidate_id = %candidate.id,
            name = %candidate.project_name,
            city = %candidate.city,
            classification = %classification,
            "discovery job completed"
        );

        JobOutcome::Staged(candidate)
    }

    /// Run jobs sequentially, in order.
    pub async fn run_all(&self, jobs: &[DiscoveryJob], now: DateTime<Utc>) -> Vec<JobOutcome> {
        let mut outcomes = Vec::with_capacity(jobs.len());
        for job in jobs {
            outcomes.push(self.run(job, now).await);
        }
        outcomes
    }

    async fn load(&self, job: &DiscoveryJob) -> Result<Document, String> {
        match &job.source {
            JobSource::Url(url) => {
                self.sink.emit(DiscoveryEvent::FetchAttempted {
                    job_id: job.id,
                    url: url.to_string(),
                    fetcher: self.fetcher.name().to_string(),
                });
                let page = self.fetcher.fetch_page(url).await.map_err(|e| {
                    self.sink.emit(DiscoveryEvent::FetchFailed {
                        job_id: job.id,
                        url: url.to_string(),
                        error: e.to_string(),
                    });
                    e.to_string()
                })?;
                let parsed = page_text(&page.body);
                self.sink.emit(DiscoveryEvent::PageParsed {
                    job_id: job.id,
                    title: parsed.title.clone().unwrap_or_default(),
                    text_chars: parsed.text.chars().count(),
                    content_hash: Some(page.content_hash.clone()),
                });
                Ok(Document {
                    text: parsed.text,
                    title: parsed.title.clone().unwrap_or_else(|| FETCHED_TITLE.to_string()),
                    title_hint: parsed.title,
                    source_url: url.to_string(),
                    publish_date: published_date(&page.body),
                })
            }
            JobSource::Html { html, source_url } => {
                let parsed = page_text(html);
                self.sink.emit(DiscoveryEvent::PageParsed {
                    job_id: job.id,
                    title: parsed.title.clone().unwrap_or_default(),
                    text_chars: parsed.text.chars().count(),
                    content_hash: None,
                });
                Ok(Document {
                    text: parsed.text,
                    title: parsed.title.clone().unwrap_or_else(|| FETCHED_TITLE.to_string()),
                    title_hint: parsed.title,
                    source_url: source_url.clone().unwrap_or_else(|| NO_URL.to_string()),
                    publish_date: published_date(html),
                })
            }
            JobSource::Text {
                text,
                title,
                source_url,
            } => Ok(Document {
                text: text.clone(),
                title: title.clone().unwrap_or_else(|| MANUAL_TITLE.to_string()),
                title_hint: title.clone(),
                source_url: source_url.clone().unwrap_or_else(|| NO_URL.to_string()),
                publish_date: None,
            }),
        }
    }

    fn fail(&self, job_id: JobId, error: String) -> JobOutcome {
        warn!(job_id = %job_id, error = %error, "discovery job failed");
        self.sink.emit(DiscoveryEvent::JobFailed {
            job_id,
            error: error.clone(),
        });
        JobOutcome::Failed { job_id, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemorySink, MockFetcher};
    use crate::types::candidate::Classification;
    use crate::types::location::City;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn runner(fetcher: MockFetcher) -> (JobRunner<MockFetcher>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (JobRunner::new(Arc::new(fetcher), sink.clone()), sink)
    }

    #[tokio::test]
    async fn test_text_job_stages_candidate() {
        let (runner, sink) = runner(MockFetcher::new());
        let job = DiscoveryJob::text("SAR 400 million luxury hotel announced in Jeddah, developer PIF");

        let outcome = runner.run(&job, now()).await;
        let candidate = outcome.candidate().unwrap();

        assert_eq!(candidate.city, City::Jeddah);
        assert_eq!(candidate.estimated_value, Some(400_000_000.0));
        assert_eq!(candidate.source_title, MANUAL_TITLE);
        assert_eq!(candidate.source_url, "#");
        assert_eq!(candidate.classification, Classification::New);
        assert_eq!(
            sink.kinds(),
            vec!["job_started", "entities_extracted", "candidate_classified", "job_completed"]
        );
    }

    #[tokio::test]
    async fn test_url_job_uses_page_title_and_meta_date() {
        let url = Url::parse("https://news.example.sa/red-sea").unwrap();
        let html = r#"<html><head><title>Red Sea Island Resort Awarded</title>
            <meta property="article:published_time" content="2024-01-15T00:00:00Z"></head>
            <body><p>Contractor: Nesma Partners won the SAR 2 billion deal.</p></body></html>"#;
        let (runner, sink) = runner(MockFetcher::new().with_page(url.as_str(), html));

        let job = DiscoveryJob::url(url.clone()).with_mode(ScanMode::Combined);
        let candidate = runner.run(&job, now()).await.into_candidate().unwrap();

        assert_eq!(candidate.project_name, "Red Sea Island Resort Awarded");
        assert_eq!(candidate.city, City::RedSea);
        assert_eq!(candidate.contractor.as_deref(), Some("Nesma Partners"));
        assert_eq!(candidate.classification, Classification::Backlog);
        assert_eq!(candidate.source_url, url.as_str());
        assert!(sink.kinds().contains(&"page_parsed"));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_job() {
        let (runner, sink) = runner(MockFetcher::new());
        let job = DiscoveryJob::url(Url::parse("https://missing.example/").unwrap());

        let outcome = runner.run(&job, now()).await;

        assert!(matches!(outcome, JobOutcome::Failed { .. }));
        assert_eq!(
            sink.kinds(),
            vec!["job_started", "fetch_attempted", "fetch_failed", "job_failed"]
        );
    }

    #[tokio::test]
    async fn test_explicit_publish_date_wins() {
        let (runner, _sink) = runner(MockFetcher::new());
        let job = DiscoveryJob::text("Hotel tender in Abha")
            .with_publish_date(now() - Duration::days(30))
            .with_mode(ScanMode::Fresh);

        let candidate = runner.run(&job, now()).await.into_candidate().unwrap();
        assert_eq!(candidate.classification, Classification::Review);
    }

    #[tokio::test]
    async fn test_empty_text_fails() {
        let (runner, _sink) = runner(MockFetcher::new());
        let outcome = runner.run(&DiscoveryJob::html("<html><body> </body></html>"), now()).await;
        assert!(matches!(outcome, JobOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_run_all_keeps_job_order() {
        let (runner, _sink) = runner(MockFetcher::new());
        let jobs = vec![
            DiscoveryJob::text("Hotel in Riyadh").with_title("First"),
            DiscoveryJob::text("Hotel in Abha").with_title("Second"),
        ];

        let outcomes = runner.run_all(&jobs, now()).await;
        let names: Vec<_> = outcomes
            .iter()
            .filter_map(|o| o.candidate())
            .map(|c| c.project_name.as_str())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }
}
