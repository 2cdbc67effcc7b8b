//! Crawler Discovery & Staging for KSA Hospitality Projects
//!
//! Turns news articles, tender notices and pasted text into candidate
//! projects, holds them in a staging area for human review, and merges the
//! ones an operator selects into the project registry.
//!
//! # Pipeline
//!
//! ```text
//! source ─► Extractor ─► Classifier ─► StagingStore ─► Matcher ─► Import
//!                                          ▲              │          │
//!                                          └──────────────┴── ProjectRegistry
//! ```
//!
//! - Extraction is rule-based and deterministic: keyword tables plus a few
//!   compiled patterns, with per-field provenance instead of silent defaults.
//! - Candidates never touch the registry until an operator imports them.
//! - The registry is an injected service, not a global.
//!
//! # Usage
//!
//! ```rust,ignore
//! use project_discovery::{DiscoveryJob, DiscoverySession, MemoryRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(MemoryRegistry::with_seed()?);
//! let mut session = DiscoverySession::new(registry);
//!
//! let job = DiscoveryJob::text("SAR 400 million hotel announced in Jeddah, developer PIF");
//! session.run_jobs(Arc::new(MockFetcher::new()), &[job]).await?;
//!
//! let selected = session.staging().items().iter().map(|c| c.id).collect();
//! let report = session.import(&selected)?;
//! ```
//!
//! # Modules
//!
//! - [`types`] - Registry records, candidates and configuration
//! - [`pipeline`] - Extraction, classification, matching, import and jobs
//! - [`stores`] - In-memory registry and the staging store
//! - [`traits`] - Registry, fetcher and event sink seams
//! - [`session`] - Staging + registry orchestration for one operator
//! - [`html`] - Text, title and publication date from HTML
//! - [`ingestors`] - HTTP page fetcher
//! - [`interchange`] - CSV export and import
//! - [`testing`] - Mock fetcher and in-memory event sink

pub mod error;
pub mod events;
pub mod html;
pub mod ingestors;
pub mod interchange;
pub mod pipeline;
pub mod session;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{DiscoveryError, FetchError, RegistryError, Result, StagingError};
pub use events::DiscoveryEvent;
pub use traits::{
    fetcher::{FetchedPage, PageFetcher},
    registry::ProjectRegistry,
    sink::{EventSink, NullSink, TracingSink},
};
pub use types::{
    candidate::{
        CandidateField, CandidateId, CandidateProject, Classification, ExtractedPerson,
        SourceDocument,
    },
    config::{AlertPolicy, ClassifierConfig, DiscoveryConfig, ExtractorConfig, ImportConfig},
    extraction::ExtractedProject,
    location::City,
    project::{
        ChangeLogEntry, ContactInfo, NewsItem, ProjectId, ProjectRecord, ProjectStatus,
        ProjectType,
    },
};

pub use pipeline::{
    classify, extract, find_match, import_candidates, reconcile_duplicates, DedupOutcome,
    DiscoveryJob, Extractor, ImportAction, ImportContext, ImportOutcome, ImportReport, JobId,
    JobOutcome, JobRunner, JobSource, ScanMode, SkipReason,
};

pub use ingestors::{FetchChannel, HttpFetcher};
pub use interchange::{map_headers, read_candidates_csv, write_candidates_csv, CsvImport, ImportField};
pub use session::DiscoverySession;
pub use stores::{MemoryRegistry, StagingStore};
