//! Testing utilities including mock implementations.
//!
//! Useful for exercising discovery jobs and sessions without network calls,
//! and for asserting on the events the pipeline emits.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::events::DiscoveryEvent;
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::traits::sink::EventSink;
use crate::types::candidate::{CandidateId, CandidateProject, Classification};
use crate::types::location::City;
use crate::types::project::{ProjectId, ProjectRecord, ProjectStatus, ProjectType};

/// A mock fetcher serving canned pages.
///
/// Unknown URLs fail with [`FetchError::Exhausted`].
#[derive(Default, Clone)]
pub struct MockFetcher {
    /// Canned bodies by URL
    pages: Arc<RwLock<HashMap<String, String>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canned body for a URL.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), body.into());
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, url: &Url) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());
        let body = self.pages.read().unwrap().get(url.as_str()).cloned();
        match body {
            Some(body) => Ok(FetchedPage::new(url.clone(), body, "mock")),
            None => Err(FetchError::Exhausted {
                url: url.to_string(),
                attempts: 1,
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Event sink that keeps everything in memory.
#[derive(Default)]
pub struct MemorySink {
    events: RwLock<Vec<DiscoveryEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiscoveryEvent> {
        self.events.read().unwrap().clone()
    }

    /// Event kinds in emission order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.read().unwrap().iter().map(|e| e.kind()).collect()
    }

    pub fn clear(&self) {
        self.events.write().unwrap().clear();
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: DiscoveryEvent) {
        self.events.write().unwrap().push(event);
    }
}

/// A minimal staged candidate: classified New, nothing defaulted.
pub fn candidate(name: &str, city: City, developer: &str) -> CandidateProject {
    CandidateProject {
        id: CandidateId::new(),
        project_name: name.to_string(),
        project_type: ProjectType::Hotel,
        city,
        region: city.region().to_string(),
        developer: developer.to_string(),
        contractor: None,
        consultant: None,
        operator: None,
        status: ProjectStatus::Tender,
        target_opening: None,
        estimated_value: None,
        source_url: "https://news.example.sa/article".to_string(),
        source_title: format!("{name} announced"),
        publish_date: Utc.with_ymd_and_hms(2025, 5, 30, 0, 0, 0).unwrap(),
        summary: format!("{name} in {city}"),
        classification: Classification::New,
        is_duplicate: false,
        existing_project_id: None,
        kitchen_notes: None,
        extracted_people: Vec::new(),
        defaulted_fields: BTreeSet::new(),
    }
}

/// A minimal registry record with status Tender.
pub fn record(id: &str, name: &str, city: City, developer: &str) -> ProjectRecord {
    ProjectRecord {
        id: ProjectId::from(id),
        name: name.to_string(),
        project_type: ProjectType::Hotel,
        city,
        region: city.region().to_string(),
        developer: developer.to_string(),
        contractor: None,
        consultant: None,
        designer: None,
        operator: None,
        status: ProjectStatus::Tender,
        estimated_value_sar: 0.0,
        kl_scope_value_sar: None,
        expected_completion: "TBD".to_string(),
        confidence_score: 0.9,
        tags: Vec::new(),
        last_updated: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        news: Vec::new(),
        history: Vec::new(),
        description: String::new(),
        notes: None,
        contacts: Vec::new(),
    }
}
