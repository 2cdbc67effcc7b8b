//! Page fetch seam.
//!
//! Jobs only need "give me the text behind this URL". How that happens
//! (direct request, proxy, canned fixture) is the implementor's business.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::FetchResult;

/// Raw body returned by a fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: Url,

    /// Raw body, usually HTML
    pub body: String,

    /// Which channel produced the body (e.g. "direct", "json-proxy")
    pub channel: String,

    /// SHA-256 of the body, hex encoded
    pub content_hash: String,

    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    pub fn new(url: Url, body: impl Into<String>, channel: impl Into<String>) -> Self {
        let body = body.into();
        let content_hash = hex::encode(Sha256::digest(body.as_bytes()));
        Self {
            url,
            body,
            channel: channel.into(),
            content_hash,
            fetched_at: Utc::now(),
        }
    }
}

/// Fetches the raw content behind a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page. Implementations decide their own fallbacks; an error
    /// means no usable text could be obtained.
    async fn fetch_page(&self, url: &Url) -> FetchResult<FetchedPage>;

    /// Short name for logs and events.
    fn name(&self) -> &str;
}
