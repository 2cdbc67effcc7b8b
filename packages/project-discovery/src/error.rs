//! Typed errors for the discovery pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match on
//! registry, staging and fetch failures separately.

use thiserror::Error;

/// Errors that can occur anywhere in the discovery pipeline.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Project registry rejected an operation
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Staging store rejected an operation
    #[error("staging error: {0}")]
    Staging(#[from] StagingError),

    /// Page fetch failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// CSV read/write failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a [`crate::traits::registry::ProjectRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A record with this id already exists
    #[error("duplicate project id: {id}")]
    DuplicateId { id: String },

    /// No record with this id
    #[error("project not found: {id}")]
    NotFound { id: String },

    /// The registry lock was poisoned by a panicking writer
    #[error("registry lock poisoned")]
    Poisoned,

    /// Seed data could not be loaded
    #[error("invalid seed data: {0}")]
    Seed(String),
}

/// Errors raised by the staging store.
#[derive(Debug, Error)]
pub enum StagingError {
    /// The same temporary id appears twice
    #[error("duplicate candidate id: {id}")]
    DuplicateId { id: String },

    /// No staged candidate with this id
    #[error("candidate not found: {id}")]
    NotFound { id: String },
}

/// Errors that can occur while fetching page text.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success status code
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Response carried no usable content
    #[error("empty response from: {url}")]
    EmptyBody { url: String },

    /// Every configured channel failed
    #[error("all {attempts} fetch channels failed for: {url}")]
    Exhausted { url: String, attempts: usize },
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Result type alias for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Result type alias for staging operations.
pub type StagingResult<T> = std::result::Result<T, StagingError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
