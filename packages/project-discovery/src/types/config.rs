//! Configuration types for extraction, classification and import.

use serde::{Deserialize, Serialize};

/// Configuration for the whole discovery pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub extractor: ExtractorConfig,
    pub classifier: ClassifierConfig,
    pub import: ImportConfig,
    pub alerts: AlertPolicy,
}

impl DiscoveryConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extractor(mut self, extractor: ExtractorConfig) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_import(mut self, import: ImportConfig) -> Self {
        self.import = import;
        self
    }

    pub fn with_alerts(mut self, alerts: AlertPolicy) -> Self {
        self.alerts = alerts;
        self
    }
}

/// Tunables for the rule-based entity extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Body characters scanned for keywords. Bounds cost on long documents.
    ///
    /// Default: 3000.
    pub search_window_chars: usize,

    /// Leading characters searched for a project name when no title is given.
    ///
    /// Default: 150.
    pub name_window_chars: usize,

    /// Maximum summary length, ellipsis included.
    ///
    /// Default: 300.
    pub summary_chars: usize,

    /// Fixed USD→SAR rate applied to `$`/`USD` amounts.
    ///
    /// Default: 3.75.
    pub usd_to_sar: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            search_window_chars: 3000,
            name_window_chars: 150,
            summary_chars: 300,
            usd_to_sar: 3.75,
        }
    }
}

impl ExtractorConfig {
    pub fn with_usd_to_sar(mut self, rate: f64) -> Self {
        self.usd_to_sar = rate;
        self
    }

    pub fn with_search_window(mut self, chars: usize) -> Self {
        self.search_window_chars = chars;
        self
    }
}

/// Publication-age windows used by the classifier, in whole days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Default: 7.
    pub fresh_max_days: i64,
    /// Default: 365.
    pub backlog_min_days: i64,
    /// Default: 730.
    pub backlog_max_days: i64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            fresh_max_days: 7,
            backlog_min_days: 365,
            backlog_max_days: 730,
        }
    }
}

/// How imported candidates are written into the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Confidence given to records created from crawled candidates.
    ///
    /// Default: 0.85.
    pub crawled_confidence: f32,

    /// Confidence of synthesized news items (directly observed).
    ///
    /// Default: 1.0.
    pub news_confidence: f32,

    /// `source` written on synthesized news items.
    pub news_source: String,

    /// Tag added next to the classification on created records.
    pub created_tag: String,

    /// Expected completion written when the candidate has no target date.
    pub unknown_completion: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            crawled_confidence: 0.85,
            news_confidence: 1.0,
            news_source: "Crawler".to_string(),
            created_tag: "Crawled".to_string(),
            unknown_completion: "TBD".to_string(),
        }
    }
}

impl ImportConfig {
    pub fn with_created_tag(mut self, tag: impl Into<String>) -> Self {
        self.created_tag = tag.into();
        self
    }

    pub fn with_news_source(mut self, source: impl Into<String>) -> Self {
        self.news_source = source.into();
        self
    }
}

/// Which imports raise alert events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub notify_on_new_project: bool,
    pub notify_on_high_value: bool,

    /// Default: 500,000,000 SAR.
    pub high_value_threshold_sar: f64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            notify_on_new_project: true,
            notify_on_high_value: true,
            high_value_threshold_sar: 500_000_000.0,
        }
    }
}

impl AlertPolicy {
    pub fn with_high_value_threshold(mut self, sar: f64) -> Self {
        self.high_value_threshold_sar = sar;
        self
    }

    /// True if a project of this value should raise a high-value alert.
    pub fn is_high_value(&self, value_sar: f64) -> bool {
        self.notify_on_high_value && value_sar >= self.high_value_threshold_sar
    }
}
