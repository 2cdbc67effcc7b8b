use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use project_discovery::{
    AlertPolicy, DiscoveryConfig, ExtractorConfig, FetchChannel, HttpFetcher, MemoryRegistry,
};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry JSON to load instead of the bundled seed
    pub seed_path: Option<PathBuf>,
    pub actor: String,
    pub fetch_channels: Vec<FetchChannel>,
    pub fetch_timeout: Duration,
    pub usd_to_sar: f64,
    pub high_value_sar: f64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = DiscoveryConfig::default();

        let fetch_channels = match lookup("INTEL_FETCH_PROXIES") {
            Some(raw) => raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|spec| {
                    FetchChannel::parse(spec)
                        .ok_or_else(|| anyhow!("invalid fetch channel '{}'", spec.trim()))
                })
                .collect::<Result<Vec<_>>>()
                .context("INTEL_FETCH_PROXIES must list direct, json:<template> or raw:<prefix>")?,
            None => HttpFetcher::default_channels(),
        };

        Ok(Self {
            seed_path: lookup("INTEL_SEED_PATH").map(PathBuf::from),
            actor: lookup("INTEL_ACTOR").unwrap_or_else(|| "Crawler Bot".to_string()),
            fetch_channels,
            fetch_timeout: Duration::from_secs(
                lookup("INTEL_FETCH_TIMEOUT_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .context("INTEL_FETCH_TIMEOUT_SECS must be a valid number")?,
            ),
            usd_to_sar: match lookup("INTEL_USD_TO_SAR") {
                Some(v) => v.parse().context("INTEL_USD_TO_SAR must be a valid number")?,
                None => defaults.extractor.usd_to_sar,
            },
            high_value_sar: match lookup("INTEL_HIGH_VALUE_SAR") {
                Some(v) => v
                    .parse()
                    .context("INTEL_HIGH_VALUE_SAR must be a valid number")?,
                None => defaults.alerts.high_value_threshold_sar,
            },
        })
    }

    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig::default()
            .with_extractor(ExtractorConfig::default().with_usd_to_sar(self.usd_to_sar))
            .with_alerts(AlertPolicy::default().with_high_value_threshold(self.high_value_sar))
    }

    pub fn fetcher(&self) -> Result<HttpFetcher> {
        Ok(HttpFetcher::with_timeout(self.fetch_timeout)
            .context("Failed to build HTTP client")?
            .with_channels(self.fetch_channels.clone()))
    }

    pub fn registry(&self) -> Result<MemoryRegistry> {
        match &self.seed_path {
            Some(path) => MemoryRegistry::from_json_path(path)
                .with_context(|| format!("Failed to load registry from {}", path.display())),
            None => MemoryRegistry::with_seed().context("Failed to load bundled seed registry"),
        }
    }
}
