//! Publication-age classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::candidate::Classification;
use crate::types::config::ClassifierConfig;

/// Which publication windows a scan is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Recent announcements only.
    #[default]
    Fresh,
    /// Older, still-relevant announcements.
    Backlog,
    /// Both windows.
    Combined,
}

impl ScanMode {
    fn includes_fresh(self) -> bool {
        matches!(self, ScanMode::Fresh | ScanMode::Combined)
    }

    fn includes_backlog(self) -> bool {
        matches!(self, ScanMode::Backlog | ScanMode::Combined)
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanMode::Fresh => "fresh",
            ScanMode::Backlog => "backlog",
            ScanMode::Combined => "combined",
        };
        f.write_str(s)
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fresh" => Ok(ScanMode::Fresh),
            "backlog" => Ok(ScanMode::Backlog),
            "combined" | "both" => Ok(ScanMode::Combined),
            other => Err(format!("unknown scan mode: {other}")),
        }
    }
}

/// Tag a candidate by how old its source publication is.
///
/// Age is counted in whole days before `now`. Publication dates in the
/// future, and ages outside every window the mode looks at, land in
/// [`Classification::Review`].
pub fn classify(
    publish_date: DateTime<Utc>,
    mode: ScanMode,
    now: DateTime<Utc>,
    config: &ClassifierConfig,
) -> Classification {
    let age = now.signed_duration_since(publish_date);
    if age < chrono::Duration::zero() {
        return Classification::Review;
    }
    let days = age.num_days();

    if mode.includes_fresh() && days <= config.fresh_max_days {
        Classification::New
    } else if mode.includes_backlog()
        && (config.backlog_min_days..=config.backlog_max_days).contains(&days)
    {
        Classification::Backlog
    } else {
        Classification::Review
    }
}
