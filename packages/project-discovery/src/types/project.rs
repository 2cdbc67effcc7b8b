//! Registry records: the unit of truth for tracked projects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::location::City;

/// Stable registry identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Fresh id for a record created from a crawled candidate.
    pub fn crawled() -> Self {
        Self(format!("crawled-{}", Uuid::now_v7()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectType {
    Hotel,
    Hospital,
    #[serde(rename = "Central Kitchen")]
    CentralKitchen,
    Restaurant,
    Franchise,
    Entertainment,
    Resort,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Hotel => "Hotel",
            ProjectType::Hospital => "Hospital",
            ProjectType::CentralKitchen => "Central Kitchen",
            ProjectType::Restaurant => "Restaurant",
            ProjectType::Franchise => "Franchise",
            ProjectType::Entertainment => "Entertainment",
            ProjectType::Resort => "Resort",
        }
    }
}

impl Default for ProjectType {
    fn default() -> Self {
        ProjectType::Hotel
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hotel" => Ok(ProjectType::Hotel),
            "hospital" => Ok(ProjectType::Hospital),
            "central kitchen" | "central_kitchen" => Ok(ProjectType::CentralKitchen),
            "restaurant" => Ok(ProjectType::Restaurant),
            "franchise" => Ok(ProjectType::Franchise),
            "entertainment" => Ok(ProjectType::Entertainment),
            "resort" => Ok(ProjectType::Resort),
            other => Err(format!("unknown project type: {other}")),
        }
    }
}

/// Pipeline stage of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Tender,
    Ongoing,
    Awarded,
    Stalled,
    Completed,
    Lost,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Tender => "Tender",
            ProjectStatus::Ongoing => "Ongoing",
            ProjectStatus::Awarded => "Awarded",
            ProjectStatus::Stalled => "Stalled",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Lost => "Lost",
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Tender
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tender" => Ok(ProjectStatus::Tender),
            "ongoing" => Ok(ProjectStatus::Ongoing),
            "awarded" => Ok(ProjectStatus::Awarded),
            "stalled" => Ok(ProjectStatus::Stalled),
            "completed" => Ok(ProjectStatus::Completed),
            "lost" => Ok(ProjectStatus::Lost),
            other => Err(format!("unknown project status: {other}")),
        }
    }
}

/// A press/news mention attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub source: String,
    pub date: String,
    pub snippet: String,
    pub url: String,
    pub confidence_score: f32,
}

/// One entry in a project's change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    pub date: DateTime<Utc>,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub user: String,
}

/// A named contact on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A tracked project in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub city: City,
    pub region: String,
    pub developer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    pub status: ProjectStatus,
    #[serde(rename = "estimatedValueSAR")]
    pub estimated_value_sar: f64,
    /// Kitchen & laundry package value
    #[serde(default, rename = "expectedKLScopeValue", skip_serializing_if = "Option::is_none")]
    pub kl_scope_value_sar: Option<f64>,
    pub expected_completion: String,
    pub confidence_score: f32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub history: Vec<ChangeLogEntry>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub contacts: Vec<ContactInfo>,
}
