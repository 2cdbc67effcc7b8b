//! In-memory project registry.

use chrono::Duration;
use std::path::Path;
use std::sync::RwLock;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::traits::registry::ProjectRegistry;
use crate::types::project::ProjectRecord;

const BUNDLED_SEED: &str = include_str!("../../seed/projects.json");

/// Registry held in memory, newest records first.
///
/// Seeded explicitly at construction; there is no global instance. Data is
/// lost when the process exits.
pub struct MemoryRegistry {
    records: RwLock<Vec<ProjectRecord>>,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Create a registry from existing records, rejecting duplicate ids.
    pub fn from_records(records: Vec<ProjectRecord>) -> RegistryResult<Self> {
        for (i, record) in records.iter().enumerate() {
            if records[..i].iter().any(|r| r.id == record.id) {
                return Err(RegistryError::DuplicateId {
                    id: record.id.to_string(),
                });
            }
        }
        Ok(Self {
            records: RwLock::new(records),
        })
    }

    /// Registry seeded with the bundled sample projects.
    pub fn with_seed() -> RegistryResult<Self> {
        Self::from_json(BUNDLED_SEED)
    }

    /// Registry seeded from a JSON array of records.
    pub fn from_json(json: &str) -> RegistryResult<Self> {
        let records: Vec<ProjectRecord> =
            serde_json::from_str(json).map_err(|e| RegistryError::Seed(e.to_string()))?;
        debug!(count = records.len(), "loaded registry seed");
        Self::from_records(records)
    }

    /// Registry seeded from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Seed(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Get the number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProjectRegistry for MemoryRegistry {
    fn list_projects(&self) -> RegistryResult<Vec<ProjectRecord>> {
        let records = self.records.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(records.clone())
    }

    fn add_project(&self, record: ProjectRecord) -> RegistryResult<()> {
        let mut records = self.records.write().map_err(|_| RegistryError::Poisoned)?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(RegistryError::DuplicateId {
                id: record.id.to_string(),
            });
        }
        debug!(project_id = %record.id, name = %record.name, "registry add");
        records.insert(0, record);
        Ok(())
    }

    fn update_project(&self, mut record: ProjectRecord) -> RegistryResult<()> {
        let mut records = self.records.write().map_err(|_| RegistryError::Poisoned)?;
        let existing = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| RegistryError::NotFound {
                id: record.id.to_string(),
            })?;

        if record.last_updated <= existing.last_updated {
            record.last_updated = existing.last_updated + Duration::milliseconds(1);
        }
        debug!(project_id = %record.id, last_updated = %record.last_updated, "registry update");
        *existing = record;
        Ok(())
    }
}
