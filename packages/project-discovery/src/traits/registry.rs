//! Project registry seam.
//!
//! The registry is the unit of truth for tracked projects. The pipeline never
//! owns it: sessions hold an injected `Arc<dyn ProjectRegistry>` (or a concrete
//! `Arc<R>`) and only go through these operations.

use crate::error::RegistryResult;
use crate::types::project::{ProjectId, ProjectRecord};

/// Shared store of tracked projects.
pub trait ProjectRegistry: Send + Sync {
    /// Snapshot of all records, newest first.
    fn list_projects(&self) -> RegistryResult<Vec<ProjectRecord>>;

    /// Insert a new record. Fails on an id that already exists.
    fn add_project(&self, record: ProjectRecord) -> RegistryResult<()>;

    /// Replace the record with the same id. Fails if it does not exist.
    fn update_project(&self, record: ProjectRecord) -> RegistryResult<()>;

    /// Look up a single record.
    fn get_project(&self, id: &ProjectId) -> RegistryResult<Option<ProjectRecord>> {
        Ok(self.list_projects()?.into_iter().find(|p| &p.id == id))
    }
}
