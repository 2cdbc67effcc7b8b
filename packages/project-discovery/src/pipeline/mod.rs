//! Discovery pipeline: extract → classify → match → import.

pub mod classify;
pub mod dedup;
pub mod extract;
pub mod jobs;
pub mod reconcile;

pub use classify::{classify, ScanMode};
pub use dedup::{find_match, reconcile_duplicates, DedupOutcome};
pub use extract::{extract, Extractor};
pub use jobs::{DiscoveryJob, JobId, JobOutcome, JobRunner, JobSource};
pub use reconcile::{
    import_candidates, ImportAction, ImportContext, ImportOutcome, ImportReport, SkipReason,
};
