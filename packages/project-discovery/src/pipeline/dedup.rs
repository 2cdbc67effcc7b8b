//! Duplicate detection against the project registry.

use crate::types::candidate::CandidateProject;
use crate::types::project::ProjectRecord;

/// Result of a matcher run.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutcome {
    pub candidates: Vec<CandidateProject>,
    /// Candidates whose duplicate flag or link was rewritten.
    pub changed: usize,
}

impl DedupOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.changed == 0
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// First registry record matching the candidate, if any.
///
/// A record matches on equal names, or on the same city with an equal
/// developer. The city+developer key is skipped when the candidate's
/// developer is missing or was defaulted by the extractor.
pub fn find_match<'a>(
    candidate: &CandidateProject,
    registry: &'a [ProjectRecord],
) -> Option<&'a ProjectRecord> {
    let name = normalize(&candidate.project_name);
    let developer = candidate.known_developer().map(normalize);

    registry.iter().find(|record| {
        if !name.is_empty() && normalize(&record.name) == name {
            return true;
        }
        match &developer {
            Some(developer) => {
                record.city == candidate.city && normalize(&record.developer) == *developer
            }
            None => false,
        }
    })
}

/// Re-derive duplicate flags and links for every candidate.
///
/// Candidates whose `(is_duplicate, existing_project_id)` pair is already
/// correct are returned untouched, so running twice on the same inputs
/// reports zero changes the second time.
pub fn reconcile_duplicates(
    candidates: &[CandidateProject],
    registry: &[ProjectRecord],
) -> DedupOutcome {
    let mut changed = 0;
    let candidates = candidates
        .iter()
        .map(|candidate| {
            let link = find_match(candidate, registry).map(|r| r.id.clone());
            let is_duplicate = link.is_some();
            if candidate.is_duplicate == is_duplicate && candidate.existing_project_id == link {
                return candidate.clone();
            }
            changed += 1;
            let mut updated = candidate.clone();
            updated.is_duplicate = is_duplicate;
            updated.existing_project_id = link;
            updated
        })
        .collect();

    DedupOutcome {
        candidates,
        changed,
    }
}
