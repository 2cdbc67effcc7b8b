//! Transient holding area for candidates awaiting review.

use std::collections::HashSet;

use crate::error::{StagingError, StagingResult};
use crate::types::candidate::{CandidateId, CandidateProject};

/// Ordered list of staged candidates, newest batch first.
///
/// Nothing here is persisted.
#[derive(Debug, Clone, Default)]
pub struct StagingStore {
    items: Vec<CandidateProject>,
}

impl StagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CandidateProject] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: CandidateId) -> Option<&CandidateProject> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: CandidateId) -> bool {
        self.get(id).is_some()
    }

    /// Prepend a batch, keeping its internal order.
    ///
    /// Candidates whose id is already staged (or repeated within the batch)
    /// are ignored. Returns how many were added.
    pub fn add_batch(&mut self, batch: Vec<CandidateProject>) -> usize {
        let mut seen: HashSet<CandidateId> = self.items.iter().map(|c| c.id).collect();
        let fresh: Vec<CandidateProject> = batch
            .into_iter()
            .filter(|c| seen.insert(c.id))
            .collect();
        let added = fresh.len();
        self.items.splice(0..0, fresh);
        added
    }

    /// Remove the given ids, returning the removed candidates in staging order.
    pub fn remove(&mut self, ids: &HashSet<CandidateId>) -> Vec<CandidateProject> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|c| ids.contains(&c.id));
        self.items = kept;
        removed
    }

    /// Swap in a fully annotated list. Ids must be unique.
    pub fn replace_all(&mut self, items: Vec<CandidateProject>) -> StagingResult<()> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(StagingError::DuplicateId {
                    id: item.id.to_string(),
                });
            }
        }
        self.items = items;
        Ok(())
    }

    /// Replace one candidate by id (operator edit).
    pub fn update(&mut self, candidate: CandidateProject) -> StagingResult<()> {
        let slot = self
            .items
            .iter_mut()
            .find(|c| c.id == candidate.id)
            .ok_or_else(|| StagingError::NotFound {
                id: candidate.id.to_string(),
            })?;
        *slot = candidate;
        Ok(())
    }

    /// Candidates with defaulted fields or a Review classification.
    pub fn needs_review(&self) -> Vec<&CandidateProject> {
        self.items.iter().filter(|c| c.needs_review()).collect()
    }

    pub fn duplicates(&self) -> Vec<&CandidateProject> {
        self.items.iter().filter(|c| c.is_duplicate).collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::candidate;
    use crate::types::candidate::{CandidateField, Classification};
    use crate::types::location::City;

    fn names(store: &StagingStore) -> Vec<&str> {
        store.items().iter().map(|c| c.project_name.as_str()).collect()
    }

    #[test]
    fn test_add_batch_prepends_in_batch_order() {
        let mut store = StagingStore::new();
        store.add_batch(vec![candidate("A", City::Riyadh, "X")]);
        store.add_batch(vec![
            candidate("B", City::Riyadh, "X"),
            candidate("C", City::Riyadh, "X"),
        ]);
        assert_eq!(names(&store), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_add_batch_ignores_known_ids() {
        let mut store = StagingStore::new();
        let a = candidate("A", City::Riyadh, "X");
        store.add_batch(vec![a.clone()]);
        let added = store.add_batch(vec![a.clone(), a]);
        assert_eq!(added, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_returns_removed_and_keeps_order() {
        let mut store = StagingStore::new();
        let batch = vec![
            candidate("A", City::Riyadh, "X"),
            candidate("B", City::Riyadh, "X"),
            candidate("C", City::Riyadh, "X"),
        ];
        let b_id = batch[1].id;
        store.add_batch(batch);

        let removed = store.remove(&HashSet::from([b_id]));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].project_name, "B");
        assert_eq!(names(&store), vec!["A", "C"]);
    }

    #[test]
    fn test_replace_all_rejects_duplicate_ids() {
        let mut store = StagingStore::new();
        let a = candidate("A", City::Riyadh, "X");
        let result = store.replace_all(vec![a.clone(), a]);
        assert!(matches!(result, Err(StagingError::DuplicateId { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_replaces_by_id() {
        let mut store = StagingStore::new();
        let a = candidate("A", City::Riyadh, "X");
        store.add_batch(vec![a.clone()]);

        let mut edited = a;
        edited.project_name = "A (edited)".to_string();
        store.update(edited).unwrap();
        assert_eq!(names(&store), vec!["A (edited)"]);

        let stranger = candidate("Z", City::Abha, "Y");
        assert!(matches!(store.update(stranger), Err(StagingError::NotFound { .. })));
    }

    #[test]
    fn test_needs_review_filters() {
        let mut store = StagingStore::new();
        let clean = candidate("Clean", City::Riyadh, "X");
        let mut review = candidate("Review", City::Riyadh, "X");
        review.classification = Classification::Review;
        let mut defaulted = candidate("Defaulted", City::Riyadh, "X");
        defaulted.defaulted_fields.insert(CandidateField::City);
        store.add_batch(vec![clean, review, defaulted]);

        let flagged: Vec<_> = store.needs_review().iter().map(|c| c.project_name.clone()).collect();
        assert_eq!(flagged, vec!["Review", "Defaulted"]);
    }
}
