// Property-based tests for duplicate matching and extraction.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use project_discovery::testing::{candidate, record};
use project_discovery::{
    extract, find_match, reconcile_duplicates, CandidateField, CandidateProject, City,
    ProjectId, ProjectRecord,
};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small name pool so candidates and records collide often.
fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(vec!["Alpha", "Beta", "Gamma", "Delta"]).prop_map(String::from),
        1 => r"[A-Za-z ]{1,12}",
    ]
}

fn arb_developer() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["ROSHN", "PIF", "Red Sea Global", "Unknown Developer"])
        .prop_map(String::from)
}

fn arb_city() -> impl Strategy<Value = City> {
    prop::sample::select(City::ALL.to_vec())
}

fn arb_record() -> impl Strategy<Value = (String, City, String)> {
    (arb_name(), arb_city(), arb_developer())
}

/// Candidate with a random (possibly stale) duplicate link.
fn arb_candidate() -> impl Strategy<Value = CandidateProject> {
    (
        arb_name(),
        arb_city(),
        arb_developer(),
        any::<bool>(),
        prop::option::of(r"p[0-9]{1,2}"),
        any::<bool>(),
    )
        .prop_map(|(name, city, dev, is_dup, link, dev_defaulted)| {
            let mut c = candidate(&name, city, &dev);
            c.is_duplicate = is_dup;
            c.existing_project_id = link.as_deref().map(ProjectId::from);
            if dev_defaulted {
                c.defaulted_fields.insert(CandidateField::Developer);
            }
            c
        })
}

fn build_registry(rows: Vec<(String, City, String)>) -> Vec<ProjectRecord> {
    rows.into_iter()
        .enumerate()
        .map(|(i, (name, city, dev))| record(&format!("p{i}"), &name, city, &dev))
        .collect()
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// A second matcher run over its own output changes nothing.
    #[test]
    fn reconcile_is_idempotent(
        rows in prop::collection::vec(arb_record(), 0..8),
        candidates in prop::collection::vec(arb_candidate(), 0..12),
    ) {
        let registry = build_registry(rows);
        let first = reconcile_duplicates(&candidates, &registry);
        let second = reconcile_duplicates(&first.candidates, &registry);

        prop_assert!(second.is_unchanged());
        prop_assert_eq!(&first.candidates, &second.candidates);
    }

    /// Flags and links always agree, and links point at real records.
    #[test]
    fn links_point_into_registry(
        rows in prop::collection::vec(arb_record(), 0..8),
        candidates in prop::collection::vec(arb_candidate(), 0..12),
    ) {
        let registry = build_registry(rows);
        let outcome = reconcile_duplicates(&candidates, &registry);

        prop_assert_eq!(outcome.candidates.len(), candidates.len());
        for c in &outcome.candidates {
            prop_assert_eq!(c.is_duplicate, c.existing_project_id.is_some());
            if let Some(link) = &c.existing_project_id {
                prop_assert!(registry.iter().any(|r| &r.id == link));
            }
        }
    }

    /// Only the duplicate pair is rewritten; the rest of the candidate is kept.
    #[test]
    fn reconcile_preserves_candidate_content(
        rows in prop::collection::vec(arb_record(), 0..8),
        candidates in prop::collection::vec(arb_candidate(), 0..12),
    ) {
        let registry = build_registry(rows);
        let outcome = reconcile_duplicates(&candidates, &registry);

        for (before, after) in candidates.iter().zip(&outcome.candidates) {
            prop_assert_eq!(before.id, after.id);
            prop_assert_eq!(&before.project_name, &after.project_name);
            prop_assert_eq!(&before.developer, &after.developer);
            prop_assert_eq!(before.city, after.city);
        }
    }

    /// A defaulted developer never produces a city+developer match.
    #[test]
    fn defaulted_developer_matches_by_name_only(
        rows in prop::collection::vec(arb_record(), 0..8),
        c in arb_candidate(),
    ) {
        let registry = build_registry(rows);
        let mut c = c;
        c.defaulted_fields.insert(CandidateField::Developer);

        if let Some(found) = find_match(&c, &registry) {
            prop_assert_eq!(
                found.name.trim().to_lowercase(),
                c.project_name.trim().to_lowercase()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// Arbitrary text (Arabic included) never panics and keeps summaries short.
    #[test]
    fn extract_is_total(text in r"[\PC]{0,600}") {
        let result = extract(&text, None);

        prop_assert!(result.summary.chars().count() <= 300);
        prop_assert!(City::ALL.contains(&result.city));
        prop_assert_eq!(result.region.as_str(), result.city.region());
        prop_assert!(result.estimated_value >= 0.0);
        if result.is_defaulted(CandidateField::EstimatedValue) {
            prop_assert_eq!(result.estimated_value, 0.0);
        }
    }

    /// Same input, same output.
    #[test]
    fn extract_is_deterministic(text in r"[\PC]{0,300}", title in prop::option::of(r"[A-Za-z ]{1,20}")) {
        let a = extract(&text, title.as_deref());
        let b = extract(&text, title.as_deref());
        prop_assert_eq!(a, b);
    }
}
