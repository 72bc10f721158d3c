//! Engine-level tests over a real on-disk corpus.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use claim_ledger::config::Config;
use claim_ledger::engine::{self, QueryError};
use claim_ledger::validate;

fn claim_json(id: &str, domain: &str, claim: &str, confidence: f64) -> String {
    format!(
        r#"{{
            "@context": "https://schema.org",
            "@type": "KnowledgeClaim",
            "identifier": "{id}",
            "name": "{id} abstract",
            "scenario": {{"domain": "{domain}", "description": "test scenario"}},
            "conclusion": {{"claim": "{claim}", "confidence": {confidence}}}
        }}"#
    )
}

fn write_file(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn setup_corpus() -> (TempDir, Config) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write_file(
        root,
        "a.json",
        &claim_json("x", "health", "Vitamin D prevents rickets", 0.8),
    );
    write_file(
        root,
        "b.json",
        &claim_json("y", "policy", "Seatbelt laws reduce fatalities", 0.3),
    );
    write_file(
        root,
        "nested/c.json",
        &claim_json("w", "health", "Fluoridation reduces caries", 0.6),
    );

    let config = Config::with_data_dir(root);
    (tmp, config)
}

#[test]
fn every_listed_id_round_trips_through_get() {
    let (_tmp, config) = setup_corpus();

    for summary in engine::list(&config).unwrap() {
        let doc = engine::get_by_id(&config, &summary.id).unwrap();
        let derived = doc
            .get("identifier")
            .or_else(|| doc.get("@id"))
            .or_else(|| doc.get("claimId"))
            .and_then(|v| v.as_str())
            .unwrap();
        assert_eq!(derived, summary.id);
    }
}

#[test]
fn search_results_are_a_subset_with_a_matching_field() {
    let (_tmp, config) = setup_corpus();

    let all = engine::list(&config).unwrap();
    let outcome = engine::search(&config, "HEALTH").unwrap();

    assert!(!outcome.results.is_empty());
    for hit in &outcome.results {
        assert!(all.contains(hit));
        let haystack = format!("{} {} {} {}", hit.title, hit.claim, hit.domain, hit.id);
        assert!(haystack.to_lowercase().contains("health"));
    }
}

#[test]
fn filter_keeps_exactly_the_summaries_at_or_above_threshold() {
    let (_tmp, config) = setup_corpus();

    let all = engine::list(&config).unwrap();
    let expected: Vec<_> = all.iter().filter(|s| s.confidence >= 0.5).collect();

    let outcome = engine::filter(&config, Some(0.5), None).unwrap();
    assert_eq!(outcome.results.iter().collect::<Vec<_>>(), expected);

    // Inclusive bound: a summary at exactly the threshold passes.
    let at_bound = engine::filter(&config, Some(0.8), None).unwrap();
    assert!(at_bound.results.iter().any(|s| s.id == "x"));

    // No threshold means no filtering.
    let unfiltered = engine::filter(&config, None, None).unwrap();
    assert_eq!(unfiltered.results, all);
}

#[test]
fn filter_domain_is_exact_and_case_sensitive() {
    let (_tmp, config) = setup_corpus();

    let outcome = engine::filter(&config, None, Some("health")).unwrap();
    assert_eq!(outcome.count, 2);

    let outcome = engine::filter(&config, Some(0.7), Some("health")).unwrap();
    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.results[0].id, "x");

    let outcome = engine::filter(&config, None, Some("Health")).unwrap();
    assert_eq!(outcome.count, 0);
}

#[test]
fn two_file_reference_example() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "a.json", &claim_json("x", "health", "A", 0.8));
    write_file(tmp.path(), "b.json", &claim_json("y", "policy", "B", 0.3));
    let config = Config::with_data_dir(tmp.path());

    let filtered = engine::filter(&config, Some(0.5), None).unwrap();
    assert_eq!(filtered.count, 1);
    assert_eq!(filtered.results[0].id, "x");

    let found = engine::search(&config, "health").unwrap();
    assert_eq!(found.count, 1);
    assert_eq!(found.results[0].id, "x");

    let err = engine::get_by_id(&config, "z").unwrap_err();
    assert!(matches!(err, QueryError::NotFound(_)));
}

#[test]
fn claim_set_documents_expand_into_member_summaries() {
    let tmp = TempDir::new().unwrap();
    write_file(
        tmp.path(),
        "set.json",
        r#"{
            "retainedClaims": [{"claimId": "c1", "claim": "A", "confidence": 0.9}],
            "removedClaims": [{"claimId": "c2", "claim": "B", "confidence": 0.2}]
        }"#,
    );
    let config = Config::with_data_dir(tmp.path());

    let all = engine::list(&config).unwrap();
    let ids: Vec<&str> = all.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
}

#[test]
fn claim_set_member_lookup_names_its_source_file() {
    let tmp = TempDir::new().unwrap();
    write_file(
        tmp.path(),
        "set.json",
        r#"{
            "retainedClaims": [{"claimId": "c1", "claim": "A", "confidence": 0.9, "note": "kept"}],
            "removedClaims": []
        }"#,
    );
    let config = Config::with_data_dir(tmp.path());

    let member = engine::get_by_id(&config, "c1").unwrap();
    assert_eq!(member["source"], "set.json");
    // Extra member fields survive the lookup.
    assert_eq!(member["note"], "kept");
}

#[test]
fn duplicate_ids_resolve_to_the_first_file_in_traversal_order() {
    let tmp = TempDir::new().unwrap();
    // Lexicographic order: a.json before z.json, regardless of creation order.
    write_file(tmp.path(), "z.json", &claim_json("dup", "policy", "later", 0.2));
    write_file(tmp.path(), "a.json", &claim_json("dup", "health", "first", 0.9));
    let config = Config::with_data_dir(tmp.path());

    let doc = engine::get_by_id(&config, "dup").unwrap();
    assert_eq!(doc["scenario"]["domain"], "health");

    let report = validate::validate_by_id(&config, "dup").unwrap();
    assert_eq!(report.filename, "a.json");
}

#[test]
fn corpus_mutation_is_visible_to_the_next_call() {
    let (tmp, config) = setup_corpus();

    assert_eq!(engine::list(&config).unwrap().len(), 3);

    write_file(
        tmp.path(),
        "d.json",
        &claim_json("v", "economics", "Minimum wage effects vary", 0.4),
    );
    assert_eq!(engine::list(&config).unwrap().len(), 4);

    fs::remove_file(tmp.path().join("d.json")).unwrap();
    assert_eq!(engine::list(&config).unwrap().len(), 3);
}

#[test]
fn malformed_files_are_skipped_not_fatal() {
    let (tmp, config) = setup_corpus();

    write_file(tmp.path(), "broken.json", "{definitely not json");
    let all = engine::list(&config).unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn demos_directory_is_optional_but_contributes_when_present() {
    let tmp = TempDir::new().unwrap();
    let abstracts = tmp.path().join("abstracts");
    fs::create_dir_all(&abstracts).unwrap();
    write_file(&abstracts, "a.json", &claim_json("x", "health", "A", 0.8));

    let mut config = Config::with_data_dir(&abstracts);
    config.data.demos_dir = Some(tmp.path().join("demos"));

    // Missing demos directory is empty, not an error.
    assert_eq!(engine::list(&config).unwrap().len(), 1);

    let demos = tmp.path().join("demos");
    fs::create_dir_all(&demos).unwrap();
    write_file(
        &demos,
        "set.json",
        r#"{
            "retainedClaims": [{"claimId": "c1", "claim": "A", "confidence": 0.9}],
            "removedClaims": []
        }"#,
    );
    assert_eq!(engine::list(&config).unwrap().len(), 2);
}

#[test]
fn batch_validation_counts_add_up() {
    let (tmp, config) = setup_corpus();
    write_file(tmp.path(), "incomplete.json", r#"{"identifier": "partial"}"#);

    let batch = validate::validate_all(&config).unwrap();
    assert_eq!(batch.total, 4);
    assert_eq!(batch.valid + batch.invalid, batch.total);
    assert!(batch
        .reports
        .iter()
        .any(|r| r.id == "partial" && !r.report.valid));
}
