//! Query engine: list, lookup-by-id, search, and confidence filtering.
//!
//! Every operation re-derives the corpus from disk through the loader and
//! scans it linearly. Input validation happens before any filesystem
//! access, so a bad query parameter never costs a directory walk.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::loader;
use crate::models::{AbstractDocument, Summary};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// Response body for a search: the echoed query, hit count, and hits.
#[derive(Debug, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub count: usize,
    pub results: Vec<Summary>,
}

/// Response body for a confidence filter.
#[derive(Debug, Serialize)]
pub struct FilterOutcome {
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub count: usize,
    pub results: Vec<Summary>,
}

/// All summaries in traversal order.
pub fn list(config: &Config) -> Result<Vec<Summary>, QueryError> {
    Ok(loader::summaries(config)?)
}

/// Finds the full original document whose `identifier`, `@id`, or (for
/// claim-set members) `claimId` equals `id`.
///
/// First match in traversal order wins; duplicate ids are resolved by
/// order, never reported as an error. A claim-set member is returned as
/// the member object plus a `source` field naming its containing file.
pub fn get_by_id(config: &Config, id: &str) -> Result<Value, QueryError> {
    for loaded in loader::load_all(config)? {
        match &loaded.doc {
            AbstractDocument::Claim(doc) => {
                if doc.id() == Some(id) {
                    return Ok(loaded.raw);
                }
            }
            AbstractDocument::ClaimSet(_) => {
                if let Some(member) = find_member(&loaded.raw, id) {
                    let mut member = member.clone();
                    if let Some(obj) = member.as_object_mut() {
                        obj.insert("source".to_string(), Value::String(loaded.filename.clone()));
                    }
                    return Ok(member);
                }
            }
        }
    }

    Err(QueryError::NotFound(format!("no abstract with id: {}", id)))
}

/// Scans the raw claim-set arrays so a matched member keeps any extra
/// fields the typed model does not carry.
fn find_member<'a>(raw: &'a Value, id: &str) -> Option<&'a Value> {
    ["retainedClaims", "removedClaims"]
        .iter()
        .filter_map(|key| raw.get(key).and_then(Value::as_array))
        .flatten()
        .find(|entry| entry.get("claimId").and_then(Value::as_str) == Some(id))
}

/// Case-insensitive substring search over title, claim, domain, and id.
///
/// An empty or blank query is a caller error, rejected before the corpus
/// is read.
pub fn search(config: &Config, query: &str) -> Result<SearchOutcome, QueryError> {
    if query.trim().is_empty() {
        return Err(QueryError::InvalidInput(
            "query parameter \"q\" is required".to_string(),
        ));
    }

    let needle = query.to_lowercase();
    let results: Vec<Summary> = loader::summaries(config)?
        .into_iter()
        .filter(|s| {
            s.title.to_lowercase().contains(&needle)
                || s.claim.to_lowercase().contains(&needle)
                || s.domain.to_lowercase().contains(&needle)
                || s.id.to_lowercase().contains(&needle)
        })
        .collect();

    Ok(SearchOutcome {
        query: query.to_string(),
        count: results.len(),
        results,
    })
}

/// Keeps summaries with `confidence >= min_confidence` (inclusive) and,
/// when given, an exactly equal domain. Absent predicates pass everything.
pub fn filter(
    config: &Config,
    min_confidence: Option<f64>,
    domain: Option<&str>,
) -> Result<FilterOutcome, QueryError> {
    if let Some(threshold) = min_confidence {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(QueryError::InvalidInput(
                "threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
    }

    let results: Vec<Summary> = loader::summaries(config)?
        .into_iter()
        .filter(|s| min_confidence.map_or(true, |t| s.confidence >= t))
        .filter(|s| domain.map_or(true, |d| s.domain == d))
        .collect();

    Ok(FilterOutcome {
        threshold: min_confidence,
        domain: domain.map(str::to_string),
        count: results.len(),
        results,
    })
}

// ============ CLI entry points ============

/// CLI entry point — lists the corpus to stdout.
pub fn run_list(config: &Config) -> anyhow::Result<()> {
    let summaries = exit_on_query_error(list(config));

    println!("{} abstracts", summaries.len());
    for s in &summaries {
        print_summary(s);
    }
    Ok(())
}

/// CLI entry point — prints the full document for an id.
pub fn run_get(config: &Config, id: &str) -> anyhow::Result<()> {
    let doc = exit_on_query_error(get_by_id(config, id));
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// CLI entry point — searches and prints hits.
pub fn run_search(config: &Config, query: &str) -> anyhow::Result<()> {
    let outcome = exit_on_query_error(search(config, query));

    if outcome.results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!("{} results for \"{}\"", outcome.count, outcome.query);
    for s in &outcome.results {
        print_summary(s);
    }
    Ok(())
}

/// CLI entry point — filters by confidence threshold and domain.
pub fn run_filter(
    config: &Config,
    threshold: Option<f64>,
    domain: Option<&str>,
) -> anyhow::Result<()> {
    let outcome = exit_on_query_error(filter(config, threshold, domain));

    match outcome.threshold {
        Some(t) => println!("{} abstracts at confidence >= {}", outcome.count, t),
        None => println!("{} abstracts", outcome.count),
    }
    for s in &outcome.results {
        print_summary(s);
    }
    Ok(())
}

fn print_summary(s: &Summary) {
    let claim = if s.claim.is_empty() {
        "(no claim)"
    } else {
        &s.claim
    };
    println!("  [{:.2}] {} ({}) — {}", s.confidence, s.id, s.domain, claim);
}

fn exit_on_query_error<T>(result: Result<T, QueryError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Input validation must reject before any filesystem access, so a
    // config pointing nowhere still yields InvalidInput, not Io.
    #[test]
    fn search_rejects_blank_query_before_scanning() {
        let config = Config::with_data_dir("/nonexistent");
        let err = search(&config, "   ").unwrap_err();
        assert!(matches!(err, QueryError::InvalidInput(_)));
    }

    #[test]
    fn filter_rejects_out_of_range_threshold_before_scanning() {
        let config = Config::with_data_dir("/nonexistent");
        let err = filter(&config, Some(1.5), None).unwrap_err();
        assert!(matches!(err, QueryError::InvalidInput(_)));

        let err = filter(&config, Some(-0.1), None).unwrap_err();
        assert!(matches!(err, QueryError::InvalidInput(_)));
    }

    #[test]
    fn missing_corpus_is_an_io_error() {
        let config = Config::with_data_dir("/nonexistent");
        assert!(matches!(list(&config).unwrap_err(), QueryError::Io(_)));
    }
}
