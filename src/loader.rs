//! Document loader: discovery, parsing, and summary projection.
//!
//! The corpus is re-read from disk on every call. There is no cache or
//! memoization anywhere in this module; mutating the data directory is
//! reflected by the next call.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::models::{AbstractDocument, LoadedDocument, Summary};

/// Enumerates every corpus file: the abstracts directory (required,
/// scanned recursively) followed by the demos directory (optional).
///
/// Paths within each root are sorted lexicographically by relative path,
/// making traversal order (and therefore duplicate-id resolution)
/// deterministic.
pub fn discover(config: &Config) -> Result<Vec<PathBuf>> {
    let include_set = build_globset(&config.data.include_globs)?;

    let root = &config.data.abstracts_dir;
    if !root.exists() {
        bail!("abstracts directory does not exist: {}", root.display());
    }

    let mut paths = scan_root(root, &include_set)?;

    // The demos directory is a legacy location; missing means empty.
    if let Some(demos) = &config.data.demos_dir {
        if demos.exists() {
            paths.extend(scan_root(demos, &include_set)?);
        }
    }

    Ok(paths)
}

fn scan_root(root: &Path, include_set: &GlobSet) -> Result<Vec<PathBuf>> {
    let mut relative: Vec<(String, PathBuf)> = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let rel_str = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        if !include_set.is_match(&rel_str) {
            continue;
        }

        relative.push((rel_str, path.to_path_buf()));
    }

    relative.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(relative.into_iter().map(|(_, path)| path).collect())
}

/// Reads and parses one corpus file.
///
/// Read and parse failures are diagnostics, not errors: the file is
/// logged and skipped so one malformed document never fails a batch.
pub fn load(path: &Path) -> Option<LoadedDocument> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
            return None;
        }
    };

    let raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping malformed JSON");
            return None;
        }
    };

    let doc: AbstractDocument = match serde_json::from_value(raw.clone()) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unrecognized document shape");
            return None;
        }
    };

    Some(LoadedDocument { filename, raw, doc })
}

/// Projects a loaded document into its summaries.
///
/// A plain claim document yields one summary; a claim-set document yields
/// one per member claim (retained before removed), each inheriting the
/// set's domain.
pub fn summarize(loaded: &LoadedDocument) -> Vec<Summary> {
    match &loaded.doc {
        AbstractDocument::Claim(doc) => {
            let (claim, confidence) = match &doc.conclusion {
                Some(c) => (
                    c.claim.clone().unwrap_or_default(),
                    c.confidence.unwrap_or(0.0),
                ),
                None => (String::new(), 0.0),
            };

            vec![Summary {
                id: doc.id().unwrap_or_default().to_string(),
                title: doc.name.clone().unwrap_or_else(|| "Untitled".to_string()),
                claim,
                confidence,
                domain: doc
                    .scenario
                    .as_ref()
                    .and_then(|s| s.domain.clone())
                    .unwrap_or_else(|| "unknown".to_string()),
                kind: doc
                    .at_type
                    .clone()
                    .unwrap_or_else(|| "KnowledgeClaim".to_string()),
                filename: loaded.filename.clone(),
            }]
        }
        AbstractDocument::ClaimSet(set) => {
            let domain = set
                .scenario
                .as_ref()
                .and_then(|s| s.domain.clone())
                .unwrap_or_else(|| "scientific".to_string());

            set.members()
                .map(|entry| Summary {
                    id: entry.claim_id.clone().unwrap_or_default(),
                    title: "Untitled".to_string(),
                    claim: entry.claim.clone().unwrap_or_default(),
                    confidence: entry.confidence.unwrap_or(0.0),
                    domain: domain.clone(),
                    kind: "KnowledgeClaim".to_string(),
                    filename: loaded.filename.clone(),
                })
                .collect()
        }
    }
}

/// Discovers and loads the whole corpus, skipping unparseable files.
pub fn load_all(config: &Config) -> Result<Vec<LoadedDocument>> {
    let paths = discover(config)?;
    Ok(paths.iter().filter_map(|p| load(p)).collect())
}

/// The flattened summary view of the corpus, in traversal order.
pub fn summaries(config: &Config) -> Result<Vec<Summary>> {
    let documents = load_all(config)?;
    Ok(documents.iter().flat_map(summarize).collect())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_corpus(files: &[(&str, &str)]) -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            let path = tmp.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        let config = Config::with_data_dir(tmp.path());
        (tmp, config)
    }

    #[test]
    fn discover_requires_abstracts_dir() {
        let config = Config::with_data_dir("/nonexistent/abstracts");
        assert!(discover(&config).is_err());
    }

    #[test]
    fn discover_tolerates_missing_demos_dir() {
        let (_tmp, mut config) = write_corpus(&[("a.json", "{}")]);
        config.data.demos_dir = Some(PathBuf::from("/nonexistent/demos"));
        assert_eq!(discover(&config).unwrap().len(), 1);
    }

    #[test]
    fn discover_is_recursive_and_sorted() {
        let (_tmp, config) = write_corpus(&[
            ("nested/deep/b.json", "{}"),
            ("a.json", "{}"),
            ("notes.txt", "ignored"),
            ("nested/c.json", "{}"),
        ]);

        let names: Vec<String> = discover(&config)
            .unwrap()
            .iter()
            .map(|p| {
                p.strip_prefix(&config.data.abstracts_dir)
                    .unwrap()
                    .to_string_lossy()
                    .to_string()
            })
            .collect();

        assert_eq!(names, vec!["a.json", "nested/c.json", "nested/deep/b.json"]);
    }

    #[test]
    fn load_skips_malformed_json() {
        let (tmp, _config) = write_corpus(&[("bad.json", "{not json")]);
        assert!(load(&tmp.path().join("bad.json")).is_none());
    }

    #[test]
    fn summarize_applies_defaults() {
        let (tmp, _config) = write_corpus(&[("empty.json", "{}")]);
        let loaded = load(&tmp.path().join("empty.json")).unwrap();

        let summaries = summarize(&loaded);
        assert_eq!(summaries.len(), 1);

        let s = &summaries[0];
        assert_eq!(s.id, "");
        assert_eq!(s.title, "Untitled");
        assert_eq!(s.claim, "");
        assert_eq!(s.confidence, 0.0);
        assert_eq!(s.domain, "unknown");
        assert_eq!(s.kind, "KnowledgeClaim");
        assert_eq!(s.filename, "empty.json");
    }

    #[test]
    fn summarize_expands_claim_sets() {
        let (tmp, _config) = write_corpus(&[(
            "set.json",
            r#"{
                "retainedClaims": [{"claimId": "c1", "claim": "A", "confidence": 0.9}],
                "removedClaims": [{"claimId": "c2", "claim": "B", "confidence": 0.2}]
            }"#,
        )]);
        let loaded = load(&tmp.path().join("set.json")).unwrap();

        let summaries = summarize(&loaded);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, "c1");
        assert_eq!(summaries[1].id, "c2");
        assert_eq!(summaries[0].domain, "scientific");
    }

    #[test]
    fn summarize_claim_set_inherits_scenario_domain() {
        let (tmp, _config) = write_corpus(&[(
            "set.json",
            r#"{
                "scenario": {"domain": "health"},
                "retainedClaims": [{"claimId": "c1", "claim": "A", "confidence": 0.9}],
                "removedClaims": []
            }"#,
        )]);
        let loaded = load(&tmp.path().join("set.json")).unwrap();
        assert_eq!(summarize(&loaded)[0].domain, "health");
    }
}
