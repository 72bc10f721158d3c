//! Schema validation for abstract documents.
//!
//! Hard errors make a document invalid; warnings flag epistemically weak
//! spots (a missing Bayesian analysis, a fully certain conclusion) without
//! affecting validity. The rule set is deterministic: validating the same
//! document twice yields identical reports.

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::engine::QueryError;
use crate::loader;
use crate::models::{AbstractDocument, ClaimDocument, ClaimEntry, LoadedDocument};

/// Outcome of validating one document or claim entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// A per-document report inside a batch run.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub id: String,
    pub filename: String,
    #[serde(flatten)]
    pub report: ValidationReport,
}

/// Batch validation of the whole corpus.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub reports: Vec<DocumentReport>,
}

/// Validates a plain claim document.
pub fn validate_claim(doc: &ClaimDocument) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if doc.at_context.is_none() {
        errors.push("missing @context".to_string());
    }
    if doc.at_type.is_none() {
        errors.push("missing @type".to_string());
    }
    if doc.id().is_none() {
        errors.push("missing identifier (identifier or @id)".to_string());
    }

    let is_collection = doc.at_type.as_deref() == Some("CollectionPage");
    if is_collection {
        if doc.name.is_none() && doc.description.is_none() {
            errors.push("collection missing both name and description".to_string());
        }
        if doc.related_claims.is_none() {
            errors.push("collection missing relatedClaims".to_string());
        }
    } else {
        if doc.scenario.is_none() {
            errors.push("missing scenario".to_string());
        }
        if doc.conclusion.is_none() {
            errors.push("missing conclusion".to_string());
        }
    }

    if let Some(confidence) = doc.conclusion.as_ref().and_then(|c| c.confidence) {
        check_confidence(confidence, &mut errors, &mut warnings);
    }

    if doc.bayesian_analysis.is_none() {
        warnings.push("missing bayesianAnalysis".to_string());
    }
    if doc.sources.as_ref().map_or(true, |s| s.is_empty()) {
        warnings.push("missing or empty sources".to_string());
    }
    if doc.metadata.is_none() {
        warnings.push("missing metadata".to_string());
    }
    if !has_grade_signal(doc) {
        warnings.push(
            "no evidence grade signal (metadata.funnelPosition or claimBasis grade)".to_string(),
        );
    }

    ValidationReport::from_parts(errors, warnings)
}

/// Validates a claim-set member entry.
///
/// Members use `claimId` as their identity and are exempt from the
/// `@type`/`@context` requirements.
pub fn validate_entry(entry: &ClaimEntry) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if entry.claim_id.is_none() {
        errors.push("missing identifier (claimId)".to_string());
    }
    if entry.claim.is_none() {
        errors.push("missing claim text".to_string());
    }
    match entry.confidence {
        None => errors.push("missing confidence".to_string()),
        Some(confidence) => check_confidence(confidence, &mut errors, &mut warnings),
    }

    ValidationReport::from_parts(errors, warnings)
}

/// Validates either document shape. A claim-set document is reported as
/// the merge of its member reports, each message prefixed with the member
/// identity.
pub fn validate_document(doc: &AbstractDocument) -> ValidationReport {
    match doc {
        AbstractDocument::Claim(claim) => validate_claim(claim),
        AbstractDocument::ClaimSet(set) => {
            let mut errors = Vec::new();
            let mut warnings = Vec::new();

            for (index, entry) in set.members().enumerate() {
                let label = entry
                    .claim_id
                    .clone()
                    .unwrap_or_else(|| format!("#{}", index));
                let report = validate_entry(entry);
                errors.extend(report.errors.iter().map(|e| format!("{}: {}", label, e)));
                warnings.extend(report.warnings.iter().map(|w| format!("{}: {}", label, w)));
            }

            ValidationReport::from_parts(errors, warnings)
        }
    }
}

/// Validates a candidate document supplied by the caller (POST body).
pub fn validate_candidate(value: &Value) -> Result<ValidationReport, QueryError> {
    if !value.is_object() {
        return Err(QueryError::InvalidInput(
            "candidate document must be a JSON object".to_string(),
        ));
    }

    let doc: AbstractDocument = serde_json::from_value(value.clone())
        .map_err(|e| QueryError::InvalidInput(format!("unrecognized document shape: {}", e)))?;

    Ok(validate_document(&doc))
}

/// Per-document reports for one loaded file: one report for a plain
/// document, one per member for a claim-set.
fn reports_for(loaded: &LoadedDocument) -> Vec<DocumentReport> {
    match &loaded.doc {
        AbstractDocument::Claim(claim) => vec![DocumentReport {
            id: claim.id().unwrap_or_default().to_string(),
            filename: loaded.filename.clone(),
            report: validate_claim(claim),
        }],
        AbstractDocument::ClaimSet(set) => set
            .members()
            .map(|entry| DocumentReport {
                id: entry.claim_id.clone().unwrap_or_default(),
                filename: loaded.filename.clone(),
                report: validate_entry(entry),
            })
            .collect(),
    }
}

/// Validates the whole corpus.
pub fn validate_all(config: &Config) -> Result<BatchReport, QueryError> {
    let documents = loader::load_all(config)?;
    let reports: Vec<DocumentReport> = documents.iter().flat_map(reports_for).collect();

    let valid = reports.iter().filter(|r| r.report.valid).count();
    Ok(BatchReport {
        total: reports.len(),
        valid,
        invalid: reports.len() - valid,
        reports,
    })
}

/// Validates the document matching `id`, with the same match policy as
/// lookup: `identifier`, `@id`, or a member `claimId`; first match in
/// traversal order wins.
pub fn validate_by_id(config: &Config, id: &str) -> Result<DocumentReport, QueryError> {
    for loaded in loader::load_all(config)? {
        match &loaded.doc {
            AbstractDocument::Claim(claim) => {
                if claim.id() == Some(id) {
                    return Ok(DocumentReport {
                        id: id.to_string(),
                        filename: loaded.filename.clone(),
                        report: validate_claim(claim),
                    });
                }
            }
            AbstractDocument::ClaimSet(set) => {
                if let Some(entry) = set.members().find(|e| e.claim_id.as_deref() == Some(id)) {
                    return Ok(DocumentReport {
                        id: id.to_string(),
                        filename: loaded.filename.clone(),
                        report: validate_entry(entry),
                    });
                }
            }
        }
    }

    Err(QueryError::NotFound(format!("no abstract with id: {}", id)))
}

fn check_confidence(confidence: f64, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if !(0.0..=1.0).contains(&confidence) {
        errors.push(format!("confidence {} outside [0, 1]", confidence));
    } else if confidence == 1.0 {
        warnings.push("confidence of exactly 1.0 expresses full certainty".to_string());
    }
}

fn has_grade_signal(doc: &ClaimDocument) -> bool {
    let funnel = doc
        .metadata
        .as_ref()
        .map_or(false, |m| m.funnel_position.is_some());
    let graded_basis = doc
        .claim_basis
        .as_ref()
        .map_or(false, |basis| basis.iter().any(|b| b.grade.is_some()));
    funnel || graded_basis
}

/// CLI entry point — batch validation, or one document when `id` given.
pub fn run_validate(config: &Config, id: Option<&str>) -> anyhow::Result<()> {
    match id {
        Some(id) => {
            let report = match validate_by_id(config, id) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => {
            let batch = match validate_all(config) {
                Ok(batch) => batch,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            println!(
                "{} documents: {} valid, {} invalid",
                batch.total, batch.valid, batch.invalid
            );
            for report in batch.reports.iter().filter(|r| !r.report.valid) {
                println!("  {} ({})", report.id, report.filename);
                for error in &report.report.errors {
                    println!("    error: {}", error);
                }
            }
        }
    }
    Ok(())
}
