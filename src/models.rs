//! Core data models for the abstract corpus.
//!
//! These types represent the documents, claim entries, and summaries that
//! flow through the loader and query engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parsed abstract document, resolved into one of the two corpus shapes
/// at load time.
///
/// The claim-set arm is listed first: its required `retainedClaims` and
/// `removedClaims` fields discriminate it, while a plain claim document
/// (all fields optional) matches any JSON object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AbstractDocument {
    ClaimSet(ClaimSetDocument),
    Claim(ClaimDocument),
}

/// A plain claim document: one top-level claim with scenario and
/// conclusion metadata.
///
/// Every field is optional at parse time. Missing data is a validation
/// concern, never a load failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimDocument {
    pub identifier: Option<String>,
    #[serde(rename = "@id")]
    pub at_id: Option<String>,
    #[serde(rename = "@type")]
    pub at_type: Option<String>,
    #[serde(rename = "@context")]
    pub at_context: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub scenario: Option<Scenario>,
    pub conclusion: Option<Conclusion>,
    #[serde(rename = "bayesianAnalysis")]
    pub bayesian_analysis: Option<Value>,
    pub sources: Option<Vec<Value>>,
    pub metadata: Option<Metadata>,
    #[serde(rename = "claimBasis")]
    pub claim_basis: Option<Vec<ClaimBasisEntry>>,
    #[serde(rename = "relatedClaims")]
    pub related_claims: Option<Vec<Value>>,
}

/// A filtered claim-set document bundling multiple sub-claims instead of
/// one top-level claim.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimSetDocument {
    #[serde(rename = "retainedClaims")]
    pub retained_claims: Vec<ClaimEntry>,
    #[serde(rename = "removedClaims")]
    pub removed_claims: Vec<ClaimEntry>,
    pub scenario: Option<Scenario>,
}

/// One member claim inside a claim-set document.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimEntry {
    #[serde(rename = "claimId")]
    pub claim_id: Option<String>,
    pub claim: Option<String>,
    pub confidence: Option<f64>,
}

/// Scenario metadata: the domain a claim belongs to and a free-text
/// description of the setting.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub domain: Option<String>,
    pub description: Option<String>,
}

/// Conclusion metadata: the claim text and its confidence in `[0, 1]`.
#[derive(Debug, Clone, Deserialize)]
pub struct Conclusion {
    pub claim: Option<String>,
    pub confidence: Option<f64>,
}

/// Free-form document metadata. Only `funnelPosition` is inspected (as an
/// evidence-grade signal); everything else is carried through untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    #[serde(rename = "funnelPosition")]
    pub funnel_position: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One entry of a document's `claimBasis` sequence. Only the evidence
/// `grade` is inspected.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimBasisEntry {
    pub grade: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A document as loaded from disk: the parsed shape plus the raw JSON,
/// retained so lookups can return the original document unmodified.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// File name (without directory components) the document came from.
    pub filename: String,
    /// The unmodified JSON value as read from disk.
    pub raw: Value,
    /// The document resolved into one of the two corpus shapes.
    pub doc: AbstractDocument,
}

/// Normalized, lossy projection of a document used for listing, search,
/// and filtering. Recomputed from disk on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: String,
    pub title: String,
    pub claim: String,
    pub confidence: f64,
    pub domain: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub filename: String,
}

impl ClaimDocument {
    /// The document's identifier: `identifier` if present, else `@id`.
    pub fn id(&self) -> Option<&str> {
        self.identifier.as_deref().or(self.at_id.as_deref())
    }
}

impl ClaimSetDocument {
    /// All member claims in document order, retained before removed.
    pub fn members(&self) -> impl Iterator<Item = &ClaimEntry> {
        self.retained_claims.iter().chain(self.removed_claims.iter())
    }
}
