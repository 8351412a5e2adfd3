// src/models/verification.rs
//! Verification outcomes reported by the tamper verifier.
//!
//! Results are created fresh per verification call and never persisted.
//! A failing outcome always carries the change list that explains it.

use serde::{Deserialize, Serialize};

/// Classification of a verification run. Outcomes are results, not
/// errors: a tampered document is a successful verification that found
/// tampering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// All layers passed against the full content-hash scheme.
    Verified,
    /// A legacy document passed the reduced checks; full verification
    /// was not possible.
    VerifiedLegacy,
    /// Not issued by this system: no creator match and no signature.
    NotRecognized,
    /// Signature present but creator metadata was rewritten, typical of
    /// re-saving through an external editor.
    CreatorTampered,
    /// Signature missing or not shaped like a SHA-256 hex digest.
    InvalidSignatureFormat,
    /// The embedded credential blob no longer matches the content hash.
    MetadataTampered,
    /// The document's visible text no longer matches the signed fields.
    ContentTampered,
    /// The embedded legacy token failed signature or expiry checks.
    TokenInvalid,
}

/// One detected change: a field whose expected value is no longer where
/// it should be.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    /// The value recorded at signing time (long values truncated).
    pub original: String,
    pub status: String,
    /// What the document contains now, when it could be located.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
}

/// Result of verifying one document for post-issuance edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    pub outcome: VerificationOutcome,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub changes: Vec<FieldChange>,
    /// Echoed when metadata integrity held.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl VerificationResult {
    pub fn pass(outcome: VerificationOutcome, message: impl Into<String>) -> Self {
        VerificationResult {
            valid: true,
            outcome,
            message: message.into(),
            changes: Vec::new(),
            content_hash: None,
        }
    }

    pub fn fail(outcome: VerificationOutcome, message: impl Into<String>) -> Self {
        VerificationResult {
            valid: false,
            outcome,
            message: message.into(),
            changes: Vec::new(),
            content_hash: None,
        }
    }

    pub fn with_changes(mut self, changes: Vec<FieldChange>) -> Self {
        self.changes = changes;
        self
    }
}

/// One mismatch between caller-supplied facts and document content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimedDifference {
    pub field: String,
    pub you_entered: String,
    /// What the document actually shows for this field, when found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_contains: Option<String>,
}

/// Result of checking caller-supplied facts against a document. Answers
/// "does this claimed data match this document", distinct from "has this
/// document been altered since issuance".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimedCheck {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub differences: Vec<ClaimedDifference>,
}
