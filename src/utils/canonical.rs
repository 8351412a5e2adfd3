// src/utils/canonical.rs
//! Canonical JSON serialization for the content hash.
//!
//! The tamper-detection anchor is `SHA256(canonicalJSON(fields))`. Hash
//! reproducibility across implementations depends on the nine credential
//! fields serializing with a fixed key order, so the canonical form is a
//! struct whose declaration order *is* the key order. Serde emits struct
//! fields in declaration order, which makes the serialized string stable
//! without a custom writer.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::utils::crypto::sha256_hex;

/// The nine credential fields covered by the content hash, in canonical
/// key order. Do not reorder: the field order defines the hash input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialFields {
    pub skill_name: String,
    pub skill_code: String,
    pub skill_description: String,
    pub claimant_name: String,
    pub narrative: String,
    pub endorser_name: String,
    pub endorsement_text: String,
    pub bona_fides: String,
    pub signature: String,
    /// Evidence URLs in their original order; serialized as an array even
    /// when empty so the hash input never omits the key.
    #[serde(default)]
    pub evidence: Vec<String>,
}

/// Serializes the fields to their canonical compact JSON form.
pub fn canonical_json(fields: &CredentialFields) -> Result<String, ServiceError> {
    serde_json::to_string(fields).map_err(|e| ServiceError::Metadata(e.to_string()))
}

/// Computes the content hash: SHA-256 over the canonical JSON.
pub fn content_hash(fields: &CredentialFields) -> Result<String, ServiceError> {
    Ok(sha256_hex(canonical_json(fields)?.as_bytes()))
}
