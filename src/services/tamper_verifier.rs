// src/services/tamper_verifier.rs
//! Post-issuance tamper detection over signed certificate documents.
//!
//! Verification runs ordered layers, short-circuiting on the first
//! decisive failure:
//!
//! - Layer 0: recognition (creator constant or embedded signature)
//! - Layer 1: creator rewrite while a signature is present
//! - Layer 2: signature shape (SHA-256 hex) and timestamp presence
//! - Layer 3: content hash recomputed over the embedded credential blob
//! - Layer 4: extracted text cross-checked against the signed fields
//! - Layer 5: legacy fallback via the forwarded token, identity only
//! - Layer 6: minimal legacy, shape-valid signature alone
//!
//! Both entry points are pure reads over the supplied bytes: safe to
//! invoke repeatedly and concurrently on the same or different documents.

use crate::auth::session_token::SessionTokens;
use crate::models::claim::ClaimState;
use crate::models::verification::{
    ClaimedCheck, ClaimedDifference, FieldChange, VerificationOutcome, VerificationResult,
};
use crate::pdf::extract;
use crate::pdf::metadata::CREATOR;
use crate::utils::canonical::{content_hash, CredentialFields};
use crate::utils::crypto::{hmac_sha256_hex, is_sha256_hex};
use crate::utils::text_match::{
    bounded_section, fuzzy_text_present, value_after_label, value_follows_label,
};

/// Substring of the creator constant that identifies our documents.
const CREATOR_MARK: &str = "SkillVouch";

/// End-of-section headings bounding the digital signature block.
const SIGNATURE_END_LABELS: [&str; 2] = ["This is a digitally", "Generated with"];

fn truncated(value: &str) -> String {
    let head: String = value.chars().take(100).collect();
    format!("{head}...")
}

/// Verifies signed certificate documents against their embedded proofs.
pub struct TamperVerifier {
    secret: Vec<u8>,
    tokens: SessionTokens,
}

impl TamperVerifier {
    /// Creates a verifier over the shared server secret. The same secret
    /// signs legacy identity HMACs and the forwarded tokens, so one
    /// secret serves both proof schemes.
    pub fn new(secret: &[u8]) -> Self {
        TamperVerifier {
            secret: secret.to_vec(),
            // Expiry only applies at mint; verification reads exp from
            // the token itself.
            tokens: SessionTokens::new(secret, 7),
        }
    }

    /// Full verification of one document, without prior knowledge of its
    /// contents.
    pub fn verify_document(&self, bytes: &[u8]) -> VerificationResult {
        let metadata = match extract::extract_metadata(bytes) {
            Ok(metadata) => metadata,
            Err(_) => {
                return VerificationResult::fail(
                    VerificationOutcome::NotRecognized,
                    "not a recognized certificate: the file could not be read as a signed document",
                )
            }
        };

        let creator_ok = metadata
            .creator
            .as_deref()
            .is_some_and(|c| c.contains(CREATOR_MARK));

        // Layer 0: neither the creator constant nor a signature.
        if !creator_ok && !metadata.has_signature() {
            return VerificationResult::fail(
                VerificationOutcome::NotRecognized,
                "not a recognized certificate: no signature or creator metadata found",
            );
        }

        // Layer 1: signed, but the creator was rewritten. Typical of
        // re-saving through an external editor.
        if metadata.has_signature() && !creator_ok {
            let found = metadata.creator.clone().unwrap_or_else(|| "Unknown".to_string());
            return VerificationResult::fail(
                VerificationOutcome::CreatorTampered,
                format!(
                    "tampering detected: creator metadata was rewritten from \"{CREATOR}\" to \"{found}\""
                ),
            )
            .with_changes(vec![FieldChange {
                field: "PDF Creator".to_string(),
                original: CREATOR.to_string(),
                status: "modified".to_string(),
                current: Some(found),
            }]);
        }

        // Layer 2: signature shape and timestamp presence.
        let timestamp = match (&metadata.signature, &metadata.timestamp) {
            (Some(signature), Some(timestamp)) if is_sha256_hex(signature) => timestamp.clone(),
            _ => {
                return VerificationResult::fail(
                    VerificationOutcome::InvalidSignatureFormat,
                    "missing or invalid signature format",
                )
            }
        };

        // Layers 3 and 4 require the full content-hash scheme.
        if let (Some(blob), Some(stored_hash)) = (&metadata.credential_data, &metadata.content_hash)
        {
            let fields: CredentialFields = match serde_json::from_str(blob) {
                Ok(fields) => fields,
                Err(_) => {
                    return VerificationResult::fail(
                        VerificationOutcome::MetadataTampered,
                        "metadata tampering detected: the embedded credential data has been modified",
                    )
                }
            };

            // Layer 3: the hash covers the blob exactly as canonicalized
            // at signing time.
            match content_hash(&fields) {
                Ok(expected) if expected == *stored_hash => {}
                _ => {
                    return VerificationResult::fail(
                        VerificationOutcome::MetadataTampered,
                        "metadata tampering detected: the embedded credential data has been modified",
                    )
                }
            }

            // Layer 4: the visible text still shows every signed field.
            let text = extract::extract_text(bytes);
            let changes = Self::content_changes(&fields, &text);
            if !changes.is_empty() {
                return VerificationResult::fail(
                    VerificationOutcome::ContentTampered,
                    format!(
                        "content tampering detected: {} field(s) modified after issuance",
                        changes.len()
                    ),
                )
                .with_changes(changes);
            }

            let mut result = VerificationResult::pass(
                VerificationOutcome::Verified,
                format!(
                    "certificate verified: signature, metadata, and content are authentic. Claim ID: {}, Version: {}, Timestamp: {}",
                    metadata.claim_id.as_deref().unwrap_or("unknown"),
                    metadata.version.as_deref().unwrap_or("unknown"),
                    timestamp
                ),
            );
            result.content_hash = Some(stored_hash.clone());
            return result;
        }

        // Layer 5: no blob or hash, but a forwarded token. Identity
        // fields only.
        if let Some(token) = &metadata.jwt {
            let state = match self.tokens.verify(token) {
                Ok(state) => state,
                Err(_) => {
                    return VerificationResult::fail(
                        VerificationOutcome::TokenInvalid,
                        "the token embedded in this document is invalid or has been tampered with",
                    )
                }
            };
            let text = extract::extract_text(bytes);
            let changes = Self::legacy_changes(&state, &text);
            if !changes.is_empty() {
                return VerificationResult::fail(
                    VerificationOutcome::ContentTampered,
                    format!(
                        "content tampering detected: {} field(s) modified after issuance",
                        changes.len()
                    ),
                )
                .with_changes(changes);
            }
        }

        // Layer 6: shape-valid signature alone. Recognized, with an
        // explicit caveat that full verification was not possible.
        VerificationResult::pass(
            VerificationOutcome::VerifiedLegacy,
            format!(
                "certificate recognized. Claim ID: {}, Version: {}, Timestamp: {}. Full content verification was not possible for this document format.",
                metadata.claim_id.as_deref().unwrap_or("unknown"),
                metadata.version.as_deref().unwrap_or("unknown"),
                timestamp
            ),
        )
    }

    /// Layer-4 cross-check: every signed field must still appear in its
    /// expected structural position in the extracted text. One change
    /// record per failing field, in a fixed field order.
    fn content_changes(fields: &CredentialFields, text: &str) -> Vec<FieldChange> {
        let mut changes = Vec::new();

        if !value_follows_label(text, "Skill", &fields.skill_name) {
            changes.push(FieldChange {
                field: "Skill Name".to_string(),
                original: fields.skill_name.clone(),
                status: "NOT FOUND IN EXPECTED LOCATION".to_string(),
                current: None,
            });
        }

        if !value_follows_label(text, "Skill Code", &fields.skill_code) {
            changes.push(FieldChange {
                field: "Skill Code".to_string(),
                original: fields.skill_code.clone(),
                status: "NOT FOUND IN EXPECTED LOCATION".to_string(),
                current: None,
            });
        }

        if !fuzzy_text_present(text, &fields.skill_description) {
            changes.push(FieldChange {
                field: "Skill Description".to_string(),
                original: truncated(&fields.skill_description),
                status: "DESCRIPTION TEXT MODIFIED OR MISSING".to_string(),
                current: None,
            });
        }

        if !value_follows_label(text, "Claimant", &fields.claimant_name) {
            changes.push(FieldChange {
                field: "Claimant Name".to_string(),
                original: fields.claimant_name.clone(),
                status: "NOT FOUND IN EXPECTED LOCATION".to_string(),
                current: None,
            });
        }

        if !fuzzy_text_present(text, &fields.narrative) {
            changes.push(FieldChange {
                field: "Claimant Narrative".to_string(),
                original: truncated(&fields.narrative),
                status: "NARRATIVE TEXT MODIFIED OR MISSING".to_string(),
                current: None,
            });
        }

        if !value_follows_label(text, "Endorsement by", &fields.endorser_name) {
            changes.push(FieldChange {
                field: "Endorser Name".to_string(),
                original: fields.endorser_name.clone(),
                status: "NOT FOUND IN EXPECTED LOCATION".to_string(),
                current: None,
            });
        }

        if !fuzzy_text_present(text, &fields.bona_fides) {
            changes.push(FieldChange {
                field: "Endorser Credentials (Bona Fides)".to_string(),
                original: truncated(&fields.bona_fides),
                status: "CREDENTIALS TEXT MODIFIED OR MISSING".to_string(),
                current: None,
            });
        }

        if !fuzzy_text_present(text, &fields.endorsement_text) {
            changes.push(FieldChange {
                field: "Endorsement Statement".to_string(),
                original: truncated(&fields.endorsement_text),
                status: "ENDORSEMENT TEXT MODIFIED OR MISSING".to_string(),
                current: None,
            });
        }

        // The signature must sit inside the bounded signature section; an
        // appearance anywhere else in the document does not count.
        match bounded_section(text, "Digital Signature", &SIGNATURE_END_LABELS) {
            None => changes.push(FieldChange {
                field: "Digital Signature".to_string(),
                original: fields.signature.clone(),
                status: "SIGNATURE SECTION NOT FOUND".to_string(),
                current: None,
            }),
            Some(section) if !section.contains(&fields.signature) => {
                changes.push(FieldChange {
                    field: "Digital Signature".to_string(),
                    original: fields.signature.clone(),
                    status: "SIGNATURE MODIFIED OR REMOVED".to_string(),
                    current: Some(section.trim().chars().take(100).collect()),
                });
            }
            Some(_) => {}
        }

        if !fields.evidence.is_empty() {
            let missing = fields
                .evidence
                .iter()
                .filter(|url| !text.contains(url.as_str()))
                .count();
            if missing > 0 {
                changes.push(FieldChange {
                    field: "Evidence URLs".to_string(),
                    original: format!("{} evidence link(s)", fields.evidence.len()),
                    status: format!("{missing} EVIDENCE LINK(S) MISSING OR MODIFIED"),
                    current: None,
                });
            }
        }

        changes
    }

    /// Layer-5 cross-check, restricted to the identity fields a legacy
    /// token carries.
    fn legacy_changes(state: &ClaimState, text: &str) -> Vec<FieldChange> {
        let mut changes = Vec::new();

        if !value_follows_label(text, "Skill Code", &state.skill_code) {
            changes.push(FieldChange {
                field: "Skill Code".to_string(),
                original: state.skill_code.clone(),
                status: "NOT FOUND IN EXPECTED LOCATION".to_string(),
                current: value_after_label(text, "Skill Code"),
            });
        }

        if let Some(claimant_name) = &state.claimant_name {
            if !value_follows_label(text, "Claimant", claimant_name) {
                changes.push(FieldChange {
                    field: "Claimant Name".to_string(),
                    original: claimant_name.clone(),
                    status: "NOT FOUND IN EXPECTED LOCATION".to_string(),
                    current: value_after_label(text, "Claimant"),
                });
            }
        }

        if let Some(endorser_name) = &state.endorser_name {
            if !value_follows_label(text, "Endorsement by", endorser_name) {
                changes.push(FieldChange {
                    field: "Endorser Name".to_string(),
                    original: endorser_name.clone(),
                    status: "NOT FOUND IN EXPECTED LOCATION".to_string(),
                    current: value_after_label(text, "Endorsement by"),
                });
            }
        }

        changes
    }

    /// Checks caller-supplied facts against one document.
    ///
    /// Recomputes the identity HMAC from the supplied fields and the
    /// document's own embedded timestamp and compares it byte-for-byte
    /// against the embedded signature. On mismatch, reports what the
    /// document actually shows for each field where it can be located.
    pub fn verify_claimed(
        &self,
        bytes: &[u8],
        skill_code: &str,
        claimant_name: &str,
        endorser_name: &str,
    ) -> ClaimedCheck {
        let metadata = match extract::extract_metadata(bytes) {
            Ok(metadata) => metadata,
            Err(_) => {
                return ClaimedCheck {
                    valid: false,
                    message: "the file could not be read as a signed document".to_string(),
                    differences: Vec::new(),
                }
            }
        };

        let (signature, timestamp) = match (&metadata.signature, &metadata.timestamp) {
            (Some(signature), Some(timestamp)) => (signature, timestamp),
            _ => {
                return ClaimedCheck {
                    valid: false,
                    message: "no signature found in document metadata".to_string(),
                    differences: Vec::new(),
                }
            }
        };

        let payload = format!("{skill_code}:{claimant_name}:{endorser_name}:{timestamp}");
        let expected = hmac_sha256_hex(&self.secret, payload.as_bytes());
        if &expected == signature {
            return ClaimedCheck {
                valid: true,
                message: "signature is valid: the document matches the supplied credential details"
                    .to_string(),
                differences: Vec::new(),
            };
        }

        let text = extract::extract_text(bytes);
        let mut differences = Vec::new();
        for (field, entered, label) in [
            ("Skill Code", skill_code, "Skill Code"),
            ("Claimant Name", claimant_name, "Claimant"),
            ("Endorser Name", endorser_name, "Endorsement by"),
        ] {
            if let Some(found) = value_after_label(&text, label) {
                if found != entered {
                    differences.push(ClaimedDifference {
                        field: field.to_string(),
                        you_entered: entered.to_string(),
                        pdf_contains: Some(found),
                    });
                }
            }
        }

        let message = if differences.is_empty() {
            "signature mismatch: the supplied details do not match what was signed. Check that the skill code, claimant name, and endorser name exactly match the certificate (case-sensitive)."
                .to_string()
        } else {
            format!(
                "signature mismatch: found {} difference(s) between the supplied details and the document",
                differences.len()
            )
        };
        ClaimedCheck {
            valid: false,
            message,
            differences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::claim::ClaimState;
    use crate::pdf::metadata::{embed_bare, overwrite_info_entry};
    use crate::pdf::render::build_certificate_pdf;
    use crate::services::artifact_signer::ArtifactSigner;
    use crate::utils::canonical::canonical_json;

    const SECRET: &[u8] = b"verifier-test-secret";

    fn fields() -> CredentialFields {
        CredentialFields {
            skill_name: "Design Skills".into(),
            skill_code: "ICT403".into(),
            skill_description: "Applies advanced design principles to complex interfaces".into(),
            claimant_name: "A. Claimant".into(),
            narrative: "I designed the onboarding flow for a production system".into(),
            endorser_name: "B. Endorser".into(),
            endorsement_text: "They consistently delivered thoughtful design work".into(),
            bona_fides: "Principal designer with twelve years of experience".into(),
            signature: "B. Endorser".into(),
            evidence: vec!["https://example.com/portfolio".into()],
        }
    }

    fn verifier() -> TamperVerifier {
        TamperVerifier::new(SECRET)
    }

    /// Renders `rendered_fields` but signs `signed_fields`: the document
    /// shows one thing while the proof covers another.
    fn sign_mismatched(
        signed_fields: &CredentialFields,
        rendered_fields: &CredentialFields,
    ) -> Vec<u8> {
        let rendered = build_certificate_pdf(rendered_fields, "Acme Inc.", "acme/claim-1").unwrap();
        ArtifactSigner::new(SECRET)
            .sign(signed_fields, &rendered, "acme/claim-1", "Acme Inc.", None)
            .unwrap()
            .bytes
    }

    fn signed_document() -> Vec<u8> {
        sign_mismatched(&fields(), &fields())
    }

    #[test]
    fn test_round_trip_verifies_clean() {
        let result = verifier().verify_document(&signed_document());
        assert!(result.valid, "{}", result.message);
        assert_eq!(result.outcome, VerificationOutcome::Verified);
        assert!(result.changes.is_empty());
        assert_eq!(
            result.content_hash.as_deref(),
            Some(content_hash(&fields()).unwrap().as_str())
        );
    }

    #[test]
    fn test_plain_bytes_are_not_recognized() {
        let result = verifier().verify_document(b"just some text, not a document");
        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::NotRecognized);
    }

    #[test]
    fn test_unsigned_document_is_not_recognized() {
        let rendered = build_certificate_pdf(&fields(), "Acme Inc.", "acme/claim-1").unwrap();
        let result = verifier().verify_document(&rendered);
        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::NotRecognized);
    }

    #[test]
    fn test_creator_rewrite_is_detected() {
        let tampered =
            overwrite_info_entry(&signed_document(), "Creator", "Some PDF Editor 9.0").unwrap();
        let result = verifier().verify_document(&tampered);

        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::CreatorTampered);
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].field, "PDF Creator");
        assert_eq!(result.changes[0].original, CREATOR);
        assert_eq!(result.changes[0].status, "modified");
        assert_eq!(
            result.changes[0].current.as_deref(),
            Some("Some PDF Editor 9.0")
        );
    }

    #[test]
    fn test_malformed_signature_shape_is_rejected() {
        let rendered = build_certificate_pdf(&fields(), "Acme Inc.", "acme/claim-1").unwrap();
        let doc = embed_bare(
            &rendered,
            &[
                ("Creator", CREATOR),
                ("Signature", "definitely-not-a-hex-digest"),
                ("Timestamp", "2024-01-01T00:00:00Z"),
            ],
        )
        .unwrap();
        let result = verifier().verify_document(&doc);
        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::InvalidSignatureFormat);
    }

    #[test]
    fn test_edited_credential_blob_is_caught_by_the_hash() {
        let mut edited = fields();
        edited.claimant_name = "X. Impostor".into();
        let blob = canonical_json(&edited).unwrap();
        // ContentHash stays as signed; only the blob is edited.
        let tampered =
            overwrite_info_entry(&signed_document(), "CredentialData", &blob).unwrap();
        let result = verifier().verify_document(&tampered);

        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::MetadataTampered);
    }

    #[test]
    fn test_unparseable_credential_blob_is_metadata_tampering() {
        let tampered =
            overwrite_info_entry(&signed_document(), "CredentialData", "not json at all").unwrap();
        let result = verifier().verify_document(&tampered);
        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::MetadataTampered);
    }

    #[test]
    fn test_visible_claimant_swap_is_caught_with_one_change() {
        let mut shown = fields();
        shown.claimant_name = "X. Impostor".into();
        let doc = sign_mismatched(&fields(), &shown);
        let result = verifier().verify_document(&doc);

        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::ContentTampered);
        assert_eq!(result.changes.len(), 1, "changes: {:?}", result.changes);
        assert_eq!(result.changes[0].field, "Claimant Name");
        assert_eq!(result.changes[0].original, "A. Claimant");
        assert_eq!(result.changes[0].status, "NOT FOUND IN EXPECTED LOCATION");
    }

    #[test]
    fn test_rewritten_narrative_is_caught_by_the_fuzzy_check() {
        let mut shown = fields();
        shown.narrative = "completely unrelated replacement paragraph".into();
        let doc = sign_mismatched(&fields(), &shown);
        let result = verifier().verify_document(&doc);

        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::ContentTampered);
        assert_eq!(result.changes.len(), 1, "changes: {:?}", result.changes);
        assert_eq!(result.changes[0].field, "Claimant Narrative");
        assert!(result.changes[0].original.ends_with("..."));
    }

    #[test]
    fn test_signature_swap_inside_the_signature_section() {
        let mut shown = fields();
        shown.signature = "Z. Forger".into();
        let doc = sign_mismatched(&fields(), &shown);
        let result = verifier().verify_document(&doc);

        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::ContentTampered);
        assert_eq!(result.changes.len(), 1, "changes: {:?}", result.changes);
        assert_eq!(result.changes[0].field, "Digital Signature");
        assert_eq!(result.changes[0].status, "SIGNATURE MODIFIED OR REMOVED");
        assert!(result.changes[0]
            .current
            .as_deref()
            .unwrap()
            .contains("Z. Forger"));
    }

    #[test]
    fn test_missing_evidence_link_is_reported() {
        let mut shown = fields();
        shown.evidence.clear();
        let doc = sign_mismatched(&fields(), &shown);
        let result = verifier().verify_document(&doc);

        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::ContentTampered);
        assert_eq!(result.changes.len(), 1, "changes: {:?}", result.changes);
        assert_eq!(result.changes[0].field, "Evidence URLs");
        assert_eq!(result.changes[0].original, "1 evidence link(s)");
        assert_eq!(result.changes[0].status, "1 EVIDENCE LINK(S) MISSING OR MODIFIED");
    }

    fn legacy_token() -> String {
        let state = ClaimState::new_claimant(
            "http://localhost:3000",
            "acme",
            "acme/claim-1",
            "ICT403",
            "Design Skills",
            "Applies advanced design principles to complex interfaces",
            "A. Claimant",
            "claimant@example.com",
        )
        .into_endorser(
            "B. Endorser",
            "endorser@example.com",
            "I designed the onboarding flow for a production system",
        );
        SessionTokens::new(SECRET, 7).mint(state).unwrap()
    }

    fn legacy_document(rendered_fields: &CredentialFields, token: &str) -> Vec<u8> {
        let rendered =
            build_certificate_pdf(rendered_fields, "Acme Inc.", "acme/claim-1").unwrap();
        embed_bare(
            &rendered,
            &[
                ("Creator", CREATOR),
                ("Signature", &"ab".repeat(32)),
                ("Timestamp", "2024-01-01T00:00:00Z"),
                ("ClaimID", "acme/claim-1"),
                ("Version", "1.0"),
                ("JWT", token),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_legacy_document_with_matching_token_passes_with_caveat() {
        let doc = legacy_document(&fields(), &legacy_token());
        let result = verifier().verify_document(&doc);
        assert!(result.valid, "{}", result.message);
        assert_eq!(result.outcome, VerificationOutcome::VerifiedLegacy);
        assert!(result.message.contains("Full content verification was not possible"));
    }

    #[test]
    fn test_legacy_claimant_swap_is_caught_via_the_token() {
        let mut shown = fields();
        shown.claimant_name = "X. Impostor".into();
        let doc = legacy_document(&shown, &legacy_token());
        let result = verifier().verify_document(&doc);

        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::ContentTampered);
        assert_eq!(result.changes.len(), 1, "changes: {:?}", result.changes);
        assert_eq!(result.changes[0].field, "Claimant Name");
        assert_eq!(result.changes[0].current.as_deref(), Some("X. Impostor"));
    }

    #[test]
    fn test_legacy_invalid_token_is_rejected() {
        let forged = SessionTokens::new(b"some-other-secret", 7)
            .mint(
                ClaimState::new_claimant(
                    "http://localhost:3000",
                    "acme",
                    "acme/claim-1",
                    "ICT403",
                    "Design Skills",
                    "desc",
                    "A. Claimant",
                    "claimant@example.com",
                ),
            )
            .unwrap();
        let doc = legacy_document(&fields(), &forged);
        let result = verifier().verify_document(&doc);
        assert!(!result.valid);
        assert_eq!(result.outcome, VerificationOutcome::TokenInvalid);
    }

    #[test]
    fn test_minimal_legacy_document_passes_with_caveat() {
        let rendered = build_certificate_pdf(&fields(), "Acme Inc.", "acme/claim-1").unwrap();
        let doc = embed_bare(
            &rendered,
            &[
                ("Creator", CREATOR),
                ("Signature", &"ab".repeat(32)),
                ("Timestamp", "2024-01-01T00:00:00Z"),
                ("ClaimID", "acme/claim-1"),
                ("Version", "1.0"),
            ],
        )
        .unwrap();
        let result = verifier().verify_document(&doc);
        assert!(result.valid);
        assert_eq!(result.outcome, VerificationOutcome::VerifiedLegacy);
    }

    #[test]
    fn test_verify_claimed_matches_the_stored_signature() {
        let doc = signed_document();
        let check = verifier().verify_claimed(&doc, "ICT403", "A. Claimant", "B. Endorser");
        assert!(check.valid, "{}", check.message);
        assert!(check.differences.is_empty());
    }

    #[test]
    fn test_verify_claimed_reports_what_the_document_shows() {
        let doc = signed_document();
        let check = verifier().verify_claimed(&doc, "ICT403", "Wrong Person", "B. Endorser");

        assert!(!check.valid);
        let diff = check
            .differences
            .iter()
            .find(|d| d.field == "Claimant Name")
            .expect("claimant difference");
        assert_eq!(diff.you_entered, "Wrong Person");
        assert_eq!(diff.pdf_contains.as_deref(), Some("A. Claimant"));
    }

    #[test]
    fn test_verify_claimed_any_field_change_breaks_the_signature() {
        let doc = signed_document();
        let v = verifier();
        assert!(!v.verify_claimed(&doc, "ICT404", "A. Claimant", "B. Endorser").valid);
        assert!(!v.verify_claimed(&doc, "ICT403", "X. Claimant", "B. Endorser").valid);
        assert!(!v.verify_claimed(&doc, "ICT403", "A. Claimant", "Y. Endorser").valid);
    }

    #[test]
    fn test_verify_claimed_unsigned_document() {
        let rendered = build_certificate_pdf(&fields(), "Acme Inc.", "acme/claim-1").unwrap();
        let check = verifier().verify_claimed(&rendered, "ICT403", "A. Claimant", "B. Endorser");
        assert!(!check.valid);
        assert!(check.message.contains("no signature found"));
    }
}
