// src/services/artifact_signer.rs
//! Certificate signing: binds rendered document bytes to their
//! credential fields.
//!
//! The signer computes the content hash over the *given* fields before
//! anything touches the document, computes the legacy identity HMAC, and
//! embeds both with the canonical credential blob into the document's
//! metadata. A metadata failure degrades to the unmodified rendered
//! bytes with `signed: false`; issuance never aborts on signing.

use chrono::{SecondsFormat, Utc};

use crate::error::ServiceError;
use crate::pdf::metadata::{self, ProofBundle, FORMAT_VERSION};
use crate::utils::canonical::{canonical_json, content_hash, CredentialFields};
use crate::utils::crypto::hmac_sha256_hex;

/// A signing attempt's output. `signed: false` means the bytes are the
/// unmodified rendered input and carry no proof.
#[derive(Debug, Clone)]
pub struct SignedArtifact {
    pub bytes: Vec<u8>,
    pub signed: bool,
    /// SHA-256 of the canonical credential JSON (hex).
    pub content_hash: String,
    /// HMAC over the identity fields and timestamp (hex).
    pub hmac_signature: String,
    /// RFC 3339 signing timestamp, second precision.
    pub timestamp: String,
}

/// Signs rendered certificates with the shared server secret.
pub struct ArtifactSigner {
    secret: Vec<u8>,
}

impl ArtifactSigner {
    pub fn new(secret: &[u8]) -> Self {
        ArtifactSigner {
            secret: secret.to_vec(),
        }
    }

    /// The identity payload covered by the legacy HMAC:
    /// `{skillCode}:{claimantName}:{endorserName}:{timestamp}`.
    pub fn hmac_payload(fields: &CredentialFields, timestamp: &str) -> String {
        format!(
            "{}:{}:{}:{}",
            fields.skill_code, fields.claimant_name, fields.endorser_name, timestamp
        )
    }

    /// Signs a rendered certificate.
    ///
    /// The content hash is computed from `fields` as passed in, never
    /// re-derived from the document, so the proof covers exactly what the
    /// caller rendered. When metadata embedding fails the rendered bytes
    /// are returned unmodified with `signed: false` and a warning is
    /// logged; downstream layers then reject the document as unsigned
    /// rather than the request failing.
    ///
    /// # Arguments
    /// * `fields` - The nine credential fields the certificate shows
    /// * `rendered` - Rendered document bytes to sign
    /// * `claim_id` - Claim identifier written into the proof
    /// * `issuer_name` - Issuer display name for descriptive metadata
    /// * `token` - Bearer token forwarded for the legacy fallback path
    pub fn sign(
        &self,
        fields: &CredentialFields,
        rendered: &[u8],
        claim_id: &str,
        issuer_name: &str,
        token: Option<&str>,
    ) -> Result<SignedArtifact, ServiceError> {
        let hash = content_hash(fields)?;
        let blob = canonical_json(fields)?;
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let signature = hmac_sha256_hex(&self.secret, Self::hmac_payload(fields, &timestamp).as_bytes());

        let bundle = ProofBundle {
            signature: signature.clone(),
            timestamp: timestamp.clone(),
            claim_id: claim_id.to_string(),
            version: FORMAT_VERSION.to_string(),
            issuer: issuer_name.to_string(),
            content_hash: Some(hash.clone()),
            credential_data: Some(blob),
            jwt: token.map(str::to_string),
        };

        let title = format!("Skill Endorsement Certificate - {}", fields.skill_name);
        match metadata::embed(rendered, &bundle, &title) {
            Ok(bytes) => Ok(SignedArtifact {
                bytes,
                signed: true,
                content_hash: hash,
                hmac_signature: signature,
                timestamp,
            }),
            Err(e) => {
                log::warn!("metadata embedding failed for claim {claim_id}: {e}; delivering unsigned");
                Ok(SignedArtifact {
                    bytes: rendered.to_vec(),
                    signed: false,
                    content_hash: hash,
                    hmac_signature: signature,
                    timestamp,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::extract::extract_metadata;
    use crate::pdf::metadata::CREATOR;
    use crate::pdf::render::build_certificate_pdf;
    use crate::utils::crypto::{is_sha256_hex, verify_hmac_hex};

    fn fields() -> CredentialFields {
        CredentialFields {
            skill_name: "Design Skills".into(),
            skill_code: "ICT403".into(),
            skill_description: "Applies advanced design principles".into(),
            claimant_name: "A. Claimant".into(),
            narrative: "I designed the onboarding flow".into(),
            endorser_name: "B. Endorser".into(),
            endorsement_text: "Thoughtful and consistent design work".into(),
            bona_fides: "Principal designer, twelve years".into(),
            signature: "B. Endorser".into(),
            evidence: vec![],
        }
    }

    #[test]
    fn test_signed_artifact_carries_the_full_proof() {
        let signer = ArtifactSigner::new(b"test-secret");
        let rendered = build_certificate_pdf(&fields(), "Acme Inc.", "claim-9").unwrap();
        let artifact = signer
            .sign(&fields(), &rendered, "claim-9", "Acme Inc.", Some("a.b.c"))
            .unwrap();

        assert!(artifact.signed);
        assert!(is_sha256_hex(&artifact.content_hash));
        assert!(is_sha256_hex(&artifact.hmac_signature));
        assert_eq!(artifact.content_hash, content_hash(&fields()).unwrap());

        let metadata = extract_metadata(&artifact.bytes).unwrap();
        assert_eq!(metadata.creator.as_deref(), Some(CREATOR));
        assert_eq!(metadata.signature.as_deref(), Some(artifact.hmac_signature.as_str()));
        assert_eq!(metadata.timestamp.as_deref(), Some(artifact.timestamp.as_str()));
        assert_eq!(metadata.claim_id.as_deref(), Some("claim-9"));
        assert_eq!(metadata.content_hash.as_deref(), Some(artifact.content_hash.as_str()));
        assert_eq!(
            metadata.credential_data.as_deref(),
            Some(canonical_json(&fields()).unwrap().as_str())
        );
        assert_eq!(metadata.jwt.as_deref(), Some("a.b.c"));
    }

    #[test]
    fn test_hmac_binds_identity_fields_to_the_timestamp() {
        let signer = ArtifactSigner::new(b"test-secret");
        let rendered = build_certificate_pdf(&fields(), "Acme Inc.", "claim-9").unwrap();
        let artifact = signer
            .sign(&fields(), &rendered, "claim-9", "Acme Inc.", None)
            .unwrap();

        let payload = ArtifactSigner::hmac_payload(&fields(), &artifact.timestamp);
        assert!(verify_hmac_hex(
            b"test-secret",
            payload.as_bytes(),
            &artifact.hmac_signature
        ));
        assert!(!verify_hmac_hex(
            b"other-secret",
            payload.as_bytes(),
            &artifact.hmac_signature
        ));
    }

    #[test]
    fn test_unrenderable_bytes_degrade_to_unsigned() {
        let signer = ArtifactSigner::new(b"test-secret");
        let not_a_document = b"plain text fallback output".to_vec();
        let artifact = signer
            .sign(&fields(), &not_a_document, "claim-9", "Acme Inc.", None)
            .unwrap();

        assert!(!artifact.signed);
        assert_eq!(artifact.bytes, not_a_document);
        // The proof values are still computed for reporting.
        assert!(is_sha256_hex(&artifact.content_hash));
    }

    #[test]
    fn test_token_is_optional() {
        let signer = ArtifactSigner::new(b"test-secret");
        let rendered = build_certificate_pdf(&fields(), "Acme Inc.", "claim-9").unwrap();
        let artifact = signer
            .sign(&fields(), &rendered, "claim-9", "Acme Inc.", None)
            .unwrap();
        let metadata = extract_metadata(&artifact.bytes).unwrap();
        assert!(metadata.jwt.is_none());
    }
}
