// src/pdf/render.rs
//! Certificate rendering.
//!
//! Produces the rendered certificate document from a credential field
//! set. The layout mirrors the issued certificate template: labeled
//! sections (`Skill:`, `Skill Code:`, `Claimant:`, `Endorsement by:`,
//! `Digital Signature:`) that the tamper verifier later anchors on when
//! cross-checking extracted text against signed fields.
//!
//! Rendering runs under a scoped permit with a bounded timeout; a
//! renderer slot is always released on every exit path. On failure the
//! caller degrades to unsigned raw bytes instead of aborting.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task;

use crate::error::ServiceError;
use crate::utils::canonical::CredentialFields;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN_X: i64 = 40;
const TOP_Y: i64 = 760;
const LINE_STEP: i64 = 16;
const LINES_PER_PAGE: usize = 45;
const WRAP_WIDTH: usize = 90;

/// Renderer pool with bounded concurrency and a render timeout.
pub struct CertificateRenderer {
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl CertificateRenderer {
    /// Creates a renderer pool.
    ///
    /// # Arguments
    /// * `max_concurrent` - Renderer instances available at once
    /// * `timeout` - Bound on waiting for a slot
    pub fn new(max_concurrent: usize, timeout: Duration) -> Self {
        CertificateRenderer {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            timeout,
        }
    }

    /// Renders a certificate to document bytes.
    ///
    /// Acquires a renderer slot under the configured timeout and runs the
    /// actual rendering on the blocking pool. The permit is tied to the
    /// render task, so it is released on every exit path.
    ///
    /// # Errors
    /// `ServiceError::Render` when no slot frees up in time or the
    /// document cannot be built; callers fall back to
    /// [`Self::fallback_bytes`] and deliver unsigned output.
    pub async fn render(
        &self,
        fields: &CredentialFields,
        issuer_name: &str,
        claim_id: &str,
    ) -> Result<Vec<u8>, ServiceError> {
        let permit = tokio::time::timeout(self.timeout, Arc::clone(&self.permits).acquire_owned())
            .await
            .map_err(|_| ServiceError::Render("timed out waiting for a renderer slot".into()))?
            .map_err(|_| ServiceError::Render("renderer pool closed".into()))?;

        let fields = fields.clone();
        let issuer = issuer_name.to_string();
        let claim = claim_id.to_string();
        let result = task::spawn_blocking(move || {
            let _permit = permit;
            build_certificate_pdf(&fields, &issuer, &claim)
        })
        .await
        .map_err(|e| ServiceError::Render(format!("render task failed: {e}")))?;

        result
    }

    /// Plain-text rendition used when document rendering fails. The
    /// result is unsigned raw bytes: Layer 0 of verification rejects it
    /// as unrecognized, never as valid.
    pub fn fallback_bytes(fields: &CredentialFields, issuer_name: &str, claim_id: &str) -> Vec<u8> {
        certificate_lines(fields, issuer_name, claim_id)
            .join("\n")
            .into_bytes()
    }
}

/// The certificate body as a list of text lines, one rendered line each.
pub fn certificate_lines(
    fields: &CredentialFields,
    issuer_name: &str,
    claim_id: &str,
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Skill Endorsement Certificate".to_string());
    lines.push(format!("Issued by: {issuer_name}"));
    lines.push(format!(
        "Issued: {}",
        chrono::Utc::now().format("%B %e, %Y")
    ));
    lines.push(String::new());

    lines.push(format!("Skill: {}", fields.skill_name));
    lines.push(format!("Skill Code: {}", fields.skill_code));
    lines.extend(wrap_text(&fields.skill_description, WRAP_WIDTH));
    lines.push(String::new());

    lines.push(format!("Claimant: {}", fields.claimant_name));
    lines.push("Skill Narrative:".to_string());
    lines.extend(wrap_text(&format!("\"{}\"", fields.narrative), WRAP_WIDTH));
    lines.push(String::new());

    lines.push(format!("Endorsement by: {}", fields.endorser_name));
    lines.push("Endorser Credentials:".to_string());
    lines.extend(wrap_text(&fields.bona_fides, WRAP_WIDTH));
    lines.push("Endorsement Statement:".to_string());
    lines.extend(wrap_text(
        &format!("\"{}\"", fields.endorsement_text),
        WRAP_WIDTH,
    ));
    lines.push(String::new());

    if !fields.evidence.is_empty() {
        lines.push("Supporting Evidence".to_string());
        for url in &fields.evidence {
            lines.push(url.clone());
        }
        lines.push(String::new());
    }

    lines.push("Digital Signature:".to_string());
    lines.push(fields.signature.clone());
    lines.push("This is a digitally verified skill endorsement certificate.".to_string());
    lines.push(format!("Certificate ID: {claim_id}"));
    lines.push(String::new());

    lines.push("Generated with SkillVouch OBv3 Endorsement System".to_string());
    lines.push(format!(
        "Powered by {issuer_name} | Standards-compliant Open Badges v3.0"
    ));

    lines
}

/// Wraps text at word boundaries.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Builds the certificate document synchronously.
///
/// Each text line is written as its own text object so extraction yields
/// one line per rendered line.
pub fn build_certificate_pdf(
    fields: &CredentialFields,
    issuer_name: &str,
    claim_id: &str,
) -> Result<Vec<u8>, ServiceError> {
    let lines = certificate_lines(fields, issuer_name, claim_id);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for chunk in lines.chunks(LINES_PER_PAGE) {
        let mut operations = Vec::new();
        let mut y = TOP_Y;
        for line in chunk {
            if !line.is_empty() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 11.into()]));
                operations.push(Operation::new("Td", vec![MARGIN_X.into(), y.into()]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(line.as_str())],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            y -= LINE_STEP;
        }
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| ServiceError::Render(format!("content encoding failed: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ServiceError::Render(format!("document serialization failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::extract;

    fn test_fields() -> CredentialFields {
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

    #[test]
    fn test_rendered_text_contains_labeled_sections() {
        let bytes = build_certificate_pdf(&test_fields(), "Acme Inc.", "claim-1").unwrap();
        let text = extract::extract_text(&bytes);

        assert!(text.contains("Skill: Design Skills"));
        assert!(text.contains("Skill Code: ICT403"));
        assert!(text.contains("Claimant: A. Claimant"));
        assert!(text.contains("Endorsement by: B. Endorser"));
        assert!(text.contains("Digital Signature:"));
        assert!(text.contains("https://example.com/portfolio"));
    }

    #[test]
    fn test_long_fields_paginate() {
        let mut fields = test_fields();
        fields.narrative = "word ".repeat(2000);
        let bytes = build_certificate_pdf(&fields, "Acme Inc.", "claim-1").unwrap();
        let text = extract::extract_text(&bytes);
        assert!(text.contains("Digital Signature:"));
    }

    #[test]
    fn test_wrap_text_respects_word_boundaries() {
        let lines = wrap_text("alpha bravo charlie delta", 12);
        assert_eq!(lines, vec!["alpha bravo", "charlie", "delta"]);
    }

    #[test]
    fn test_fallback_bytes_are_not_a_pdf() {
        let bytes = CertificateRenderer::fallback_bytes(&test_fields(), "Acme Inc.", "claim-1");
        assert!(!bytes.starts_with(b"%PDF"));
        assert!(String::from_utf8(bytes).unwrap().contains("Skill Code: ICT403"));
    }
}
