// src/pdf/extract.rs
//! Metadata and plain-text extraction from document bytes.
//!
//! Both verifier entry points are pure reads over the supplied bytes:
//! nothing here mutates the document, so extraction is safe to invoke
//! repeatedly and concurrently on the same buffer.

use lopdf::{Dictionary, Document, Object};

use crate::error::ServiceError;

/// Everything the verifier reads out of a document's info dictionary:
/// descriptive fields plus the embedded proof keys. Absent keys stay
/// `None`; an unsigned document yields all-`None`.
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub signature: Option<String>,
    pub timestamp: Option<String>,
    pub claim_id: Option<String>,
    pub version: Option<String>,
    pub issuer: Option<String>,
    pub content_hash: Option<String>,
    pub credential_data: Option<String>,
    pub jwt: Option<String>,
}

impl DocumentMetadata {
    /// Signature and timestamp both present: the primary indicator that
    /// this document was issued by the signing pipeline.
    pub fn has_signature(&self) -> bool {
        self.signature.is_some() && self.timestamp.is_some()
    }
}

fn info_dict(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn string_value(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Reads the metadata the verifier operates on.
///
/// # Errors
/// `ServiceError::Metadata` when the bytes are not a loadable document;
/// the verifier reports such input as "not a recognized certificate".
pub fn extract_metadata(bytes: &[u8]) -> Result<DocumentMetadata, ServiceError> {
    let doc = Document::load_mem(bytes).map_err(|e| ServiceError::Metadata(e.to_string()))?;

    let mut metadata = DocumentMetadata::default();
    if let Some(dict) = info_dict(&doc) {
        metadata.title = string_value(dict, b"Title");
        metadata.author = string_value(dict, b"Author");
        metadata.creator = string_value(dict, b"Creator");
        metadata.producer = string_value(dict, b"Producer");
        metadata.signature = string_value(dict, b"Signature");
        metadata.timestamp = string_value(dict, b"Timestamp");
        metadata.claim_id = string_value(dict, b"ClaimID");
        metadata.version = string_value(dict, b"Version");
        metadata.issuer = string_value(dict, b"Issuer");
        metadata.content_hash = string_value(dict, b"ContentHash");
        metadata.credential_data = string_value(dict, b"CredentialData");
        metadata.jwt = string_value(dict, b"JWT");
    }
    Ok(metadata)
}

/// Extracts the document's plain text across all pages.
///
/// Extraction failures yield an empty string: the content cross-check
/// then reports every expected field as missing rather than erroring.
pub fn extract_text(bytes: &[u8]) -> String {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(_) => return String::new(),
    };
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    doc.extract_text(&pages).unwrap_or_default()
}
