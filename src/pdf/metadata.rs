// src/pdf/metadata.rs
//! Typed proof bundle and its serialization into document metadata.
//!
//! The proof of content travels inside the document's info dictionary
//! under fixed keys. Key names must match exactly for
//! cross-implementation verification compatibility: `Signature`,
//! `Timestamp`, `ClaimID`, `Version`, `Issuer`, `ContentHash`, `JWT`,
//! `CredentialData`.

use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::error::ServiceError;

/// Fixed creator string written into descriptive metadata at signing
/// time. Re-saving a document through an external editor typically
/// rewrites this field, so it doubles as a tamper signal.
pub const CREATOR: &str = "SkillVouch OBv3 Endorsement System";

/// Proof format version tag embedded alongside the signature.
pub const FORMAT_VERSION: &str = "2.0";

/// The embedded proof of content, written once at signing time.
#[derive(Debug, Clone)]
pub struct ProofBundle {
    /// HMAC-SHA256 over identity fields and timestamp (hex).
    pub signature: String,
    /// RFC 3339 signing timestamp.
    pub timestamp: String,
    pub claim_id: String,
    pub version: String,
    pub issuer: String,
    /// SHA-256 of the canonical credential JSON (hex).
    pub content_hash: Option<String>,
    /// Canonical JSON blob of the nine credential fields.
    pub credential_data: Option<String>,
    /// Forwarded bearer token for the legacy fallback path.
    pub jwt: Option<String>,
}

fn literal(value: &str) -> Object {
    Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
}

fn hexadecimal(value: &str) -> Object {
    // Hex strings survive arbitrary payload characters unescaped.
    Object::String(value.as_bytes().to_vec(), StringFormat::Hexadecimal)
}

/// Embeds the proof bundle and descriptive metadata into rendered
/// document bytes.
///
/// Replaces the info dictionary wholesale: the document's title, author,
/// creator, and producer are set along with the proof keys.
///
/// # Errors
/// `ServiceError::Metadata` when the bytes are not a loadable document
/// or cannot be re-serialized. The artifact signer treats this as a
/// degrade signal and returns the rendered bytes unmodified.
pub fn embed(bytes: &[u8], bundle: &ProofBundle, title: &str) -> Result<Vec<u8>, ServiceError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| ServiceError::Metadata(e.to_string()))?;

    let mut info = Dictionary::new();
    info.set("Title", literal(title));
    info.set("Author", literal(&bundle.issuer));
    info.set("Creator", literal(CREATOR));
    info.set("Producer", literal(CREATOR));
    info.set("Signature", literal(&bundle.signature));
    info.set("Timestamp", literal(&bundle.timestamp));
    info.set("ClaimID", literal(&bundle.claim_id));
    info.set("Version", literal(&bundle.version));
    info.set("Issuer", literal(&bundle.issuer));
    if let Some(hash) = &bundle.content_hash {
        info.set("ContentHash", literal(hash));
    }
    if let Some(data) = &bundle.credential_data {
        info.set("CredentialData", hexadecimal(data));
    }
    if let Some(token) = &bundle.jwt {
        info.set("JWT", hexadecimal(token));
    }

    let info_id = doc.add_object(Object::Dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ServiceError::Metadata(e.to_string()))?;
    Ok(out)
}

/// Overwrites a single info-dictionary entry on an already-signed
/// document, leaving everything else in place. Reproduces the edits a
/// third party could make; test support only.
#[cfg(test)]
pub fn overwrite_info_entry(
    bytes: &[u8],
    key: &str,
    value: &str,
) -> Result<Vec<u8>, ServiceError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| ServiceError::Metadata(e.to_string()))?;

    let info_id = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => *id,
        _ => return Err(ServiceError::Metadata("no info dictionary".into())),
    };
    let info = doc
        .get_object_mut(info_id)
        .ok()
        .and_then(|obj| obj.as_dict_mut().ok())
        .ok_or_else(|| ServiceError::Metadata("info dictionary unreadable".into()))?;
    info.set(key.as_bytes().to_vec(), hexadecimal(value));

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ServiceError::Metadata(e.to_string()))?;
    Ok(out)
}

/// Writes a bare info dictionary with only the supplied proof keys.
///
/// Produces the shapes earlier-format documents carry (signature and
/// timestamp without a credential blob, optionally with a forwarded
/// token); exercises the legacy verification paths in tests.
#[cfg(test)]
pub fn embed_bare(
    bytes: &[u8],
    entries: &[(&str, &str)],
) -> Result<Vec<u8>, ServiceError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| ServiceError::Metadata(e.to_string()))?;

    let mut info = Dictionary::new();
    for (key, value) in entries {
        info.set(key.as_bytes().to_vec(), hexadecimal(value));
    }
    let info_id = doc.add_object(Object::Dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ServiceError::Metadata(e.to_string()))?;
    Ok(out)
}
