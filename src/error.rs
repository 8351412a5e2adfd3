// src/error.rs
//! Error taxonomy for the endorsement system.
//!
//! Token failures and malformed caller input map to 4xx responses at the
//! API layer; render, storage, and webhook failures are recovered locally
//! (degrade to unsigned bytes, inline delivery, or a reported flag) and
//! never abort a request. Verification outcomes are not errors; they are
//! reported through [`crate::models::verification::VerificationResult`].

use thiserror::Error;

/// Failures that can surface from the core services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Token carried a valid signature but is past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// Token failed the signature check or is structurally malformed.
    #[error("token invalid")]
    TokenInvalid,

    /// Malformed caller input, recovered as a 4xx-equivalent.
    #[error("invalid request: {0}")]
    Validation(String),

    /// No tenant matches the supplied identifier or API key.
    #[error("tenant not found")]
    TenantNotFound,

    /// Certificate rendering failed; callers degrade to unsigned bytes.
    #[error("render failed: {0}")]
    Render(String),

    /// Object storage failed; callers fall back to inline delivery.
    #[error("storage failed: {0}")]
    Storage(String),

    /// Document metadata could not be read or written.
    #[error("document metadata error: {0}")]
    Metadata(String),
}
