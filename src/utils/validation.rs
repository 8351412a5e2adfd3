// src/utils/validation.rs
//! Request body validation helpers.
//!
//! Small, composable checks that surface as `ServiceError::Validation`
//! (a 4xx-equivalent). Field rules mirror the public API contract:
//! non-empty identifiers, minimum lengths for free text, plausible
//! emails, and http(s) evidence URLs.

use crate::error::ServiceError;

/// Rejects empty or whitespace-only values.
pub fn require_non_empty(value: &str, field: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        Err(ServiceError::Validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

/// Requires at least `min` characters after trimming.
pub fn require_min_len(value: &str, min: usize, field: &str) -> Result<(), ServiceError> {
    if value.trim().chars().count() < min {
        Err(ServiceError::Validation(format!(
            "{field} must be at least {min} characters"
        )))
    } else {
        Ok(())
    }
}

/// Minimal email shape check: one `@` with a dotted domain after it.
pub fn require_email(value: &str, field: &str) -> Result<(), ServiceError> {
    let mut parts = value.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    let well_formed = parts.next().is_none()
        && !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if well_formed {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "{field} must be a valid email address"
        )))
    }
}

/// Requires an absolute http(s) URL.
pub fn require_url(value: &str, field: &str) -> Result<(), ServiceError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) if !rest.is_empty() => Ok(()),
        _ => Err(ServiceError::Validation(format!(
            "{field} must be an http(s) URL"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert!(require_non_empty("x", "field").is_ok());
        assert!(require_non_empty("  ", "field").is_err());
    }

    #[test]
    fn test_min_len() {
        assert!(require_min_len("0123456789", 10, "narrative").is_ok());
        assert!(require_min_len("too short", 10, "narrative").is_err());
    }

    #[test]
    fn test_email() {
        assert!(require_email("person@example.com", "email").is_ok());
        assert!(require_email("no-at-sign", "email").is_err());
        assert!(require_email("two@@example.com", "email").is_err());
        assert!(require_email("x@nodot", "email").is_err());
    }

    #[test]
    fn test_url() {
        assert!(require_url("https://example.com/a", "evidence").is_ok());
        assert!(require_url("http://example.com", "evidence").is_ok());
        assert!(require_url("ftp://example.com", "evidence").is_err());
        assert!(require_url("example.com", "evidence").is_err());
    }
}
