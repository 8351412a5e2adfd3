// src/auth/session_token.rs
//! Signed bearer tokens carrying the claim workflow state.
//!
//! The token is the only place workflow state exists; there is no
//! server-side session storage. Minting serializes a [`ClaimState`],
//! signs it with the symmetric server secret (HS256), and stamps
//! issued-at and expiry. Verification checks the signature first, then
//! expiry: a structurally broken or forged token is `TokenInvalid`, an
//! otherwise-valid but stale token is `TokenExpired`.

use axum::http::{header, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashMap;

use crate::error::ServiceError;
use crate::models::claim::ClaimState;

/// Mint/verify pair over the shared server secret.
///
/// Stateless and cheap to share: every operation is a pure function of
/// the keys and its inputs, safe under arbitrary parallelism.
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    /// Default token lifetime in days.
    expiry_days: i64,
}

impl SessionTokens {
    /// Creates a token service from the symmetric server secret.
    ///
    /// # Arguments
    /// * `secret` - HMAC signing key; absence of a configured secret is a
    ///   startup-fatal condition handled in `main`, not here
    /// * `expiry_days` - Default lifetime applied by [`Self::mint`]
    pub fn new(secret: &[u8], expiry_days: i64) -> Self {
        SessionTokens {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            expiry_days,
        }
    }

    /// Default token lifetime in days.
    pub fn expiry_days(&self) -> i64 {
        self.expiry_days
    }

    /// Mints a signed token carrying `state` with the default lifetime.
    pub fn mint(&self, state: ClaimState) -> Result<String, ServiceError> {
        self.mint_with_expiry(state, self.expiry_days)
    }

    /// Mints a signed token with an explicit lifetime in days.
    ///
    /// Stamps issued-at and expiry into the state before signing.
    /// Deterministic given identical state and time; the nonce inside the
    /// state is the only generated component.
    pub fn mint_with_expiry(
        &self,
        mut state: ClaimState,
        expiry_days: i64,
    ) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        state.iat = now as usize;
        state.exp = (now + expiry_days * 24 * 60 * 60) as usize;
        encode(&Header::default(), &state, &self.encoding).map_err(|_| ServiceError::TokenInvalid)
    }

    /// Verifies a token and returns the state it carries.
    ///
    /// # Errors
    /// * `TokenExpired` - valid signature, past expiry
    /// * `TokenInvalid` - any signature or structural failure
    pub fn verify(&self, token: &str) -> Result<ClaimState, ServiceError> {
        decode::<ClaimState>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
                _ => ServiceError::TokenInvalid,
            })
    }
}

/// Extracts a bearer token from a request: Authorization header first,
/// then the `token` query parameter, then the `token` cookie. First
/// match wins.
pub fn extract_token(headers: &HeaderMap, query: &HashMap<String, String>) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    if let Some(token) = query.get("token") {
        return Some(token.clone());
    }

    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|c| c.strip_prefix("token="))
                .map(str::to_string)
        })
}
