// src/services/mod.rs
//! Business logic and API.

pub mod api_server;
pub mod artifact_signer;
pub mod credential_issuer;
pub mod tamper_verifier;
pub mod webhook_dispatcher;
