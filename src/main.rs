// src/main.rs

//! # SkillVouch Endorsement System - Main Entry Point
//!
//! Initializes all core components and starts the API server for the
//! stateless skill-endorsement workflow.
//!
//! ## Architecture Overview
//! 1. **Auth Layer**: signed bearer tokens carrying all workflow state
//! 2. **Services Layer**: credential issuance, certificate signing,
//!    tamper verification, webhook delivery, and API endpoints
//! 3. **Document Layer**: certificate rendering and metadata proofs
//! 4. **Storage Layer**: presigned-URL artifact uploads
//!
//! ## Environment Variables
//! - `TOKEN_SECRET`: symmetric signing key (required; startup-fatal)
//! - `APP_URL`: public base URL for magic links (default http://localhost:3000)
//! - `BIND_ADDR`: listen address (default 127.0.0.1:3000)
//! - `TOKEN_EXPIRY_DAYS`: token lifetime (default 7)
//! - `ARTIFACTS_DIR`: (optional) local artifact directory; set for
//!   development without a storage presigner
//! - `PRESIGN_ENDPOINT`, `ARTIFACTS_BUCKET`: external presign service
//!   and target bucket for production artifact storage
//! - `SKILLVOUCH_API_KEY`, `SKILLVOUCH_WEBHOOK_URL`,
//!   `SKILLVOUCH_WEBHOOK_SECRET`, `ISSUER_ID`, `ISSUER_NAME`:
//!   default-tenant configuration

use crate::config::TenantRegistry;
use crate::pdf::render::CertificateRenderer;
use crate::services::api_server::ApiServer;
use crate::services::artifact_signer::ArtifactSigner;
use crate::services::tamper_verifier::TamperVerifier;
use crate::services::webhook_dispatcher::WebhookDispatcher;
use crate::storage::object_store::{ObjectStore, PresignClient};
use dotenv::dotenv;
use std::net::SocketAddr;
use std::time::Duration;

// Module declarations (organized by functional domain)
mod auth; // bearer-token minting and verification
mod config; // tenant configuration
mod error; // error taxonomy
mod models; // data structures
mod pdf; // certificate rendering, signing metadata, extraction
mod services; // business logic and API
mod storage; // artifact object storage
mod utils; // helper functions

/// Main application entry point
///
/// # Panics
/// - If `TOKEN_SECRET` is missing (secret misconfiguration is the one
///   startup-fatal condition; everything else is recovered per request)
/// - If the listen address is malformed or cannot be bound
#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let secret = std::env::var("TOKEN_SECRET").expect("TOKEN_SECRET must be set in .env");
    let app_url =
        std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let expiry_days = std::env::var("TOKEN_EXPIRY_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(7);

    let tokens = auth::session_token::SessionTokens::new(secret.as_bytes(), expiry_days);
    let tenants = TenantRegistry::from_env();
    let renderer = CertificateRenderer::new(4, Duration::from_secs(30));
    let signer = ArtifactSigner::new(secret.as_bytes());
    let verifier = TamperVerifier::new(secret.as_bytes());
    let dispatcher = WebhookDispatcher::new();
    let store = match std::env::var("ARTIFACTS_DIR") {
        Ok(dir) => ObjectStore::local(dir),
        Err(_) => {
            match (
                std::env::var("PRESIGN_ENDPOINT"),
                std::env::var("ARTIFACTS_BUCKET"),
            ) {
                (Ok(endpoint), Ok(bucket)) => {
                    ObjectStore::remote(PresignClient::new(&endpoint), &bucket)
                }
                _ => {
                    log::warn!(
                        "no presigner configured; storing artifacts under ./artifacts"
                    );
                    ObjectStore::local("artifacts")
                }
            }
        }
    };

    let api_server = ApiServer::new(
        tokens, tenants, renderer, signer, verifier, dispatcher, store, &app_url,
    );

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .expect("BIND_ADDR must be a socket address");
    log::info!("API server running at http://{addr}");
    api_server.run(addr).await;
}
