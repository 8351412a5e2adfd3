// src/services/api_server.rs
//! HTTP API for the skill-endorsement workflow.
//!
//! The API is built using Axum and includes endpoints for:
//! - Claim creation (tenant API key) and endorser-link minting
//! - Endorsement submission: credential assembly, certificate rendering
//!   and signing, artifact storage, and webhook scheduling
//! - Artifact re-download from a completed endorsement token
//! - Document verification, with optional claimed-facts checking
//! - Inbound webhook signature testing
//!
//! All workflow state travels in bearer tokens; handlers hold no
//! per-claim server state.

use crate::auth::session_token::{extract_token, SessionTokens};
use crate::config::{TenantConfig, TenantRegistry};
use crate::error::ServiceError;
use crate::models::claim::{ClaimState, Role};
use crate::models::credential::AchievementCredential;
use crate::models::verification::{ClaimedCheck, VerificationResult};
use crate::models::webhook::{ArtifactRef, WebhookPayload};
use crate::pdf::render::CertificateRenderer;
use crate::services::artifact_signer::{ArtifactSigner, SignedArtifact};
use crate::services::credential_issuer::CredentialIssuer;
use crate::services::tamper_verifier::TamperVerifier;
use crate::services::webhook_dispatcher::WebhookDispatcher;
use crate::storage::object_store::{artifact_key, FileType, ObjectStore};
use crate::utils::canonical::CredentialFields;
use crate::utils::validation::{require_email, require_min_len, require_non_empty, require_url};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

/// Upload cap for verification requests.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Retry attempts for webhook delivery (the full schedule).
const WEBHOOK_MAX_ATTEMPTS: u32 = 5;

// API request and response structures

/// Request payload for creating a claim.
#[derive(Serialize, Deserialize)]
struct CreateClaimRequest {
    skill_code: String,
    skill_name: String,
    skill_description: String,
    claimant_name: String,
    claimant_email: String,
}

/// Response for claim creation.
#[derive(Serialize, Deserialize)]
struct CreateClaimResponse {
    claim_id: String,
    /// Magic link carrying the claimant token.
    claimant_url: String,
    expires_at: String,
}

/// Request payload for minting an endorser link.
#[derive(Serialize, Deserialize)]
struct EndorserLinkRequest {
    endorser_name: String,
    endorser_email: String,
    /// Claimant's narrative, locked into the endorser token.
    narrative: String,
}

/// Response containing the endorser magic link.
#[derive(Serialize, Deserialize)]
struct EndorserLinkResponse {
    endorser_url: String,
    expires_at: String,
}

/// Request payload for submitting an endorsement.
#[derive(Serialize, Deserialize)]
struct SubmitEndorsementRequest {
    endorsement_text: String,
    bona_fides: String,
    #[serde(default)]
    evidence: Vec<String>,
    /// Typed-name digital signature.
    signature: String,
}

/// Response for endorsement submission.
#[derive(Serialize, Deserialize)]
struct SubmitEndorsementResponse {
    claim_id: String,
    credential: AchievementCredential,
    artifacts: Vec<ArtifactRef>,
    /// Signed certificate bytes, base64, for inline download.
    pdf_base64: String,
    /// Whether the certificate carries an embedded proof.
    signed: bool,
    /// Whether both artifacts reached object storage.
    stored: bool,
    webhook_scheduled: bool,
    /// Token for later artifact re-download.
    download_token: String,
}

/// Response for an artifact download.
#[derive(Serialize, Deserialize)]
struct DownloadResponse {
    file_name: String,
    content_type: String,
    base64: String,
}

/// Response for document verification.
#[derive(Serialize, Deserialize)]
struct VerifyPdfResponse {
    document: VerificationResult,
    /// Present when the three identity fields accompanied the upload.
    #[serde(skip_serializing_if = "Option::is_none")]
    claimed: Option<ClaimedCheck>,
}

/// Response for the webhook signature test.
#[derive(Serialize, Deserialize)]
struct WebhookTestResponse {
    valid: bool,
}

/// Error body returned with every non-2xx response.
#[derive(Serialize, Deserialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn reject(e: ServiceError) -> ApiError {
    let status = match e {
        ServiceError::TokenExpired | ServiceError::TokenInvalid => StatusCode::UNAUTHORIZED,
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::TenantNotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorBody { error: e.to_string() }))
}

fn forbidden(message: &str) -> ApiError {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

/// API server state containing all service dependencies.
#[derive(Clone)]
pub struct ApiServer {
    tokens: Arc<SessionTokens>,
    tenants: Arc<TenantRegistry>,
    renderer: Arc<CertificateRenderer>,
    signer: Arc<ArtifactSigner>,
    verifier: Arc<TamperVerifier>,
    dispatcher: Arc<WebhookDispatcher>,
    store: Arc<ObjectStore>,
    /// Public base URL used in minted magic links.
    app_url: String,
}

impl ApiServer {
    /// Creates a new instance of the API server.
    ///
    /// # Arguments
    /// * `tokens` - Bearer-token mint/verify service
    /// * `tenants` - Registered tenant configurations
    /// * `renderer` - Certificate renderer pool
    /// * `signer` - Certificate signer
    /// * `verifier` - Document tamper verifier
    /// * `dispatcher` - Webhook delivery service
    /// * `store` - Artifact object store
    /// * `app_url` - Public base URL for magic links
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tokens: SessionTokens,
        tenants: TenantRegistry,
        renderer: CertificateRenderer,
        signer: ArtifactSigner,
        verifier: TamperVerifier,
        dispatcher: WebhookDispatcher,
        store: ObjectStore,
        app_url: &str,
    ) -> Self {
        ApiServer {
            tokens: Arc::new(tokens),
            tenants: Arc::new(tenants),
            renderer: Arc::new(renderer),
            signer: Arc::new(signer),
            verifier: Arc::new(verifier),
            dispatcher: Arc::new(dispatcher),
            store: Arc::new(store),
            app_url: app_url.to_string(),
        }
    }

    /// Configures all API routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/v1/claims", post(Self::create_claim_handler))
            .route(
                "/api/v1/claims/:id/endorser-link",
                post(Self::endorser_link_handler),
            )
            .route(
                "/api/v1/endorsements/submit",
                post(Self::submit_endorsement_handler),
            )
            .route(
                "/api/v1/endorsements/:id/download/:file_type",
                get(Self::download_handler),
            )
            .route(
                "/api/v1/verify-pdf",
                post(Self::verify_pdf_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
            )
            .route("/api/v1/webhook/test", post(Self::webhook_test_handler))
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and begins listening for requests.
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(&self, addr: SocketAddr) {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("failed to bind API listener");
        axum::serve(listener, app)
            .await
            .expect("API server terminated");
    }

    // =====================
    // Shared helpers
    // =====================

    fn tenant_from_api_key(&self, headers: &HeaderMap) -> Result<&TenantConfig, ServiceError> {
        headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .and_then(|key| self.tenants.validate_api_key(key))
            .ok_or(ServiceError::TenantNotFound)
    }

    fn verified_state(
        &self,
        headers: &HeaderMap,
        query: &HashMap<String, String>,
    ) -> Result<ClaimState, ServiceError> {
        let token = extract_token(headers, query).ok_or(ServiceError::TokenInvalid)?;
        self.tokens.verify(&token)
    }

    fn expires_at(&self) -> String {
        (Utc::now() + chrono::Duration::days(self.tokens.expiry_days())).to_rfc3339()
    }

    /// Assembles the nine signed fields from a completed endorser state.
    fn credential_fields(state: &ClaimState) -> Result<CredentialFields, ServiceError> {
        let field = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| ServiceError::Validation(format!("missing {name} in claim state")))
        };
        Ok(CredentialFields {
            skill_name: state.skill_name.clone(),
            skill_code: state.skill_code.clone(),
            skill_description: state.skill_description.clone(),
            claimant_name: field(&state.claimant_name, "claimant name")?,
            narrative: field(&state.claimant_narrative, "claimant narrative")?,
            endorser_name: field(&state.endorser_name, "endorser name")?,
            endorsement_text: field(&state.endorsement_text, "endorsement text")?,
            bona_fides: field(&state.bona_fides, "bona fides")?,
            signature: field(&state.signature, "signature")?,
            evidence: state.evidence.clone(),
        })
    }

    /// Builds both artifacts for a completed endorsement: the credential
    /// JSON and the rendered, signed certificate. Render failure
    /// degrades to unsigned fallback bytes rather than failing.
    async fn generate_artifacts(
        &self,
        state: &ClaimState,
        tenant: &TenantConfig,
        token: &str,
    ) -> Result<(AchievementCredential, String, SignedArtifact), ServiceError> {
        let issuer = CredentialIssuer::new(&tenant.issuer_id, &tenant.issuer_name);
        let credential = issuer.issue(state)?;
        let json = serde_json::to_string_pretty(&credential)
            .map_err(|e| ServiceError::Metadata(e.to_string()))?;

        let fields = Self::credential_fields(state)?;
        let rendered = match self
            .renderer
            .render(&fields, &tenant.issuer_name, &state.claim_id)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("render failed for claim {}: {e}; using fallback", state.claim_id);
                CertificateRenderer::fallback_bytes(&fields, &tenant.issuer_name, &state.claim_id)
            }
        };
        let signed = self.signer.sign(
            &fields,
            &rendered,
            &state.claim_id,
            &tenant.issuer_name,
            Some(token),
        )?;
        Ok((credential, json, signed))
    }

    // =====================
    // Claim workflow handlers
    // =====================

    /// Creates a claim and mints the claimant magic link.
    ///
    /// # Endpoint
    /// POST /api/v1/claims
    ///
    /// # Responses
    /// - 200 OK: claim id, claimant URL, and token expiry
    /// - 400 Bad Request: validation failure
    /// - 404 Not Found: unknown API key
    async fn create_claim_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<CreateClaimRequest>,
    ) -> Result<Json<CreateClaimResponse>, ApiError> {
        let tenant = state.tenant_from_api_key(&headers).map_err(reject)?;

        require_non_empty(&payload.skill_code, "skill_code").map_err(reject)?;
        require_non_empty(&payload.skill_name, "skill_name").map_err(reject)?;
        require_non_empty(&payload.skill_description, "skill_description").map_err(reject)?;
        require_non_empty(&payload.claimant_name, "claimant_name").map_err(reject)?;
        require_email(&payload.claimant_email, "claimant_email").map_err(reject)?;

        let claim_id = format!("{}/{}", tenant.id, Uuid::new_v4());
        let claim = ClaimState::new_claimant(
            &state.app_url,
            &tenant.id,
            &claim_id,
            &payload.skill_code,
            &payload.skill_name,
            &payload.skill_description,
            &payload.claimant_name,
            &payload.claimant_email,
        );
        let token = state.tokens.mint(claim).map_err(reject)?;

        log::info!("claim {claim_id} created for tenant {}", tenant.id);
        Ok(Json(CreateClaimResponse {
            claimant_url: format!("{}/claim?token={token}", state.app_url),
            expires_at: state.expires_at(),
            claim_id,
        }))
    }

    /// Mints the endorser magic link from a claimant token.
    ///
    /// # Endpoint
    /// POST /api/v1/claims/:id/endorser-link
    ///
    /// # Responses
    /// - 200 OK: endorser URL and token expiry
    /// - 400 Bad Request: validation failure
    /// - 401 Unauthorized: missing, invalid, or expired token
    /// - 403 Forbidden: wrong role or claim mismatch
    async fn endorser_link_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<String>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(payload): Json<EndorserLinkRequest>,
    ) -> Result<Json<EndorserLinkResponse>, ApiError> {
        let claim = state.verified_state(&headers, &query).map_err(reject)?;
        if claim.role != Role::Claimant {
            return Err(forbidden("an endorser link requires a claimant token"));
        }
        if claim.claim_id != id {
            return Err(forbidden("token does not match this claim"));
        }

        require_non_empty(&payload.endorser_name, "endorser_name").map_err(reject)?;
        require_email(&payload.endorser_email, "endorser_email").map_err(reject)?;
        require_min_len(&payload.narrative, 10, "narrative").map_err(reject)?;

        let endorser_state = claim.into_endorser(
            &payload.endorser_name,
            &payload.endorser_email,
            &payload.narrative,
        );
        let token = state.tokens.mint(endorser_state).map_err(reject)?;

        Ok(Json(EndorserLinkResponse {
            endorser_url: format!("{}/endorse?token={token}", state.app_url),
            expires_at: state.expires_at(),
        }))
    }

    /// Submits an endorsement: builds the credential pair, renders and
    /// signs the certificate, stores artifacts, and schedules the
    /// tenant webhook.
    ///
    /// # Endpoint
    /// POST /api/v1/endorsements/submit
    ///
    /// # Responses
    /// - 200 OK: credential, artifact keys, and inline downloads
    /// - 400 Bad Request: validation failure
    /// - 401 Unauthorized: missing, invalid, or expired token
    /// - 403 Forbidden: wrong role
    async fn submit_endorsement_handler(
        State(state): State<Arc<ApiServer>>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(payload): Json<SubmitEndorsementRequest>,
    ) -> Result<Json<SubmitEndorsementResponse>, ApiError> {
        let claim = state.verified_state(&headers, &query).map_err(reject)?;
        if claim.role != Role::Endorser {
            return Err(forbidden("endorsement submission requires an endorser token"));
        }

        require_min_len(&payload.endorsement_text, 10, "endorsement_text").map_err(reject)?;
        require_min_len(&payload.bona_fides, 5, "bona_fides").map_err(reject)?;
        require_min_len(&payload.signature, 2, "signature").map_err(reject)?;
        for url in &payload.evidence {
            require_url(url, "evidence").map_err(reject)?;
        }

        let mut completed = claim;
        completed.endorsement_text = Some(payload.endorsement_text);
        completed.bona_fides = Some(payload.bona_fides);
        completed.evidence = payload.evidence;
        completed.signature = Some(payload.signature);

        let tenant = state
            .tenants
            .get(&completed.tenant)
            .ok_or(ServiceError::TenantNotFound)
            .map_err(reject)?;

        // The completed state is minted back out so artifacts can be
        // re-generated later from the token alone.
        let download_token = state.tokens.mint(completed.clone()).map_err(reject)?;
        let (credential, json, signed) = state
            .generate_artifacts(&completed, tenant, &download_token)
            .await
            .map_err(reject)?;

        let json_key = artifact_key(&tenant.id, &completed.claim_id, FileType::Json);
        let pdf_key = artifact_key(&tenant.id, &completed.claim_id, FileType::Pdf);
        let mut stored = true;
        for (key, bytes, file_type) in [
            (&json_key, json.as_bytes(), FileType::Json),
            (&pdf_key, signed.bytes.as_slice(), FileType::Pdf),
        ] {
            let outcome = match state
                .store
                .put_presigned(key, file_type.content_type())
                .await
            {
                Ok(url) => state.store.upload(&url, bytes, file_type.content_type()).await,
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                log::warn!("artifact upload failed for {key}: {e}; delivering inline only");
                stored = false;
            }
        }
        let artifacts = vec![
            ArtifactRef {
                artifact_type: "obv3-json".to_string(),
                s3_key: json_key,
                s3_url: None,
            },
            ArtifactRef {
                artifact_type: "pdf".to_string(),
                s3_key: pdf_key,
                s3_url: None,
            },
        ];

        // Delivery can span tens of hours across retries; it runs
        // detached and never blocks this response.
        let webhook_scheduled = match (&tenant.webhook_url, &tenant.webhook_secret) {
            (Some(url), Some(secret)) => {
                let dispatcher = Arc::clone(&state.dispatcher);
                let payload = WebhookPayload::claim_endorsed(
                    &completed.claim_id,
                    &completed.skill_code,
                    &completed.skill_name,
                    completed.claimant_name.as_deref().unwrap_or_default(),
                    completed.endorser_name.as_deref().unwrap_or_default(),
                    artifacts.clone(),
                );
                let url = url.clone();
                let secret = secret.clone();
                tokio::spawn(async move {
                    let result = dispatcher
                        .send(&url, &payload, &secret, WEBHOOK_MAX_ATTEMPTS)
                        .await;
                    if !result.success {
                        log::error!(
                            "webhook delivery for {} exhausted {} attempts: {:?}",
                            payload.claim_id,
                            result.attempts,
                            result.last_error
                        );
                    }
                });
                true
            }
            _ => false,
        };

        Ok(Json(SubmitEndorsementResponse {
            claim_id: completed.claim_id.clone(),
            credential,
            artifacts,
            pdf_base64: base64::encode(&signed.bytes),
            signed: signed.signed,
            stored,
            webhook_scheduled,
            download_token,
        }))
    }

    /// Re-generates an artifact from a completed endorsement token.
    ///
    /// # Endpoint
    /// GET /api/v1/endorsements/:id/download/:file_type
    ///
    /// # Responses
    /// - 200 OK: file name, content type, and base64 content
    /// - 400 Bad Request: unknown artifact type or incomplete token
    /// - 401 Unauthorized: missing, invalid, or expired token
    /// - 403 Forbidden: wrong role or claim mismatch
    async fn download_handler(
        State(state): State<Arc<ApiServer>>,
        Path((id, file_type)): Path<(String, String)>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Result<Json<DownloadResponse>, ApiError> {
        let claim = state.verified_state(&headers, &query).map_err(reject)?;
        if claim.role != Role::Endorser {
            return Err(forbidden("downloads require an endorser token"));
        }
        if claim.claim_id != id {
            return Err(forbidden("token does not match this claim"));
        }
        if claim.endorsement_text.is_none() {
            return Err(bad_request("this claim has not been endorsed yet"));
        }

        let tenant = state
            .tenants
            .get(&claim.tenant)
            .ok_or(ServiceError::TenantNotFound)
            .map_err(reject)?;
        let token = extract_token(&headers, &query).ok_or_else(|| reject(ServiceError::TokenInvalid))?;
        let (_, json, signed) = state
            .generate_artifacts(&claim, tenant, &token)
            .await
            .map_err(reject)?;

        match file_type.as_str() {
            "json" => Ok(Json(DownloadResponse {
                file_name: "claim.obv3.json".to_string(),
                content_type: FileType::Json.content_type().to_string(),
                base64: base64::encode(json.as_bytes()),
            })),
            "pdf" => Ok(Json(DownloadResponse {
                file_name: "claim.pdf".to_string(),
                content_type: FileType::Pdf.content_type().to_string(),
                base64: base64::encode(&signed.bytes),
            })),
            _ => Err(bad_request("artifact type must be \"json\" or \"pdf\"")),
        }
    }

    // =====================
    // Verification handlers
    // =====================

    /// Verifies an uploaded certificate document.
    ///
    /// Always runs document verification; also runs claimed-facts
    /// verification when `skill_code`, `claimant_name`, and
    /// `endorser_name` accompany the file.
    ///
    /// # Endpoint
    /// POST /api/v1/verify-pdf (multipart, 10 MB cap)
    ///
    /// # Responses
    /// - 200 OK: verification outcome(s)
    /// - 400 Bad Request: missing or non-PDF file
    async fn verify_pdf_handler(
        State(state): State<Arc<ApiServer>>,
        mut multipart: Multipart,
    ) -> Result<Json<VerifyPdfResponse>, ApiError> {
        let mut file: Option<Vec<u8>> = None;
        let mut skill_code = None;
        let mut claimant_name = None;
        let mut endorser_name = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(&format!("malformed multipart body: {e}")))?
        {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| bad_request(&format!("unreadable file: {e}")))?;
                    file = Some(bytes.to_vec());
                }
                Some(part @ ("skill_code" | "claimant_name" | "endorser_name")) => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| bad_request(&format!("unreadable {part}: {e}")))?;
                    match part {
                        "skill_code" => skill_code = Some(text),
                        "claimant_name" => claimant_name = Some(text),
                        _ => endorser_name = Some(text),
                    }
                }
                _ => {}
            }
        }

        let file = file.ok_or_else(|| bad_request("a \"file\" field is required"))?;
        if !file.starts_with(b"%PDF") {
            return Err(bad_request("the uploaded file is not a PDF document"));
        }

        let document = state.verifier.verify_document(&file);
        let claimed = match (skill_code, claimant_name, endorser_name) {
            (Some(code), Some(claimant), Some(endorser)) => {
                Some(state.verifier.verify_claimed(&file, &code, &claimant, &endorser))
            }
            _ => None,
        };

        Ok(Json(VerifyPdfResponse { document, claimed }))
    }

    /// Verifies an inbound webhook signature against the tenant's
    /// webhook secret, for receiver-side integration testing.
    ///
    /// # Endpoint
    /// POST /api/v1/webhook/test
    ///
    /// # Responses
    /// - 200 OK: whether the signature matches
    /// - 400 Bad Request: tenant has no webhook secret or no signature
    /// - 404 Not Found: unknown API key
    async fn webhook_test_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        body: axum::body::Bytes,
    ) -> Result<Json<WebhookTestResponse>, ApiError> {
        let tenant = state.tenant_from_api_key(&headers).map_err(reject)?;
        let secret = tenant
            .webhook_secret
            .as_deref()
            .ok_or_else(|| bad_request("tenant has no webhook secret configured"))?;
        let signature = headers
            .get("x-signature")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| bad_request("an X-Signature header is required"))?;

        Ok(Json(WebhookTestResponse {
            valid: WebhookDispatcher::verify_incoming_signature(&body, signature, secret),
        }))
    }
}
