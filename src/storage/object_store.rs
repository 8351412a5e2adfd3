// src/storage/object_store.rs
//! Object storage for issued artifacts.
//!
//! The store speaks the presigned-URL contract: an external presign
//! service exchanges bucket, key, and content type for a PUT URL, and
//! upload is a plain HTTP PUT against it. In local mode (no presigner
//! configured) keys map to files under a local artifacts directory and
//! presigned URLs take a `mock://` form, the same fallback the
//! development environment uses.
//!
//! Storage failures never fail the workflow; callers fall back to
//! inline byte delivery and report the artifact as unstored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

const MOCK_PREFIX: &str = "mock://localhost/s3/";

/// Builds the canonical artifact key:
/// `{tenant}/endorsements/{claim_id}/claim.{obv3.json|pdf}`.
pub fn artifact_key(tenant: &str, claim_id: &str, file_type: FileType) -> String {
    format!("{tenant}/endorsements/{claim_id}/claim.{}", file_type.extension())
}

/// The two artifact kinds a claim produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Json,
    Pdf,
}

impl FileType {
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Json => "obv3.json",
            FileType::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            FileType::Json => "application/json",
            FileType::Pdf => "application/pdf",
        }
    }
}

/// Request body sent to the presign service.
#[derive(Debug, Serialize, Deserialize)]
pub struct PresignRequest {
    pub bucket: String,
    pub key: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
}

/// Response body expected from the presign service.
#[derive(Debug, Serialize, Deserialize)]
pub struct PresignResponse {
    pub url: String,
}

/// Client for the external presign collaborator: exchanges bucket, key,
/// and content type for a presigned PUT URL. The store holds one and
/// never signs anything itself.
pub struct PresignClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PresignClient {
    pub fn new(endpoint: &str) -> Self {
        PresignClient {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Requests a presigned PUT URL for one object.
    ///
    /// # Errors
    /// `ServiceError::Storage` when the presign service is unreachable,
    /// responds non-2xx, or returns an unparseable body.
    pub async fn put_presigned(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> Result<String, ServiceError> {
        let request = PresignRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("presign request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ServiceError::Storage(format!(
                "presign service returned status {}",
                response.status()
            )));
        }
        let presigned: PresignResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Storage(format!("unparseable presign response: {e}")))?;
        Ok(presigned.url)
    }
}

enum Backend {
    Local(PathBuf),
    Remote { presigner: PresignClient, bucket: String },
}

/// Artifact store over presigned PUT URLs, with a local-directory mode
/// for development and tests.
pub struct ObjectStore {
    client: reqwest::Client,
    backend: Backend,
}

impl ObjectStore {
    /// Store writing to a local directory, keyed like the remote store.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        ObjectStore {
            client: reqwest::Client::new(),
            backend: Backend::Local(root.into()),
        }
    }

    /// Store backed by the external presign service, uploading into
    /// `bucket`.
    pub fn remote(presigner: PresignClient, bucket: &str) -> Self {
        ObjectStore {
            client: reqwest::Client::new(),
            backend: Backend::Remote {
                presigner,
                bucket: bucket.to_string(),
            },
        }
    }

    /// Produces a PUT URL for `key`. Local mode returns the `mock://`
    /// form; remote mode asks the presign service.
    pub async fn put_presigned(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, ServiceError> {
        match &self.backend {
            Backend::Local(_) => Ok(format!("{MOCK_PREFIX}{key}")),
            Backend::Remote { presigner, bucket } => {
                presigner.put_presigned(bucket, key, content_type).await
            }
        }
    }

    /// Uploads `bytes` to a presigned URL.
    ///
    /// # Errors
    /// `ServiceError::Storage` on any write or non-success response;
    /// callers degrade to inline delivery.
    pub async fn upload(
        &self,
        url: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ServiceError> {
        if let Some(key) = url.strip_prefix(MOCK_PREFIX) {
            let root = match &self.backend {
                Backend::Local(root) => root.as_path(),
                Backend::Remote { .. } => {
                    return Err(ServiceError::Storage(
                        "mock URL without local storage configured".into(),
                    ))
                }
            };
            return write_local(root, key, bytes).await;
        }

        let response = self
            .client
            .put(url)
            .header("Content-Type", content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ServiceError::Storage(format!(
                "upload returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

async fn write_local(root: &Path, key: &str, bytes: &[u8]) -> Result<(), ServiceError> {
    // Keys are slash-separated; reject traversal rather than sanitize.
    if key.split('/').any(|part| part == "..") {
        return Err(ServiceError::Storage(format!("invalid artifact key: {key}")));
    }
    let path = root.join(key);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
    }
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ServiceError::Storage(e.to_string()))?;
    log::info!("saved artifact locally: {}", path.display());
    Ok(())
}
