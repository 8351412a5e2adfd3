// src/models/webhook.rs
//! Webhook notification payload delivered to tenants on endorsement.

use serde::{Deserialize, Serialize};

/// One stored artifact referenced by the notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// "obv3-json" or "pdf".
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub s3_key: String,
    /// Optional presigned GET URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_url: Option<String>,
}

/// Payload for the `claim.endorsed` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub event: String,
    pub claim_id: String,
    pub skill_code: String,
    pub skill_name: String,
    pub claimant_name: String,
    pub endorser_name: String,
    pub artifacts: Vec<ArtifactRef>,
    /// RFC 3339 timestamp of the endorsement.
    pub timestamp: String,
}

impl WebhookPayload {
    /// Builds a `claim.endorsed` payload.
    #[allow(clippy::too_many_arguments)]
    pub fn claim_endorsed(
        claim_id: &str,
        skill_code: &str,
        skill_name: &str,
        claimant_name: &str,
        endorser_name: &str,
        artifacts: Vec<ArtifactRef>,
    ) -> Self {
        WebhookPayload {
            event: "claim.endorsed".to_string(),
            claim_id: claim_id.to_string(),
            skill_code: skill_code.to_string(),
            skill_name: skill_name.to_string(),
            claimant_name: claimant_name.to_string(),
            endorser_name: endorser_name.to_string(),
            artifacts,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
