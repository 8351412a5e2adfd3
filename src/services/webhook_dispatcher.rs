// src/services/webhook_dispatcher.rs
//! Signed webhook delivery with bounded retry.
//!
//! Delivers `claim.endorsed` notifications to tenant endpoints. The body
//! is signed with the tenant's webhook secret and the retry schedule is
//! fixed and escalating; the total worst-case span is tens of hours, so
//! dispatch always runs as a detached background task, never inside a
//! request cycle.

use std::time::Duration;

use uuid::Uuid;

use crate::models::webhook::WebhookPayload;
use crate::utils::crypto::{hmac_sha256_hex, verify_hmac_hex};

/// Escalating delay applied between attempts: 1 minute, 5 minutes,
/// 30 minutes, 6 hours, 24 hours.
pub const RETRY_SCHEDULE_SECS: [u64; 5] = [60, 300, 1800, 21_600, 86_400];

/// Outcome of one delivery run.
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    pub success: bool,
    /// Attempts actually made, including the successful one.
    pub attempts: u32,
    /// Last observed error or non-2xx status when delivery failed.
    pub last_error: Option<String>,
}

/// Delivers signed webhook notifications.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    schedule: Vec<Duration>,
}

impl Default for WebhookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookDispatcher {
    pub fn new() -> Self {
        WebhookDispatcher {
            client: reqwest::Client::new(),
            schedule: RETRY_SCHEDULE_SECS
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
        }
    }

    /// Same dispatcher with an explicit delay schedule. Used by tests to
    /// avoid real multi-minute sleeps.
    pub fn with_schedule(schedule: Vec<Duration>) -> Self {
        WebhookDispatcher {
            client: reqwest::Client::new(),
            schedule,
        }
    }

    fn delay_before_attempt(&self, next_attempt: u32) -> Duration {
        // The schedule applies sequentially; past its end the last delay
        // repeats.
        let index = (next_attempt as usize).saturating_sub(2);
        self.schedule
            .get(index.min(self.schedule.len().saturating_sub(1)))
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Delivers `payload` to `url`, retrying on failure up to
    /// `max_attempts` total attempts.
    ///
    /// The body is a stable JSON serialization signed with
    /// HMAC-SHA256; headers carry the signature, the tenant identifier
    /// derived from the leading segment of the claim identifier, and a
    /// fresh delivery identifier. The first 2xx response short-circuits
    /// success.
    pub async fn send(
        &self,
        url: &str,
        payload: &WebhookPayload,
        secret: &str,
        max_attempts: u32,
    ) -> DeliveryResult {
        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(e) => {
                return DeliveryResult {
                    success: false,
                    attempts: 0,
                    last_error: Some(format!("payload serialization failed: {e}")),
                }
            }
        };
        let signature = hmac_sha256_hex(secret.as_bytes(), body.as_bytes());
        let tenant = payload
            .claim_id
            .split('/')
            .next()
            .unwrap_or(&payload.claim_id)
            .to_string();
        let event_id = Uuid::new_v4().to_string();

        let mut last_error = None;
        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.delay_before_attempt(attempt)).await;
            }

            let response = self
                .client
                .post(url)
                .header("Content-Type", "application/json")
                .header("X-Signature", format!("sha256={signature}"))
                .header("X-Tenant", &tenant)
                .header("X-Event-Id", &event_id)
                .body(body.clone())
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    log::info!(
                        "webhook {event_id} delivered to {url} on attempt {attempt}"
                    );
                    return DeliveryResult {
                        success: true,
                        attempts: attempt,
                        last_error: None,
                    };
                }
                Ok(resp) => {
                    log::warn!(
                        "webhook {event_id} attempt {attempt} to {url} returned {}",
                        resp.status()
                    );
                    last_error = Some(format!("received status {}", resp.status()));
                }
                Err(e) => {
                    log::warn!("webhook {event_id} attempt {attempt} to {url} failed: {e}");
                    last_error = Some(e.to_string());
                }
            }
        }

        DeliveryResult {
            success: false,
            attempts: max_attempts,
            last_error,
        }
    }

    /// Constant-time check of an inbound webhook signature, for
    /// acknowledgment endpoints receiving our own scheme back.
    pub fn verify_incoming_signature(body: &[u8], signature: &str, secret: &str) -> bool {
        let hex = signature.strip_prefix("sha256=").unwrap_or(signature);
        verify_hmac_hex(secret.as_bytes(), body, hex)
    }
}
