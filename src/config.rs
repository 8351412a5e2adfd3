// src/config.rs
//! Tenant configuration.
//!
//! Tenants are registered at startup; API keys are stored only as
//! SHA-256 hashes and requests are matched by hash. The environment
//! loader registers a single default tenant for development.

use std::collections::HashMap;

use crate::utils::crypto::sha256_hex;

/// One registered tenant and its delivery settings.
#[derive(Debug, Clone)]
pub struct TenantConfig {
    pub id: String,
    /// SHA-256 hex of the tenant API key; the key itself is never kept.
    pub api_key_hash: String,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub issuer_id: String,
    pub issuer_name: String,
}

impl TenantConfig {
    /// Builds a tenant entry, hashing the supplied API key.
    pub fn new(id: &str, api_key: &str, issuer_id: &str, issuer_name: &str) -> Self {
        TenantConfig {
            id: id.to_string(),
            api_key_hash: sha256_hex(api_key.as_bytes()),
            webhook_url: None,
            webhook_secret: None,
            issuer_id: issuer_id.to_string(),
            issuer_name: issuer_name.to_string(),
        }
    }
}

/// Registered tenants, looked up by identifier or API key.
#[derive(Debug, Clone, Default)]
pub struct TenantRegistry {
    tenants: HashMap<String, TenantConfig>,
}

impl TenantRegistry {
    pub fn new(tenants: Vec<TenantConfig>) -> Self {
        TenantRegistry {
            tenants: tenants.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    /// Loads the default tenant from the environment.
    pub fn from_env() -> Self {
        let api_key =
            std::env::var("SKILLVOUCH_API_KEY").unwrap_or_else(|_| "dev-api-key".to_string());
        let mut tenant = TenantConfig::new(
            "skillvouch",
            &api_key,
            &std::env::var("ISSUER_ID").unwrap_or_else(|_| {
                "https://endorse.skillvouch.example/issuers/default".to_string()
            }),
            &std::env::var("ISSUER_NAME").unwrap_or_else(|_| "SkillVouch Inc.".to_string()),
        );
        tenant.webhook_url = std::env::var("SKILLVOUCH_WEBHOOK_URL").ok();
        tenant.webhook_secret = std::env::var("SKILLVOUCH_WEBHOOK_SECRET").ok();
        TenantRegistry::new(vec![tenant])
    }

    /// Looks up a tenant by identifier.
    pub fn get(&self, tenant_id: &str) -> Option<&TenantConfig> {
        self.tenants.get(tenant_id)
    }

    /// Resolves a tenant from a presented API key by hash comparison.
    pub fn validate_api_key(&self, api_key: &str) -> Option<&TenantConfig> {
        let hash = sha256_hex(api_key.as_bytes());
        self.tenants.values().find(|t| t.api_key_hash == hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TenantRegistry {
        TenantRegistry::new(vec![TenantConfig::new(
            "acme",
            "acme-key",
            "https://endorse.example/issuers/acme",
            "Acme Inc.",
        )])
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(registry().get("acme").unwrap().issuer_name, "Acme Inc.");
        assert!(registry().get("unknown").is_none());
    }

    #[test]
    fn test_api_key_matches_by_hash_only() {
        let registry = registry();
        assert_eq!(registry.validate_api_key("acme-key").unwrap().id, "acme");
        assert!(registry.validate_api_key("wrong-key").is_none());
        // The plaintext key never appears in the stored config.
        assert_ne!(registry.get("acme").unwrap().api_key_hash, "acme-key");
        assert_eq!(registry.get("acme").unwrap().api_key_hash.len(), 64);
    }
}
