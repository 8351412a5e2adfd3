// src/models/claim.rs
//! Claim workflow state carried inside signed bearer tokens.
//!
//! There is no backing database: the token *is* the workflow state. A new
//! state is minted per phase (claimant, then endorser) and never mutated
//! in place; the endorser-phase state carries every claimant field
//! forward unchanged and only adds the endorser identity and, later, the
//! endorsement content.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which phase of the claim workflow a token authorizes.
///
/// Role is a capability gate: every operation checks that the verified
/// state's role matches the role it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Claimant,
    Endorser,
}

/// The entire workflow state for one claim, serialized into the token.
///
/// Losing the token loses the claim. The one-time `nonce` is generated at
/// mint but never checked against prior use; replay tracking is an
/// explicit non-goal of the stateless design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimState {
    /// Issuing application URL.
    pub iss: String,
    /// Audience, the tenant identifier.
    pub aud: String,
    /// Tenant identifier.
    pub tenant: String,
    pub claim_id: String,
    pub skill_code: String,
    pub skill_name: String,
    pub skill_description: String,
    pub role: Role,
    /// Issued-at, seconds since epoch. Set at mint.
    #[serde(default)]
    pub iat: usize,
    /// Expiry, seconds since epoch. Set at mint.
    #[serde(default)]
    pub exp: usize,
    /// One-time use identifier, generated per mint.
    pub nonce: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub claimant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub claimant_email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub endorser_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub endorser_email: Option<String>,
    /// Claimant's narrative, carried into the endorser phase.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub claimant_narrative: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub endorsement_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bona_fides: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub evidence: Vec<String>,
    /// Typed-name digital signature supplied by the endorser.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub signature: Option<String>,
}

impl ClaimState {
    /// Builds the claimant-phase state for a freshly created claim.
    ///
    /// # Arguments
    /// * `iss` - Issuing application URL
    /// * `tenant` - Tenant identifier (also used as the audience)
    /// * `claim_id` - Claim identifier
    /// * Skill and claimant fields as submitted by the tenant
    pub fn new_claimant(
        iss: &str,
        tenant: &str,
        claim_id: &str,
        skill_code: &str,
        skill_name: &str,
        skill_description: &str,
        claimant_name: &str,
        claimant_email: &str,
    ) -> Self {
        ClaimState {
            iss: iss.to_string(),
            aud: tenant.to_string(),
            tenant: tenant.to_string(),
            claim_id: claim_id.to_string(),
            skill_code: skill_code.to_string(),
            skill_name: skill_name.to_string(),
            skill_description: skill_description.to_string(),
            role: Role::Claimant,
            iat: 0,
            exp: 0,
            nonce: Uuid::new_v4().to_string(),
            claimant_name: Some(claimant_name.to_string()),
            claimant_email: Some(claimant_email.to_string()),
            endorser_name: None,
            endorser_email: None,
            claimant_narrative: None,
            endorsement_text: None,
            bona_fides: None,
            evidence: Vec::new(),
            signature: None,
        }
    }

    /// Derives the endorser-phase state from a claimant-phase state.
    ///
    /// Carries every claimant field forward unchanged; only the role, the
    /// endorser identity, and the claimant narrative are added. A fresh
    /// nonce is generated for the new token.
    pub fn into_endorser(
        self,
        endorser_name: &str,
        endorser_email: &str,
        claimant_narrative: &str,
    ) -> Self {
        ClaimState {
            role: Role::Endorser,
            nonce: Uuid::new_v4().to_string(),
            endorser_name: Some(endorser_name.to_string()),
            endorser_email: Some(endorser_email.to_string()),
            claimant_narrative: Some(claimant_narrative.to_string()),
            iat: 0,
            exp: 0,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endorser_state_carries_claimant_fields_forward() {
        let claimant = ClaimState::new_claimant(
            "http://localhost:3000",
            "acme",
            "claim-1",
            "ICT403",
            "Design Skills",
            "Applies advanced design principles",
            "A. Claimant",
            "claimant@example.com",
        );
        let original_nonce = claimant.nonce.clone();

        let endorser = claimant
            .clone()
            .into_endorser("B. Endorser", "endorser@example.com", "My narrative here");

        assert_eq!(endorser.role, Role::Endorser);
        assert_eq!(endorser.claim_id, claimant.claim_id);
        assert_eq!(endorser.tenant, claimant.tenant);
        assert_eq!(endorser.skill_code, claimant.skill_code);
        assert_eq!(endorser.skill_name, claimant.skill_name);
        assert_eq!(endorser.skill_description, claimant.skill_description);
        assert_eq!(endorser.claimant_name, claimant.claimant_name);
        assert_eq!(endorser.claimant_email, claimant.claimant_email);
        assert_eq!(endorser.endorser_name.as_deref(), Some("B. Endorser"));
        assert_eq!(
            endorser.claimant_narrative.as_deref(),
            Some("My narrative here")
        );
        assert_ne!(endorser.nonce, original_nonce);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Claimant).unwrap(), "\"claimant\"");
        assert_eq!(serde_json::to_string(&Role::Endorser).unwrap(), "\"endorser\"");
    }
}
