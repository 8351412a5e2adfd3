// src/models/credential.rs
//! Open Badges v3 credential data model.
//!
//! Defines the achievement/endorsement credential pair produced for an
//! endorsed claim, following the OBv3 / W3C Verifiable Credentials shape.
//! These are plain data structures: construction lives in the credential
//! issuer service, and serialization is the artifact delivered to tenants.

use serde::{Deserialize, Serialize};

/// JSON-LD context for OBv3 credentials.
pub const OBV3_CONTEXT: [&str; 2] = [
    "https://www.w3.org/ns/credentials/v2",
    "https://purl.imsglobal.org/spec/ob/v3p0/context-3.0.3.json",
];

/// Issuer or endorser profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(rename = "type")]
    pub profile_type: String,
    pub name: String,
}

/// Criteria under which the achievement was assessed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criteria {
    pub narrative: String,
}

/// The skill being endorsed, embedded as an OBv3 achievement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    /// Skill code, e.g. "ICTDSN403".
    pub id: String,
    #[serde(rename = "type")]
    pub achievement_type: String,
    pub name: String,
    pub description: String,
    pub criteria: Criteria,
}

/// Subject of the achievement credential: the claimant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementSubject {
    /// Derived from the claimant email, e.g. "did:email:a@example.com".
    pub id: String,
    #[serde(rename = "type")]
    pub subject_type: String,
    pub name: String,
    pub narrative: String,
    pub achievement: Achievement,
}

/// One evidence record per submitted URL, named positionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub evidence_type: String,
    /// Positional name, "Evidence 1", "Evidence 2", ...
    pub name: String,
}

/// Endorser profile embedded in the endorsement subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndorserProfile {
    #[serde(rename = "type")]
    pub profile_type: String,
    pub name: String,
    /// The endorser's bona fides.
    pub description: String,
}

/// Subject of the endorsement credential: the endorser's comment about
/// the achievement credential it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndorsementSubject {
    /// References the achievement credential's id.
    pub id: String,
    #[serde(rename = "type")]
    pub subject_type: String,
    #[serde(rename = "endorsementComment")]
    pub endorsement_comment: String,
    pub profile: EndorserProfile,
}

/// An OBv3 endorsement credential linked to an achievement credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndorsementCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    pub id: String,
    pub issuer: Profile,
    #[serde(rename = "issuanceDate")]
    pub issuance_date: String,
    #[serde(rename = "credentialSubject")]
    pub credential_subject: EndorsementSubject,
}

/// An OBv3 achievement credential for the claimed skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    pub id: String,
    pub issuer: Profile,
    #[serde(rename = "issuanceDate")]
    pub issuance_date: String,
    #[serde(rename = "credentialSubject")]
    pub credential_subject: AchievementSubject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<EvidenceRecord>>,
    /// Populated by linking; holds exactly one entry per claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endorsement: Option<Vec<EndorsementCredential>>,
}
