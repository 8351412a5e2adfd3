// src/services/credential_issuer.rs
//! Open Badges v3 credential assembly.
//!
//! Builds the achievement credential for an endorsed claim, the
//! endorsement credential referencing it, and links the two. Inputs come
//! from a verified endorser-phase claim state; the issuer never invents
//! field values beyond generated identifiers and timestamps.

use chrono::Utc;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::claim::ClaimState;
use crate::models::credential::{
    Achievement, AchievementCredential, AchievementSubject, Criteria, EndorsementCredential,
    EndorsementSubject, EndorserProfile, EvidenceRecord, Profile, OBV3_CONTEXT,
};

/// Assembles OBv3 credentials for endorsed claims.
pub struct CredentialIssuer {
    /// Issuer profile id, e.g. the application URL.
    issuer_id: String,
    issuer_name: String,
}

impl CredentialIssuer {
    /// Creates an issuer with a fixed profile.
    ///
    /// # Arguments
    /// * `issuer_id` - Stable identifier URL for the issuer profile
    /// * `issuer_name` - Display name written into issued credentials
    pub fn new(issuer_id: &str, issuer_name: &str) -> Self {
        CredentialIssuer {
            issuer_id: issuer_id.to_string(),
            issuer_name: issuer_name.to_string(),
        }
    }

    fn issuer_profile(&self) -> Profile {
        Profile {
            id: self.issuer_id.clone(),
            profile_type: "Profile".to_string(),
            name: self.issuer_name.clone(),
        }
    }

    fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str, ServiceError> {
        field
            .as_deref()
            .ok_or_else(|| ServiceError::Validation(format!("missing {name} in claim state")))
    }

    /// Builds the achievement credential for an endorsed claim.
    ///
    /// The credential id is a fresh `urn:uuid:`, the subject id is derived
    /// from the claimant email (`did:email:...`), and the achievement id
    /// is the skill code itself. One evidence record is emitted per
    /// submitted URL, named positionally.
    ///
    /// # Errors
    /// `ServiceError::Validation` when the state lacks the claimant or
    /// narrative fields an endorsed claim must carry.
    pub fn build_achievement(
        &self,
        state: &ClaimState,
    ) -> Result<AchievementCredential, ServiceError> {
        let claimant_name = Self::required(&state.claimant_name, "claimant name")?;
        let claimant_email = Self::required(&state.claimant_email, "claimant email")?;
        let narrative = Self::required(&state.claimant_narrative, "claimant narrative")?;

        let evidence: Vec<EvidenceRecord> = state
            .evidence
            .iter()
            .enumerate()
            .map(|(i, url)| EvidenceRecord {
                id: url.clone(),
                evidence_type: "Evidence".to_string(),
                name: format!("Evidence {}", i + 1),
            })
            .collect();

        Ok(AchievementCredential {
            context: OBV3_CONTEXT.iter().map(|s| s.to_string()).collect(),
            credential_type: vec![
                "VerifiableCredential".to_string(),
                "OpenBadgeCredential".to_string(),
            ],
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            issuer: self.issuer_profile(),
            issuance_date: Utc::now().to_rfc3339(),
            credential_subject: AchievementSubject {
                id: format!("did:email:{claimant_email}"),
                subject_type: "AchievementSubject".to_string(),
                name: claimant_name.to_string(),
                narrative: narrative.to_string(),
                achievement: Achievement {
                    id: state.skill_code.clone(),
                    achievement_type: "Achievement".to_string(),
                    name: state.skill_name.clone(),
                    description: state.skill_description.clone(),
                    criteria: Criteria {
                        narrative: "Demonstrated competency through peer endorsement"
                            .to_string(),
                    },
                },
            },
            evidence: if evidence.is_empty() {
                None
            } else {
                Some(evidence)
            },
            endorsement: None,
        })
    }

    /// Builds the endorsement credential referencing an achievement
    /// credential by id.
    ///
    /// # Errors
    /// `ServiceError::Validation` when the state lacks the endorser
    /// identity or endorsement content.
    pub fn build_endorsement(
        &self,
        state: &ClaimState,
        achievement_id: &str,
    ) -> Result<EndorsementCredential, ServiceError> {
        let endorser_name = Self::required(&state.endorser_name, "endorser name")?;
        let endorsement_text = Self::required(&state.endorsement_text, "endorsement text")?;
        let bona_fides = Self::required(&state.bona_fides, "endorser bona fides")?;

        Ok(EndorsementCredential {
            context: OBV3_CONTEXT.iter().map(|s| s.to_string()).collect(),
            credential_type: vec![
                "VerifiableCredential".to_string(),
                "EndorsementCredential".to_string(),
            ],
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            issuer: self.issuer_profile(),
            issuance_date: Utc::now().to_rfc3339(),
            credential_subject: EndorsementSubject {
                id: achievement_id.to_string(),
                subject_type: "EndorsementSubject".to_string(),
                endorsement_comment: endorsement_text.to_string(),
                profile: EndorserProfile {
                    profile_type: "Profile".to_string(),
                    name: endorser_name.to_string(),
                    description: bona_fides.to_string(),
                },
            },
        })
    }

    /// Attaches the endorsement to the achievement credential. Each claim
    /// carries exactly one endorsement.
    pub fn link(achievement: &mut AchievementCredential, endorsement: EndorsementCredential) {
        achievement.endorsement = Some(vec![endorsement]);
    }

    /// Builds both credentials for an endorsed claim state and links them.
    pub fn issue(&self, state: &ClaimState) -> Result<AchievementCredential, ServiceError> {
        let mut achievement = self.build_achievement(state)?;
        let endorsement = self.build_endorsement(state, &achievement.id)?;
        Self::link(&mut achievement, endorsement);
        Ok(achievement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endorsed_state() -> ClaimState {
        let mut state = ClaimState::new_claimant(
            "http://localhost:3000",
            "acme",
            "claim-1",
            "ICT403",
            "Design Skills",
            "Applies advanced design principles",
            "A. Claimant",
            "claimant@example.com",
        )
        .into_endorser(
            "B. Endorser",
            "endorser@example.com",
            "I designed the onboarding flow",
        );
        state.endorsement_text = Some("Thoughtful and consistent design work".to_string());
        state.bona_fides = Some("Principal designer, twelve years".to_string());
        state.evidence = vec![
            "https://example.com/portfolio".to_string(),
            "https://example.com/repo".to_string(),
        ];
        state.signature = Some("B. Endorser".to_string());
        state
    }

    fn issuer() -> CredentialIssuer {
        CredentialIssuer::new("http://localhost:3000", "Acme Inc.")
    }

    #[test]
    fn test_achievement_shape() {
        let credential = issuer().build_achievement(&endorsed_state()).unwrap();

        assert!(credential.id.starts_with("urn:uuid:"));
        assert_eq!(credential.context, OBV3_CONTEXT.to_vec());
        assert_eq!(
            credential.credential_type,
            vec!["VerifiableCredential", "OpenBadgeCredential"]
        );
        assert_eq!(credential.issuer.name, "Acme Inc.");

        let subject = &credential.credential_subject;
        assert_eq!(subject.id, "did:email:claimant@example.com");
        assert_eq!(subject.name, "A. Claimant");
        assert_eq!(subject.narrative, "I designed the onboarding flow");
        assert_eq!(subject.achievement.id, "ICT403");
        assert_eq!(subject.achievement.name, "Design Skills");
        assert_eq!(
            subject.achievement.criteria.narrative,
            "Demonstrated competency through peer endorsement"
        );
    }

    #[test]
    fn test_evidence_records_are_positional() {
        let credential = issuer().build_achievement(&endorsed_state()).unwrap();
        let evidence = credential.evidence.unwrap();
        assert_eq!(evidence.len(), 2);
        assert_eq!(evidence[0].id, "https://example.com/portfolio");
        assert_eq!(evidence[0].name, "Evidence 1");
        assert_eq!(evidence[1].name, "Evidence 2");
    }

    #[test]
    fn test_no_evidence_omits_the_array() {
        let mut state = endorsed_state();
        state.evidence.clear();
        let credential = issuer().build_achievement(&state).unwrap();
        assert!(credential.evidence.is_none());
        let json = serde_json::to_string(&credential).unwrap();
        assert!(!json.contains("\"evidence\""));
    }

    #[test]
    fn test_endorsement_references_the_achievement() {
        let service = issuer();
        let state = endorsed_state();
        let achievement = service.build_achievement(&state).unwrap();
        let endorsement = service.build_endorsement(&state, &achievement.id).unwrap();

        assert_eq!(endorsement.credential_subject.id, achievement.id);
        assert_eq!(
            endorsement.credential_type,
            vec!["VerifiableCredential", "EndorsementCredential"]
        );
        assert_eq!(
            endorsement.credential_subject.endorsement_comment,
            "Thoughtful and consistent design work"
        );
        assert_eq!(endorsement.credential_subject.profile.name, "B. Endorser");
        assert_eq!(
            endorsement.credential_subject.profile.description,
            "Principal designer, twelve years"
        );
    }

    #[test]
    fn test_issue_links_exactly_one_endorsement() {
        let credential = issuer().issue(&endorsed_state()).unwrap();
        let endorsements = credential.endorsement.unwrap();
        assert_eq!(endorsements.len(), 1);
        assert_eq!(endorsements[0].credential_subject.id, credential.id);
    }

    #[test]
    fn test_missing_endorsement_fields_are_rejected() {
        let service = issuer();
        let mut state = endorsed_state();
        state.endorsement_text = None;
        let achievement = service.build_achievement(&state).unwrap();
        assert!(matches!(
            service.build_endorsement(&state, &achievement.id),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_claimant_phase_state_is_rejected() {
        let state = ClaimState::new_claimant(
            "http://localhost:3000",
            "acme",
            "claim-1",
            "ICT403",
            "Design Skills",
            "Applies advanced design principles",
            "A. Claimant",
            "claimant@example.com",
        );
        assert!(matches!(
            issuer().build_achievement(&state),
            Err(ServiceError::Validation(_))
        ));
    }
}
