//! # Delegation Certificates
//!
//! Certificates attached to delegation transactions. Stake credentials are
//! identified by the wallet's reward address.

use serde::{Deserialize, Serialize};
use shared::dto::delegation::{
    DelegationKind, DelegationRequest, DREP_ALWAYS_ABSTAIN, DREP_ALWAYS_NO_CONFIDENCE,
};

/// Vote delegation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DRep {
    /// A registered DRep, by bech32 or hex id.
    Id(String),
    AlwaysAbstain,
    AlwaysNoConfidence,
}

impl DRep {
    /// Map a DRep identifier to a target. The reserved sentinels (in either
    /// `drep_always_abstain` or `always-abstain` spelling) become the special forms.
    pub fn from_ident(ident: &str) -> Self {
        let ident = ident.trim();
        let normalized = ident.to_ascii_lowercase().replace('-', "_");
        let normalized = normalized.strip_prefix("drep_").unwrap_or(&normalized);

        if format!("drep_{normalized}") == DREP_ALWAYS_ABSTAIN {
            DRep::AlwaysAbstain
        } else if format!("drep_{normalized}") == DREP_ALWAYS_NO_CONFIDENCE {
            DRep::AlwaysNoConfidence
        } else {
            DRep::Id(ident.to_string())
        }
    }
}

/// Transaction certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Certificate {
    /// Registers the stake key; carries the key deposit.
    StakeRegistration { reward_address: String },
    StakeDelegation { reward_address: String, pool_id: String },
    VoteDelegation { reward_address: String, drep: DRep },
}

impl Certificate {
    /// Delegation certificate for `request`, issued for `reward_address`.
    pub fn for_request(request: &DelegationRequest, reward_address: &str) -> Self {
        let reward_address = reward_address.to_string();
        match request.kind {
            DelegationKind::Pool => Certificate::StakeDelegation {
                reward_address,
                pool_id: request.ident.trim().to_string(),
            },
            DelegationKind::Drep => Certificate::VoteDelegation {
                reward_address,
                drep: DRep::from_ident(&request.ident),
            },
        }
    }

    pub fn registration(reward_address: &str) -> Self {
        Certificate::StakeRegistration {
            reward_address: reward_address.to_string(),
        }
    }

    pub fn is_registration(&self) -> bool {
        matches!(self, Certificate::StakeRegistration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drep_sentinels() {
        assert_eq!(DRep::from_ident("drep_always_abstain"), DRep::AlwaysAbstain);
        assert_eq!(DRep::from_ident("always-abstain"), DRep::AlwaysAbstain);
        assert_eq!(DRep::from_ident("drep_always_no_confidence"), DRep::AlwaysNoConfidence);
        assert_eq!(DRep::from_ident("always-no-confidence"), DRep::AlwaysNoConfidence);
    }

    #[test]
    fn test_regular_drep_id_is_kept_verbatim() {
        let id = "drep1ygr9tuapcanc3kpeyy4dc3vmrz9cfe5q7v9wj3x9j0ap3tswtre9j";
        assert_eq!(DRep::from_ident(id), DRep::Id(id.to_string()));
        assert_eq!(DRep::from_ident("drep_abstain"), DRep::Id("drep_abstain".to_string()));
    }

    #[test]
    fn test_certificate_for_pool_request() {
        let cert = Certificate::for_request(&DelegationRequest::pool("pool1abc123"), "stake1u8");
        assert_eq!(
            cert,
            Certificate::StakeDelegation {
                reward_address: "stake1u8".to_string(),
                pool_id: "pool1abc123".to_string(),
            }
        );
        assert!(!cert.is_registration());
    }

    #[test]
    fn test_certificate_for_abstain_request() {
        let cert = Certificate::for_request(&DelegationRequest::drep(DREP_ALWAYS_ABSTAIN), "stake1u8");
        assert_eq!(
            cert,
            Certificate::VoteDelegation {
                reward_address: "stake1u8".to_string(),
                drep: DRep::AlwaysAbstain,
            }
        );
    }

    #[test]
    fn test_certificate_wire_shape() {
        let value = serde_json::to_value(Certificate::VoteDelegation {
            reward_address: "stake1u8".to_string(),
            drep: DRep::Id("drep1xyz".to_string()),
        })
        .unwrap();
        assert_eq!(value["type"], "vote_delegation");
        assert_eq!(value["drep"]["kind"], "id");
        assert_eq!(value["drep"]["id"], "drep1xyz");
    }
}
