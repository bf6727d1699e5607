//! Delegation DTOs
//!
//! A [`DelegationRequest`] names what the user wants to delegate to; a
//! [`DelegationInfo`] is the record forwarded downstream after a delegation
//! transaction was accepted by the wallet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved DRep identifier for the "always abstain" voting option.
pub const DREP_ALWAYS_ABSTAIN: &str = "drep_always_abstain";
/// Reserved DRep identifier for the "always no confidence" voting option.
pub const DREP_ALWAYS_NO_CONFIDENCE: &str = "drep_always_no_confidence";

/// Fixed action tag carried by every [`DelegationInfo`].
pub const DELEGATION_ACTION: &str = "delegation";

/// Target kind of a delegation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelegationKind {
    Pool,
    Drep,
}

impl fmt::Display for DelegationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegationKind::Pool => f.write_str("pool"),
            DelegationKind::Drep => f.write_str("drep"),
        }
    }
}

/// A request to delegate the connected wallet's stake or vote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationRequest {
    pub kind: DelegationKind,
    pub ident: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donation_ada: Option<f64>,
}

impl DelegationRequest {
    pub fn pool(ident: impl Into<String>) -> Self {
        Self {
            kind: DelegationKind::Pool,
            ident: ident.into(),
            donation_ada: None,
        }
    }

    pub fn drep(ident: impl Into<String>) -> Self {
        Self {
            kind: DelegationKind::Drep,
            ident: ident.into(),
            donation_ada: None,
        }
    }

    pub fn with_donation(mut self, ada: f64) -> Self {
        self.donation_ada = Some(ada);
        self
    }

    /// Donation amount in whole ADA, `None` unless strictly positive.
    pub fn donation(&self) -> Option<f64> {
        self.donation_ada.filter(|ada| ada.is_finite() && *ada > 0.0)
    }
}

/// Record sent to the notification collaborator after a successful delegation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationInfo {
    pub tx_hash: String,
    pub ident: String,
    #[serde(rename = "type")]
    pub kind: DelegationKind,
    pub action: String,
    pub donation_amount: f64,
}

impl DelegationInfo {
    pub fn new(tx_hash: impl Into<String>, request: &DelegationRequest) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            ident: request.ident.clone(),
            kind: request.kind,
            action: DELEGATION_ACTION.to_string(),
            donation_amount: request.donation().unwrap_or(0.0),
        }
    }
}
