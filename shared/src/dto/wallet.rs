//! Wallet identity DTOs
//!
//! [`WalletIdentity`] is the *remembered* half of a wallet connection: the part
//! that survives a page reload. The live capability obtained from the provider
//! is never part of this type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing a [`ProviderType`] or [`Network`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown wallet provider: {0}")]
    UnknownProvider(String),
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}

/// Browser-injected CIP-30 wallet extensions supported by the explorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Nami,
    Eternl,
    Flint,
    Lace,
    Typhon,
    Yoroi,
    Gerowallet,
    Nufi,
    Vespr,
    Begin,
}

impl ProviderType {
    pub const ALL: [ProviderType; 10] = [
        ProviderType::Nami,
        ProviderType::Eternl,
        ProviderType::Flint,
        ProviderType::Lace,
        ProviderType::Typhon,
        ProviderType::Yoroi,
        ProviderType::Gerowallet,
        ProviderType::Nufi,
        ProviderType::Vespr,
        ProviderType::Begin,
    ];

    /// Display name shown to the user.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderType::Nami => "Nami",
            ProviderType::Eternl => "Eternl",
            ProviderType::Flint => "Flint",
            ProviderType::Lace => "Lace",
            ProviderType::Typhon => "Typhon",
            ProviderType::Yoroi => "Yoroi",
            ProviderType::Gerowallet => "GeroWallet",
            ProviderType::Nufi => "NuFi",
            ProviderType::Vespr => "VESPR",
            ProviderType::Begin => "Begin",
        }
    }

    /// Key under which the extension injects itself (`window.cardano.<key>`).
    pub fn key(&self) -> &'static str {
        match self {
            ProviderType::Nami => "nami",
            ProviderType::Eternl => "eternl",
            ProviderType::Flint => "flint",
            ProviderType::Lace => "lace",
            ProviderType::Typhon => "typhon",
            ProviderType::Yoroi => "yoroi",
            ProviderType::Gerowallet => "gerowallet",
            ProviderType::Nufi => "nufi",
            ProviderType::Vespr => "vespr",
            ProviderType::Begin => "begin",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProviderType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ProviderType::ALL
            .into_iter()
            .find(|p| p.key() == needle)
            .ok_or_else(|| ParseError::UnknownProvider(s.to_string()))
    }
}

/// Network the explorer is deployed against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Preprod,
    Preview,
}

impl Network {
    /// Network id carried in the low nibble of a Shelley address header.
    ///
    /// All test networks share id `0`.
    pub fn network_id(&self) -> u8 {
        match self {
            Network::Mainnet => 1,
            Network::Preprod | Network::Preview => 0,
        }
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self, Network::Mainnet)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "Mainnet",
            Network::Preprod => "Preprod",
            Network::Preview => "Preview",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "preprod" => Ok(Network::Preprod),
            "preview" => Ok(Network::Preview),
            other => Err(ParseError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Last known wallet identity, persisted across reloads.
///
/// `address` and `provider_type` are either both set or both unset once a
/// connection cycle has completed. [`WalletIdentity::default`] is the fully
/// disconnected shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletIdentity {
    pub address: Option<String>,
    pub stake_key: Option<String>,
    pub provider_type: Option<ProviderType>,
    pub disabled_ext: bool,
}

impl WalletIdentity {
    /// The fully disconnected identity.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(address: String, stake_key: Option<String>, provider_type: ProviderType) -> Self {
        Self {
            address: Some(address),
            stake_key,
            provider_type: Some(provider_type),
            disabled_ext: false,
        }
    }

    pub fn is_disconnected(&self) -> bool {
        *self == Self::disconnected()
    }

    /// True when the identity remembers a wallet, regardless of whether a live
    /// handle exists for it.
    pub fn is_remembered(&self) -> bool {
        self.address.is_some() && self.provider_type.is_some()
    }

    /// `address` and `provider_type` are set together or not at all.
    pub fn is_consistent(&self) -> bool {
        self.address.is_some() == self.provider_type.is_some()
    }
}
