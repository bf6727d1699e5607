//! # Wallet Provider Capability
//!
//! The explorer does not implement a wallet. It consumes the CIP-30 API that a
//! browser extension injects, expressed here as two traits:
//!
//! - [`WalletProvider`]: `enable(providerType)`; resolves once the user (or the
//!   extension's remembered permission) grants access. May suspend indefinitely.
//! - [`WalletApi`]: the enabled handle. Every call is asynchronous and may also
//!   suspend on a user prompt or hardware device.
//!
//! A [`WalletHandle`] is the *live* half of a wallet connection. It is never
//! serialized and only exists for the lifetime of the process.

use crate::error::ProviderError;
use crate::transaction::Utxo;
use async_trait::async_trait;
use shared::dto::wallet::ProviderType;
use std::sync::Arc;

/// Enabled CIP-30 wallet API.
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Addresses that appear in at least one transaction.
    async fn get_used_addresses(&self) -> Result<Vec<String>, ProviderError>;

    /// Fresh addresses that have never received funds.
    async fn get_unused_addresses(&self) -> Result<Vec<String>, ProviderError>;

    /// Stake (reward) addresses owned by the wallet.
    async fn get_reward_addresses(&self) -> Result<Vec<String>, ProviderError>;

    /// Spendable outputs. An empty vector means the wallet has no funds.
    async fn get_utxos(&self) -> Result<Vec<Utxo>, ProviderError>;

    async fn get_change_address(&self) -> Result<String, ProviderError>;

    /// Sign a hex-encoded unsigned transaction, returning the signed transaction hex.
    async fn sign_tx(&self, unsigned_hex: &str) -> Result<String, ProviderError>;

    /// Submit a signed transaction, returning its hash.
    async fn submit_tx(&self, signed_hex: &str) -> Result<String, ProviderError>;
}

/// Live wallet handle.
pub type WalletHandle = Arc<dyn WalletApi>;

/// Injected wallet extensions, keyed by [`ProviderType`].
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request access to the wallet of type `provider`.
    async fn enable(&self, provider: ProviderType) -> Result<WalletHandle, ProviderError>;

    /// Extensions currently injected into the page.
    fn installed(&self) -> Vec<ProviderType> {
        Vec::new()
    }
}

/// First used address, falling back to the first unused one.
///
/// Returns `Ok(None)` when the wallet reports neither.
pub async fn primary_address(wallet: &dyn WalletApi) -> Result<Option<String>, ProviderError> {
    let used = wallet.get_used_addresses().await?;
    if let Some(address) = used.into_iter().find(|a| !a.trim().is_empty()) {
        return Ok(Some(address));
    }
    let unused = wallet.get_unused_addresses().await?;
    Ok(unused.into_iter().find(|a| !a.trim().is_empty()))
}

/// First non-empty reward address.
pub async fn reward_address(wallet: &dyn WalletApi) -> Result<Option<String>, ProviderError> {
    Ok(wallet
        .get_reward_addresses()
        .await?
        .into_iter()
        .find(|a| !a.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedWallet;

    #[tokio::test]
    async fn test_primary_address_prefers_used() {
        let wallet = SimulatedWallet::new("addr1used").with_unused_addresses(vec!["addr1fresh".into()]);
        assert_eq!(primary_address(&wallet).await.unwrap().as_deref(), Some("addr1used"));
    }

    #[tokio::test]
    async fn test_primary_address_falls_back_to_unused() {
        let wallet = SimulatedWallet::empty().with_unused_addresses(vec!["addr1fresh".into()]);
        assert_eq!(primary_address(&wallet).await.unwrap().as_deref(), Some("addr1fresh"));
    }

    #[tokio::test]
    async fn test_primary_address_none_when_wallet_has_no_addresses() {
        let wallet = SimulatedWallet::empty();
        assert_eq!(primary_address(&wallet).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reward_address_skips_blank_entries() {
        let wallet = SimulatedWallet::empty().with_reward_addresses(vec![String::new(), "stake1u9".into()]);
        assert_eq!(reward_address(&wallet).await.unwrap().as_deref(), Some("stake1u9"));
    }
}
