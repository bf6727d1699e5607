//! # Simulated Wallet
//!
//! In-process stand-ins for the browser wallet bridge, used by the demo binary
//! and by tests:
//!
//! - [`SimulatedWallet`]: a [`WalletApi`] with scripted addresses, UTxOs, and
//!   queued sign/submit failures. Records every call.
//! - [`SimulatedProvider`]: a [`WalletProvider`] over a set of simulated wallets.
//!   `enable` calls can be held open to reproduce races with slow extensions.
//! - [`RecordingNotifier`]: forwards every delegation record to a channel.

use crate::error::{NotifyError, ProviderError};
use crate::notify::DelegationNotifier;
use crate::provider::{WalletApi, WalletHandle, WalletProvider};
use crate::transaction::Utxo;
use async_trait::async_trait;
use bech32::{Bech32, Hrp};
use parking_lot::Mutex;
use shared::dto::delegation::DelegationInfo;
use shared::dto::wallet::{Network, ProviderType};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Starting balance of [`SimulatedWallet::funded`], in lovelace.
pub const FUNDED_BALANCE: u64 = 50_000_000;

// region: --- Addresses

/// Purpose of a sample address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRole {
    Payment,
    Stake,
    Donation,
}

/// Well-formed bech32 address for `network`, deterministic per role.
pub fn sample_address(network: Network, role: AddressRole) -> String {
    let network_id = network.network_id();
    let (hrp, header, fill) = match role {
        AddressRole::Payment => ("addr", network_id, 0x11),
        AddressRole::Stake => ("stake", 0xe0 | network_id, 0x22),
        AddressRole::Donation => ("addr", network_id, 0x33),
    };
    let hrp = if network.is_mainnet() {
        hrp.to_string()
    } else {
        format!("{hrp}_test")
    };

    let mut payload = vec![header];
    payload.extend(std::iter::repeat(fill).take(28));
    if role != AddressRole::Stake {
        payload.extend(std::iter::repeat(0x44).take(28));
    }

    Hrp::parse(&hrp)
        .ok()
        .and_then(|hrp| bech32::encode::<Bech32>(hrp, &payload).ok())
        .unwrap_or(hrp)
}

// endregion: --- Addresses

// region: --- SimulatedWallet

#[derive(Default)]
struct WalletState {
    used: Vec<String>,
    unused: Vec<String>,
    reward: Vec<String>,
    utxos: Vec<Utxo>,
    change: Option<String>,
    sign_failures: VecDeque<ProviderError>,
    submit_failures: VecDeque<ProviderError>,
    signed: Vec<String>,
    submitted: Vec<String>,
    tx_counter: u64,
}

/// Scripted CIP-30 wallet.
#[derive(Default)]
pub struct SimulatedWallet {
    state: Mutex<WalletState>,
}

impl SimulatedWallet {
    /// Wallet whose only (used) address is `address`, also used for change.
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            state: Mutex::new(WalletState {
                used: vec![address.clone()],
                change: Some(address),
                ..Default::default()
            }),
        }
    }

    /// Wallet with no addresses, no reward account, and no funds.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wallet on `network` with a payment address, a reward address, and one UTxO.
    pub fn funded(network: Network) -> Self {
        let address = sample_address(network, AddressRole::Payment);
        let utxo = Utxo {
            tx_hash: format!("{:064x}", 1),
            output_index: 0,
            address: address.clone(),
            lovelace: FUNDED_BALANCE,
        };
        Self::new(address)
            .with_reward_addresses(vec![sample_address(network, AddressRole::Stake)])
            .with_utxos(vec![utxo])
    }

    pub fn with_unused_addresses(self, addresses: Vec<String>) -> Self {
        self.state.lock().unused = addresses;
        self
    }

    pub fn with_reward_addresses(self, addresses: Vec<String>) -> Self {
        self.state.lock().reward = addresses;
        self
    }

    pub fn with_utxos(self, utxos: Vec<Utxo>) -> Self {
        self.state.lock().utxos = utxos;
        self
    }

    pub fn with_change_address(self, address: impl Into<String>) -> Self {
        self.state.lock().change = Some(address.into());
        self
    }

    /// Primary (first used) address.
    pub fn address(&self) -> Option<String> {
        self.state.lock().used.first().cloned()
    }

    pub fn reward_address(&self) -> Option<String> {
        self.state.lock().reward.first().cloned()
    }

    /// Queue a failure for the next `sign_tx` call.
    pub fn fail_next_sign(&self, err: ProviderError) {
        self.state.lock().sign_failures.push_back(err);
    }

    /// Queue a failure for the next `submit_tx` call.
    pub fn fail_next_submit(&self, err: ProviderError) {
        self.state.lock().submit_failures.push_back(err);
    }

    /// Unsigned bodies passed to `sign_tx`, in call order.
    pub fn signed_txs(&self) -> Vec<String> {
        self.state.lock().signed.clone()
    }

    pub fn sign_calls(&self) -> usize {
        self.state.lock().signed.len()
    }

    pub fn submit_calls(&self) -> usize {
        self.state.lock().submitted.len()
    }
}

#[async_trait]
impl WalletApi for SimulatedWallet {
    async fn get_used_addresses(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.state.lock().used.clone())
    }

    async fn get_unused_addresses(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.state.lock().unused.clone())
    }

    async fn get_reward_addresses(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.state.lock().reward.clone())
    }

    async fn get_utxos(&self) -> Result<Vec<Utxo>, ProviderError> {
        Ok(self.state.lock().utxos.clone())
    }

    async fn get_change_address(&self) -> Result<String, ProviderError> {
        let state = self.state.lock();
        state
            .change
            .clone()
            .or_else(|| state.used.first().cloned())
            .ok_or_else(|| ProviderError::with_code(-2, "no change address"))
    }

    async fn sign_tx(&self, unsigned_hex: &str) -> Result<String, ProviderError> {
        let mut state = self.state.lock();
        state.signed.push(unsigned_hex.to_string());
        if let Some(err) = state.sign_failures.pop_front() {
            return Err(err);
        }
        // Witness set placeholder appended to the body.
        Ok(format!("{unsigned_hex}a0"))
    }

    async fn submit_tx(&self, signed_hex: &str) -> Result<String, ProviderError> {
        let mut state = self.state.lock();
        state.submitted.push(signed_hex.to_string());
        if let Some(err) = state.submit_failures.pop_front() {
            return Err(err);
        }
        state.tx_counter += 1;
        Ok(format!("{:064x}", state.tx_counter))
    }
}

// endregion: --- SimulatedWallet

// region: --- SimulatedProvider

/// Injected-extension registry backed by simulated wallets.
#[derive(Default)]
pub struct SimulatedProvider {
    wallets: Mutex<HashMap<ProviderType, Arc<SimulatedWallet>>>,
    refusals: Mutex<HashMap<ProviderType, ProviderError>>,
    holds: Mutex<VecDeque<oneshot::Receiver<()>>>,
    enable_calls: AtomicUsize,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wallet(self, provider: ProviderType, wallet: Arc<SimulatedWallet>) -> Self {
        self.insert_wallet(provider, wallet);
        self
    }

    pub fn insert_wallet(&self, provider: ProviderType, wallet: Arc<SimulatedWallet>) {
        self.wallets.lock().insert(provider, wallet);
    }

    /// Uninstall the extension for `provider`.
    pub fn remove_wallet(&self, provider: ProviderType) {
        self.wallets.lock().remove(&provider);
    }

    /// Make `enable(provider)` reject with `err` until [`Self::allow`] is called.
    pub fn refuse(&self, provider: ProviderType, err: ProviderError) {
        self.refusals.lock().insert(provider, err);
    }

    pub fn allow(&self, provider: ProviderType) {
        self.refusals.lock().remove(&provider);
    }

    /// Hold the next `enable` call open until the returned sender fires or drops.
    pub fn hold_next_enable(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().push_back(rx);
        tx
    }

    pub fn enable_calls(&self) -> usize {
        self.enable_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for SimulatedProvider {
    async fn enable(&self, provider: ProviderType) -> Result<WalletHandle, ProviderError> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);

        let hold = self.holds.lock().pop_front();
        if let Some(hold) = hold {
            let _ = hold.await;
        }

        if let Some(err) = self.refusals.lock().get(&provider).cloned() {
            return Err(err);
        }

        let wallet = self.wallets.lock().get(&provider).cloned();
        match wallet {
            Some(wallet) => Ok(wallet),
            None => Err(ProviderError::with_code(
                -2,
                format!("{} wallet is not installed", provider.name()),
            )),
        }
    }

    fn installed(&self) -> Vec<ProviderType> {
        let wallets = self.wallets.lock();
        ProviderType::ALL
            .into_iter()
            .filter(|p| wallets.contains_key(p))
            .collect()
    }
}

// endregion: --- SimulatedProvider

// region: --- RecordingNotifier

/// Notifier that forwards records to a channel, optionally failing afterwards.
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<DelegationInfo>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DelegationInfo>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, fail: false }, rx)
    }

    /// Records every delivery, then reports it as rejected.
    pub fn failing() -> (Self, mpsc::UnboundedReceiver<DelegationInfo>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, fail: true }, rx)
    }
}

#[async_trait]
impl DelegationNotifier for RecordingNotifier {
    async fn notify(&self, info: &DelegationInfo) -> Result<(), NotifyError> {
        let _ = self.tx.send(info.clone());
        if self.fail {
            return Err(NotifyError::Rejected("recording notifier set to fail".to_string()));
        }
        Ok(())
    }
}

// endregion: --- RecordingNotifier
