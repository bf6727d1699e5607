//! # Transaction Assembly
//!
//! A [`TxDraft`] collects what the delegation builder wants (certificates,
//! extra outputs, spendable inputs, change address). A [`TxCompleter`] turns
//! the draft into an [`UnsignedTx`] the wallet can sign: it selects inputs,
//! computes the fee and deposit, and adds change.
//!
//! [`LocalCompleter`] does this in-process with largest-first coin selection
//! and the linear fee formula `min_fee_b + min_fee_a * size`. The body is
//! carried as hex so it passes through `signTx` unchanged.

use crate::certificate::Certificate;
use crate::error::BuildError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// region: --- Types

/// Spendable transaction output owned by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub tx_hash: String,
    pub output_index: u32,
    pub address: String,
    pub lovelace: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub lovelace: u64,
}

/// Transaction under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxDraft {
    pub certificates: Vec<Certificate>,
    pub outputs: Vec<TxOutput>,
    pub available_inputs: Vec<Utxo>,
    pub change_address: String,
}

impl TxDraft {
    pub fn new(change_address: impl Into<String>) -> Self {
        Self {
            certificates: Vec::new(),
            outputs: Vec::new(),
            available_inputs: Vec::new(),
            change_address: change_address.into(),
        }
    }

    pub fn add_certificate(mut self, certificate: Certificate) -> Self {
        self.certificates.push(certificate);
        self
    }

    /// Insert `certificate` ahead of every existing certificate.
    pub fn prepend_certificate(mut self, certificate: Certificate) -> Self {
        self.certificates.insert(0, certificate);
        self
    }

    pub fn pay_to(mut self, address: impl Into<String>, lovelace: u64) -> Self {
        self.outputs.push(TxOutput {
            address: address.into(),
            lovelace,
        });
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<Utxo>) -> Self {
        self.available_inputs = inputs;
        self
    }

    pub fn registers_stake_key(&self) -> bool {
        self.certificates.iter().any(Certificate::is_registration)
    }
}

/// Balanced transaction, ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    /// Hex-encoded body handed to `signTx`.
    pub body_hex: String,
    pub fee: u64,
    /// Stake key deposit paid by this transaction.
    pub deposit: u64,
    pub inputs: Vec<Utxo>,
    pub outputs: Vec<TxOutput>,
    pub certificates: Vec<Certificate>,
}

/// Serialized transaction body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    pub inputs: Vec<Utxo>,
    pub outputs: Vec<TxOutput>,
    pub certificates: Vec<Certificate>,
    pub fee: u64,
    pub deposit: u64,
}

impl TxBody {
    pub fn to_hex(&self) -> Result<String, BuildError> {
        let bytes = serde_json::to_vec(self).map_err(|e| BuildError::Serialize(e.to_string()))?;
        Ok(hex::encode(bytes))
    }

    pub fn from_hex(body_hex: &str) -> Result<Self, BuildError> {
        let bytes = hex::decode(body_hex).map_err(|e| BuildError::Serialize(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| BuildError::Serialize(e.to_string()))
    }
}

// endregion: --- Types

// region: --- Completion

/// Finalizes a draft into a signable transaction. May suspend.
#[async_trait]
pub trait TxCompleter: Send + Sync {
    async fn complete(&self, draft: TxDraft) -> Result<UnsignedTx, BuildError>;
}

/// Protocol parameters used for fee and deposit calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolParams {
    /// Fee per byte of serialized body.
    pub min_fee_a: u64,
    /// Constant fee component.
    pub min_fee_b: u64,
    pub key_deposit: u64,
    /// Smallest lovelace amount an output may carry.
    pub min_utxo: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            min_fee_a: 44,
            min_fee_b: 155_381,
            key_deposit: 2_000_000,
            min_utxo: 1_000_000,
        }
    }
}

/// In-process transaction completion.
#[derive(Debug, Clone, Default)]
pub struct LocalCompleter {
    params: ProtocolParams,
}

impl LocalCompleter {
    pub fn new(params: ProtocolParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    fn fee_for(&self, body: &TxBody) -> Result<u64, BuildError> {
        // Size of the hex string is twice the byte size.
        let size = body.to_hex()?.len() as u64 / 2;
        Ok(self.params.min_fee_b.saturating_add(self.params.min_fee_a.saturating_mul(size)))
    }

    fn deposit_for(&self, draft: &TxDraft) -> u64 {
        if draft.registers_stake_key() {
            self.params.key_deposit
        } else {
            0
        }
    }

    /// `None` when no selection can ever cover the outputs.
    fn balance(&self, draft: &TxDraft, paid: u64, inputs: &[Utxo]) -> Result<Option<UnsignedTx>, BuildError> {
        let deposit = self.deposit_for(draft);
        let available = sum_lovelace(inputs.iter().map(|u| u.lovelace)).unwrap_or(u64::MAX);

        // First pass sizes the body with a change output placeholder.
        let mut body = TxBody {
            inputs: inputs.to_vec(),
            outputs: draft.outputs.clone(),
            certificates: draft.certificates.clone(),
            fee: 0,
            deposit,
        };
        body.outputs.push(TxOutput {
            address: draft.change_address.clone(),
            lovelace: available,
        });
        let fee = self.fee_for(&body)?;

        let Some(required) = paid.checked_add(deposit).and_then(|v| v.checked_add(fee)) else {
            return Ok(None);
        };
        if available < required {
            return Ok(None);
        }

        let change = available - required;
        body.outputs.pop();
        let fee = if change >= self.params.min_utxo {
            body.outputs.push(TxOutput {
                address: draft.change_address.clone(),
                lovelace: change,
            });
            fee
        } else {
            // Dust change goes to the fee.
            fee.saturating_add(change)
        };
        body.fee = fee;

        Ok(Some(UnsignedTx {
            body_hex: body.to_hex()?,
            fee,
            deposit,
            inputs: body.inputs,
            outputs: body.outputs,
            certificates: body.certificates,
        }))
    }
}

#[async_trait]
impl TxCompleter for LocalCompleter {
    async fn complete(&self, draft: TxDraft) -> Result<UnsignedTx, BuildError> {
        if draft.available_inputs.is_empty() {
            return Err(BuildError::NoInputs);
        }
        if let Some(output) = draft.outputs.iter().find(|o| o.lovelace < self.params.min_utxo) {
            return Err(BuildError::InvalidOutput(format!(
                "output to {} carries {} lovelace, below the minimum of {}",
                output.address, output.lovelace, self.params.min_utxo
            )));
        }

        let paid = sum_lovelace(draft.outputs.iter().map(|o| o.lovelace))
            .ok_or_else(|| BuildError::InvalidOutput("total output value exceeds the lovelace supply".to_string()))?;

        let mut candidates = draft.available_inputs.clone();
        candidates.sort_by(|a, b| b.lovelace.cmp(&a.lovelace));

        let mut selected = Vec::new();
        for utxo in candidates {
            selected.push(utxo);
            if let Some(tx) = self.balance(&draft, paid, &selected)? {
                return Ok(tx);
            }
        }

        Err(BuildError::InsufficientFunds {
            required: paid
                .saturating_add(self.deposit_for(&draft))
                .saturating_add(self.params.min_fee_b),
            available: sum_lovelace(selected.iter().map(|u| u.lovelace)).unwrap_or(u64::MAX),
        })
    }
}

fn sum_lovelace(amounts: impl Iterator<Item = u64>) -> Option<u64> {
    amounts.into_iter().try_fold(0u64, |acc, v| acc.checked_add(v))
}

// endregion: --- Completion

#[cfg(test)]
mod tests {
    use super::*;

    fn utxo(n: u8, lovelace: u64) -> Utxo {
        Utxo {
            tx_hash: format!("{:064x}", n),
            output_index: 0,
            address: "addr1change".to_string(),
            lovelace,
        }
    }

    fn delegation_draft() -> TxDraft {
        TxDraft::new("addr1change").add_certificate(Certificate::StakeDelegation {
            reward_address: "stake1u8".to_string(),
            pool_id: "pool1abc123".to_string(),
        })
    }

    #[tokio::test]
    async fn test_complete_balances_inputs_outputs_and_fee() {
        let completer = LocalCompleter::default();
        let draft = delegation_draft()
            .pay_to("addr1donation", 5_000_000)
            .with_inputs(vec![utxo(1, 3_000_000), utxo(2, 20_000_000)]);

        let tx = completer.complete(draft).await.unwrap();

        assert_eq!(tx.inputs.len(), 1, "largest input alone covers the outputs");
        assert_eq!(tx.inputs[0].lovelace, 20_000_000);
        assert_eq!(tx.deposit, 0);
        assert!(tx.fee > completer.params().min_fee_b);

        let out: u64 = tx.outputs.iter().map(|o| o.lovelace).sum();
        assert_eq!(out + tx.fee + tx.deposit, 20_000_000);
        assert_eq!(tx.outputs[0], TxOutput { address: "addr1donation".to_string(), lovelace: 5_000_000 });
    }

    #[tokio::test]
    async fn test_registration_pays_key_deposit() {
        let completer = LocalCompleter::default();
        let draft = delegation_draft()
            .prepend_certificate(Certificate::registration("stake1u8"))
            .with_inputs(vec![utxo(1, 10_000_000)]);

        let tx = completer.complete(draft).await.unwrap();
        assert_eq!(tx.deposit, 2_000_000);
        assert!(tx.certificates[0].is_registration());
        assert_eq!(tx.certificates.len(), 2);
    }

    #[tokio::test]
    async fn test_body_hex_round_trips() {
        let tx = LocalCompleter::default()
            .complete(delegation_draft().with_inputs(vec![utxo(1, 10_000_000)]))
            .await
            .unwrap();
        let body = TxBody::from_hex(&tx.body_hex).unwrap();
        assert_eq!(body.fee, tx.fee);
        assert_eq!(body.certificates, tx.certificates);
    }

    #[tokio::test]
    async fn test_selects_more_inputs_when_needed() {
        let tx = LocalCompleter::default()
            .complete(
                delegation_draft()
                    .pay_to("addr1donation", 5_000_000)
                    .with_inputs(vec![utxo(1, 3_000_000), utxo(2, 3_000_000)]),
            )
            .await
            .unwrap();
        assert_eq!(tx.inputs.len(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_funds() {
        let err = LocalCompleter::default()
            .complete(
                delegation_draft()
                    .pay_to("addr1donation", 5_000_000)
                    .with_inputs(vec![utxo(1, 1_000_000)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::InsufficientFunds { available: 1_000_000, .. }));
    }

    #[tokio::test]
    async fn test_near_max_outputs_do_not_overflow() {
        let completer = LocalCompleter::default();

        let err = completer
            .complete(
                delegation_draft()
                    .pay_to("addr1donation", u64::MAX - 1)
                    .with_inputs(vec![utxo(1, 10_000_000)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::InsufficientFunds { available: 10_000_000, .. }));

        let err = completer
            .complete(
                delegation_draft()
                    .pay_to("addr1donation", u64::MAX)
                    .pay_to("addr1other", 5_000_000)
                    .with_inputs(vec![utxo(1, 10_000_000)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidOutput(_)));
    }

    #[tokio::test]
    async fn test_rejects_empty_inputs_and_dust_outputs() {
        let completer = LocalCompleter::default();
        assert_eq!(completer.complete(delegation_draft()).await.unwrap_err(), BuildError::NoInputs);

        let err = completer
            .complete(delegation_draft().pay_to("addr1donation", 10).with_inputs(vec![utxo(1, 10_000_000)]))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidOutput(_)));
    }
}
