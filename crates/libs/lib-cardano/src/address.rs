//! # Address Network Inspection
//!
//! Cardano Shelley addresses carry their network twice: in the bech32 human
//! readable part (`addr` / `addr_test`, `stake` / `stake_test`) and in the low
//! nibble of the header byte (`1` mainnet, `0` testnet). CIP-30 wallets may
//! return either bech32 or raw hex, so both encodings are accepted.

use bech32::primitives::decode::CheckedHrpstring;
use bech32::Bech32;
use shared::dto::wallet::Network;
use std::fmt;

/// Network class encoded in an address. Preprod and preview share `Testnet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressNetwork {
    Mainnet,
    Testnet,
}

impl AddressNetwork {
    fn from_header(header: u8) -> Option<Self> {
        match header & 0x0f {
            1 => Some(AddressNetwork::Mainnet),
            0 => Some(AddressNetwork::Testnet),
            _ => None,
        }
    }

    fn from_hrp(hrp: &str) -> Option<Self> {
        match hrp {
            "addr" | "stake" => Some(AddressNetwork::Mainnet),
            "addr_test" | "stake_test" => Some(AddressNetwork::Testnet),
            _ => None,
        }
    }

    pub fn of(network: Network) -> Self {
        if network.is_mainnet() {
            AddressNetwork::Mainnet
        } else {
            AddressNetwork::Testnet
        }
    }
}

impl fmt::Display for AddressNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressNetwork::Mainnet => f.write_str("Mainnet"),
            AddressNetwork::Testnet => f.write_str("Testnet"),
        }
    }
}

/// Network an address belongs to, or `None` if it cannot be determined.
///
/// Checked in order: a valid bech32 string (header byte, then HRP), the textual
/// prefix of a bech32-looking string, a hex-encoded header byte.
pub fn address_network(address: &str) -> Option<AddressNetwork> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }

    if let Ok(checked) = CheckedHrpstring::new::<Bech32>(address) {
        let hrp = checked.hrp().to_string();
        let from_header = checked.byte_iter().next().and_then(AddressNetwork::from_header);
        if let Some(network) = from_header.or_else(|| AddressNetwork::from_hrp(&hrp)) {
            return Some(network);
        }
    }

    let lower = address.to_ascii_lowercase();
    if lower.starts_with("addr_test1") || lower.starts_with("stake_test1") {
        return Some(AddressNetwork::Testnet);
    }
    if lower.starts_with("addr1") || lower.starts_with("stake1") {
        return Some(AddressNetwork::Mainnet);
    }

    if lower.len() >= 2 && lower.bytes().all(|b| b.is_ascii_hexdigit()) {
        return hex::decode(&lower[..2])
            .ok()
            .and_then(|bytes| bytes.first().copied())
            .and_then(AddressNetwork::from_header);
    }

    None
}

/// True when `address` belongs to `network`. Undeterminable addresses never match.
pub fn matches_network(address: &str, network: Network) -> bool {
    address_network(address) == Some(AddressNetwork::of(network))
}

/// Check that a donation target lives on the same network as the wallet.
///
/// # Arguments
///
/// * `donation_address` - Configured donation target
/// * `wallet_address` - Any address of the wallet (reward or payment)
pub fn ensure_same_network(donation_address: &str, wallet_address: &str) -> Result<(), String> {
    let donation = address_network(donation_address);
    let wallet = address_network(wallet_address);
    match (donation, wallet) {
        (Some(d), Some(w)) if d == w => Ok(()),
        (Some(d), Some(w)) => Err(format!(
            "Donation address is on {d} but your wallet is on {w}. Switch your wallet network or skip the donation"
        )),
        (None, _) => Err("Donation address network could not be determined".to_string()),
        (_, None) => Err("Wallet network could not be determined".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bech32::Hrp;

    fn encode(hrp: &str, header: u8) -> String {
        let mut bytes = vec![header];
        bytes.extend_from_slice(&[0x5a; 28]);
        bytes.extend_from_slice(&[0x3c; 28]);
        bech32::encode::<Bech32>(Hrp::parse(hrp).unwrap(), &bytes).unwrap()
    }

    #[test]
    fn test_bech32_header_decides_network() {
        assert_eq!(address_network(&encode("addr", 0x01)), Some(AddressNetwork::Mainnet));
        assert_eq!(address_network(&encode("addr_test", 0x00)), Some(AddressNetwork::Testnet));
        assert_eq!(address_network(&encode("stake", 0xe1)), Some(AddressNetwork::Mainnet));
        assert_eq!(address_network(&encode("stake_test", 0xe0)), Some(AddressNetwork::Testnet));
    }

    #[test]
    fn test_prefix_fallback_for_unchecked_strings() {
        assert_eq!(address_network("addr1qx2fxv2umyh"), Some(AddressNetwork::Mainnet));
        assert_eq!(address_network("addr_test1qz2fxv2umyh"), Some(AddressNetwork::Testnet));
        assert_eq!(address_network("stake_test1uq"), Some(AddressNetwork::Testnet));
    }

    #[test]
    fn test_hex_header_byte() {
        assert_eq!(address_network("01abcdef"), Some(AddressNetwork::Mainnet));
        assert_eq!(address_network("00abcdef"), Some(AddressNetwork::Testnet));
        assert_eq!(address_network("e1abcdef"), Some(AddressNetwork::Mainnet));
    }

    #[test]
    fn test_unknown_addresses() {
        assert_eq!(address_network(""), None);
        assert_eq!(address_network("0xdeadbeef"), None);
        assert_eq!(address_network("DdzFFzCqrht"), None);
    }

    #[test]
    fn test_matches_network() {
        let testnet = encode("addr_test", 0x00);
        assert!(!matches_network(&testnet, Network::Mainnet));
        assert!(matches_network(&testnet, Network::Preprod));
        assert!(matches_network(&encode("addr", 0x01), Network::Mainnet));
        assert!(!matches_network("garbage", Network::Preview));
    }

    #[test]
    fn test_donation_network_check() {
        let mainnet = encode("addr", 0x01);
        let testnet_stake = encode("stake_test", 0xe0);
        assert!(ensure_same_network(&mainnet, &encode("stake", 0xe1)).is_ok());

        let err = ensure_same_network(&mainnet, &testnet_stake).unwrap_err();
        assert!(err.contains("Mainnet"));
        assert!(err.contains("Testnet"));
    }
}
