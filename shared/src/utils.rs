//! # Shared Utility Functions
//!
//! ## Address Formatting
//!
//! Cardano addresses are long bech32 strings; logs and toasts show a shortened form:
//! - [`format_address`] - Format address with ellipsis (first N and last M characters)
//! - [`truncate_address`] - [`format_address`] with the explorer's default lengths
//!
//! ```rust
//! use shared::utils::format_address;
//!
//! let address = "addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgse35a3x";
//! assert_eq!(format_address(address, 8, 6), "addr1qx2...e35a3x");
//! ```

/// Format a wallet address by showing the first `prefix_len` and last `suffix_len` characters.
///
/// If the address is shorter than `prefix_len + suffix_len`, it is returned as-is.
/// Non-ASCII input is returned unchanged rather than sliced mid-character.
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let address_len = address.len();

    if !address.is_ascii()
        || address_len <= prefix_len + suffix_len
        || prefix_len >= address_len
        || suffix_len >= address_len
    {
        return address.to_string();
    }

    let prefix = &address[..prefix_len];
    let suffix = &address[address_len - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Format a wallet address with an 8-character prefix (keeps the `addr1`/`stake1`
/// human-readable part visible) and a 6-character suffix.
pub fn truncate_address(address: &str) -> String {
    format_address(address, 8, 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgse35a3x";

    #[test]
    fn test_format_address() {
        assert_eq!(format_address(ADDR, 4, 4), "addr...5a3x");
        assert_eq!(format_address(ADDR, 6, 2), "addr1q...3x");
    }

    #[test]
    fn test_format_address_short() {
        assert_eq!(format_address("short", 4, 4), "short");
        assert_eq!(format_address("abc", 4, 4), "abc");
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(truncate_address(ADDR), "addr1qx2...e35a3x");
    }
}
