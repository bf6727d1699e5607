//! # Shared Data Transfer Objects Library
//!
//! Types exchanged between the explorer crates and persisted or sent over the wire.
//! Everything here is plain data with `serde` derives; behaviour lives in the
//! library crates that consume these types.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects
//!   - **[`dto::wallet`]**: Wallet identity, provider types and networks
//!   - **[`dto::delegation`]**: Delegation requests and the delegation info record
//! - **[`utils`]**: Shared utility functions
//!   - **[`utils::format_address`]**: Format wallet addresses for display
//!   - **[`utils::truncate_address`]**: Truncate addresses with ellipsis
//!
//! ## Wire Format
//!
//! DTOs that are persisted or posted to collaborators use **camelCase** field names
//! so the blobs stay readable by the web front end:
//!
//! ```rust
//! use shared::dto::wallet::WalletIdentity;
//!
//! let identity = WalletIdentity::default();
//! let json = serde_json::to_string(&identity).unwrap();
//! assert_eq!(json, r#"{"address":null,"stakeKey":null,"providerType":null,"disabledExt":false}"#);
//! ```

pub mod dto;
pub mod utils;

// Re-export commonly used types for convenience
pub use dto::*;
pub use utils::*;
