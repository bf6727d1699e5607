//! # Local Store
//!
//! Key/value storage that survives a reload, plus the stores persisted in it.
//!
//! The storage model mirrors browser local storage: string keys, string values,
//! synchronous access. Typed values go through [`persisted`], which wraps them in a
//! versioned envelope so an incompatible blob from an older build is ignored rather
//! than half-applied.

// region: --- Modules
pub mod auth_tokens;
pub mod persisted;
pub mod storage;
// endregion: --- Modules

// region: --- Re-exports
pub use auth_tokens::AuthTokenStore;
pub use persisted::{load_persisted, save_persisted, Envelope};
pub use storage::{JsonFileStorage, KeyValueStorage, MemoryStorage, SharedStorage};
// endregion: --- Re-exports

/// Storage key of the persisted wallet identity blob.
pub const WALLET_IDENTITY_KEY: &str = "wallet-identity";

/// Storage key of the persisted address-to-token map.
pub const AUTH_TOKENS_KEY: &str = "auth-tokens";
