//! # Core Library
//!
//! Configuration, error types, and persisted local state for the explorer.

pub mod config;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::store::{
    AuthTokenStore, JsonFileStorage, KeyValueStorage, MemoryStorage, SharedStorage,
};
