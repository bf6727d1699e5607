//! # Centralized Error Handling
//!
//! This module defines the error type [`AppError`] used by the core library:
//! configuration, persisted storage, and decoding of stored blobs.
//! Wallet and delegation failures have their own taxonomies in `lib-cardano`.
//!
//! ## Error Categories
//!
//! 1. **Input Errors** - caller supplied something unusable
//!    - [`InvalidInput`](AppError::InvalidInput)
//!
//! 2. **Environment Errors** - local system issues
//!    - [`Config`](AppError::Config)
//!    - [`Storage`](AppError::Storage)
//!    - [`Internal`](AppError::Internal)
//!
//! 3. **Data Errors**
//!    - [`Encoding`](AppError::Encoding) / [`Decoding`](AppError::Decoding)
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, Result};
//!
//! fn parse_settle_delay(raw: &str) -> Result<u64> {
//!     raw.parse()
//!         .map_err(|_| AppError::InvalidInput(format!("not a number: {raw}")))
//! }
//! ```

use thiserror::Error;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Core error type.
///
/// Each variant includes a descriptive `String` for context.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Data encoding error (JSON serialization of persisted state).
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Data decoding error (corrupt or incompatible persisted blob).
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Invalid input validation error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get a user-friendly error message.
    ///
    /// For internal errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Config(msg) => format!("Explorer is misconfigured: {}", msg),
            AppError::Storage(_) => "Could not access saved wallet settings".to_string(),
            AppError::Encoding(_) | AppError::Decoding(_) | AppError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

/// Convert `std::io::Error` to `AppError`.
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            AppError::Storage(format!("JSON I/O error: {}", err))
        } else {
            AppError::Decoding(format!("JSON error: {}", err))
        }
    }
}

impl From<lib_utils::envs::Error> for AppError {
    fn from(err: lib_utils::envs::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
