//! # Logging Infrastructure
//!
//! Structured logging for the explorer process.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (default `explorer=info,lib_cardano=info,warn`)
//! - `EXPLORER_LOG_DIR`: When set, logs are also written to `explorer.log` in this
//!   directory with daily rotation
//!
//! ## Usage
//!
//! ```rust,ignore
//! // Keep the guard alive until exit so buffered file output is flushed.
//! let _log_guard = explorer::debug::init();
//! ```

pub mod config;
pub mod logger;

pub use config::LogConfig;
pub use logger::init_with as init_logger;

use tracing_appender::non_blocking::WorkerGuard;

/// Initialize logging from the environment and install the panic hook.
pub fn init() -> Option<WorkerGuard> {
    init_logger(&LogConfig::from_env())
}
