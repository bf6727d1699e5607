//! Logging configuration from environment variables

use lib_utils::envs::get_env_opt;
use std::path::PathBuf;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "explorer=info,lib_cardano=info,warn";

/// Log file name inside the log directory (date suffix added by rotation).
pub const LOG_FILE_NAME: &str = "explorer.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level filter (e.g., "explorer=debug,info")
    pub log_level: String,
    /// Directory for the rotating log file; `None` logs to stderr only
    pub log_dir: Option<PathBuf>,
    /// Emit ANSI colors on stderr
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            log_level: get_env_opt("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: get_env_opt("EXPLORER_LOG_DIR").map(PathBuf::from),
            ansi: get_env_opt("NO_COLOR").is_none(),
        }
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| dir.join(LOG_FILE_NAME))
    }

    /// Check if debug logging is enabled
    pub fn is_debug_enabled(&self) -> bool {
        self.log_level.contains("debug") || self.log_level.contains("trace")
    }
}
