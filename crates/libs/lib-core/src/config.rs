//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! ## Global Config Access
//!
//! Use [`core_config()`] to access the global configuration instance:
//!
//! ```rust,no_run
//! use lib_core::config::core_config;
//!
//! let config = core_config();
//! let network = config.network;
//! ```
//!
//! The config must be initialized once at application startup using [`init_config()`].
//! Components take a `Config` (or the fields they need) explicitly, so tests build
//! their own instance with [`Config::for_network`] instead of touching the global.

use lib_utils::envs::{get_env_opt, get_env_or};
use lib_utils::validation::{validate_not_empty, validate_range};
use shared::dto::wallet::Network;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Lovelace in one ADA.
pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// Default settle delay for the pending action resolver.
pub const DEFAULT_SETTLE_MS: u64 = 200;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Network the explorer serves; wallets on any other network are refused.
    pub network: Network,

    /// Address receiving optional donations attached to delegation transactions.
    pub donation_address: String,

    /// Conversion factor from whole ADA to the chain's base unit.
    pub lovelace_per_ada: u64,

    /// JSON file holding persisted wallet identity and auth tokens.
    pub storage_path: PathBuf,

    /// Endpoint receiving delegation info records. `None` disables notifications.
    pub notify_url: Option<String>,

    /// Settle delay before the pending action resolver acts on current state.
    ///
    /// Valid range: 150-250 ms.
    pub settle_delay_ms: u64,
}

impl Config {
    /// Configuration with defaults for `network`.
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            donation_address: default_donation_address(network).to_string(),
            lovelace_per_ada: LOVELACE_PER_ADA,
            storage_path: PathBuf::from("data/explorer-state.json"),
            notify_url: None,
            settle_delay_ms: DEFAULT_SETTLE_MS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` beforehand (see [`init_config`]) to pick up a `.env` file.
    pub fn from_env() -> Result<Self, String> {
        let network = get_env_or("EXPLORER_NETWORK", "mainnet")
            .parse::<Network>()
            .map_err(|e| format!("EXPLORER_NETWORK is invalid: {}", e))?;

        let donation_address = get_env_opt("DONATION_ADDRESS")
            .unwrap_or_else(|| default_donation_address(network).to_string());

        let lovelace_per_ada = get_env_or("LOVELACE_PER_ADA", "1000000")
            .trim()
            .parse()
            .map_err(|e| format!("LOVELACE_PER_ADA must be a valid number: {}", e))?;

        let storage_path = PathBuf::from(get_env_or("EXPLORER_STORAGE_PATH", "data/explorer-state.json"));

        let settle_delay_ms = get_env_or("PENDING_ACTION_SETTLE_MS", "200")
            .trim()
            .parse()
            .map_err(|e| format!("PENDING_ACTION_SETTLE_MS must be a valid number: {}", e))?;

        Ok(Self {
            network,
            donation_address,
            lovelace_per_ada,
            storage_path,
            notify_url: get_env_opt("DELEGATION_NOTIFY_URL"),
            settle_delay_ms,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        validate_not_empty(&self.donation_address, "DONATION_ADDRESS")?;

        if self.lovelace_per_ada == 0 {
            return Err("LOVELACE_PER_ADA must be greater than 0".to_string());
        }

        validate_range(self.settle_delay_ms, 150, 250, "PENDING_ACTION_SETTLE_MS")?;

        if let Some(url) = &self.notify_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("DELEGATION_NOTIFY_URL must be an http(s) URL".to_string());
            }
        }

        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}

fn default_donation_address(network: Network) -> &'static str {
    match network {
        // Placeholders for local runs; deployments set DONATION_ADDRESS.
        Network::Mainnet => {
            "addr1q9v5xk7gt0x9wdfq0ys8yhh0d7sh2xfz7nny3ae4hdd0x06fk0cquv94cmz4zl7uw2k4pkkvms0j4zt8tf2kxj2c8vmsq9dq6z"
        }
        Network::Preprod | Network::Preview => {
            "addr_test1qpv5xk7gt0x9wdfq0ys8yhh0d7sh2xfz7nny3ae4hdd0x06fk0cquv94cmz4zl7uw2k4pkkvms0j4zt8tf2kxj2c8vmsjxk2uq"
        }
    }
}

/// Global configuration instance (initialized once at startup).
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Initialize the global configuration.
///
/// Loads `.env` if present, reads the environment, and validates the result.
///
/// # Errors
///
/// Returns an error if:
/// - Environment variables are invalid
/// - Configuration validation fails
/// - Config has already been initialized
pub fn init_config() -> Result<&'static Config, String> {
    // A missing .env file is fine; the process environment is used as-is.
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| "Config has already been initialized".to_string())?;
    Ok(core_config())
}

/// Get a reference to the global configuration.
///
/// # Panics
///
/// Panics if [`init_config()`] has not been called yet.
pub fn core_config() -> &'static Config {
    CONFIG.get().expect("Config must be initialized with init_config() before use")
}
