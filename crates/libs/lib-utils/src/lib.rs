//! # Utilities Library
//!
//! Shared utility functions for environment variables, URL query strings and validation.

pub mod envs;
pub mod url;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env, get_env_opt, get_env_or};
pub use url::{get_query_param, has_query_param, location_path, remove_query_param};
pub use validation::{validate_not_empty, validate_range};
