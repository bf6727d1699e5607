//! # Async Tasks
//!
//! Background task helpers: latest-only request handling and delegation runs.

pub mod delegation;
pub mod latest;
