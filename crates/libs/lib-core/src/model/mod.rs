//! # Model Layer
//!
//! Persisted local state and the stores built on top of it.

pub mod store;
