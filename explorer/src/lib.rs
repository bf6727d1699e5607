//! # Explorer Wallet Pipeline - Library Root
//!
//! Wallet connection and delegation for the explorer front end. This crate wires
//! the Cardano logic from `lib-cardano` to process-level state and background
//! tasks; the binary in `main.rs` drives it against a simulated wallet.
//!
//! ## Module Structure
//!
//! - **app**: [`ExplorerApp`], state containers, app events, the pending action
//!   resolver, and background tasks
//! - **services**: the connection manager (reconnect, connect, disconnect)
//! - **core**: application-layer error types
//! - **debug**: logging initialization
//!
//! ```text
//! main.rs
//!   │
//!   ├── debug (logging)
//!   └── app (ExplorerApp)
//!       ├── state (WalletStore, UrlState)
//!       ├── pending_action (debounced resolver)
//!       ├── tasks (latest-only, delegation runner)
//!       └── services::connection
//!             └── lib_cardano (provider, delegation)
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test -p explorer
//! ```

pub mod app;
pub mod core;
pub mod debug;
pub mod services;

pub use app::{AppEvent, ExplorerApp, PendingActionState, ToastLevel};
pub use core::{ConnectError, ConnectResult, DelegationBusy};
