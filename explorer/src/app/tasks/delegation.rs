//! # Delegation Tasks
//!
//! Runs one delegation at a time against the current wallet handle and reports
//! its single outcome on the event channel.

use crate::app::events::AppEvent;
use crate::app::state::WalletStore;
use crate::core::error::DelegationBusy;
use async_channel::Sender;
use lib_cardano::{DelegationOutcome, DelegationService};
use shared::dto::delegation::DelegationRequest;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, info_span, Instrument};

/// At most one delegation in flight per wallet.
#[derive(Clone)]
pub struct DelegationRunner {
    service: DelegationService,
    store: WalletStore,
    event_tx: Sender<AppEvent>,
    in_flight: Arc<AtomicBool>,
}

impl DelegationRunner {
    pub fn new(service: DelegationService, store: WalletStore, event_tx: Sender<AppEvent>) -> Self {
        Self {
            service,
            store,
            event_tx,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Spawn a delegation using the handle present at call time.
    ///
    /// The outcome is sent as [`AppEvent::DelegationFinished`] and also returned
    /// through the join handle.
    ///
    /// # Errors
    ///
    /// [`DelegationBusy`] if a previous delegation has not finished yet.
    pub fn submit(&self, request: DelegationRequest) -> Result<JoinHandle<DelegationOutcome>, DelegationBusy> {
        let guard = InFlight::acquire(&self.in_flight).ok_or(DelegationBusy)?;

        let wallet = self.store.handle();
        let service = self.service.clone();
        let event_tx = self.event_tx.clone();
        let attempt_id = uuid::Uuid::new_v4();
        let span = info_span!("delegation", %attempt_id, kind = %request.kind);

        Ok(tokio::spawn(
            async move {
                let _guard = guard;
                let outcome = service.execute(wallet.as_ref(), &request).await;
                info!(success = outcome.is_success(), "Delegation finished");
                let _ = event_tx.send(AppEvent::DelegationFinished(outcome.clone())).await;
                outcome
            }
            .instrument(span),
        ))
    }
}

/// Clears the in-flight flag when the task ends, including on abort.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
