//! # Delegation Notifications
//!
//! After a delegation transaction is submitted, a [`DelegationInfo`] record is
//! forwarded to an analytics collaborator. Delivery is fire-and-forget: the
//! record is sent on a detached task and a failure is only logged.

use crate::error::NotifyError;
use async_trait::async_trait;
use reqwest::Client;
use shared::dto::delegation::DelegationInfo;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[async_trait]
pub trait DelegationNotifier: Send + Sync {
    async fn notify(&self, info: &DelegationInfo) -> Result<(), NotifyError>;
}

/// POSTs the record as JSON to a fixed endpoint.
#[derive(Clone)]
pub struct HttpNotifier {
    client: Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DelegationNotifier for HttpNotifier {
    async fn notify(&self, info: &DelegationInfo) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(info).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        debug!(tx_hash = %info.tx_hash, "Delegation notification delivered");
        Ok(())
    }
}

/// Drops every record. Used when no endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl DelegationNotifier for NoopNotifier {
    async fn notify(&self, _info: &DelegationInfo) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Deliver `info` on a detached task. The outcome never reaches the caller.
pub fn dispatch(notifier: Arc<dyn DelegationNotifier>, info: DelegationInfo) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&info).await {
            warn!(tx_hash = %info.tx_hash, error = %e, "Failed to deliver delegation notification");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::dto::delegation::DelegationRequest;

    struct FailingNotifier;

    #[async_trait]
    impl DelegationNotifier for FailingNotifier {
        async fn notify(&self, _info: &DelegationInfo) -> Result<(), NotifyError> {
            Err(NotifyError::Rejected("collector offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let info = DelegationInfo::new("ab12", &DelegationRequest::pool("pool1abc123"));
        let handle = dispatch(Arc::new(FailingNotifier), info);
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn test_http_notifier_reports_transport_errors() {
        // Port 9 (discard) on localhost is not listening in test environments.
        let notifier = HttpNotifier::new("http://127.0.0.1:9/delegations");
        let info = DelegationInfo::new("ab12", &DelegationRequest::drep("drep1xyz"));
        assert!(matches!(notifier.notify(&info).await, Err(NotifyError::Http(_))));
    }
}
