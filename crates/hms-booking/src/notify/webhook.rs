//! Webhook delivery of booking events.

use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::{BookingConfirmed, NotificationDispatcher, NotifyError};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs each event as JSON to a fixed URL on a spawned task.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    url: String,
}

impl WebhookDispatcher {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        // Already-installed is fine; reqwest is built without a default provider.
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Webhook(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl NotificationDispatcher for WebhookDispatcher {
    fn dispatch(&self, event: &BookingConfirmed) -> Result<(), NotifyError> {
        let handle = Handle::try_current()
            .map_err(|_| NotifyError::Webhook("no async runtime".to_string()))?;
        let client = self.client.clone();
        let url = self.url.clone();
        let event = event.clone();

        handle.spawn(async move {
            match client.post(&url).json(&event).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(appointment_id = %event.appointment_id, "Webhook delivered");
                }
                Ok(resp) => {
                    warn!(appointment_id = %event.appointment_id, status = %resp.status(), "Webhook rejected");
                }
                Err(e) => {
                    warn!(appointment_id = %event.appointment_id, error = %e, "Webhook delivery failed");
                }
            }
        });
        Ok(())
    }
}
