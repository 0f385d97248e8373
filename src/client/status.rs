//! # System Status Polling
//!
//! Recomputes a [`SystemStatus`] on a fixed timer from the health and
//! model-info endpoints. A failed poll is recorded and reported; nothing is
//! retried until the next scheduled tick, and the tick loop itself is the
//! only serialization between polls.

use chrono::{DateTime, Utc};
use log::warn;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::client::DetectClient;

/// Last observed state of the detection service.
#[derive(Debug, Clone)]
pub struct SystemStatus {
    pub healthy: bool,
    pub model_ready: bool,
    /// Companies in the brand database, when the last poll reached the model
    pub brands_count: Option<usize>,
    /// Error message from the last poll, if it failed
    pub last_error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl SystemStatus {
    /// State before the first poll has completed.
    pub fn unknown() -> Self {
        Self {
            healthy: false,
            model_ready: false,
            brands_count: None,
            last_error: None,
            checked_at: Utc::now(),
        }
    }
}

/// Run one status check against the service.
pub async fn poll_once(client: &DetectClient) -> SystemStatus {
    let health = match client.health().await {
        Ok(health) => health,
        Err(e) => {
            return SystemStatus {
                healthy: false,
                model_ready: false,
                brands_count: None,
                last_error: Some(e.to_string()),
                checked_at: Utc::now(),
            }
        }
    };

    let (brands_count, last_error) = match client.model_info().await {
        Ok(info) => (Some(info.brands_count), None),
        Err(e) => (None, Some(e.to_string())),
    };

    SystemStatus {
        healthy: health.status == "healthy",
        model_ready: health.model_ready,
        brands_count,
        last_error,
        checked_at: Utc::now(),
    }
}

/// Fixed-interval poller updating a shared [`SystemStatus`].
pub struct StatusPoller {
    client: Arc<DetectClient>,
    interval: Duration,
    status: Arc<RwLock<SystemStatus>>,
}

impl StatusPoller {
    pub fn new(client: Arc<DetectClient>, interval: Duration) -> Self {
        Self {
            client,
            interval,
            status: Arc::new(RwLock::new(SystemStatus::unknown())),
        }
    }

    /// Handle to the shared status, updated by the polling task.
    pub fn status(&self) -> Arc<RwLock<SystemStatus>> {
        self.status.clone()
    }

    /// Start the polling loop. The first poll runs immediately, then once
    /// per interval.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                let status = poll_once(&self.client).await;
                if let Some(error) = &status.last_error {
                    warn!("Status poll failed: {}", error);
                }
                *self.status.write().await = status;
            }
        })
    }
}
