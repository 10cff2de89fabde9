//! ==============================================================================
//! poller.rs - status polling and power toggle
//! ==============================================================================
//!
//! purpose:
//!     keeps the dashboard state in step with the tank controller.
//!     - fetch_status: one poll cycle (GET /status, then apply the snapshot)
//!     - toggle_system: one click on the control button (POST /toggle)
//!     - run_schedule: the timer that fires a poll cycle every interval
//!
//! concurrency:
//!     every tick spawns its own fetch task. a slow controller never delays
//!     the next tick, so fetches may overlap; whichever finishes last wins.
//!     the write lock is only taken after the response has been parsed, so a
//!     failed cycle leaves the state exactly as it was.
//!
//! relationships:
//!     - uses: device.rs (DeviceApi), domain.rs (AppState)
//!     - used by: main.rs (schedule), dashboard.rs (toggle + state reads)
//!
//! ==============================================================================

use crate::device::DeviceApi;
use crate::domain::{AppState, SharedState};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Clone-able handle to the device and the shared dashboard state
pub struct StatusPoller<D> {
    device: Arc<D>,
    state: SharedState,
    show_data: bool,
}

impl<D> Clone for StatusPoller<D> {
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
            state: Arc::clone(&self.state),
            show_data: self.show_data,
        }
    }
}

impl<D: DeviceApi> StatusPoller<D> {
    pub fn new(device: D, state: SharedState, show_data: bool) -> Self {
        Self {
            device: Arc::new(device),
            state,
            show_data,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn device(&self) -> &D {
        &self.device
    }

    /// one poll cycle; failures are logged and leave the state untouched
    pub async fn fetch_status(&self) {
        match self.device.fetch_status().await {
            Ok(snapshot) => {
                self.state.write().await.apply(&snapshot, now_ms());
                if self.show_data {
                    tracing::info!("Data: {:?}", snapshot);
                }
            }
            Err(e) => {
                tracing::error!("Error fetching status: {}", e);
            }
        }
    }

    /// ask the controller to flip its power state; the outcome shows up on the next poll
    pub async fn toggle_system(&self) {
        if let Err(e) = self.device.toggle().await {
            tracing::error!("Error toggling system: {}", e);
        }
    }

    /// fire fetch_status now and then every `period`, forever
    pub async fn run_schedule(self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        loop {
            // first tick completes immediately
            ticker.tick().await;
            let poller = self.clone();
            tokio::spawn(async move {
                poller.fetch_status().await;
            });
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
