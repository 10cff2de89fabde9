//! ==============================================================================
//! device.rs - tank controller access
//! ==============================================================================
//!
//! purpose:
//!     provides a unified interface to the remote tank controller.
//!     abstracts away the difference between the real controller (reqwest
//!     over http) and the scripted devices used in tests.
//!
//! wire contract:
//!     GET  {base_url}/status  -> json StatusSnapshot
//!     POST {base_url}/toggle  -> empty body, response ignored
//!
//! relationships:
//!     - used by: poller.rs (fetch_status / toggle_system)
//!     - uses: reqwest (http client), serde_json (status body)
//!
//! ==============================================================================

use crate::config::DeviceConfig;
use crate::domain::StatusSnapshot;
use std::future::Future;
use std::time::Duration;

/// the only failure kind of the dashboard: the controller could not be reached
/// or did not answer with a usable body
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// connection refused, timeout, dns, ...
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// controller answered with a non-success status
    #[error("network response was not ok (HTTP {0})")]
    Status(u16),
    /// body was not a status snapshot
    #[error("invalid status body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub trait DeviceApi: Send + Sync + 'static {
    /// GET /status
    fn fetch_status(&self) -> impl Future<Output = Result<StatusSnapshot, DeviceError>> + Send;
    /// POST /toggle with an empty body
    fn toggle(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;
}

// ==============================================================================
// http implementation (the real controller)
// ==============================================================================

pub struct HttpDevice {
    client: reqwest::Client,
    status_url: String,
    toggle_url: String,
}

impl HttpDevice {
    pub fn new(config: &DeviceConfig) -> Result<Self, DeviceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        let base = config.base_url.trim_end_matches('/');

        Ok(Self {
            client,
            status_url: format!("{}/status", base),
            toggle_url: format!("{}/toggle", base),
        })
    }
}

impl DeviceApi for HttpDevice {
    async fn fetch_status(&self) -> Result<StatusSnapshot, DeviceError> {
        let response = self.client.get(&self.status_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn toggle(&self) -> Result<(), DeviceError> {
        // the controller's answer carries nothing we use; the next poll shows the effect
        self.client.post(&self.toggle_url).send().await?;
        Ok(())
    }
}

// ==============================================================================
// tests
// ==============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Bytes,
        extract::State,
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
        Router,
    };
    use std::sync::{Arc, Mutex};

    /// what the fake controller answers and what it has seen
    #[derive(Default)]
    struct FakeController {
        status_code: u16,
        status_body: String,
        toggle_bodies: Vec<Bytes>,
    }

    type Shared = Arc<Mutex<FakeController>>;

    async fn status_handler(State(fake): State<Shared>) -> impl IntoResponse {
        let fake = fake.lock().unwrap();
        (
            StatusCode::from_u16(fake.status_code).unwrap(),
            [("content-type", "application/json")],
            fake.status_body.clone(),
        )
    }

    async fn toggle_handler(State(fake): State<Shared>, body: Bytes) -> StatusCode {
        fake.lock().unwrap().toggle_bodies.push(body);
        StatusCode::OK
    }

    /// serve a fake controller on an ephemeral port, returns its base url
    async fn spawn_controller(fake: Shared) -> String {
        let app = Router::new()
            .route("/status", get(status_handler))
            .route("/toggle", post(toggle_handler))
            .with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn device_for(base_url: String) -> HttpDevice {
        HttpDevice::new(&DeviceConfig {
            base_url,
            request_timeout_ms: 2000,
        })
        .unwrap()
    }

    const BODY: &str = r#"{"system_status":true,"buzzer_status":false,"led_status":true,"pump_status":false,"water_level_low":false,"ph_value_bad":true,"distance_to_water":42,"water_ph_value":5.8}"#;

    #[tokio::test]
    async fn test_fetch_status_parses_body() {
        let fake = Arc::new(Mutex::new(FakeController {
            status_code: 200,
            status_body: BODY.to_string(),
            ..Default::default()
        }));
        let device = device_for(spawn_controller(fake).await);

        let snapshot = device.fetch_status().await.unwrap();
        assert_eq!(snapshot, crate::domain::sample_snapshot());
    }

    #[tokio::test]
    async fn test_fetch_status_non_ok_is_error() {
        let fake = Arc::new(Mutex::new(FakeController {
            status_code: 503,
            status_body: BODY.to_string(),
            ..Default::default()
        }));
        let device = device_for(spawn_controller(fake).await);

        let err = device.fetch_status().await.unwrap_err();
        assert!(matches!(err, DeviceError::Status(503)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_status_garbage_body_is_error() {
        let fake = Arc::new(Mutex::new(FakeController {
            status_code: 200,
            status_body: "<html>not json</html>".to_string(),
            ..Default::default()
        }));
        let device = device_for(spawn_controller(fake).await);

        let err = device.fetch_status().await.unwrap_err();
        assert!(matches!(err, DeviceError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_status_unreachable_is_transport_error() {
        // bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let device = device_for(format!("http://{}", addr));
        let err = device.fetch_status().await.unwrap_err();
        assert!(matches!(err, DeviceError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_toggle_posts_empty_body() {
        let fake = Arc::new(Mutex::new(FakeController {
            status_code: 200,
            ..Default::default()
        }));
        let base = spawn_controller(fake.clone()).await;
        // trailing slash must not produce "//toggle"
        let device = device_for(format!("{}/", base));

        device.toggle().await.unwrap();

        let fake = fake.lock().unwrap();
        assert_eq!(fake.toggle_bodies.len(), 1);
        assert!(fake.toggle_bodies[0].is_empty());
    }
}
