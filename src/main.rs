//! ==============================================================================
//! main.rs - tank dashboard entry point
//! ==============================================================================
//!
//! purpose:
//!     watches a water-tank controller (buzzer, pump, led, water level, ph)
//!     over its small json api and serves a status page with a power button.
//!
//! responsibilities:
//!     - load configuration (dashboard.toml + env overrides)
//!     - initialize logging
//!     - poll GET /status on a fixed interval, first poll immediately
//!     - serve the dashboard page and forward button clicks as POST /toggle
//!
//! relationships:
//!     - uses: config.rs (settings), device.rs (http client to the controller)
//!     - uses: poller.rs (poll cycle, toggle, schedule)
//!     - uses: dashboard.rs (web routes), domain.rs (shared state)
//!
//! architecture:
//!
//!     ┌──────────────────────────────────────────────────────┐
//!     │                 rust host (this file)                │
//!     │  ┌──────────────┐            ┌───────────────────┐   │
//!     │  │ poll timer   │            │ web server        │   │
//!     │  │ (1s cycle)   │            │ (port 3000)       │   │
//!     │  └──────┬───────┘            └─────────┬─────────┘   │
//!     │         │ writes                 reads │ / toggles   │
//!     │         └────────────┬─────────────────┘             │
//!     │               ┌──────┴──────┐                        │
//!     │               │ StatusPoller│ <- poller.rs           │
//!     │               └──────┬──────┘                        │
//!     └──────────────────────┼───────────────────────────────┘
//!                            │ http (reqwest)
//!                            ▼
//!                  ┌───────────────────┐
//!                  │ tank controller   │
//!                  │ :5000 /status     │
//!                  │       /toggle     │
//!                  └───────────────────┘
//!
//! ==============================================================================

mod config;
mod dashboard;
mod device;
mod domain;
mod poller;

use anyhow::{Context, Result};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // startup banner
    println!("===========================================================");
    println!("  Tank Dashboard");
    println!("===========================================================");

    // step 1: load configuration
    let config = config::DashboardConfig::load_or_default().context("invalid configuration")?;
    config.print_summary();

    // step 2: logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.level))
        .init();

    // step 3: device client + shared state
    let device = device::HttpDevice::new(&config.device).context("failed to build http client")?;
    let state = domain::AppState::shared();
    let poller = poller::StatusPoller::new(device, state, config.logging.show_device_data);

    // step 4: poll schedule in background
    let period = Duration::from_millis(config.polling.interval_ms);
    tracing::info!(
        device = %config.device.base_url,
        interval_ms = config.polling.interval_ms,
        "starting status polling"
    );
    tokio::spawn(poller.clone().run_schedule(period));

    // step 5: web server until ctrl-c
    let refresh_secs = config.polling.interval_ms.div_ceil(1000);
    let app = dashboard::router(poller, refresh_secs);
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!("dashboard live at http://{}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
