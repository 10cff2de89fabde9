//! ==============================================================================
//! dashboard.rs - web surface
//! ==============================================================================
//!
//! routes:
//!     GET  /            html page: five status fields + power button
//!     POST /toggle      the power button (one POST to the controller in the background, then back to /)
//!     GET  /api/status  current mirror and field text as json
//!
//! the page reloads itself once per poll interval, so it always shows what the
//! last successful poll cycle wrote.
//!
//! ==============================================================================

use crate::device::DeviceApi;
use crate::domain::{
    AppState, DashboardView, BUZZER_STATUS_ID, DISTANCE_TO_WATER_ID, LED_STATUS_ID, PUMP_STATUS_ID,
    WATER_PH_VALUE_ID,
};
use crate::poller::StatusPoller;
use axum::{
    extract::State,
    response::{Html, Json, Redirect},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// id of the power button element
pub const SYSTEM_CONTROL_BUTTON_ID: &str = "system-control-button";

struct WebState<D> {
    poller: StatusPoller<D>,
    refresh_secs: u64,
}

impl<D> Clone for WebState<D> {
    fn clone(&self) -> Self {
        Self {
            poller: self.poller.clone(),
            refresh_secs: self.refresh_secs,
        }
    }
}

pub fn router<D: DeviceApi>(poller: StatusPoller<D>, refresh_secs: u64) -> Router {
    Router::new()
        .route("/", get(dashboard_handler::<D>))
        .route("/toggle", post(toggle_handler::<D>))
        .route("/api/status", get(api_handler::<D>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(WebState {
            poller,
            refresh_secs: refresh_secs.max(1),
        })
}

async fn dashboard_handler<D: DeviceApi>(State(web): State<WebState<D>>) -> Html<String> {
    let view = web.poller.state().read().await.view.clone();
    Html(render_page(&view, web.refresh_secs))
}

/// power button; the POST to the controller runs on its own task so a
/// dropped browser request cannot cancel it
async fn toggle_handler<D: DeviceApi>(State(web): State<WebState<D>>) -> Redirect {
    let poller = web.poller.clone();
    tokio::spawn(async move {
        poller.toggle_system().await;
    });
    Redirect::to("/")
}

/// json api endpoint for programmatic access
async fn api_handler<D: DeviceApi>(State(web): State<WebState<D>>) -> Json<AppState> {
    let state = web.poller.state().read().await;
    Json(state.clone())
}

fn label_for(element_id: &str) -> &'static str {
    match element_id {
        BUZZER_STATUS_ID => "Buzzer",
        PUMP_STATUS_ID => "Pump",
        LED_STATUS_ID => "LED",
        DISTANCE_TO_WATER_ID => "Distance to water",
        WATER_PH_VALUE_ID => "Water pH",
        _ => "",
    }
}

fn render_page(view: &DashboardView, refresh_secs: u64) -> String {
    let rows: String = view
        .fields()
        .iter()
        .map(|(id, text)| {
            format!(
                "    <p>{}: <span id=\"{}\">{}</span></p>\n",
                label_for(id),
                id,
                html_escape(text)
            )
        })
        .collect();

    format!(
        r#"<!doctype html>
<html>
<head>
    <meta charset="utf-8">
    <meta http-equiv="refresh" content="{refresh}">
    <title>Tank Dashboard</title>
</head>
<body style="font-family: system-ui; padding: 2rem;">
    <h1>Tank Dashboard</h1>
{rows}    <form method="post" action="/toggle">
        <button id="{button}" type="submit">Toggle system</button>
    </form>
</body>
</html>"#,
        refresh = refresh_secs,
        rows = rows,
        button = SYSTEM_CONTROL_BUTTON_ID,
    )
}

/// escape html special characters to prevent xss
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
