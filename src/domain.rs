//! ==============================================================================
//! domain.rs - status snapshot, mirror flags and dashboard text
//! ==============================================================================
//!
//! purpose:
//!     the data the dashboard carries between poll cycles.
//!     - StatusSnapshot: one /status body, exactly as the controller sends it
//!     - Mirror: last-seen actuator/alarm flags
//!     - DashboardView: the five text fields shown on the page
//!     - AppState: everything above plus the last update time
//!
//! relationships:
//!     - produced by: device.rs (parses StatusSnapshot)
//!     - written by: poller.rs (AppState::apply after a successful fetch)
//!     - read by: dashboard.rs (page + json api)
//!
//! ==============================================================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// text shown in a field before the first successful poll
pub const PLACEHOLDER: &str = "--";

/// element ids of the rendered text fields
pub const BUZZER_STATUS_ID: &str = "buzzerStatus";
pub const PUMP_STATUS_ID: &str = "pumpStatus";
pub const LED_STATUS_ID: &str = "ledStatus";
pub const DISTANCE_TO_WATER_ID: &str = "distanceToWater";
pub const WATER_PH_VALUE_ID: &str = "waterPhValue";

/// one reading of the tank controller, as returned by GET /status
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// remote system powered on
    pub system_status: bool,
    pub buzzer_status: bool,
    pub led_status: bool,
    pub pump_status: bool,
    pub water_level_low: bool,
    /// never sent by the controller we know of; kept for wire compatibility
    #[serde(default)]
    pub water_level_high: bool,
    /// measured pH outside the acceptable range
    pub ph_value_bad: bool,
    /// raw ultrasonic distance from sensor to water surface
    pub distance_to_water: f64,
    /// raw pH probe reading
    pub water_ph_value: f64,
}

/// last-seen flags of the remote system
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Mirror {
    pub is_system_on: bool,
    pub is_buzzer_on: bool,
    pub is_led_on: bool,
    pub is_pump_on: bool,
    pub is_water_level_low: bool,
    pub is_water_level_high: bool,
    pub is_ph_value_bad: bool,
}

/// text content of the dashboard fields
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub buzzer_status: String,
    pub pump_status: String,
    pub led_status: String,
    pub distance_to_water: String,
    pub water_ph_value: String,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            buzzer_status: PLACEHOLDER.to_string(),
            pump_status: PLACEHOLDER.to_string(),
            led_status: PLACEHOLDER.to_string(),
            distance_to_water: PLACEHOLDER.to_string(),
            water_ph_value: PLACEHOLDER.to_string(),
        }
    }
}

impl DashboardView {
    /// fields in page order, paired with their element id
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            (BUZZER_STATUS_ID, self.buzzer_status.as_str()),
            (PUMP_STATUS_ID, self.pump_status.as_str()),
            (LED_STATUS_ID, self.led_status.as_str()),
            (DISTANCE_TO_WATER_ID, self.distance_to_water.as_str()),
            (WATER_PH_VALUE_ID, self.water_ph_value.as_str()),
        ]
    }

    /// text currently held by the element with the given id
    #[cfg(test)]
    pub fn text(&self, element_id: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find(|(id, _)| *id == element_id)
            .map(|(_, text)| text)
    }
}

/// state shared between the poll tasks (writers) and the web server (readers)
#[derive(Clone, Debug, Default, Serialize)]
pub struct AppState {
    pub mirror: Mirror,
    pub view: DashboardView,
    /// unix timestamp (ms) of last successful update, 0 before the first one
    pub last_update: u64,
}

pub type SharedState = Arc<RwLock<AppState>>;

impl AppState {
    pub fn shared() -> SharedState {
        Arc::new(RwLock::new(Self::default()))
    }

    /// overwrite mirror and text fields from a freshly parsed snapshot
    pub fn apply(&mut self, snapshot: &StatusSnapshot, now_ms: u64) {
        // is_water_level_high is left alone: no poll ever populates it
        self.mirror.is_system_on = snapshot.system_status;
        self.mirror.is_buzzer_on = snapshot.buzzer_status;
        self.mirror.is_led_on = snapshot.led_status;
        self.mirror.is_pump_on = snapshot.pump_status;
        self.mirror.is_water_level_low = snapshot.water_level_low;
        self.mirror.is_ph_value_bad = snapshot.ph_value_bad;

        self.view.buzzer_status = snapshot.buzzer_status.to_string();
        self.view.pump_status = snapshot.pump_status.to_string();
        self.view.led_status = snapshot.led_status.to_string();
        self.view.distance_to_water = number_text(snapshot.distance_to_water);
        self.view.water_ph_value = number_text(snapshot.water_ph_value);

        self.last_update = now_ms;
    }
}

/// shortest decimal text of a reading; negative zero shows as "0"
fn number_text(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
pub(crate) fn sample_snapshot() -> StatusSnapshot {
    StatusSnapshot {
        system_status: true,
        buzzer_status: false,
        led_status: true,
        pump_status: false,
        water_level_low: false,
        water_level_high: false,
        ph_value_bad: true,
        distance_to_water: 42.0,
        water_ph_value: 5.8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_controller_body() {
        let body = r#"{"system_status":true,"buzzer_status":false,"led_status":true,
            "pump_status":false,"water_level_low":false,"ph_value_bad":true,
            "distance_to_water":42,"water_ph_value":5.8}"#;
        let snapshot: StatusSnapshot = serde_json::from_str(body).unwrap();
        assert_eq!(snapshot, sample_snapshot());
    }

    #[test]
    fn test_reject_body_missing_field() {
        let body = r#"{"system_status":true,"buzzer_status":false}"#;
        assert!(serde_json::from_str::<StatusSnapshot>(body).is_err());
    }

    #[test]
    fn test_apply_renders_text() {
        let mut state = AppState::default();
        state.apply(&sample_snapshot(), 1234);

        assert_eq!(state.view.text(BUZZER_STATUS_ID), Some("false"));
        assert_eq!(state.view.text(PUMP_STATUS_ID), Some("false"));
        assert_eq!(state.view.text(LED_STATUS_ID), Some("true"));
        assert_eq!(state.view.text(DISTANCE_TO_WATER_ID), Some("42"));
        assert_eq!(state.view.text(WATER_PH_VALUE_ID), Some("5.8"));
        assert_eq!(state.last_update, 1234);
    }

    #[test]
    fn test_apply_overwrites_mirror() {
        let mut state = AppState::default();
        state.apply(&sample_snapshot(), 1);

        assert_eq!(
            state.mirror,
            Mirror {
                is_system_on: true,
                is_buzzer_on: false,
                is_led_on: true,
                is_pump_on: false,
                is_water_level_low: false,
                is_water_level_high: false,
                is_ph_value_bad: true,
            }
        );

        let next = StatusSnapshot {
            system_status: false,
            buzzer_status: true,
            pump_status: true,
            water_level_low: true,
            ..sample_snapshot()
        };
        state.apply(&next, 2);
        assert!(!state.mirror.is_system_on);
        assert!(state.mirror.is_buzzer_on);
        assert!(state.mirror.is_pump_on);
        assert!(state.mirror.is_water_level_low);
        assert_eq!(state.view.text(BUZZER_STATUS_ID), Some("true"));
    }

    #[test]
    fn test_water_level_high_never_mirrored() {
        let mut state = AppState::default();
        let snapshot = StatusSnapshot {
            water_level_high: true,
            ..sample_snapshot()
        };
        state.apply(&snapshot, 1);
        assert!(!state.mirror.is_water_level_high);
    }

    #[test]
    fn test_placeholder_before_first_poll() {
        let view = DashboardView::default();
        for (_, text) in view.fields() {
            assert_eq!(text, PLACEHOLDER);
        }
        assert_eq!(view.text("nope"), None);
    }

    #[test]
    fn test_number_text() {
        assert_eq!(number_text(42.0), "42");
        assert_eq!(number_text(5.8), "5.8");
        assert_eq!(number_text(-3.5), "-3.5");
        assert_eq!(number_text(-0.0), "0");

        let mut state = AppState::default();
        let snapshot = StatusSnapshot {
            distance_to_water: -0.0,
            ..sample_snapshot()
        };
        state.apply(&snapshot, 1);
        assert_eq!(state.view.text(DISTANCE_TO_WATER_ID), Some("0"));
    }
}
