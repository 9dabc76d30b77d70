//! Tracking configuration.
//!
//! Every threshold the engine uses is a parameter here rather than a
//! hard-coded constant. The frontend may ship overrides as JSON.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Minimum time between accepted position updates, in milliseconds.
    pub min_update_interval_ms: u64,
    /// Minimum displacement between accepted position updates, in meters.
    pub min_update_distance_m: f64,
    /// Significant-change gate in degrees; movements below this are
    /// treated as GPS noise for fetch and re-resolution purposes.
    pub epsilon_deg: f64,
    /// Quiescence window for place-name resolution, in milliseconds.
    pub resolve_debounce_ms: u64,
    /// Quiescence window for route/guide fetches, in milliseconds.
    pub route_debounce_ms: u64,
    /// Distance to the destination below which the session is considered
    /// arrived, in meters.
    pub arrival_threshold_m: f64,
    /// Look-ahead projection distance for the forward camera, in meters.
    pub camera_forward_m: f64,
    /// Camera tilt in the forward-looking state, in degrees from top-down.
    pub camera_forward_tilt_deg: f64,
    /// API key for the place search / geocoding / route guide services.
    pub api_key: String,
    /// Locale sent to the guide service for instruction names.
    pub locale: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            min_update_interval_ms: 5_000,
            min_update_distance_m: 10.0,
            epsilon_deg: 0.0001,
            resolve_debounce_ms: 500,
            route_debounce_ms: 1_000,
            arrival_threshold_m: 100.0,
            camera_forward_m: 100.0,
            camera_forward_tilt_deg: 60.0,
            api_key: String::new(),
            locale: "th".to_string(),
        }
    }
}

impl TrackingConfig {
    pub fn min_update_interval(&self) -> Duration {
        Duration::from_millis(self.min_update_interval_ms)
    }

    pub fn resolve_debounce(&self) -> Duration {
        Duration::from_millis(self.resolve_debounce_ms)
    }

    pub fn route_debounce(&self) -> Duration {
        Duration::from_millis(self.route_debounce_ms)
    }
}
