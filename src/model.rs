//! Navigation data model.
//!
//! Plain serializable structures shared across the engine and handed to
//! the frontend as JSON. Position samples are immutable: each GPS fix
//! produces a new value, nothing is updated in place.

use serde::{Deserialize, Serialize};

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

/// A timestamped GPS fix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub point: Point,
    /// Direction of travel in degrees [0, 360), if the platform reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Ground speed in m/s, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Horizontal accuracy radius in meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Unix epoch milliseconds.
    pub timestamp_ms: i64,
}

/// The tracking target: a free-text keyword supplied at session start,
/// plus the canonical coordinate once place search has resolved it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<Point>,
    /// Resolved display name; falls back to reverse geocoding when the
    /// keyword search returns nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Destination {
    pub fn new(keyword: impl Into<String>) -> Self {
        Destination {
            keyword: keyword.into(),
            point: None,
            display_name: None,
        }
    }
}

/// The renderable path from the last successful geometry fetch. Replaced
/// wholesale on each fetch; retained as-is when a fetch fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub points: Vec<Point>,
}

/// Maneuver classification reported by the route guide service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Straight,
    TurnRight,
    TurnLeft,
    ForkRight,
    ForkLeft,
    UTurn,
    RampUp,
    RampDown,
    RoundaboutEnter,
    RoundaboutExit,
}

impl TurnKind {
    /// Map the guide service's numeric turn code. Unknown codes degrade
    /// to `Straight` rather than failing the whole guide.
    pub fn from_wire(code: u32) -> TurnKind {
        match code {
            1 => TurnKind::Straight,
            2 => TurnKind::TurnLeft,
            3 => TurnKind::TurnRight,
            4 => TurnKind::ForkLeft,
            5 => TurnKind::ForkRight,
            6 => TurnKind::UTurn,
            7 => TurnKind::RampUp,
            8 => TurnKind::RampDown,
            9 => TurnKind::RoundaboutEnter,
            10 => TurnKind::RoundaboutExit,
            _ => TurnKind::Straight,
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            TurnKind::Straight => "continue straight",
            TurnKind::TurnRight => "turn right",
            TurnKind::TurnLeft => "turn left",
            TurnKind::ForkRight => "keep right at the fork",
            TurnKind::ForkLeft => "keep left at the fork",
            TurnKind::UTurn => "make a U-turn",
            TurnKind::RampUp => "take the ramp up",
            TurnKind::RampDown => "take the ramp down",
            TurnKind::RoundaboutEnter => "enter the roundabout",
            TurnKind::RoundaboutExit => "exit the roundabout",
        }
    }
}

/// One maneuver in the turn-by-turn plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideStep {
    /// Distance to this maneuver from the previous one, in meters.
    pub distance_m: f64,
    pub turn: TurnKind,
    /// Location of the maneuver.
    pub point: Point,
    /// Street or place name at the maneuver.
    pub name: String,
}

/// The full turn-by-turn plan. Steps are ordered along the route from
/// origin to destination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Guide {
    pub steps: Vec<GuideStep>,
    pub total_distance_m: f64,
    pub total_duration_s: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_kind_wire_mapping() {
        assert_eq!(TurnKind::from_wire(2), TurnKind::TurnLeft);
        assert_eq!(TurnKind::from_wire(6), TurnKind::UTurn);
        assert_eq!(TurnKind::from_wire(9), TurnKind::RoundaboutEnter);
    }

    #[test]
    fn turn_kind_unknown_code_degrades() {
        assert_eq!(TurnKind::from_wire(0), TurnKind::Straight);
        assert_eq!(TurnKind::from_wire(99), TurnKind::Straight);
    }

    #[test]
    fn position_serializes_without_empty_options() {
        let pos = Position {
            point: Point { lat: 13.0, lon: 100.0 },
            heading: None,
            speed: None,
            accuracy: Some(5.0),
            timestamp_ms: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&pos).unwrap();
        assert!(json.get("heading").is_none());
        assert_eq!(json["accuracy"], 5.0);
    }

    #[test]
    fn turn_kind_snake_case_json() {
        let json = serde_json::to_string(&TurnKind::RoundaboutEnter).unwrap();
        assert_eq!(json, "\"roundabout_enter\"");
    }
}
