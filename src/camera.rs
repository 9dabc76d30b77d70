//! Camera follow-mode state machine.
//!
//! Three states cycled by an explicit user toggle: Off, Centered, and
//! Forward. Manual map manipulation drops back to Off, but movement
//! caused by the controller's own animation must not be mistaken for a
//! user pan; the frontend brackets each programmatic animation with
//! `begin_animation`/`end_animation` so the gesture handler can tell them
//! apart.

use serde::Serialize;

use crate::config::TrackingConfig;
use crate::geo::project_forward;
use crate::model::{Point, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    Off,
    Centered,
    Forward,
}

/// A viewport the frontend should animate to. A new target supersedes any
/// animation still in flight; targets are never queued.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CameraTarget {
    pub center: Point,
    /// Map rotation in degrees, 0 = north up.
    pub bearing: f64,
    /// Degrees from top-down.
    pub tilt: f64,
}

#[derive(Debug)]
pub struct CameraController {
    mode: CameraMode,
    /// Off-state latch: the camera snaps to the user once per Off entry,
    /// then leaves the viewport alone for manual browsing.
    centered_once: bool,
    animating: bool,
}

impl CameraController {
    pub fn new() -> Self {
        CameraController {
            mode: CameraMode::Off,
            centered_once: false,
            animating: false,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Explicit user toggle: Off -> Centered -> Forward -> Off.
    /// Re-entering Off this way re-arms the snap-to-user latch.
    pub fn toggle(&mut self) -> CameraMode {
        self.mode = match self.mode {
            CameraMode::Off => CameraMode::Centered,
            CameraMode::Centered => CameraMode::Forward,
            CameraMode::Forward => {
                self.centered_once = false;
                CameraMode::Off
            }
        };
        self.mode
    }

    /// Mark the start of a programmatic camera animation. Gestures
    /// reported while the flag is up are the animation's own movement.
    pub fn begin_animation(&mut self) {
        self.animating = true;
    }

    pub fn end_animation(&mut self) {
        self.animating = false;
    }

    /// A manual pan or zoom on the map. Following stops, but the latch is
    /// left set: snapping back to the user here would fight the gesture.
    /// Returns true when the mode changed.
    pub fn on_map_gesture(&mut self) -> bool {
        if self.animating || self.mode == CameraMode::Off {
            return false;
        }
        self.mode = CameraMode::Off;
        self.centered_once = true;
        true
    }

    /// Compute the viewport for a new position, if the current state
    /// wants the camera moved at all.
    pub fn on_position(&mut self, pos: &Position, config: &TrackingConfig) -> Option<CameraTarget> {
        match self.mode {
            CameraMode::Off => {
                if self.centered_once {
                    return None;
                }
                self.centered_once = true;
                Some(CameraTarget { center: pos.point, bearing: 0.0, tilt: 0.0 })
            }
            CameraMode::Centered => {
                Some(CameraTarget { center: pos.point, bearing: 0.0, tilt: 0.0 })
            }
            CameraMode::Forward => {
                let bearing = pos.heading.unwrap_or(0.0);
                let ahead = project_forward(&pos.point, bearing, config.camera_forward_m);
                Some(CameraTarget {
                    center: ahead,
                    bearing,
                    tilt: config.camera_forward_tilt_deg,
                })
            }
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}
