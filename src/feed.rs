//! Position feed adapter.
//!
//! The platform delivers GPS fixes over a push-style subscription. The
//! adapter surfaces permission denial as a fatal error and filters the raw
//! stream through a dual time+distance gate so stationary devices do not
//! generate update storms while moving ones stay fresh.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::TrackingConfig;
use crate::error::TrackError;
use crate::geo::haversine;
use crate::model::Position;

/// A platform position source. Implemented over the device geolocation
/// API on a real frontend and by in-memory channels under test.
///
/// `subscribe` requests foreground location permission first and fails
/// with [`TrackError::PermissionDenied`] when refused; the caller must not
/// retry automatically. Dropping the receiver unsubscribes.
#[async_trait]
pub trait PositionFeed: Send + Sync {
    async fn subscribe(&self) -> Result<mpsc::Receiver<Position>, TrackError>;
}

/// Dual-gate filter over raw fixes.
///
/// The first fix always passes. A later fix passes only when BOTH the
/// minimum interval has elapsed AND the device moved past the minimum
/// displacement since the last accepted fix.
#[derive(Debug)]
pub struct UpdateGate {
    min_interval_ms: i64,
    min_distance_m: f64,
    last_accepted: Option<Position>,
}

impl UpdateGate {
    pub fn new(config: &TrackingConfig) -> Self {
        UpdateGate {
            min_interval_ms: config.min_update_interval_ms as i64,
            min_distance_m: config.min_update_distance_m,
            last_accepted: None,
        }
    }

    /// Whether to accept this fix. Accepted fixes become the new gate
    /// reference point.
    pub fn accept(&mut self, fix: &Position) -> bool {
        let pass = match &self.last_accepted {
            None => true,
            Some(prev) => {
                let elapsed = fix.timestamp_ms - prev.timestamp_ms;
                let moved = haversine(&prev.point, &fix.point);
                elapsed >= self.min_interval_ms && moved >= self.min_distance_m
            }
        };

        if pass {
            self.last_accepted = Some(*fix);
        }
        pass
    }
}
