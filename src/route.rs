//! Route engine.
//!
//! Maintains the drawn route geometry and the turn-by-turn guide between
//! the moving position and the destination. Fetches are debounced and
//! re-issued only when the (from, to) pair moves beyond the significant-
//! change gate since the last successful fetch. Failed fetches keep the
//! stale result; a response that was superseded while in flight is
//! dropped through the sequence gate.

use std::time::Instant;

use log::{debug, warn};

use crate::config::TrackingConfig;
use crate::debounce::{Debouncer, SeqGate};
use crate::error::TrackError;
use crate::geo::moved_significantly;
use crate::model::{Guide, Point, RouteGeometry};

/// Which of the two independent route calls to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFetchKind {
    Geometry,
    Guide,
}

/// A route fetch the caller should execute.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest {
    pub kind: RouteFetchKind,
    pub seq: u64,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug)]
pub struct RouteEngine {
    debounce: Debouncer<(Point, Point)>,
    geometry_gate: SeqGate,
    guide_gate: SeqGate,
    /// (from, to) of the last successful fetch, per call type. The
    /// epsilon gate compares against these.
    geometry_fetched_at: Option<(Point, Point)>,
    guide_fetched_at: Option<(Point, Point)>,
    geometry: RouteGeometry,
    guide: Guide,
    epsilon_deg: f64,
}

impl RouteEngine {
    pub fn new(config: &TrackingConfig) -> Self {
        RouteEngine {
            debounce: Debouncer::new(config.route_debounce()),
            geometry_gate: SeqGate::new(),
            guide_gate: SeqGate::new(),
            geometry_fetched_at: None,
            guide_fetched_at: None,
            geometry: RouteGeometry::default(),
            guide: Guide::default(),
            epsilon_deg: config.epsilon_deg,
        }
    }

    fn pair_moved(&self, prev: &Option<(Point, Point)>, pair: &(Point, Point)) -> bool {
        match prev {
            None => true,
            Some((pf, pt)) => {
                moved_significantly(pf, &pair.0, self.epsilon_deg)
                    || moved_significantly(pt, &pair.1, self.epsilon_deg)
            }
        }
    }

    /// Record a new (position, destination) pair. Arms the debouncer only
    /// when at least one call type would actually re-fetch.
    pub fn note(&mut self, from: Point, to: Point, now: Instant) {
        let pair = (from, to);
        if self.pair_moved(&self.geometry_fetched_at, &pair)
            || self.pair_moved(&self.guide_fetched_at, &pair)
        {
            self.debounce.push(pair, now);
        }
    }

    /// Drain fetch requests whose quiescence window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Vec<RouteRequest> {
        let Some(pair) = self.debounce.poll(now) else {
            return Vec::new();
        };
        let (from, to) = pair;

        let mut out = Vec::new();
        if self.pair_moved(&self.geometry_fetched_at, &pair) {
            out.push(RouteRequest {
                kind: RouteFetchKind::Geometry,
                seq: self.geometry_gate.issue(),
                from,
                to,
            });
        }
        if self.pair_moved(&self.guide_fetched_at, &pair) {
            out.push(RouteRequest {
                kind: RouteFetchKind::Guide,
                seq: self.guide_gate.issue(),
                from,
                to,
            });
        }
        out
    }

    /// Commit a geometry response. Stale sequences are dropped; failures
    /// retain the previous geometry and stay eligible for retry on the
    /// next significant movement.
    pub fn apply_geometry(
        &mut self,
        seq: u64,
        pair: (Point, Point),
        result: Result<Vec<Point>, TrackError>,
    ) {
        if !self.geometry_gate.admit(seq) {
            debug!("discarding stale geometry response (seq {seq})");
            return;
        }
        match result {
            Ok(points) => {
                self.geometry = RouteGeometry { points };
                self.geometry_fetched_at = Some(pair);
            }
            Err(e) => warn!("geometry fetch failed, keeping stale path: {e}"),
        }
    }

    /// Commit a guide response, same rules as geometry.
    pub fn apply_guide(&mut self, seq: u64, pair: (Point, Point), result: Result<Guide, TrackError>) {
        if !self.guide_gate.admit(seq) {
            debug!("discarding stale guide response (seq {seq})");
            return;
        }
        match result {
            Ok(guide) => {
                self.guide = guide;
                self.guide_fetched_at = Some(pair);
            }
            Err(e) => warn!("guide fetch failed, keeping stale guide: {e}"),
        }
    }

    pub fn geometry(&self) -> &RouteGeometry {
        &self.geometry
    }

    pub fn guide(&self) -> &Guide {
        &self.guide
    }
}
