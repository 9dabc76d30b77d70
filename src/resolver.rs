//! Place-name resolution with per-target debouncing.
//!
//! Keeps human-readable labels for the moving start position and for the
//! destination. Each target has its own debounce bucket and its own
//! significant-change gate, so rapid position churn does not flood the
//! geocoding service. Failures retain the previous label; a blank flash
//! is worse than a slightly stale name.

use std::time::Instant;

use log::{debug, warn};

use crate::config::TrackingConfig;
use crate::debounce::{Debouncer, SeqGate};
use crate::error::TrackError;
use crate::geo::moved_significantly;
use crate::model::Point;

/// Independent debounce buckets for the two labelled targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelBucket {
    Start,
    Destination,
}

/// A reverse-geocode request the caller should execute.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest {
    pub bucket: LabelBucket,
    pub seq: u64,
    pub point: Point,
}

#[derive(Debug)]
struct Bucket {
    debounce: Debouncer<Point>,
    gate: SeqGate,
    /// Coordinate of the last successful resolution; the epsilon gate
    /// compares against this.
    resolved_at: Option<Point>,
    name: Option<String>,
}

impl Bucket {
    fn new(config: &TrackingConfig) -> Self {
        Bucket {
            debounce: Debouncer::new(config.resolve_debounce()),
            gate: SeqGate::new(),
            resolved_at: None,
            name: None,
        }
    }
}

#[derive(Debug)]
pub struct PlaceResolver {
    start: Bucket,
    destination: Bucket,
    epsilon_deg: f64,
}

impl PlaceResolver {
    pub fn new(config: &TrackingConfig) -> Self {
        PlaceResolver {
            start: Bucket::new(config),
            destination: Bucket::new(config),
            epsilon_deg: config.epsilon_deg,
        }
    }

    fn bucket(&self, which: LabelBucket) -> &Bucket {
        match which {
            LabelBucket::Start => &self.start,
            LabelBucket::Destination => &self.destination,
        }
    }

    fn bucket_mut(&mut self, which: LabelBucket) -> &mut Bucket {
        match which {
            LabelBucket::Start => &mut self.start,
            LabelBucket::Destination => &mut self.destination,
        }
    }

    /// Record a coordinate change for a target. Sub-epsilon movement
    /// relative to the last resolved coordinate is GPS noise and arms
    /// nothing.
    pub fn note(&mut self, which: LabelBucket, point: Point, now: Instant) {
        let epsilon = self.epsilon_deg;
        let bucket = self.bucket_mut(which);

        let significant = match &bucket.resolved_at {
            None => true,
            Some(prev) => moved_significantly(prev, &point, epsilon),
        };
        if significant {
            bucket.debounce.push(point, now);
        }
    }

    /// Drain resolution requests whose quiescence window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Vec<ResolveRequest> {
        let mut out = Vec::new();
        for which in [LabelBucket::Start, LabelBucket::Destination] {
            let bucket = self.bucket_mut(which);
            if let Some(point) = bucket.debounce.poll(now) {
                let seq = bucket.gate.issue();
                out.push(ResolveRequest { bucket: which, seq, point });
            }
        }
        out
    }

    /// Commit a resolution result. Stale responses (a newer request has
    /// been issued since) are discarded; failures keep the old label and
    /// leave the gate reference untouched so the next qualifying movement
    /// retries naturally.
    pub fn apply(
        &mut self,
        which: LabelBucket,
        seq: u64,
        point: Point,
        result: Result<String, TrackError>,
    ) {
        let bucket = self.bucket_mut(which);
        if !bucket.gate.admit(seq) {
            debug!("discarding stale geocode response for {which:?} (seq {seq})");
            return;
        }
        match result {
            Ok(name) => {
                bucket.name = Some(name);
                bucket.resolved_at = Some(point);
            }
            Err(e) => {
                warn!("geocoding {which:?} failed, keeping previous label: {e}");
            }
        }
    }

    /// Seed a label without a network round trip, e.g. from a successful
    /// keyword search that already carries a display name.
    pub fn seed(&mut self, which: LabelBucket, point: Point, name: String) {
        let bucket = self.bucket_mut(which);
        bucket.name = Some(name);
        bucket.resolved_at = Some(point);
        bucket.debounce.cancel();
    }

    pub fn name(&self, which: LabelBucket) -> Option<&str> {
        self.bucket(which).name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn pt(lat: f64, lon: f64) -> Point {
        Point { lat, lon }
    }

    fn resolver() -> PlaceResolver {
        PlaceResolver::new(&TrackingConfig::default())
    }

    const WINDOW: Duration = Duration::from_millis(500);

    #[test]
    fn first_note_requests_after_quiescence() {
        let mut r = resolver();
        let t0 = Instant::now();
        r.note(LabelBucket::Start, pt(13.0, 100.0), t0);

        assert!(r.poll(t0).is_empty());
        let reqs = r.poll(t0 + WINDOW);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].bucket, LabelBucket::Start);
    }

    #[test]
    fn sub_epsilon_movement_requests_nothing() {
        let mut r = resolver();
        let t0 = Instant::now();
        r.note(LabelBucket::Start, pt(13.0, 100.0), t0);
        let req = r.poll(t0 + WINDOW).remove(0);
        r.apply(LabelBucket::Start, req.seq, req.point, Ok("Rama IV Rd".into()));

        // Moves less than 0.0001 degrees from the resolved coordinate.
        r.note(LabelBucket::Start, pt(13.00005, 100.0), t0 + WINDOW * 2);
        assert!(r.poll(t0 + WINDOW * 4).is_empty());
    }

    #[test]
    fn super_epsilon_movement_requests_exactly_once() {
        let mut r = resolver();
        let t0 = Instant::now();
        r.note(LabelBucket::Start, pt(13.0, 100.0), t0);
        let req = r.poll(t0 + WINDOW).remove(0);
        r.apply(LabelBucket::Start, req.seq, req.point, Ok("A".into()));

        r.note(LabelBucket::Start, pt(13.0005, 100.0), t0 + WINDOW * 2);
        r.note(LabelBucket::Start, pt(13.00051, 100.0), t0 + WINDOW * 2);
        let reqs = r.poll(t0 + WINDOW * 4);
        assert_eq!(reqs.len(), 1, "burst must coalesce to one request");
        assert!(r.poll(t0 + WINDOW * 6).is_empty());
    }

    #[test]
    fn buckets_are_independent() {
        let mut r = resolver();
        let t0 = Instant::now();
        r.note(LabelBucket::Start, pt(13.0, 100.0), t0);
        r.note(LabelBucket::Destination, pt(14.0, 101.0), t0);

        let reqs = r.poll(t0 + WINDOW);
        assert_eq!(reqs.len(), 2);
        assert_ne!(reqs[0].bucket, reqs[1].bucket);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut r = resolver();
        let t0 = Instant::now();
        r.note(LabelBucket::Start, pt(13.0, 100.0), t0);
        let old = r.poll(t0 + WINDOW).remove(0);

        r.note(LabelBucket::Start, pt(13.01, 100.0), t0 + WINDOW * 2);
        let new = r.poll(t0 + WINDOW * 4).remove(0);

        // Older request's response arrives after the newer one's.
        r.apply(LabelBucket::Start, new.seq, new.point, Ok("new road".into()));
        r.apply(LabelBucket::Start, old.seq, old.point, Ok("old road".into()));
        assert_eq!(r.name(LabelBucket::Start), Some("new road"));
    }

    #[test]
    fn failure_keeps_previous_label_and_allows_retry() {
        let mut r = resolver();
        let t0 = Instant::now();
        r.note(LabelBucket::Start, pt(13.0, 100.0), t0);
        let req = r.poll(t0 + WINDOW).remove(0);
        r.apply(LabelBucket::Start, req.seq, req.point, Ok("kept".into()));

        r.note(LabelBucket::Start, pt(13.01, 100.0), t0 + WINDOW * 2);
        let req = r.poll(t0 + WINDOW * 4).remove(0);
        r.apply(
            LabelBucket::Start,
            req.seq,
            req.point,
            Err(TrackError::Geocoding("503".into())),
        );
        assert_eq!(r.name(LabelBucket::Start), Some("kept"));

        // The failed coordinate never became the gate reference, so the
        // same movement qualifies again.
        r.note(LabelBucket::Start, pt(13.01, 100.0), t0 + WINDOW * 6);
        assert_eq!(r.poll(t0 + WINDOW * 8).len(), 1);
    }

    #[test]
    fn seed_suppresses_lookup_for_same_coordinate() {
        let mut r = resolver();
        let t0 = Instant::now();
        r.seed(LabelBucket::Destination, pt(14.0, 101.0), "Grand Palace".into());

        r.note(LabelBucket::Destination, pt(14.0, 101.0), t0);
        assert!(r.poll(t0 + WINDOW).is_empty());
        assert_eq!(r.name(LabelBucket::Destination), Some("Grand Palace"));
    }
}
