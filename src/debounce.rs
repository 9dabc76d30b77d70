//! Debounce and request-ordering primitives.
//!
//! The resolver and the route engine both coalesce bursts of position
//! changes into a single network call after a quiescence window, and both
//! must discard responses that arrive after a newer request was issued.
//! `Debouncer` handles the first concern, `SeqGate` the second. Both are
//! caller-driven with explicit instants so they are deterministic under
//! test and free of timer callbacks.

use std::time::{Duration, Instant};

/// Trailing-edge debouncer. Each `push` restarts the quiescence window;
/// `poll` yields the latest pushed value once the window has elapsed with
/// no newer push.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Debouncer { window, pending: None }
    }

    /// Replace any pending value and restart the quiescence window.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value if the window has elapsed since the last push.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, pushed)) if now.duration_since(*pushed) >= self.window => {
                self.pending.take().map(|(v, _)| v)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending value without firing.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Monotonic request-sequence gate for one debounce bucket.
///
/// `issue` tags an outgoing request; `admit` accepts a response only if it
/// carries the latest-issued tag. A response to a superseded request is
/// rejected no matter when it arrives, which makes out-of-order network
/// completions safe to apply blindly through this gate.
#[derive(Debug, Default)]
pub struct SeqGate {
    latest: u64,
}

impl SeqGate {
    pub fn new() -> Self {
        SeqGate { latest: 0 }
    }

    /// Tag a new outgoing request, superseding all earlier ones.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Whether a response tagged `seq` is still the live request.
    pub fn admit(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debouncer_fires_after_quiescence() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        let t0 = Instant::now();
        d.push(1, t0);

        assert_eq!(d.poll(t0 + Duration::from_millis(499)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(500)), Some(1));
        // Consumed: nothing further fires.
        assert_eq!(d.poll(t0 + Duration::from_millis(600)), None);
    }

    #[test]
    fn debouncer_push_restarts_window() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        let t0 = Instant::now();
        d.push(1, t0);
        d.push(2, t0 + Duration::from_millis(400));

        // 500 ms after the first push, but only 100 ms after the second.
        assert_eq!(d.poll(t0 + Duration::from_millis(500)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(900)), Some(2));
    }

    #[test]
    fn debouncer_keeps_only_latest_value() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let t0 = Instant::now();
        d.push("a", t0);
        d.push("b", t0);
        assert_eq!(d.poll(t0 + Duration::from_millis(100)), Some("b"));
    }

    #[test]
    fn debouncer_cancel_drops_pending() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let t0 = Instant::now();
        d.push(7, t0);
        d.cancel();
        assert_eq!(d.poll(t0 + Duration::from_millis(200)), None);
    }

    #[test]
    fn seq_gate_admits_only_latest() {
        let mut gate = SeqGate::new();
        let first = gate.issue();
        let second = gate.issue();

        assert!(!gate.admit(first));
        assert!(gate.admit(second));
    }

    #[test]
    fn seq_gate_rejects_before_any_issue() {
        let gate = SeqGate::new();
        assert!(!gate.admit(1));
    }
}
