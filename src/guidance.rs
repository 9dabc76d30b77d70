//! Guidance tracking.
//!
//! Recomputes the active turn-by-turn step from scratch on every position
//! update and latches arrival once the destination is within threshold.
//! The active step is the nearest maneuver by great-circle distance; GPS
//! noise can legitimately move it backwards, so no monotonicity is
//! assumed.

use serde::Serialize;

use crate::geo::{format_distance, haversine};
use crate::model::{Guide, Point};

/// Index of the guide step whose maneuver coordinate is nearest to
/// `position`. Full linear scan; guides are tens of steps at most.
///
/// Ties resolve to the earliest index (strict `<`), preferring the
/// upcoming maneuver over one already passed. Empty guides yield `None`.
pub fn active_step(position: &Point, guide: &Guide) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, step) in guide.steps.iter().enumerate() {
        let dist = haversine(position, &step.point);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }

    best.map(|(i, _)| i)
}

/// Sticky arrival detector. Once the position comes within the threshold
/// of the destination it stays arrived for the life of the session, even
/// if the user later moves away.
#[derive(Debug, Default)]
pub struct ArrivalLatch {
    arrived: bool,
}

impl ArrivalLatch {
    pub fn new() -> Self {
        ArrivalLatch { arrived: false }
    }

    pub fn update(&mut self, position: &Point, destination: &Point, threshold_m: f64) -> bool {
        if !self.arrived && haversine(position, destination) <= threshold_m {
            self.arrived = true;
        }
        self.arrived
    }

    pub fn arrived(&self) -> bool {
        self.arrived
    }
}

/// Guidance text for the frontend: the current instruction, the one after
/// it, and the remaining distance to the next maneuver.
#[derive(Debug, Clone, Serialize)]
pub struct GuidanceText {
    pub current: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub distance_to_turn: String,
}

/// Render display text for the active step, or `None` when the guide is
/// empty and guidance display is suppressed.
pub fn guidance_text(position: &Point, guide: &Guide, active: usize) -> Option<GuidanceText> {
    let step = guide.steps.get(active)?;
    let to_turn = haversine(position, &step.point);

    let current = if step.name.is_empty() {
        step.turn.instruction().to_string()
    } else {
        format!("{} onto {}", step.turn.instruction(), step.name)
    };

    let next = guide.steps.get(active + 1).map(|s| {
        if s.name.is_empty() {
            format!("then {}", s.turn.instruction())
        } else {
            format!("then {} onto {}", s.turn.instruction(), s.name)
        }
    });

    Some(GuidanceText {
        current,
        next,
        distance_to_turn: format_distance(to_turn),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GuideStep, TurnKind};

    fn pt(lat: f64, lon: f64) -> Point {
        Point { lat, lon }
    }

    fn step(lat: f64, lon: f64, name: &str) -> GuideStep {
        GuideStep {
            distance_m: 0.0,
            turn: TurnKind::TurnRight,
            point: pt(lat, lon),
            name: name.to_string(),
        }
    }

    fn guide(steps: Vec<GuideStep>) -> Guide {
        Guide { steps, total_distance_m: 0.0, total_duration_s: 0.0 }
    }

    #[test]
    fn selects_nearest_maneuver() {
        let g = guide(vec![
            step(0.0, 0.0, ""),
            step(0.0, 0.001, ""),
            step(0.0, 0.002, ""),
        ]);
        // 0.0015 is 55.6 m from step 1 and 55.6 m from step 2; nudge it
        // east so step 2 is strictly nearest.
        let active = active_step(&pt(0.0, 0.0016), &g).unwrap();
        assert_eq!(active, 2);

        // Cross-check against literal haversine distances.
        let d1 = haversine(&pt(0.0, 0.0016), &g.steps[1].point);
        let d2 = haversine(&pt(0.0, 0.0016), &g.steps[2].point);
        assert!(d2 < d1, "step 2 should be nearer: {d2} vs {d1}");
    }

    #[test]
    fn ties_resolve_to_earliest_index() {
        // Position exactly between steps 0 and 1.
        let g = guide(vec![step(0.0, 0.0, ""), step(0.0, 0.002, "")]);
        assert_eq!(active_step(&pt(0.0, 0.001), &g), Some(0));
    }

    #[test]
    fn empty_guide_yields_none() {
        assert_eq!(active_step(&pt(13.0, 100.0), &guide(vec![])), None);
    }

    #[test]
    fn arrival_latches_inside_threshold() {
        let mut latch = ArrivalLatch::new();
        let dest = pt(13.0, 100.0);

        // ~78 m away: within the 100 m threshold.
        assert!(latch.update(&pt(13.0007, 100.0), &dest, 100.0));
    }

    #[test]
    fn arrival_is_sticky_across_excursion() {
        let mut latch = ArrivalLatch::new();
        let dest = pt(13.0, 100.0);

        assert!(latch.update(&pt(13.0001, 100.0), &dest, 100.0));
        // 5 km away afterwards: still arrived.
        assert!(latch.update(&pt(13.045, 100.0), &dest, 100.0));
        assert!(latch.arrived());
    }

    #[test]
    fn not_arrived_outside_threshold() {
        let mut latch = ArrivalLatch::new();
        assert!(!latch.update(&pt(13.01, 100.0), &pt(13.0, 100.0), 100.0));
    }

    #[test]
    fn guidance_text_includes_next_step() {
        let g = guide(vec![
            step(13.0, 100.0, "Rama IV Rd"),
            step(13.001, 100.0, "Sukhumvit Rd"),
        ]);
        let text = guidance_text(&pt(13.0005, 100.0), &g, 0).unwrap();
        assert_eq!(text.current, "turn right onto Rama IV Rd");
        assert_eq!(text.next.as_deref(), Some("then turn right onto Sukhumvit Rd"));
    }

    #[test]
    fn guidance_text_last_step_has_no_next() {
        let g = guide(vec![step(13.0, 100.0, "")]);
        let text = guidance_text(&pt(13.0, 100.0), &g, 0).unwrap();
        assert_eq!(text.current, "turn right");
        assert!(text.next.is_none());
    }

    #[test]
    fn guidance_text_suppressed_for_empty_guide() {
        assert!(guidance_text(&pt(13.0, 100.0), &guide(vec![]), 0).is_none());
    }
}
