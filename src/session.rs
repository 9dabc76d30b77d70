//! Navigation session.
//!
//! One session owns every piece of mutable tracking state: the latest
//! position, the destination, route geometry, guide, active step, the
//! arrival latch, and the camera. All writes flow through the update
//! methods here; side effects come out as explicit [`Command`] values
//! computed from significant-change comparisons, never from implicit
//! reactive triggers. Responses are committed through `apply_*` methods
//! that drop anything a newer request has superseded.

use std::time::Instant;

use log::warn;
use serde::Serialize;

use crate::camera::{CameraController, CameraMode, CameraTarget};
use crate::config::TrackingConfig;
use crate::debounce::SeqGate;
use crate::error::TrackError;
use crate::guidance::{self, ArrivalLatch, GuidanceText};
use crate::model::{Destination, Guide, Point, Position, RouteGeometry};
use crate::resolver::{LabelBucket, PlaceResolver, ResolveRequest};
use crate::route::{RouteEngine, RouteRequest};
use crate::services::PlaceMatch;

/// A side effect the session wants executed. The driver runs network
/// commands asynchronously and feeds results back through `apply_*`;
/// camera commands go straight to the frontend.
#[derive(Debug)]
pub enum Command {
    SearchDestination { seq: u64, keyword: String },
    ResolveLabel(ResolveRequest),
    FetchRoute(RouteRequest),
    MoveCamera(CameraTarget),
}

/// Immutable render snapshot handed to the presentation layer.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub destination: Destination,
    /// Label for where the user currently is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_label: Option<String>,
    pub geometry: RouteGeometry,
    pub guide: Guide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<GuidanceText>,
    pub arrived: bool,
    pub camera_mode: CameraMode,
}

pub struct NavigationSession {
    config: TrackingConfig,
    position: Option<Position>,
    destination: Destination,
    resolver: PlaceResolver,
    route: RouteEngine,
    camera: CameraController,
    arrival: ArrivalLatch,
    active_step: Option<usize>,
    search_gate: SeqGate,
}

impl NavigationSession {
    /// `initial_point` is the coordinate the caller already knows for the
    /// destination (e.g. from the booked tour program); keyword search
    /// may replace it with a canonical match.
    pub fn new(keyword: impl Into<String>, initial_point: Option<Point>, config: TrackingConfig) -> Self {
        let mut destination = Destination::new(keyword);
        destination.point = initial_point;
        NavigationSession {
            resolver: PlaceResolver::new(&config),
            route: RouteEngine::new(&config),
            camera: CameraController::new(),
            arrival: ArrivalLatch::new(),
            active_step: None,
            search_gate: SeqGate::new(),
            position: None,
            destination,
            config,
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Begin the session: resolve the destination keyword.
    pub fn start(&mut self) -> Vec<Command> {
        vec![Command::SearchDestination {
            seq: self.search_gate.issue(),
            keyword: self.destination.keyword.clone(),
        }]
    }

    /// Ingest a gated position update. Recomputes guidance and arrival,
    /// arms the debounced fetches, and moves the camera if its state
    /// wants following.
    pub fn handle_position(&mut self, pos: Position, now: Instant) -> Vec<Command> {
        self.position = Some(pos);

        self.active_step = guidance::active_step(&pos.point, self.route.guide());
        if let Some(dest) = self.destination.point {
            self.arrival.update(&pos.point, &dest, self.config.arrival_threshold_m);
            self.route.note(pos.point, dest, now);
        }
        self.resolver.note(LabelBucket::Start, pos.point, now);

        let mut commands = Vec::new();
        if let Some(target) = self.camera.on_position(&pos, &self.config) {
            commands.push(Command::MoveCamera(target));
        }
        commands
    }

    /// Drain debounced network commands that have become due.
    pub fn poll(&mut self, now: Instant) -> Vec<Command> {
        let mut commands = Vec::new();
        commands.extend(self.resolver.poll(now).into_iter().map(Command::ResolveLabel));
        commands.extend(self.route.poll(now).into_iter().map(Command::FetchRoute));
        commands
    }

    /// Commit the keyword search result. An empty or failed search keeps
    /// whatever coordinate the caller supplied and falls back to reverse
    /// geocoding for the display name.
    pub fn apply_search(
        &mut self,
        seq: u64,
        result: Result<Option<PlaceMatch>, TrackError>,
        now: Instant,
    ) {
        if !self.search_gate.admit(seq) {
            return;
        }
        match result {
            Ok(Some(m)) => {
                self.destination.point = Some(m.point);
                self.destination.display_name = Some(m.name.clone());
                self.resolver.seed(LabelBucket::Destination, m.point, m.name);
            }
            Ok(None) => {
                if let Some(known) = self.destination.point {
                    self.resolver.note(LabelBucket::Destination, known, now);
                } else {
                    warn!(
                        "destination keyword {:?} resolved to nothing and no fallback coordinate is known",
                        self.destination.keyword
                    );
                }
            }
            Err(e) => {
                warn!("destination search failed: {e}");
                if let Some(known) = self.destination.point {
                    self.resolver.note(LabelBucket::Destination, known, now);
                }
            }
        }

        // A newly resolved coordinate is a destination change for the
        // route engine and for arrival detection.
        if let (Some(pos), Some(dest)) = (self.position, self.destination.point) {
            self.arrival.update(&pos.point, &dest, self.config.arrival_threshold_m);
            self.route.note(pos.point, dest, now);
        }
    }

    pub fn apply_label(
        &mut self,
        bucket: LabelBucket,
        seq: u64,
        point: Point,
        result: Result<String, TrackError>,
    ) {
        self.resolver.apply(bucket, seq, point, result);
        if bucket == LabelBucket::Destination {
            if let Some(name) = self.resolver.name(LabelBucket::Destination) {
                self.destination.display_name = Some(name.to_string());
            }
        }
    }

    pub fn apply_geometry(
        &mut self,
        seq: u64,
        pair: (Point, Point),
        result: Result<Vec<Point>, TrackError>,
    ) {
        self.route.apply_geometry(seq, pair, result);
    }

    pub fn apply_guide(&mut self, seq: u64, pair: (Point, Point), result: Result<Guide, TrackError>) {
        self.route.apply_guide(seq, pair, result);
        if let Some(pos) = self.position {
            self.active_step = guidance::active_step(&pos.point, self.route.guide());
        }
    }

    /// Explicit user toggle of the camera follow mode. Entering a
    /// following state snaps immediately instead of waiting for the next
    /// fix.
    pub fn toggle_camera(&mut self) -> Vec<Command> {
        self.camera.toggle();
        match self.position {
            Some(pos) => self
                .camera
                .on_position(&pos, &self.config)
                .map(Command::MoveCamera)
                .into_iter()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn on_map_gesture(&mut self) {
        self.camera.on_map_gesture();
    }

    pub fn begin_camera_animation(&mut self) {
        self.camera.begin_animation();
    }

    pub fn end_camera_animation(&mut self) {
        self.camera.end_animation();
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.camera.mode()
    }

    pub fn arrived(&self) -> bool {
        self.arrival.arrived()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut destination = self.destination.clone();
        if destination.display_name.is_none() {
            destination.display_name = self
                .resolver
                .name(LabelBucket::Destination)
                .map(str::to_string);
        }

        let guidance = match (&self.position, self.active_step) {
            (Some(pos), Some(active)) => {
                guidance::guidance_text(&pos.point, self.route.guide(), active)
            }
            _ => None,
        };

        SessionSnapshot {
            position: self.position,
            destination,
            start_label: self.resolver.name(LabelBucket::Start).map(str::to_string),
            geometry: self.route.geometry().clone(),
            guide: self.route.guide().clone(),
            active_step: self.active_step,
            guidance,
            arrived: self.arrival.arrived(),
            camera_mode: self.camera.mode(),
        }
    }
}
