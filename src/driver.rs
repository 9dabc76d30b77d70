//! Async session driver.
//!
//! Owns the [`NavigationSession`] on a single task. Position fixes,
//! user actions, timer ticks, and network completions all funnel into
//! one select loop, so state mutation stays strictly sequential. Network
//! commands are executed on spawned tasks that report back over a
//! channel; when the loop has exited, those sends fail and the results
//! are discarded, which is exactly the teardown rule: in-flight requests
//! finish harmlessly into a dead session.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::camera::CameraTarget;
use crate::error::TrackError;
use crate::feed::{PositionFeed, UpdateGate};
use crate::model::{Guide, Point};
use crate::resolver::LabelBucket;
use crate::route::RouteFetchKind;
use crate::services::{PlaceMatch, PlaceSearch, ReverseGeocode, RouteProvider};
use crate::session::{Command, NavigationSession, SessionSnapshot};

/// How often the loop drains due debounced fetches.
const POLL_TICK: Duration = Duration::from_millis(100);

/// Session timestamps come from the tokio clock so tests under paused
/// time observe the same instants the timers do.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Frontend-originated inputs.
#[derive(Debug)]
pub enum UserAction {
    ToggleCamera,
    MapGesture,
    /// The frontend is about to run a programmatic camera animation;
    /// gestures until `CameraAnimationEnded` are the animation's own.
    CameraAnimationStarted,
    CameraAnimationEnded,
    Stop,
}

/// The remote services the driver executes commands against.
#[derive(Clone)]
pub struct Services {
    pub search: Arc<dyn PlaceSearch>,
    pub geocode: Arc<dyn ReverseGeocode>,
    pub routes: Arc<dyn RouteProvider>,
}

enum Completion {
    Search {
        seq: u64,
        result: Result<Option<PlaceMatch>, TrackError>,
    },
    Label {
        bucket: LabelBucket,
        seq: u64,
        point: Point,
        result: Result<String, TrackError>,
    },
    Geometry {
        seq: u64,
        pair: (Point, Point),
        result: Result<Vec<Point>, TrackError>,
    },
    Guide {
        seq: u64,
        pair: (Point, Point),
        result: Result<Guide, TrackError>,
    },
}

/// Handle to a running tracking session.
pub struct Tracker {
    pub actions: mpsc::Sender<UserAction>,
    /// Latest committed state for rendering.
    pub snapshots: watch::Receiver<SessionSnapshot>,
    /// Latest camera target. `watch` semantics give last-state-wins: a
    /// new target simply replaces one the frontend has not animated yet.
    pub camera: watch::Receiver<Option<CameraTarget>>,
    pub task: JoinHandle<Result<(), TrackError>>,
}

impl Tracker {
    /// Start the session loop on the current tokio runtime.
    pub fn spawn(
        session: NavigationSession,
        feed: Arc<dyn PositionFeed>,
        services: Services,
    ) -> Tracker {
        let (action_tx, action_rx) = mpsc::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
        let (camera_tx, camera_rx) = watch::channel(None);

        let task = tokio::spawn(run(session, feed, services, action_rx, snapshot_tx, camera_tx));

        Tracker {
            actions: action_tx,
            snapshots: snapshot_rx,
            camera: camera_rx,
            task,
        }
    }
}

async fn run(
    mut session: NavigationSession,
    feed: Arc<dyn PositionFeed>,
    services: Services,
    mut actions: mpsc::Receiver<UserAction>,
    snapshots: watch::Sender<SessionSnapshot>,
    camera: watch::Sender<Option<CameraTarget>>,
) -> Result<(), TrackError> {
    // Permission denial surfaces here, before any state exists. Fatal:
    // the frontend shows remediation and may spawn a fresh tracker after
    // the user acts.
    let mut fixes = feed.subscribe().await?;
    let mut gate = UpdateGate::new(session.config());

    let (done_tx, mut completions) = mpsc::channel::<Completion>(32);
    let mut tick = tokio::time::interval(POLL_TICK);

    for command in session.start() {
        execute(command, &services, &done_tx, &camera);
    }
    let _ = snapshots.send(session.snapshot());

    loop {
        tokio::select! {
            fix = fixes.recv() => {
                let Some(fix) = fix else {
                    info!("position feed closed, ending session");
                    break;
                };
                if gate.accept(&fix) {
                    for command in session.handle_position(fix, now()) {
                        execute(command, &services, &done_tx, &camera);
                    }
                }
            }
            Some(action) = actions.recv() => match action {
                UserAction::ToggleCamera => {
                    for command in session.toggle_camera() {
                        execute(command, &services, &done_tx, &camera);
                    }
                }
                UserAction::MapGesture => session.on_map_gesture(),
                UserAction::CameraAnimationStarted => session.begin_camera_animation(),
                UserAction::CameraAnimationEnded => session.end_camera_animation(),
                UserAction::Stop => break,
            },
            Some(done) = completions.recv() => match done {
                Completion::Search { seq, result } => {
                    session.apply_search(seq, result, now());
                }
                Completion::Label { bucket, seq, point, result } => {
                    session.apply_label(bucket, seq, point, result);
                }
                Completion::Geometry { seq, pair, result } => {
                    session.apply_geometry(seq, pair, result);
                }
                Completion::Guide { seq, pair, result } => {
                    session.apply_guide(seq, pair, result);
                }
            },
            _ = tick.tick() => {
                for command in session.poll(now()) {
                    execute(command, &services, &done_tx, &camera);
                }
            }
        }
        let _ = snapshots.send(session.snapshot());
    }

    Ok(())
}

/// Execute one session command. Network commands run on their own task;
/// their completion send is allowed to fail once the session is gone.
fn execute(
    command: Command,
    services: &Services,
    done: &mpsc::Sender<Completion>,
    camera: &watch::Sender<Option<CameraTarget>>,
) {
    match command {
        Command::MoveCamera(target) => {
            camera.send_replace(Some(target));
        }
        Command::SearchDestination { seq, keyword } => {
            let search = services.search.clone();
            let done = done.clone();
            tokio::spawn(async move {
                let result = search.search(&keyword).await;
                let _ = done.send(Completion::Search { seq, result }).await;
            });
        }
        Command::ResolveLabel(req) => {
            let geocode = services.geocode.clone();
            let done = done.clone();
            tokio::spawn(async move {
                let result = geocode.resolve(&req.point).await;
                let _ = done
                    .send(Completion::Label {
                        bucket: req.bucket,
                        seq: req.seq,
                        point: req.point,
                        result,
                    })
                    .await;
            });
        }
        Command::FetchRoute(req) => {
            let routes = services.routes.clone();
            let done = done.clone();
            tokio::spawn(async move {
                let pair = (req.from, req.to);
                let completion = match req.kind {
                    RouteFetchKind::Geometry => Completion::Geometry {
                        seq: req.seq,
                        pair,
                        result: routes.geometry(&req.from, &req.to).await,
                    },
                    RouteFetchKind::Guide => Completion::Guide {
                        seq: req.seq,
                        pair,
                        result: routes.guide(&req.from, &req.to).await,
                    },
                };
                let _ = done.send(completion).await;
            });
        }
    }
}
