//! Native run driver
//!
//! Two tickers (frame, countdown) feed a controller task that exclusively owns the
//! [`Session`]. The controller publishes a [`Snapshot`] after every event. One stop
//! signal cancels both tickers on every exit path, including dropping the handle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::consts::{COUNTDOWN_INTERVAL_MS, FRAME_INTERVAL_MS};
use crate::session::{EndReason, Screen, Session};
use crate::sim::{CrashEvent, InputSampler, VehicleState, WorldModel};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Ticker cadence
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    pub frame_interval: Duration,
    pub countdown_interval: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(FRAME_INTERVAL_MS),
            countdown_interval: Duration::from_millis(COUNTDOWN_INTERVAL_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEvent {
    Frame,
    Second,
    Abort,
}

/// Immutable view of the session after one event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub screen: Screen,
    pub vehicle: VehicleState,
    pub time_left: u32,
    pub frame: u64,
    pub end_reason: Option<EndReason>,
    /// Crash reported by the frame that produced this snapshot
    pub crash: Option<CrashEvent>,
}

impl Snapshot {
    pub fn capture(session: &Session, crash: Option<CrashEvent>) -> Self {
        Self {
            screen: session.screen(),
            vehicle: *session.vehicle(),
            time_left: session.time_left(),
            frame: session.frame(),
            end_reason: session.end_reason(),
            crash,
        }
    }
}

/// Handle to a running session. Dropping it stops the run.
pub struct RunHandle {
    snapshots: watch::Receiver<Snapshot>,
    events: mpsc::Sender<RunEvent>,
    stop: Arc<watch::Sender<bool>>,
    controller: Option<JoinHandle<Session>>,
}

impl RunHandle {
    /// A receiver for published snapshots
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Snapshot {
        *self.snapshots.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.controller.as_ref().is_none_or(|c| c.is_finished())
    }

    /// Abort the run (back to the menu) and hand the session back
    pub async fn abort(self) -> Result<Session, JoinError> {
        // The controller may already be gone if the run just ended
        let _ = self.events.send(RunEvent::Abort).await;
        self.finished().await
    }

    /// Wait for the run to end on its own
    pub async fn finished(mut self) -> Result<Session, JoinError> {
        match self.controller.take() {
            Some(controller) => controller.await,
            None => unreachable!("controller is only taken by consuming methods"),
        }
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}

/// Drive an already-started session on the current tokio runtime
pub fn spawn_run(
    session: Session,
    world: Arc<WorldModel>,
    input: Arc<InputSampler>,
    config: RunConfig,
) -> RunHandle {
    input.release_all();

    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::capture(&session, None));
    let (stop_tx, _) = watch::channel(false);
    let stop_tx = Arc::new(stop_tx);

    if session.is_playing() {
        tokio::spawn(ticker(
            config.frame_interval,
            RunEvent::Frame,
            event_tx.clone(),
            stop_tx.subscribe(),
        ));
        if session.has_countdown() {
            tokio::spawn(ticker(
                config.countdown_interval,
                RunEvent::Second,
                event_tx.clone(),
                stop_tx.subscribe(),
            ));
        }
    }

    let controller = tokio::spawn(controller_task(
        session,
        world,
        input,
        event_rx,
        snapshot_tx,
        Arc::clone(&stop_tx),
    ));

    RunHandle {
        snapshots: snapshot_rx,
        events: event_tx,
        stop: stop_tx,
        controller: Some(controller),
    }
}

/// Emit `event` every `period`, starting one period from now
async fn ticker(
    period: Duration,
    event: RunEvent,
    events: mpsc::Sender<RunEvent>,
    mut stop: watch::Receiver<bool>,
) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            // Err means the run is gone entirely
            _ = stop.changed() => break,
            _ = interval.tick() => {
                if *stop.borrow() || events.send(event).await.is_err() {
                    break;
                }
            }
        }
    }
    log::debug!("{event:?} ticker stopped");
}

async fn controller_task(
    mut session: Session,
    world: Arc<WorldModel>,
    input: Arc<InputSampler>,
    mut events: mpsc::Receiver<RunEvent>,
    snapshots: watch::Sender<Snapshot>,
    stop: Arc<watch::Sender<bool>>,
) -> Session {
    let mut stop_rx = stop.subscribe();

    while session.is_playing() {
        let event = tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        let crash = match event {
            RunEvent::Frame => session.advance_frame(&input.snapshot(), &world),
            RunEvent::Second => {
                session.countdown_second();
                None
            }
            RunEvent::Abort => {
                session.abort();
                None
            }
        };
        snapshots.send_replace(Snapshot::capture(&session, crash));
    }

    let _ = stop.send(true);
    log::info!(
        "Run driver stopped on {:?} after {} frames",
        session.screen(),
        session.frame()
    );
    session
}
