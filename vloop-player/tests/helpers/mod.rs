//! Shared test fixtures: a script-controlled fake media backend and a
//! recording display surface.
//!
//! The fake player hands every `load()` back to the test as a `LoadHandle`,
//! so tests decide exactly when (and whether) each clip becomes ready and
//! what duration it reports. Combined with tokio's paused clock this makes
//! the whole looping protocol deterministic.

// Shared by several test crates; not every crate uses every helper.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use vloop_player::events::LoopEvent;
use vloop_player::media::{ClipSource, ItemStatus, MediaItem, MediaPlayer};
use vloop_player::surface::{DisplaySurface, FillMode};
use vloop_player::{LoopPlayer, PlayerConfig};

/// Media item handle produced by [`FakePlayer`]
pub struct FakeItem {
    status_rx: watch::Receiver<ItemStatus>,
    duration: Arc<Mutex<Option<Duration>>>,
}

impl MediaItem for FakeItem {
    fn status(&self) -> ItemStatus {
        *self.status_rx.borrow()
    }

    fn duration(&self) -> Option<Duration> {
        *self.duration.lock().unwrap()
    }

    fn status_changes(&self) -> watch::Receiver<ItemStatus> {
        self.status_rx.clone()
    }
}

/// Test-side control over one in-flight load
pub struct LoadHandle {
    source: ClipSource,
    status_tx: watch::Sender<ItemStatus>,
    duration: Arc<Mutex<Option<Duration>>>,
}

impl LoadHandle {
    pub fn source(&self) -> &ClipSource {
        &self.source
    }

    /// Mark the load ready with the given measured duration
    pub fn ready(&self, duration: Duration) {
        *self.duration.lock().unwrap() = Some(duration);
        let _ = self.status_tx.send(ItemStatus::Ready);
    }

    /// Mark the load ready while leaving the duration unmeasured
    pub fn ready_without_duration(&self) {
        let _ = self.status_tx.send(ItemStatus::Ready);
    }

    /// Mark the load failed
    pub fn fail(&self) {
        let _ = self.status_tx.send(ItemStatus::Failed);
    }
}

/// Fake media player for one slot
pub struct FakePlayer {
    loads: mpsc::UnboundedSender<LoadHandle>,
    current: Option<ClipSource>,
    plays: Arc<Mutex<Vec<ClipSource>>>,
}

impl MediaPlayer for FakePlayer {
    type Item = FakeItem;

    fn load(&mut self, source: &ClipSource) -> FakeItem {
        let (status_tx, status_rx) = watch::channel(ItemStatus::Loading);
        let duration = Arc::new(Mutex::new(None));
        self.current = Some(source.clone());
        let _ = self.loads.send(LoadHandle {
            source: source.clone(),
            status_tx,
            duration: Arc::clone(&duration),
        });
        FakeItem {
            status_rx,
            duration,
        }
    }

    fn play(&mut self) {
        let source = self.current.clone().expect("play without a loaded item");
        self.plays.lock().unwrap().push(source);
    }
}

/// Test-side view of one slot's fake player
pub struct PlayerControl {
    loads: mpsc::UnboundedReceiver<LoadHandle>,
    plays: Arc<Mutex<Vec<ClipSource>>>,
}

impl PlayerControl {
    /// Wait for the next load issued to this slot
    pub async fn next_load(&mut self) -> LoadHandle {
        self.loads.recv().await.expect("fake player dropped")
    }

    /// Grab an already-issued load, if any
    pub fn try_next_load(&mut self) -> Option<LoadHandle> {
        self.loads.try_recv().ok()
    }

    /// Sources passed to `play()`, in order
    pub fn plays(&self) -> Vec<ClipSource> {
        self.plays.lock().unwrap().clone()
    }

    pub fn play_count(&self) -> usize {
        self.plays.lock().unwrap().len()
    }
}

pub fn fake_player() -> (FakePlayer, PlayerControl) {
    let (loads_tx, loads_rx) = mpsc::unbounded_channel();
    let plays = Arc::new(Mutex::new(Vec::new()));
    (
        FakePlayer {
            loads: loads_tx,
            current: None,
            plays: Arc::clone(&plays),
        },
        PlayerControl {
            loads: loads_rx,
            plays,
        },
    )
}

#[derive(Default)]
struct SurfaceState {
    opacity: f64,
    history: Vec<f64>,
    front_count: usize,
    fill_mode: FillMode,
}

/// Recording display surface
#[derive(Default)]
pub struct FakeSurface {
    state: Mutex<SurfaceState>,
}

impl FakeSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All opacity values set so far, clearing the record
    pub fn take_history(&self) -> Vec<f64> {
        std::mem::take(&mut self.state.lock().unwrap().history)
    }

    pub fn front_count(&self) -> usize {
        self.state.lock().unwrap().front_count
    }

    pub fn fill_mode(&self) -> FillMode {
        self.state.lock().unwrap().fill_mode
    }
}

impl DisplaySurface for FakeSurface {
    fn set_opacity(&self, opacity: f64) {
        let mut state = self.state.lock().unwrap();
        state.opacity = opacity;
        state.history.push(opacity);
    }

    fn opacity(&self) -> f64 {
        self.state.lock().unwrap().opacity
    }

    fn bring_to_front(&self) {
        self.state.lock().unwrap().front_count += 1;
    }

    fn set_fill_mode(&self, mode: FillMode) {
        self.state.lock().unwrap().fill_mode = mode;
    }
}

/// A wired-up player plus the controls for both slots
pub struct Harness {
    pub player: LoopPlayer,
    pub ctrl_a: PlayerControl,
    pub ctrl_b: PlayerControl,
    pub surface_a: Arc<FakeSurface>,
    pub surface_b: Arc<FakeSurface>,
}

pub fn harness(config: PlayerConfig) -> Harness {
    let (player_a, ctrl_a) = fake_player();
    let (player_b, ctrl_b) = fake_player();
    let surface_a = FakeSurface::new();
    let surface_b = FakeSurface::new();
    let player = LoopPlayer::new(
        player_a,
        Arc::clone(&surface_a),
        player_b,
        Arc::clone(&surface_b),
        config,
    )
    .expect("valid config");
    Harness {
        player,
        ctrl_a,
        ctrl_b,
        surface_a,
        surface_b,
    }
}

/// Short fades and a coarse tick keep the virtual-clock tests fast
pub fn test_config() -> PlayerConfig {
    PlayerConfig {
        fade_seconds: 2.0,
        tick_interval_ms: 100,
        ..PlayerConfig::default()
    }
}

/// Receive events until `pred` matches, returning the matching event
pub async fn wait_for<F>(rx: &mut broadcast::Receiver<LoopEvent>, mut pred: F) -> LoopEvent
where
    F: FnMut(&LoopEvent) -> bool,
{
    loop {
        let event = rx.recv().await.expect("event bus closed while waiting");
        if pred(&event) {
            return event;
        }
    }
}
