//! Simulated media engine
//!
//! Stands in for a platform media framework: loading a clip buffers for a
//! configurable latency, then reports ready with the catalog's duration for
//! that clip. Clips missing from the catalog fail to load, which exercises
//! the player's skip path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use vloop_player::media::{ClipSource, ItemStatus, MediaItem, MediaPlayer};
use vloop_player::surface::{DisplaySurface, FillMode};

/// Clip duration catalog shared by both simulated players
#[derive(Clone)]
pub struct ClipCatalog {
    durations: Arc<HashMap<String, Duration>>,
    load_latency: Duration,
}

impl ClipCatalog {
    pub fn new(durations: HashMap<String, Duration>, load_latency: Duration) -> Self {
        Self {
            durations: Arc::new(durations),
            load_latency,
        }
    }

    /// Create a player for one slot
    pub fn player(&self, label: &'static str) -> SimPlayer {
        SimPlayer {
            label,
            catalog: self.clone(),
            current: None,
        }
    }
}

/// One simulated media player
pub struct SimPlayer {
    label: &'static str,
    catalog: ClipCatalog,
    current: Option<ClipSource>,
}

impl MediaPlayer for SimPlayer {
    type Item = SimItem;

    fn load(&mut self, source: &ClipSource) -> SimItem {
        let (status_tx, status_rx) = watch::channel(ItemStatus::Loading);
        let duration = self.catalog.durations.get(source.as_str()).copied();
        let latency = self.catalog.load_latency;
        self.current = Some(source.clone());

        let label = self.label;
        let source = source.clone();
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            match duration {
                Some(duration) => {
                    debug!(
                        player = label,
                        %source,
                        secs = duration.as_secs_f64(),
                        "simulated clip buffered"
                    );
                    let _ = status_tx.send(ItemStatus::Ready);
                }
                None => {
                    warn!(player = label, %source, "clip not in catalog; load fails");
                    let _ = status_tx.send(ItemStatus::Failed);
                }
            }
        });

        SimItem {
            status_rx,
            duration,
        }
    }

    fn play(&mut self) {
        if let Some(source) = &self.current {
            info!(player = self.label, %source, "playing clip");
        }
    }
}

/// Simulated media item handle
pub struct SimItem {
    status_rx: watch::Receiver<ItemStatus>,
    duration: Option<Duration>,
}

impl MediaItem for SimItem {
    fn status(&self) -> ItemStatus {
        *self.status_rx.borrow()
    }

    fn duration(&self) -> Option<Duration> {
        match *self.status_rx.borrow() {
            ItemStatus::Ready => self.duration,
            _ => None,
        }
    }

    fn status_changes(&self) -> watch::Receiver<ItemStatus> {
        self.status_rx.clone()
    }
}

/// Logging display surface
///
/// Tracks opacity in an atomic so the fade task can write it without locks.
pub struct SimSurface {
    label: &'static str,
    opacity_bits: AtomicU64,
    fill_mode: Mutex<FillMode>,
}

impl SimSurface {
    pub fn new(label: &'static str) -> Arc<Self> {
        Arc::new(Self {
            label,
            opacity_bits: AtomicU64::new(0.0f64.to_bits()),
            fill_mode: Mutex::new(FillMode::default()),
        })
    }
}

impl DisplaySurface for SimSurface {
    fn set_opacity(&self, opacity: f64) {
        self.opacity_bits.store(opacity.to_bits(), Ordering::Relaxed);
    }

    fn opacity(&self) -> f64 {
        f64::from_bits(self.opacity_bits.load(Ordering::Relaxed))
    }

    fn bring_to_front(&self) {
        debug!(surface = self.label, "raised to front");
    }

    fn set_fill_mode(&self, mode: FillMode) {
        *self.fill_mode.lock().unwrap() = mode;
        debug!(surface = self.label, %mode, "fill mode applied");
    }
}
