//! Player slots
//!
//! Each slot pairs one media player with one display surface and tracks the
//! clip currently loaded into it. Slots have no awareness of each other;
//! which slot is foreground is derived purely from the cursor parity via
//! [`SlotId::foreground_for`].

use crate::media::{ClipSource, ItemStatus, MediaItem, MediaPlayer};
use crate::playback::messages::SchedulerEvent;
use crate::playback::watcher::ReadinessWatcher;
use crate::surface::{DisplaySurface, FillMode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Identity of one of the two player slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotId {
    A,
    B,
}

impl SlotId {
    /// Foreground slot for a given cursor position
    ///
    /// Even cursor → Slot B, odd cursor → Slot A. Readiness routing depends
    /// on this derivation, so it must stay the single source of truth for
    /// slot roles.
    pub fn foreground_for(cursor: usize) -> SlotId {
        if cursor % 2 == 0 {
            SlotId::B
        } else {
            SlotId::A
        }
    }

    /// The sibling slot
    pub fn other(self) -> SlotId {
        match self {
            SlotId::A => SlotId::B,
            SlotId::B => SlotId::A,
        }
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotId::A => write!(f, "A"),
            SlotId::B => write!(f, "B"),
        }
    }
}

/// Readiness of a slot's current load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotReadiness {
    /// Nothing loaded
    Empty,
    /// A load is in flight
    Loading,
    /// Loaded and ready to play
    Ready,
    /// Loaded and playing
    Playing,
    /// The load failed
    Failed,
}

struct LoadedClip<I> {
    index: usize,
    token: Uuid,
    item: I,
    watcher: ReadinessWatcher,
}

/// One media player + display surface pair
pub(crate) struct PlayerSlot<P: MediaPlayer, S: DisplaySurface> {
    id: SlotId,
    player: P,
    surface: Arc<S>,
    loaded: Option<LoadedClip<P::Item>>,
    playing: bool,
}

impl<P: MediaPlayer, S: DisplaySurface> PlayerSlot<P, S> {
    pub fn new(id: SlotId, player: P, surface: Arc<S>) -> Self {
        Self {
            id,
            player,
            surface,
            loaded: None,
            playing: false,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Replace the slot's item with `source` and watch it for readiness
    ///
    /// The previous load's watcher is detached before the item is replaced,
    /// so a stale status change can never be delivered for it. Returns the
    /// fresh load token identifying this load generation.
    pub fn load(
        &mut self,
        index: usize,
        source: &ClipSource,
        signals: &mpsc::UnboundedSender<SchedulerEvent>,
    ) -> Uuid {
        if let Some(previous) = self.loaded.take() {
            previous.watcher.detach();
        }
        self.playing = false;

        let token = Uuid::new_v4();
        let item = self.player.load(source);
        let watcher = ReadinessWatcher::spawn(self.id, token, item.status_changes(), signals.clone());
        debug!(slot = %self.id, clip_index = index, %token, %source, "loading clip");
        self.loaded = Some(LoadedClip {
            index,
            token,
            item,
            watcher,
        });
        token
    }

    /// Drop the current load and its watcher
    pub fn unload(&mut self) {
        if let Some(previous) = self.loaded.take() {
            previous.watcher.detach();
        }
        self.playing = false;
    }

    /// Begin playback of the loaded item (assumed ready)
    pub fn play(&mut self) {
        self.player.play();
        self.playing = true;
    }

    pub fn current_token(&self) -> Option<Uuid> {
        self.loaded.as_ref().map(|l| l.token)
    }

    pub fn clip_index(&self) -> Option<usize> {
        self.loaded.as_ref().map(|l| l.index)
    }

    /// Measured duration of the loaded item, once ready
    pub fn duration(&self) -> Option<Duration> {
        self.loaded.as_ref().and_then(|l| l.item.duration())
    }

    pub fn readiness(&self) -> SlotReadiness {
        match &self.loaded {
            None => SlotReadiness::Empty,
            Some(loaded) => {
                if self.playing {
                    SlotReadiness::Playing
                } else {
                    match loaded.item.status() {
                        ItemStatus::Loading => SlotReadiness::Loading,
                        ItemStatus::Ready => SlotReadiness::Ready,
                        ItemStatus::Failed => SlotReadiness::Failed,
                    }
                }
            }
        }
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    pub fn set_opacity(&self, opacity: f64) {
        self.surface.set_opacity(opacity);
    }

    pub fn bring_to_front(&self) {
        self.surface.bring_to_front();
    }

    pub fn set_fill_mode(&self, mode: FillMode) {
        self.surface.set_fill_mode(mode);
    }
}
