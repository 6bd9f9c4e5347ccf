//! Public event system
//!
//! The scheduler broadcasts `LoopEvent`s describing playlist changes, clip
//! transitions, and degraded-mode conditions. Hosts subscribe through
//! `LoopPlayer::subscribe()`; missing a subscription never blocks playback.
//!
//! Internal scheduler signals (readiness, timer expiry, fade completion) are
//! a separate mpsc type in `playback::messages` and are never broadcast.

use crate::playback::slot::SlotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Events broadcast to host subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoopEvent {
    /// A new playlist was accepted
    PlaylistConfigured {
        /// Number of distinct clip sources supplied by the host
        clip_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Playback was started and both slots began priming
    PlaybackStarted {
        clip_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The idle slot began loading the upcoming clip
    NextClipLoading {
        slot: SlotId,
        clip_index: usize,
        timestamp: DateTime<Utc>,
    },

    /// A cross-fade between the two slots began
    TransitionStarted {
        from: SlotId,
        to: SlotId,
        clip_index: usize,
        fade_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A cross-fade ran to completion uninterrupted
    TransitionCompleted {
        foreground: SlotId,
        clip_index: usize,
        timestamp: DateTime<Utc>,
    },

    /// The media engine reported a failed load for the upcoming clip
    ClipLoadFailed {
        slot: SlotId,
        clip_index: usize,
        timestamp: DateTime<Utc>,
    },

    /// A failed clip was skipped and the cursor advanced past it
    ClipSkipped {
        clip_index: usize,
        timestamp: DateTime<Utc>,
    },

    /// Every clip in the playlist failed to load; the loop is frozen
    PlaybackStalled {
        consecutive_failures: u32,
        timestamp: DateTime<Utc>,
    },

    /// The player was torn down
    Stopped { timestamp: DateTime<Utc> },
}

/// Broadcast bus for `LoopEvent`s
///
/// Thin wrapper over `tokio::sync::broadcast`; slow subscribers lag and drop
/// old events rather than ever blocking the scheduler.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LoopEvent>,
}

impl EventBus {
    /// Create a new bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<LoopEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Events emitted while nobody is subscribed are dropped.
    pub fn emit(&self, event: LoopEvent) {
        if self.tx.send(event).is_err() {
            trace!("no event subscribers; dropping event");
        }
    }
}
