//! Playback state snapshots

use crate::playback::slot::{SlotId, SlotReadiness};
use serde::Serialize;

/// Phase of the looping protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// No playlist, or playback not started
    Idle,
    /// Both slots are loading their first two clips
    Priming,
    /// One slot is foreground and playing; the other holds the next clip
    Playing { foreground: SlotId },
    /// A cross-fade between the slots is in progress
    Transitioning { from: SlotId, to: SlotId },
}

impl std::fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackPhase::Idle => write!(f, "idle"),
            PlaybackPhase::Priming => write!(f, "priming"),
            PlaybackPhase::Playing { foreground } => write!(f, "playing({foreground})"),
            PlaybackPhase::Transitioning { from, to } => {
                write!(f, "transitioning({from}->{to})")
            }
        }
    }
}

/// Point-in-time snapshot of the scheduler, for hosts and tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStatus {
    pub phase: PlaybackPhase,
    /// Index of the clip driving the foreground slot; absent before playback
    pub cursor: Option<usize>,
    /// Foreground slot derived from the cursor parity
    pub foreground: Option<SlotId>,
    /// Number of distinct sources in the configured playlist (0 when
    /// unconfigured)
    pub clip_count: usize,
    pub slot_a: SlotReadiness,
    pub slot_b: SlotReadiness,
}
