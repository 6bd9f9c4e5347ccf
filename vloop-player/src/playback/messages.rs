//! Internal scheduler messages
//!
//! These types are private plumbing between the public `LoopPlayer` handle,
//! the helper tasks (watchers, fades, advance timers), and the scheduler
//! task. They are never broadcast; the public event surface is
//! `crate::events::LoopEvent`.

use crate::media::ClipSource;
use crate::playback::slot::SlotId;
use crate::playback::state::PlayerStatus;
use crate::surface::FillMode;
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Signals delivered to the scheduler by its helper tasks
#[derive(Debug)]
pub(crate) enum SchedulerEvent {
    /// A watched load reached ready-to-play
    ClipReady { slot: SlotId, token: Uuid },

    /// A watched load failed
    ClipFailed { slot: SlotId, token: Uuid },

    /// The play-duration timer expired; time to load the next clip
    AdvanceDue { epoch: u64 },

    /// A cross-fade ran to completion uninterrupted
    FadeFinished { token: Uuid },
}

/// Commands sent from the `LoopPlayer` handle
#[derive(Debug)]
pub(crate) enum Command {
    /// Replace the playlist (empty input is ignored)
    Configure(Vec<ClipSource>),

    /// Start looping playback (no-op without a playlist)
    Begin,

    /// Apply a scaling mode to both surfaces
    SetFillMode(FillMode),

    /// Fade duration for subsequent transitions
    SetFadeDuration(Duration),

    /// Snapshot the scheduler state
    Query(oneshot::Sender<PlayerStatus>),

    /// Tear the player down
    Shutdown,
}
