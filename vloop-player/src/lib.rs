//! # vloop-player
//!
//! Seamless, infinite looping video playback built on two alternating
//! player slots. While one slot plays in the foreground, the other loads
//! the next clip in the background; when the incoming clip is ready and the
//! outgoing clip's remaining time runs out, the slots swap roles under a
//! timed cross-fade, so the viewer perceives one continuous video.
//!
//! **Purpose:** "living background" / ambient loops without visible restart
//! glitches.
//!
//! Decoding and rendering stay with the host: supply one [`media::MediaPlayer`]
//! and one [`surface::DisplaySurface`] per slot, configure a clip list, and
//! call [`LoopPlayer::begin_playback`].

pub mod config;
pub mod error;
pub mod events;
pub mod fade_curves;
pub mod media;
pub mod playback;
pub mod surface;

pub use config::PlayerConfig;
pub use error::{Error, Result};
pub use events::{EventBus, LoopEvent};
pub use fade_curves::FadeCurve;
pub use media::{ClipSource, ItemStatus, MediaItem, MediaPlayer};
pub use playback::{LoopPlayer, PlaybackPhase, PlayerStatus, SlotId, SlotReadiness};
pub use surface::{DisplaySurface, FillMode};
