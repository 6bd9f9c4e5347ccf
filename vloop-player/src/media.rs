//! Media engine boundary
//!
//! The loop scheduler never decodes or renders video itself. It drives an
//! opaque, host-supplied media engine through the two traits in this module:
//! one player per slot, one item handle per loaded clip. Item loading is
//! asynchronous: the engine buffers in the background and publishes status
//! transitions on a watch channel, which the scheduler observes through a
//! readiness watcher.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;

/// Opaque clip locator (local file path or remote URL)
///
/// The core passes it unchanged to the media player and never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipSource(String);

impl ClipSource {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClipSource {
    fn from(locator: &str) -> Self {
        Self(locator.to_string())
    }
}

impl From<String> for ClipSource {
    fn from(locator: String) -> Self {
        Self(locator)
    }
}

impl fmt::Display for ClipSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Loading status of a media item
///
/// A freshly loaded item starts in `Loading` and settles exactly once into
/// `Ready` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// Buffering/probing in progress
    Loading,
    /// Metadata and buffering are sufficient to begin playback without stall
    Ready,
    /// The engine could not prepare the item
    Failed,
}

/// Handle to one loaded clip inside a media player
pub trait MediaItem: Send + 'static {
    /// Current loading status
    fn status(&self) -> ItemStatus;

    /// Measured clip duration
    ///
    /// Available once the item is `Ready`; `None` before that.
    fn duration(&self) -> Option<Duration>;

    /// Subscribe to status transitions for this item
    fn status_changes(&self) -> watch::Receiver<ItemStatus>;
}

/// One platform media player instance (one per player slot)
pub trait MediaPlayer: Send + 'static {
    type Item: MediaItem;

    /// Replace the player's current item and begin loading `source`
    /// asynchronously. The previous item, if any, is discarded.
    fn load(&mut self, source: &ClipSource) -> Self::Item;

    /// Begin playback of the currently loaded item.
    ///
    /// Callers are responsible for only playing items that are ready.
    fn play(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_source_round_trip() {
        let source = ClipSource::new("/media/flames.mov");
        assert_eq!(source.as_str(), "/media/flames.mov");
        assert_eq!(source.to_string(), "/media/flames.mov");
        assert_eq!(ClipSource::from("/media/flames.mov"), source);
    }
}
