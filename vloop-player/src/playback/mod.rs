//! Loop scheduler and its supporting pieces

pub mod fade;
pub mod messages;
pub mod playlist;
pub mod scheduler;
pub mod slot;
pub mod state;
pub mod watcher;

pub use playlist::Playlist;
pub use scheduler::LoopPlayer;
pub use slot::{SlotId, SlotReadiness};
pub use state::{PlaybackPhase, PlayerStatus};
