//! Playlist of clip sources
//!
//! An ordered, non-empty clip list owned by the scheduler. The foreground
//! slot is derived from the cursor's parity, so the cursor must change
//! parity on every advance; that only holds when the stored list has even
//! length. An odd-length input (including a single clip) is therefore
//! stored doubled: `[s]` becomes `[s, s]` (the loop cross-fades the clip
//! onto itself) and `[a, b, c]` becomes `[a, b, c, a, b, c]`. Clip indices
//! reported to hosts are always indices into the original input.

use crate::media::ClipSource;

/// Ordered clip sources driving the loop
#[derive(Debug, Clone)]
pub struct Playlist {
    sources: Vec<ClipSource>,
    source_count: usize,
}

impl Playlist {
    /// Build a playlist from the host-supplied sources
    ///
    /// Returns `None` for an empty input. An odd-length input is stored
    /// doubled so the cursor parity alternates on every advance.
    pub fn new(sources: Vec<ClipSource>) -> Option<Self> {
        if sources.is_empty() {
            return None;
        }
        let source_count = sources.len();
        let sources = if sources.len() % 2 == 1 {
            let mut doubled = sources.clone();
            doubled.extend(sources);
            doubled
        } else {
            sources
        };
        Some(Self {
            sources,
            source_count,
        })
    }

    /// Number of stored entries (always even, always ≥ 2)
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of sources the host supplied
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    /// Clip source at the stored `cursor` position (wrapped into range)
    pub fn clip(&self, cursor: usize) -> &ClipSource {
        &self.sources[cursor % self.sources.len()]
    }

    /// Host-facing clip index for a stored cursor position
    pub fn source_index(&self, cursor: usize) -> usize {
        cursor % self.sources.len() % self.source_count
    }

    /// The stored cursor position following `cursor`, modulo the stored
    /// length
    pub fn next_index(&self, cursor: usize) -> usize {
        (cursor + 1) % self.sources.len()
    }
}
