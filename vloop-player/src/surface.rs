//! Display surface boundary
//!
//! Each player slot renders into one host-supplied surface. Both surfaces
//! are expected to fully overlap the component's bounds; the scheduler only
//! manipulates opacity, stacking order, and the scaling mode.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the video is scaled within the surface bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Preserve aspect ratio and fill the bounds, cropping as needed
    #[default]
    Fill,
    /// Preserve aspect ratio and fit inside the bounds, letterboxing as needed
    Fit,
    /// Stretch to the bounds, ignoring aspect ratio
    Stretch,
}

impl FromStr for FillMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fill" => Ok(FillMode::Fill),
            "fit" => Ok(FillMode::Fit),
            "stretch" => Ok(FillMode::Stretch),
            other => Err(format!("unknown fill mode: {other}")),
        }
    }
}

impl std::fmt::Display for FillMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillMode::Fill => write!(f, "fill"),
            FillMode::Fit => write!(f, "fit"),
            FillMode::Stretch => write!(f, "stretch"),
        }
    }
}

/// One stacked, rectangle-filling video surface owned by the host view layer
///
/// Implementations must be callable from the scheduler's helper tasks, so
/// all methods take `&self` and the type is shared behind an `Arc`.
pub trait DisplaySurface: Send + Sync + 'static {
    /// Set the surface opacity (0.0 = invisible, 1.0 = fully visible).
    ///
    /// Purely visual; does not affect playback.
    fn set_opacity(&self, opacity: f64);

    /// Current surface opacity
    fn opacity(&self) -> f64;

    /// Raise this surface above its sibling in stacking order
    fn bring_to_front(&self);

    /// Apply a scaling mode to the surface
    fn set_fill_mode(&self, mode: FillMode);
}
