//! Fade curve implementations for cross-fading
//!
//! Provides the opacity ramp shapes used when cross-fading between the two
//! player slots. A fade-in curve maps normalized fade progress to the
//! incoming surface's opacity multiplier; a fade-out curve does the same for
//! the outgoing surface.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Fade curve types for cross-fading
///
/// Each curve type produces a different perceptual quality:
/// - Linear: constant rate of change (precise, predictable)
/// - Exponential: slow start, fast finish
/// - Logarithmic: fast start, slow finish
/// - SCurve: smooth acceleration and deceleration (ease-in-out)
/// - EqualPower: constant perceived brightness across the overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// Linear: v(t) = t
    Linear,

    /// Exponential: v(t) = t²
    Exponential,

    /// Logarithmic: v(t) = (1-t)² when fading out, sqrt(t) when fading in
    Logarithmic,

    /// S-Curve: v(t) = 0.5 × (1 - cos(π × t))
    SCurve,

    /// Equal-Power: v(t) = sin(t × π/2)
    EqualPower,
}

impl FadeCurve {
    /// Opacity multiplier for the incoming surface at the given position
    ///
    /// # Arguments
    /// * `position` - Normalized position through the fade (0.0 to 1.0)
    ///
    /// # Returns
    /// Opacity multiplier (0.0 = invisible, 1.0 = fully visible)
    pub fn fade_in(&self, position: f64) -> f64 {
        let t = position.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => t,
            FadeCurve::Exponential => t * t,
            FadeCurve::Logarithmic => t.sqrt(),
            FadeCurve::SCurve => 0.5 * (1.0 - (std::f64::consts::PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).sin(),
        }
    }

    /// Opacity multiplier for the outgoing surface at the given position
    ///
    /// # Arguments
    /// * `position` - Normalized position through the fade (0.0 to 1.0)
    ///
    /// # Returns
    /// Opacity multiplier (1.0 = fully visible, 0.0 = invisible)
    pub fn fade_out(&self, position: f64) -> f64 {
        let t = position.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => 1.0 - t,
            FadeCurve::Exponential => {
                let inv = 1.0 - t;
                inv * inv
            }
            FadeCurve::Logarithmic => {
                let inv = 1.0 - t;
                inv * inv
            }
            FadeCurve::SCurve => 0.5 * (1.0 + (std::f64::consts::PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).cos(),
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "Linear",
            FadeCurve::Exponential => "Exponential",
            FadeCurve::Logarithmic => "Logarithmic",
            FadeCurve::SCurve => "S-Curve",
            FadeCurve::EqualPower => "Equal Power",
        }
    }

    /// Get all available fade curve variants
    pub fn all_variants() -> &'static [FadeCurve] {
        &[
            FadeCurve::Linear,
            FadeCurve::Exponential,
            FadeCurve::Logarithmic,
            FadeCurve::SCurve,
            FadeCurve::EqualPower,
        ]
    }
}

impl Default for FadeCurve {
    /// Default curve is SCurve, matching the ease-in-out animation of the
    /// platform view animators this component typically sits in front of.
    fn default() -> Self {
        FadeCurve::SCurve
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
