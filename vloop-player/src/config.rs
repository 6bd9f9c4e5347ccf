//! Player configuration

use crate::error::{Error, Result};
use crate::fade_curves::FadeCurve;
use crate::surface::FillMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Looping player configuration
///
/// All fields have defaults, so hosts can deserialize a partial TOML/JSON
/// table or start from `PlayerConfig::default()` and override selectively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Cross-fade duration in seconds
    pub fade_seconds: f64,

    /// Opacity curve applied to the incoming slot during a cross-fade
    pub fade_in_curve: FadeCurve,

    /// Opacity curve applied to the outgoing slot during a cross-fade
    pub fade_out_curve: FadeCurve,

    /// Scaling mode applied to both display surfaces
    pub fill_mode: FillMode,

    /// Fade animation tick interval in milliseconds
    pub tick_interval_ms: u64,

    /// Skip clips whose load fails instead of stalling on them
    ///
    /// When disabled, a failed load leaves the loop holding the last good
    /// frame indefinitely.
    pub skip_failed_clips: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            fade_seconds: 5.0,
            fade_in_curve: FadeCurve::default(),
            fade_out_curve: FadeCurve::default(),
            fill_mode: FillMode::default(),
            tick_interval_ms: 16,
            skip_failed_clips: true,
        }
    }
}

impl PlayerConfig {
    /// Cross-fade duration as a `Duration`
    pub fn fade_duration(&self) -> Duration {
        Duration::from_secs_f64(self.fade_seconds.max(0.0))
    }

    /// Fade animation tick interval as a `Duration`
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Validate the configuration before starting a player
    pub fn validate(&self) -> Result<()> {
        if !self.fade_seconds.is_finite() || self.fade_seconds < 0.0 {
            return Err(Error::Config(format!(
                "fade_seconds must be finite and non-negative, got {}",
                self.fade_seconds
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::Config(
                "tick_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
