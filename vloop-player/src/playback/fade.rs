//! Cross-fade animation
//!
//! A fade runs as its own task driving both surfaces' opacities on an
//! interval ticker: the incoming surface ramps from its current opacity to
//! 1.0 and the outgoing surface from its current opacity to 0.0, shaped by
//! the configured curves. Progress is computed from elapsed time rather
//! than tick counts, so missed ticks cannot stretch the fade.
//!
//! On uninterrupted completion the task snaps both opacities to their exact
//! targets and reports `FadeFinished`. Cancelling the handle aborts the
//! task mid-ramp: an interrupted fade leaves the outgoing opacity wherever
//! it was and reports nothing.

use crate::fade_curves::FadeCurve;
use crate::playback::messages::SchedulerEvent;
use crate::surface::DisplaySurface;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

pub(crate) struct FadeHandle {
    token: Uuid,
    task: JoinHandle<()>,
}

impl FadeHandle {
    pub fn token(&self) -> Uuid {
        self.token
    }

    /// Interrupt the fade mid-ramp
    pub fn cancel(self) {
        // Drop aborts the task
    }
}

impl Drop for FadeHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a cross-fade between two surfaces
///
/// A zero duration degrades to an immediate cut: the first tick snaps both
/// opacities and completes.
#[allow(clippy::too_many_arguments)]
pub(crate) fn spawn_crossfade<S: DisplaySurface>(
    token: Uuid,
    incoming: Arc<S>,
    outgoing: Arc<S>,
    duration: Duration,
    tick: Duration,
    fade_in_curve: FadeCurve,
    fade_out_curve: FadeCurve,
    signals: mpsc::UnboundedSender<SchedulerEvent>,
) -> FadeHandle {
    let task = tokio::spawn(async move {
        let incoming_start = incoming.opacity();
        let outgoing_start = outgoing.opacity();
        let started = tokio::time::Instant::now();

        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let progress = if duration.is_zero() {
                1.0
            } else {
                (started.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0)
            };
            incoming
                .set_opacity(incoming_start + (1.0 - incoming_start) * fade_in_curve.fade_in(progress));
            outgoing.set_opacity(outgoing_start * fade_out_curve.fade_out(progress));
            if progress >= 1.0 {
                break;
            }
        }

        // Exact end states, reached only when the fade was not interrupted
        incoming.set_opacity(1.0);
        outgoing.set_opacity(0.0);
        let _ = signals.send(SchedulerEvent::FadeFinished { token });
    });

    FadeHandle { token, task }
}
