//! Loop scheduler
//!
//! Orchestrates the alternating dual-slot playback protocol, indefinitely:
//! prime both slots, wait for the upcoming slot's clip to become ready,
//! cross-fade it to the foreground, and schedule the next load against the
//! clip's measured duration.
//!
//! All cursor, slot, and phase mutation happens inside one scheduler task.
//! Watchers, fade animations, and advance timers are helper tasks that only
//! send [`SchedulerEvent`]s back in; stale or misrouted signals are filtered
//! by slot role and load token, so out-of-order delivery is harmless by
//! construction.

use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::events::{EventBus, LoopEvent};
use crate::fade_curves::FadeCurve;
use crate::media::{ClipSource, MediaPlayer};
use crate::playback::fade::{spawn_crossfade, FadeHandle};
use crate::playback::messages::{Command, SchedulerEvent};
use crate::playback::playlist::Playlist;
use crate::playback::slot::{PlayerSlot, SlotId};
use crate::playback::state::{PlaybackPhase, PlayerStatus};
use crate::surface::{DisplaySurface, FillMode};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Fixed safety margin subtracted from each clip's play duration, so the
/// cross-fade completes before or as the clip runs out.
const TRANSITION_SAFETY_MARGIN: Duration = Duration::from_secs(1);

/// Floor for the advance delay when a clip is shorter than the fade plus
/// the safety margin. Keeps the timer strictly positive and non-reentrant.
const MIN_ADVANCE_DELAY: Duration = Duration::from_millis(100);

/// Event buffer per subscriber
const EVENT_CAPACITY: usize = 256;

/// Delay before the next clip load is scheduled:
/// `max(duration − fade − 1s, 100ms)`.
fn play_duration(clip_duration: Duration, fade_duration: Duration) -> Duration {
    clip_duration
        .saturating_sub(fade_duration)
        .saturating_sub(TRANSITION_SAFETY_MARGIN)
        .max(MIN_ADVANCE_DELAY)
}

/// Handle to a running looping player
///
/// Construction spawns the scheduler task; the handle is a thin command
/// sender. Control methods are fire-and-forget, matching the silent no-op
/// contract of the underlying protocol; they only error once the player is
/// shut down.
pub struct LoopPlayer {
    commands: mpsc::UnboundedSender<Command>,
    events: EventBus,
    task: JoinHandle<()>,
}

impl LoopPlayer {
    /// Create a player from two media player + surface pairs
    ///
    /// Both surfaces are hidden (opacity 0) and set to the configured fill
    /// mode immediately. Must be called from within a tokio runtime.
    pub fn new<P, S>(
        player_a: P,
        surface_a: Arc<S>,
        player_b: P,
        surface_b: Arc<S>,
        config: PlayerConfig,
    ) -> Result<Self>
    where
        P: MediaPlayer,
        S: DisplaySurface,
    {
        config.validate()?;

        let events = EventBus::new(EVENT_CAPACITY);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();

        let scheduler = LoopScheduler {
            slot_a: PlayerSlot::new(SlotId::A, player_a, surface_a),
            slot_b: PlayerSlot::new(SlotId::B, player_b, surface_b),
            playlist: None,
            cursor: None,
            phase: PlaybackPhase::Idle,
            fade_duration: config.fade_duration(),
            fade_in_curve: config.fade_in_curve,
            fade_out_curve: config.fade_out_curve,
            fill_mode: config.fill_mode,
            tick: config.tick_interval(),
            skip_failed: config.skip_failed_clips,
            events: events.clone(),
            signals: signals_tx,
            fade: None,
            advance_timer: None,
            timer_epoch: 0,
            consecutive_failures: 0,
        };
        let task = tokio::spawn(scheduler.run(commands_rx, signals_rx));

        Ok(Self {
            commands: commands_tx,
            events,
            task,
        })
    }

    /// Replace the playlist
    ///
    /// An empty list is silently ignored (logged, no state change); the
    /// loop simply never starts. A single source loops onto itself.
    pub fn configure(&self, sources: Vec<ClipSource>) -> Result<()> {
        self.send(Command::Configure(sources))
    }

    /// Configure a single clip to loop onto itself
    pub fn configure_single(&self, source: ClipSource) -> Result<()> {
        self.configure(vec![source])
    }

    /// Start looping playback
    ///
    /// Silently does nothing when no playlist has been configured.
    pub fn begin_playback(&self) -> Result<()> {
        self.send(Command::Begin)
    }

    /// Apply a scaling mode to both display surfaces
    pub fn set_fill_mode(&self, mode: FillMode) -> Result<()> {
        self.send(Command::SetFillMode(mode))
    }

    /// Change the cross-fade duration for subsequent transitions
    pub fn set_fade_duration(&self, duration: Duration) -> Result<()> {
        self.send(Command::SetFadeDuration(duration))
    }

    /// Snapshot the scheduler state
    pub async fn status(&self) -> Result<PlayerStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Query(reply_tx))?;
        reply_rx
            .await
            .map_err(|_| Error::Shutdown("scheduler exited before replying".to_string()))
    }

    /// Subscribe to playback events
    pub fn subscribe(&self) -> broadcast::Receiver<LoopEvent> {
        self.events.subscribe()
    }

    /// Tear the player down, cancelling all pending timers, fades, and
    /// readiness watchers
    pub async fn shutdown(self) -> Result<()> {
        // Ignore a send failure: the task may already be gone
        let _ = self.commands.send(Command::Shutdown);
        self.task
            .await
            .map_err(|e| Error::Shutdown(format!("scheduler task panicked: {e}")))
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::Shutdown("scheduler task is not running".to_string()))
    }
}

/// Scheduler internals; owned entirely by the scheduler task
struct LoopScheduler<P: MediaPlayer, S: DisplaySurface> {
    slot_a: PlayerSlot<P, S>,
    slot_b: PlayerSlot<P, S>,
    playlist: Option<Playlist>,
    cursor: Option<usize>,
    phase: PlaybackPhase,
    fade_duration: Duration,
    fade_in_curve: FadeCurve,
    fade_out_curve: FadeCurve,
    fill_mode: FillMode,
    tick: Duration,
    skip_failed: bool,
    events: EventBus,
    signals: mpsc::UnboundedSender<SchedulerEvent>,
    fade: Option<FadeHandle>,
    advance_timer: Option<JoinHandle<()>>,
    timer_epoch: u64,
    consecutive_failures: u32,
}

impl<P: MediaPlayer, S: DisplaySurface> LoopScheduler<P, S> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut signals: mpsc::UnboundedReceiver<SchedulerEvent>,
    ) {
        // Both surfaces start hidden; the first transition fades one in.
        self.slot_a.set_opacity(0.0);
        self.slot_b.set_opacity(0.0);
        self.slot_a.set_fill_mode(self.fill_mode);
        self.slot_b.set_fill_mode(self.fill_mode);

        loop {
            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }
                Some(signal) = signals.recv() => self.handle_signal(signal),
            }
        }

        self.teardown();
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Configure(sources) => self.on_configure(sources),
            Command::Begin => self.on_begin(),
            Command::SetFillMode(mode) => {
                self.fill_mode = mode;
                self.slot_a.set_fill_mode(mode);
                self.slot_b.set_fill_mode(mode);
            }
            Command::SetFadeDuration(duration) => {
                debug!(fade_secs = duration.as_secs_f64(), "fade duration updated");
                self.fade_duration = duration;
            }
            Command::Query(reply) => {
                let _ = reply.send(self.status());
            }
            Command::Shutdown => unreachable!("handled in run loop"),
        }
    }

    fn handle_signal(&mut self, signal: SchedulerEvent) {
        match signal {
            SchedulerEvent::ClipReady { slot, token } => self.on_clip_ready(slot, token),
            SchedulerEvent::ClipFailed { slot, token } => self.on_clip_failed(slot, token),
            SchedulerEvent::AdvanceDue { epoch } => self.on_advance_due(epoch),
            SchedulerEvent::FadeFinished { token } => self.on_fade_finished(token),
        }
    }

    fn on_configure(&mut self, sources: Vec<ClipSource>) {
        let Some(playlist) = Playlist::new(sources) else {
            // Deliberate quirk: an empty list is not an error the caller
            // sees, it just never starts anything.
            warn!("ignoring empty clip list");
            return;
        };

        self.reset_runtime();
        self.cursor = None;
        self.phase = PlaybackPhase::Idle;
        info!(
            clips = playlist.source_count(),
            "playlist configured; awaiting begin_playback"
        );
        self.events.emit(LoopEvent::PlaylistConfigured {
            clip_count: playlist.source_count(),
            timestamp: Utc::now(),
        });
        self.playlist = Some(playlist);
    }

    fn on_begin(&mut self) {
        let (first, second, second_index, clip_count) = match self.playlist.as_ref() {
            Some(playlist) => (
                playlist.clip(0).clone(),
                playlist.clip(1).clone(),
                playlist.source_index(1),
                playlist.source_count(),
            ),
            None => {
                warn!("begin_playback called without a configured clip list; nothing to play");
                return;
            }
        };

        self.reset_runtime();
        self.cursor = Some(0);
        self.phase = PlaybackPhase::Priming;

        // Prime the slot that will be foreground with clip 0 and its
        // sibling with clip 1; each load gets a fresh readiness watcher.
        let signals = self.signals.clone();
        let foreground = SlotId::foreground_for(0);
        self.slot_mut(foreground).load(0, &first, &signals);
        self.slot_mut(foreground.other())
            .load(second_index, &second, &signals);

        info!(clips = clip_count, "beginning looping playback");
        self.events.emit(LoopEvent::PlaybackStarted {
            clip_count,
            timestamp: Utc::now(),
        });
    }

    fn on_clip_ready(&mut self, slot_id: SlotId, token: Uuid) {
        if !self.signal_actionable(slot_id, token, "readiness") {
            return;
        }
        let Some(clip_duration) = self.slot(slot_id).duration() else {
            warn!(
                slot = %slot_id,
                "clip reported ready without a measured duration; treating as a failed load"
            );
            self.handle_load_failure(slot_id);
            return;
        };
        self.consecutive_failures = 0;
        self.start_transition(slot_id, clip_duration);
    }

    fn on_clip_failed(&mut self, slot_id: SlotId, token: Uuid) {
        if !self.signal_actionable(slot_id, token, "load failure") {
            return;
        }
        self.handle_load_failure(slot_id);
    }

    /// A signal is actionable only for the slot the cursor parity expects
    /// to become (or stay) foreground, and only for that slot's current
    /// load generation. Everything else is a stray or stale callback.
    fn signal_actionable(&self, slot_id: SlotId, token: Uuid, what: &str) -> bool {
        let Some(cursor) = self.cursor else {
            debug!(slot = %slot_id, "ignoring {what} signal with no active playback");
            return false;
        };
        let expected = SlotId::foreground_for(cursor);
        if slot_id != expected {
            debug!(
                slot = %slot_id,
                expected = %expected,
                "ignoring {what} signal for slot outside the expected role"
            );
            return false;
        }
        if self.slot(slot_id).current_token() != Some(token) {
            debug!(slot = %slot_id, %token, "ignoring stale {what} signal for a superseded load");
            return false;
        }
        true
    }

    /// Bring the ready slot to the foreground: play it, cross-fade it in,
    /// and schedule the deferred next-clip load against the measured
    /// duration.
    fn start_transition(&mut self, to: SlotId, clip_duration: Duration) {
        let from = to.other();
        let clip_index = self.slot(to).clip_index().unwrap_or(0);
        let advance_after = play_duration(clip_duration, self.fade_duration);

        info!(
            to = %to,
            clip_index,
            clip_secs = clip_duration.as_secs_f64(),
            fade_secs = self.fade_duration.as_secs_f64(),
            play_secs = advance_after.as_secs_f64(),
            "clip ready; starting cross-fade"
        );

        self.slot(to).bring_to_front();
        self.slot_mut(to).play();

        // An unfinished previous fade counts as interrupted: it is aborted
        // without snapping its outgoing surface.
        if let Some(previous) = self.fade.take() {
            previous.cancel();
        }
        let fade_token = Uuid::new_v4();
        let incoming = Arc::clone(self.slot(to).surface());
        let outgoing = Arc::clone(self.slot(from).surface());
        self.fade = Some(spawn_crossfade(
            fade_token,
            incoming,
            outgoing,
            self.fade_duration,
            self.tick,
            self.fade_in_curve,
            self.fade_out_curve,
            self.signals.clone(),
        ));

        self.phase = PlaybackPhase::Transitioning { from, to };
        self.events.emit(LoopEvent::TransitionStarted {
            from,
            to,
            clip_index,
            fade_ms: self.fade_duration.as_millis() as u64,
            timestamp: Utc::now(),
        });

        self.schedule_advance(advance_after);
    }

    fn on_fade_finished(&mut self, token: Uuid) {
        if self.fade.as_ref().map(FadeHandle::token) != Some(token) {
            debug!(%token, "ignoring completion of a superseded fade");
            return;
        }
        self.fade = None;
        if let PlaybackPhase::Transitioning { to, .. } = self.phase {
            self.phase = PlaybackPhase::Playing { foreground: to };
            let clip_index = self.slot(to).clip_index().unwrap_or(0);
            debug!(foreground = %to, clip_index, "cross-fade completed");
            self.events.emit(LoopEvent::TransitionCompleted {
                foreground: to,
                clip_index,
                timestamp: Utc::now(),
            });
        }
    }

    fn on_advance_due(&mut self, epoch: u64) {
        if epoch != self.timer_epoch {
            debug!(epoch, current = self.timer_epoch, "ignoring expired stale advance timer");
            return;
        }
        self.advance_timer = None;
        self.advance_to_next_clip();
    }

    /// Advance the cursor and (re)load the upcoming clip into the slot its
    /// parity selects, which is the slot that is not currently visible.
    /// Its old watcher is detached by the reload.
    fn advance_to_next_clip(&mut self) {
        let Some((next, clip_index, source)) = self.cursor.and_then(|cursor| {
            self.playlist.as_ref().map(|playlist| {
                let next = playlist.next_index(cursor);
                (next, playlist.source_index(next), playlist.clip(next).clone())
            })
        }) else {
            return;
        };

        self.cursor = Some(next);
        let target = SlotId::foreground_for(next);
        let signals = self.signals.clone();
        self.slot_mut(target).load(clip_index, &source, &signals);

        debug!(slot = %target, clip_index, "advanced cursor; loading next clip");
        self.events.emit(LoopEvent::NextClipLoading {
            slot: target,
            clip_index,
            timestamp: Utc::now(),
        });
    }

    fn handle_load_failure(&mut self, slot_id: SlotId) {
        let clip_index = self.slot(slot_id).clip_index().unwrap_or(0);
        self.events.emit(LoopEvent::ClipLoadFailed {
            slot: slot_id,
            clip_index,
            timestamp: Utc::now(),
        });

        if !self.skip_failed {
            warn!(
                slot = %slot_id,
                clip_index,
                "clip failed to load; playback will hold the current frame"
            );
            return;
        }

        self.consecutive_failures += 1;
        // Give each distinct source one chance (at least one retry for a
        // single-clip loop) before declaring the whole playlist bad
        let failure_limit = self
            .playlist
            .as_ref()
            .map(|p| p.source_count().max(2) as u32)
            .unwrap_or(0);
        if self.consecutive_failures >= failure_limit {
            error!(
                failures = self.consecutive_failures,
                "every clip in the playlist failed to load; giving up"
            );
            self.events.emit(LoopEvent::PlaybackStalled {
                consecutive_failures: self.consecutive_failures,
                timestamp: Utc::now(),
            });
            return;
        }

        warn!(slot = %slot_id, clip_index, "clip failed to load; skipping to the next clip");
        self.events.emit(LoopEvent::ClipSkipped {
            clip_index,
            timestamp: Utc::now(),
        });
        self.advance_to_next_clip();
    }

    fn schedule_advance(&mut self, delay: Duration) {
        self.timer_epoch += 1;
        let epoch = self.timer_epoch;
        if let Some(previous) = self.advance_timer.take() {
            previous.abort();
        }
        let signals = self.signals.clone();
        self.advance_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = signals.send(SchedulerEvent::AdvanceDue { epoch });
        }));
    }

    /// Cancel all in-flight work: fade animation, advance timer, and both
    /// slots' loads with their readiness watchers.
    fn reset_runtime(&mut self) {
        if let Some(fade) = self.fade.take() {
            fade.cancel();
        }
        if let Some(timer) = self.advance_timer.take() {
            timer.abort();
        }
        // An already-expired timer may still have a signal queued
        self.timer_epoch += 1;
        self.slot_a.unload();
        self.slot_b.unload();
        self.consecutive_failures = 0;
    }

    fn teardown(&mut self) {
        debug!("loop scheduler shutting down");
        self.reset_runtime();
        self.cursor = None;
        self.phase = PlaybackPhase::Idle;
        self.events.emit(LoopEvent::Stopped {
            timestamp: Utc::now(),
        });
    }

    fn status(&self) -> PlayerStatus {
        let playlist = self.playlist.as_ref();
        PlayerStatus {
            phase: self.phase,
            cursor: match (self.cursor, playlist) {
                (Some(cursor), Some(playlist)) => Some(playlist.source_index(cursor)),
                _ => None,
            },
            foreground: self.cursor.map(SlotId::foreground_for),
            clip_count: playlist.map(Playlist::source_count).unwrap_or(0),
            slot_a: self.slot_a.readiness(),
            slot_b: self.slot_b.readiness(),
        }
    }

    fn slot(&self, id: SlotId) -> &PlayerSlot<P, S> {
        match id {
            SlotId::A => &self.slot_a,
            SlotId::B => &self.slot_b,
        }
    }

    fn slot_mut(&mut self, id: SlotId) -> &mut PlayerSlot<P, S> {
        match id {
            SlotId::A => &mut self.slot_a,
            SlotId::B => &mut self.slot_b,
        }
    }
}
