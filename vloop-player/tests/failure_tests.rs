//! Failure handling and teardown tests
//!
//! With `skip_failed_clips` disabled a failed load stalls the loop on the
//! current frame; the default configuration instead skips the bad clip and
//! only stalls once every source has failed in a row. Teardown must leave
//! no live watchers or timers behind.

mod helpers;

use helpers::{harness, test_config, wait_for};
use std::time::Duration;
use tokio::time::sleep;
use vloop_player::events::LoopEvent;
use vloop_player::{ClipSource, PlaybackPhase, PlayerConfig, SlotId};

#[tokio::test(start_paused = true)]
async fn failed_clip_is_skipped() {
    let mut h = harness(test_config());
    let mut rx = h.player.subscribe();
    h.player
        .configure(vec!["x".into(), "y".into(), "z".into(), "w".into()])
        .unwrap();
    h.player.begin_playback().unwrap();

    let first = h.ctrl_b.next_load().await;
    let _preload = h.ctrl_a.next_load().await;
    first.ready(Duration::from_secs(10));
    wait_for(&mut rx, |e| matches!(e, LoopEvent::TransitionStarted { .. })).await;

    // The deferred advance reloads clip 1 into slot A; it fails
    let reload = h.ctrl_a.next_load().await;
    assert_eq!(reload.source().as_str(), "y");
    reload.fail();

    match wait_for(&mut rx, |e| matches!(e, LoopEvent::ClipLoadFailed { .. })).await {
        LoopEvent::ClipLoadFailed { slot, clip_index, .. } => {
            assert_eq!(slot, SlotId::A);
            assert_eq!(clip_index, 1);
        }
        _ => unreachable!(),
    }
    match wait_for(&mut rx, |e| matches!(e, LoopEvent::ClipSkipped { .. })).await {
        LoopEvent::ClipSkipped { clip_index, .. } => assert_eq!(clip_index, 1),
        _ => unreachable!(),
    }

    // The cursor moved past the bad clip; clip 2 loads immediately
    let skipped_to = h.ctrl_b.next_load().await;
    assert_eq!(skipped_to.source().as_str(), "z");
    skipped_to.ready(Duration::from_secs(10));
    match wait_for(&mut rx, |e| matches!(e, LoopEvent::TransitionStarted { .. })).await {
        LoopEvent::TransitionStarted { to, clip_index, .. } => {
            assert_eq!(to, SlotId::B);
            assert_eq!(clip_index, 2);
        }
        _ => unreachable!(),
    }
}

#[tokio::test(start_paused = true)]
async fn all_clips_failing_stalls_playback() {
    let mut h = harness(test_config());
    let mut rx = h.player.subscribe();
    h.player.configure_single(ClipSource::new("bad")).unwrap();
    h.player.begin_playback().unwrap();

    let first = h.ctrl_b.next_load().await;
    let _preload = h.ctrl_a.next_load().await;

    // First failure: skipped, the single clip is retried in the other slot
    first.fail();
    wait_for(&mut rx, |e| matches!(e, LoopEvent::ClipSkipped { .. })).await;
    let retry = h.ctrl_a.next_load().await;
    assert_eq!(retry.source().as_str(), "bad");

    // Second consecutive failure exhausts the playlist: the loop gives up
    retry.fail();
    match wait_for(&mut rx, |e| matches!(e, LoopEvent::PlaybackStalled { .. })).await {
        LoopEvent::PlaybackStalled {
            consecutive_failures,
            ..
        } => assert_eq!(consecutive_failures, 2),
        _ => unreachable!(),
    }

    sleep(Duration::from_secs(10)).await;
    assert!(h.ctrl_a.try_next_load().is_none());
    assert!(h.ctrl_b.try_next_load().is_none());
    assert_eq!(h.ctrl_a.play_count(), 0);
    assert_eq!(h.ctrl_b.play_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn failure_without_skip_holds_current_frame() {
    let config = PlayerConfig {
        skip_failed_clips: false,
        ..test_config()
    };
    let mut h = harness(config);
    let mut rx = h.player.subscribe();
    h.player
        .configure(vec!["x".into(), "y".into()])
        .unwrap();
    h.player.begin_playback().unwrap();

    let first = h.ctrl_b.next_load().await;
    let _preload = h.ctrl_a.next_load().await;
    first.fail();

    wait_for(&mut rx, |e| matches!(e, LoopEvent::ClipLoadFailed { .. })).await;
    sleep(Duration::from_secs(30)).await;

    // No skip, no retry: the loop holds where it is
    assert!(h.ctrl_a.try_next_load().is_none());
    assert!(h.ctrl_b.try_next_load().is_none());
    let status = h.player.status().await.unwrap();
    assert_eq!(status.phase, PlaybackPhase::Priming);
    assert_eq!(status.cursor, Some(0));
}

#[tokio::test(start_paused = true)]
async fn ready_without_duration_counts_as_failure() {
    let mut h = harness(test_config());
    let mut rx = h.player.subscribe();
    h.player
        .configure(vec!["x".into(), "y".into()])
        .unwrap();
    h.player.begin_playback().unwrap();

    let first = h.ctrl_b.next_load().await;
    let _preload = h.ctrl_a.next_load().await;

    // Ready without a measured duration cannot drive a transition
    first.ready_without_duration();
    match wait_for(&mut rx, |e| matches!(e, LoopEvent::ClipLoadFailed { .. })).await {
        LoopEvent::ClipLoadFailed { slot, clip_index, .. } => {
            assert_eq!(slot, SlotId::B);
            assert_eq!(clip_index, 0);
        }
        _ => unreachable!(),
    }
    wait_for(&mut rx, |e| matches!(e, LoopEvent::ClipSkipped { .. })).await;

    let reload = h.ctrl_a.next_load().await;
    assert_eq!(reload.source().as_str(), "y");
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_timers_and_watchers() {
    let mut h = harness(test_config());
    let mut rx = h.player.subscribe();
    h.player
        .configure(vec!["x".into(), "y".into()])
        .unwrap();
    h.player.begin_playback().unwrap();

    let first = h.ctrl_b.next_load().await;
    let preload = h.ctrl_a.next_load().await;
    first.ready(Duration::from_secs(10));
    wait_for(&mut rx, |e| matches!(e, LoopEvent::TransitionStarted { .. })).await;

    // Tear down mid-fade, well before the 7s advance timer
    h.player.shutdown().await.unwrap();
    wait_for(&mut rx, |e| matches!(e, LoopEvent::Stopped { .. })).await;

    // The advance timer never fires and detached watchers stay silent
    sleep(Duration::from_secs(30)).await;
    preload.ready(Duration::from_secs(8));
    sleep(Duration::from_secs(1)).await;
    assert!(h.ctrl_a.try_next_load().is_none());
    assert!(h.ctrl_b.try_next_load().is_none());
    assert_eq!(h.ctrl_b.play_count(), 1);

    // The event bus closes once the scheduler is gone
    loop {
        match rx.recv().await {
            Ok(_) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            Err(err) => panic!("unexpected recv error: {err:?}"),
        }
    }
}
