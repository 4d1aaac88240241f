use crate::common::Harness;
use crate::common::fixtures::{guild, page_url, stream_url, track};
use crate::common::mocks::{Gate, ScriptedResolver};
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use std::time::Duration;
use tunequeue::commands::music::utils::music_manager::MusicError;
use tunequeue::commands::music::utils::player::{
    EnqueueOutcome, IDLE_TOPIC, Notice, PlayOutcome, PlaybackCompletion, StartResult,
};
use tunequeue::commands::music::utils::queue_manager::PlaybackState;

fn now_playing(title: &str) -> Notice {
    Notice::NowPlaying {
        title: title.to_string(),
        requester: "listener".to_string(),
        duration: Some(Duration::from_secs(180)),
        url: Some(page_url(title)),
    }
}

fn started(query: &str, result: StartResult) -> PlayOutcome {
    PlayOutcome::Started {
        track: track(query),
        result,
    }
}

#[tokio::test]
async fn test_three_tracks_play_in_request_order() {
    let mut h = Harness::new(ScriptedResolver::default());

    assert_eq!(
        h.player.enqueue_and_maybe_start(guild(), track("A")).await,
        started("A", StartResult::Playing)
    );
    assert_eq!(
        h.player.enqueue_and_maybe_start(guild(), track("B")).await,
        PlayOutcome::Queued { position: 1 }
    );
    assert_eq!(
        h.player.enqueue_and_maybe_start(guild(), track("C")).await,
        PlayOutcome::Queued { position: 2 }
    );
    assert_eq!(h.driver.started_urls(), vec![stream_url("A")]);

    h.driver.finish(0, None);
    h.pump().await;
    assert_eq!(h.driver.started_urls(), vec![stream_url("A"), stream_url("B")]);

    h.driver.finish(1, None);
    h.pump().await;
    h.driver.finish(2, None);
    h.pump().await;

    assert_eq!(h.resolver.calls(), vec!["A", "B", "C"]);
    assert_eq!(h.player.state(guild()).await, PlaybackState::Idle);
    assert_eq!(
        h.notifier.notices(),
        vec![
            now_playing("A"),
            now_playing("B"),
            now_playing("C"),
            Notice::QueueEmpty
        ]
    );
    assert_eq!(h.notifier.topics().last().map(String::as_str), Some(IDLE_TOPIC));
}

#[tokio::test]
async fn test_topic_follows_current_track() {
    let mut h = Harness::new(ScriptedResolver::default());

    h.player.enqueue_and_maybe_start(guild(), track("Around the World")).await;
    assert_eq!(h.notifier.topics(), vec!["🎵 Now Playing: Around the World"]);

    h.driver.finish(0, None);
    h.pump().await;
    assert_eq!(
        h.notifier.topics(),
        vec!["🎵 Now Playing: Around the World", IDLE_TOPIC]
    );
}

#[tokio::test]
async fn test_stream_error_still_advances() {
    let mut h = Harness::new(ScriptedResolver::default());
    h.player.enqueue_and_maybe_start(guild(), track("A")).await;
    h.player.enqueue_and_maybe_start(guild(), track("B")).await;

    assert!(h.driver.finish(0, Some("connection reset")));
    h.pump().await;

    assert_eq!(h.driver.started_urls(), vec![stream_url("A"), stream_url("B")]);
    assert_eq!(h.player.state(guild()).await, PlaybackState::Playing);
}

#[tokio::test]
async fn test_failed_lookup_on_idle_guild_reports_and_goes_idle() {
    let h = Harness::new(ScriptedResolver::default().failing_on("nothing matches", "no results"));

    let outcome = h
        .player
        .enqueue_and_maybe_start(guild(), track("nothing matches"))
        .await;

    assert_eq!(outcome, started("nothing matches", StartResult::Failed));
    assert_eq!(h.player.state(guild()).await, PlaybackState::Idle);
    assert!(h.driver.started_urls().is_empty());
    assert_matches!(
        h.notifier.notices().as_slice(),
        [Notice::ResolutionFailed { title, reason }]
            if title == "nothing matches" && reason.contains("no results")
    );
}

#[tokio::test]
async fn test_failed_lookup_mid_queue_leaves_rest_pending() {
    let mut h = Harness::new(ScriptedResolver::default().failing_on("B", "video unavailable"));
    h.player.enqueue_and_maybe_start(guild(), track("A")).await;
    h.player.enqueue_and_maybe_start(guild(), track("B")).await;
    h.player.enqueue_and_maybe_start(guild(), track("C")).await;

    h.driver.finish(0, None);
    h.pump().await;

    assert_eq!(h.player.state(guild()).await, PlaybackState::Idle);
    assert_eq!(h.driver.started_urls(), vec![stream_url("A")]);
    let view = h.player.queue_view(guild()).await;
    assert_eq!(view.upcoming, vec![track("C")]);

    // The next request picks the loop back up, oldest pending first
    let outcome = h.player.enqueue_and_maybe_start(guild(), track("D")).await;
    assert_eq!(outcome, started("C", StartResult::Playing));
    assert_eq!(h.driver.started_urls(), vec![stream_url("A"), stream_url("C")]);
    assert_eq!(h.player.queue_view(guild()).await.upcoming, vec![track("D")]);
}

#[tokio::test]
async fn test_driver_failure_is_reported_as_playback_failure() {
    let h = Harness::new(ScriptedResolver::default());
    h.driver.fail_on(stream_url("A"));

    h.player.enqueue_and_maybe_start(guild(), track("A")).await;

    assert_eq!(h.player.state(guild()).await, PlaybackState::Idle);
    assert_matches!(
        h.notifier.notices().as_slice(),
        [Notice::PlaybackFailed { title, .. }] if title == "A"
    );
}

#[tokio::test]
async fn test_skip_plays_next_track() {
    let mut h = Harness::new(ScriptedResolver::default());
    h.player.enqueue_and_maybe_start(guild(), track("A")).await;
    h.player.enqueue_and_maybe_start(guild(), track("B")).await;

    h.player.skip(guild()).await.unwrap();
    h.pump().await;

    assert_eq!(h.driver.stop_count(), 1);
    assert_eq!(h.driver.started_urls(), vec![stream_url("A"), stream_url("B")]);
    assert_eq!(
        h.player.queue_view(guild()).await.current,
        Some(track("B"))
    );
}

#[tokio::test]
async fn test_skip_last_track_goes_idle() {
    let mut h = Harness::new(ScriptedResolver::default());
    h.player.enqueue_and_maybe_start(guild(), track("A")).await;

    h.player.skip(guild()).await.unwrap();
    h.pump().await;

    assert_eq!(h.player.state(guild()).await, PlaybackState::Idle);
    assert_eq!(h.notifier.count(&Notice::QueueEmpty), 1);
    assert_matches!(h.player.skip(guild()).await, Err(MusicError::NotPlaying));
}

#[tokio::test]
async fn test_stop_discards_the_halted_tracks_completion() {
    let mut h = Harness::new(ScriptedResolver::default());
    h.player.enqueue_and_maybe_start(guild(), track("A")).await;
    h.player.enqueue_and_maybe_start(guild(), track("B")).await;

    assert!(h.player.stop(guild()).await);
    // The halted stream still reports its end
    h.pump().await;

    assert_eq!(h.player.state(guild()).await, PlaybackState::Idle);
    assert_eq!(h.driver.started_urls(), vec![stream_url("A")]);
    assert!(h.player.queue_view(guild()).await.is_empty());
    assert_eq!(h.notifier.count(&Notice::QueueEmpty), 0);
    assert_eq!(h.notifier.topics().last().map(String::as_str), Some(IDLE_TOPIC));
}

#[tokio::test]
async fn test_play_after_stop_starts_fresh() {
    let mut h = Harness::new(ScriptedResolver::default());
    h.player.enqueue_and_maybe_start(guild(), track("A")).await;
    h.player.stop(guild()).await;
    h.pump().await;

    let outcome = h.player.enqueue_and_maybe_start(guild(), track("Z")).await;

    assert_eq!(outcome, started("Z", StartResult::Playing));
    assert_eq!(h.driver.started_urls(), vec![stream_url("A"), stream_url("Z")]);
}

#[tokio::test]
async fn test_clear_on_idle_guild_is_a_no_op() {
    let mut h = Harness::new(ScriptedResolver::default());

    assert!(!h.player.clear(guild()).await);
    assert_eq!(h.player.state(guild()).await, PlaybackState::Idle);
    assert!(h.no_pending_completions());
}

#[tokio::test]
async fn test_completion_from_older_generation_is_ignored() {
    let mut h = Harness::new(ScriptedResolver::default());
    h.player.enqueue_and_maybe_start(guild(), track("A")).await;
    h.player.enqueue_and_maybe_start(guild(), track("B")).await;
    h.player.enqueue_and_maybe_start(guild(), track("C")).await;
    let first_generation = h.driver.signal(0).generation();

    h.driver.finish(0, None);
    h.pump().await;

    h.player
        .handle_completion(PlaybackCompletion {
            guild_id: guild(),
            generation: first_generation,
            error: None,
        })
        .await;

    assert_eq!(h.driver.started_urls(), vec![stream_url("A"), stream_url("B")]);
    assert_eq!(h.player.queue_view(guild()).await.upcoming, vec![track("C")]);
}

#[tokio::test]
async fn test_signal_delivers_only_first_completion() {
    let mut h = Harness::new(ScriptedResolver::default());
    h.player.enqueue_and_maybe_start(guild(), track("A")).await;
    h.player.enqueue_and_maybe_start(guild(), track("B")).await;

    assert!(h.driver.finish(0, Some("decoder error")));
    assert!(!h.driver.finish(0, None));
    h.pump().await;

    assert!(h.no_pending_completions());
    assert_eq!(h.driver.started_urls().len(), 2);
}

#[tokio::test]
async fn test_stop_during_lookup_drops_the_result() {
    let gate = Gate::default();
    let h = Harness::new(ScriptedResolver::default().gated_on("slow", gate.clone()));

    let player = h.player.clone();
    let pending =
        tokio::spawn(async move { player.enqueue_and_maybe_start(guild(), track("slow")).await });

    gate.entered.notified().await;
    assert_eq!(h.player.state(guild()).await, PlaybackState::Resolving);
    assert_matches!(h.player.skip(guild()).await, Err(MusicError::NotPlaying));

    h.player.stop(guild()).await;
    gate.release.notify_one();
    assert_eq!(
        pending.await.unwrap(),
        started("slow", StartResult::Superseded)
    );

    assert!(h.driver.started_urls().is_empty());
    assert_eq!(h.player.state(guild()).await, PlaybackState::Idle);
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_requests_during_lookup_are_queued() {
    let gate = Gate::default();
    let h = Harness::new(ScriptedResolver::default().gated_on("slow", gate.clone()));

    let player = h.player.clone();
    let pending =
        tokio::spawn(async move { player.enqueue_and_maybe_start(guild(), track("slow")).await });
    gate.entered.notified().await;

    let outcome = h.player.enqueue_and_maybe_start(guild(), track("next")).await;
    assert_eq!(outcome, PlayOutcome::Queued { position: 1 });

    gate.release.notify_one();
    pending.await.unwrap();

    assert_eq!(h.resolver.calls(), vec!["slow"]);
    assert_eq!(h.driver.started_urls(), vec![stream_url("slow")]);
}

#[tokio::test]
async fn test_queue_view_lists_current_and_upcoming() {
    let h = Harness::new(ScriptedResolver::default());
    for name in ["one", "two", "three"] {
        h.player.enqueue_and_maybe_start(guild(), track(name)).await;
    }

    let view = h.player.queue_view(guild()).await;

    assert_eq!(view.current, Some(track("one")));
    assert_eq!(view.upcoming, vec![track("two"), track("three")]);
    assert_eq!(view.overflow, 0);
}

#[tokio::test]
async fn test_stalled_queue_promotes_oldest_pending_track() {
    let mut h = Harness::new(ScriptedResolver::default().failing_on("B", "video unavailable"));
    h.player.enqueue_and_maybe_start(guild(), track("A")).await;
    h.player.enqueue_and_maybe_start(guild(), track("B")).await;
    h.player.enqueue_and_maybe_start(guild(), track("C")).await;
    h.driver.finish(0, None);
    h.pump().await;

    let EnqueueOutcome::Next(pending) = h.player.enqueue(guild(), track("D")).await else {
        panic!("stalled guild should promote a track");
    };

    assert_eq!(pending.track(), &track("C"));
    assert_eq!(h.player.start(pending).await, StartResult::Playing);
    assert_eq!(h.notifier.notices().last(), Some(&now_playing("C")));
}

#[tokio::test]
async fn test_enqueue_while_busy_only_reports_position() {
    let h = Harness::new(ScriptedResolver::default());
    h.player.enqueue_and_maybe_start(guild(), track("A")).await;

    assert_eq!(
        h.player.enqueue(guild(), track("B")).await,
        EnqueueOutcome::Queued { position: 1 }
    );
    assert_eq!(h.resolver.calls(), vec!["A"]);
}
