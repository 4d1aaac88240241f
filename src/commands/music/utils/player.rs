//! The playback loop: dequeue, resolve, stream, and advance again when the stream ends.
//!
//! Every transition for a guild happens under that guild's queue lock. The lock
//! is released while the resolver runs, so each attempt carries a generation
//! number that is re-checked before its result is applied. Stream completions
//! come back as [`PlaybackCompletion`] messages on a channel instead of calling
//! into the player from the audio driver's task.

use super::music_manager::{MusicError, MusicResult};
use super::queue_manager::{GuildQueue, PlaybackState, QUEUE_DISPLAY_LIMIT, QueueRegistry, QueueView};
use crate::commands::music::audio_sources::track_metadata::{MediaLocator, ResolvedTrack, TrackRequest};
use serenity::async_trait;
use serenity::model::id::GuildId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub const IDLE_TOPIC: &str = "🎵 No music playing";

/// Turns search text into a stream locator and metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, query: &str) -> MusicResult<ResolvedTrack>;
}

/// Streams audio into a guild's voice connection.
#[async_trait]
pub trait PlaybackDriver: Send + Sync {
    /// Starts streaming `locator`. `on_complete` must be fired once the stream
    /// ends for any reason: natural end, `stop()`, or an error.
    async fn start(
        &self,
        guild_id: GuildId,
        locator: &MediaLocator,
        on_complete: CompletionSignal,
    ) -> MusicResult<Box<dyn PlaybackHandle>>;
}

/// Control over a running stream.
pub trait PlaybackHandle: Send + Sync {
    fn stop(&self) -> MusicResult<()>;
}

/// Messages the player emits for users.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    NowPlaying {
        title: String,
        requester: String,
        duration: Option<Duration>,
        /// Public page of the track, linked from the notice.
        url: Option<String>,
    },
    QueueEmpty,
    ResolutionFailed {
        title: String,
        reason: String,
    },
    PlaybackFailed {
        title: String,
        reason: String,
    },
}

/// Where notices and channel topics go.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, guild_id: GuildId, notice: Notice);

    /// May fail with `MusicError::PermissionDenied`; the player ignores failures.
    async fn set_topic(&self, guild_id: GuildId, topic: &str) -> MusicResult<()>;
}

/// A stream ended. `generation` identifies which playback attempt it belonged to.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackCompletion {
    pub guild_id: GuildId,
    pub generation: u64,
    pub error: Option<String>,
}

/// One-shot completion callback handed to the driver. Clones share the
/// "already fired" flag, so only the first `complete` call is delivered.
#[derive(Clone)]
pub struct CompletionSignal {
    guild_id: GuildId,
    generation: u64,
    fired: Arc<AtomicBool>,
    sender: mpsc::UnboundedSender<PlaybackCompletion>,
}

impl CompletionSignal {
    pub fn new(
        guild_id: GuildId,
        generation: u64,
        sender: mpsc::UnboundedSender<PlaybackCompletion>,
    ) -> Self {
        Self {
            guild_id,
            generation,
            fired: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report the end of the stream. Returns false if this signal already fired.
    pub fn complete(&self, error: Option<String>) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }

        let completion = PlaybackCompletion {
            guild_id: self.guild_id,
            generation: self.generation,
            error,
        };

        if self.sender.send(completion).is_err() {
            warn!(
                "Completion for guild {} dropped: player is gone",
                self.guild_id
            );
        }
        true
    }
}

/// Receiving side of the completion channel, consumed by [`MusicPlayer::run_completions`].
pub type CompletionReceiver = mpsc::UnboundedReceiver<PlaybackCompletion>;

/// What `enqueue` decided under the guild lock
#[derive(Debug, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Something is already playing; the track waits at `position` (1-based).
    Queued { position: usize },
    /// The guild was idle. The oldest pending track was promoted and must be
    /// handed to [`MusicPlayer::start`].
    Next(PendingStart),
}

/// A promoted track that has not been looked up yet.
///
/// The guild stays in `Resolving` until this is passed to [`MusicPlayer::start`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "the guild stays busy until the pending track is started"]
pub struct PendingStart {
    guild_id: GuildId,
    track: TrackRequest,
    generation: u64,
}

impl PendingStart {
    /// The track about to play. Not necessarily the one just requested.
    pub fn track(&self) -> &TrackRequest {
        &self.track
    }
}

/// How a playback attempt ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartResult {
    /// The stream is running.
    Playing,
    /// Lookup or stream start failed; a notice was sent and the guild is idle.
    Failed,
    /// Stop or clear ran before the attempt finished.
    Superseded,
}

/// Result of [`MusicPlayer::enqueue_and_maybe_start`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Queued { position: usize },
    Started { track: TrackRequest, result: StartResult },
}

/// What the next step of the loop is, decided under the guild lock
enum Step {
    Idle,
    Play(PendingStart),
}

pub struct MusicPlayer {
    registry: QueueRegistry,
    resolver: Arc<dyn Resolver>,
    driver: Arc<dyn PlaybackDriver>,
    notifier: Arc<dyn Notifier>,
    completions: mpsc::UnboundedSender<PlaybackCompletion>,
}

impl MusicPlayer {
    /// Creates the player and the receiver its completion signals are delivered to.
    pub fn new(
        resolver: Arc<dyn Resolver>,
        driver: Arc<dyn PlaybackDriver>,
        notifier: Arc<dyn Notifier>,
    ) -> (Self, CompletionReceiver) {
        let (completions, receiver) = mpsc::unbounded_channel();
        let player = Self {
            registry: QueueRegistry::new(),
            resolver,
            driver,
            notifier,
            completions,
        };
        (player, receiver)
    }

    /// Dispatch loop for completion signals. Each completion is handled on its
    /// own task so a slow lookup in one guild does not hold up the others.
    pub async fn run_completions(self: Arc<Self>, mut receiver: CompletionReceiver) {
        info!("Completion dispatcher started");
        while let Some(completion) = receiver.recv().await {
            let player = Arc::clone(&self);
            tokio::spawn(async move {
                player.handle_completion(completion).await;
            });
        }
        info!("Completion dispatcher stopped");
    }

    pub fn registry(&self) -> &QueueRegistry {
        &self.registry
    }

    /// Queue a track. If the guild is idle the oldest pending track is promoted
    /// and returned for [`MusicPlayer::start`].
    pub async fn enqueue(&self, guild_id: GuildId, track: TrackRequest) -> EnqueueOutcome {
        let queue = self.registry.get(guild_id);
        let mut queue = queue.lock().await;
        let position = queue.enqueue(track);

        if queue.is_playing() {
            debug!("Guild {} busy, queued at #{}", guild_id, position);
            return EnqueueOutcome::Queued { position };
        }

        match Self::next_step(guild_id, &mut queue) {
            Step::Play(pending) => EnqueueOutcome::Next(pending),
            // The track was just appended, so the queue cannot be empty here
            Step::Idle => EnqueueOutcome::Queued { position },
        }
    }

    /// Look up and stream a promoted track.
    pub async fn start(&self, pending: PendingStart) -> StartResult {
        {
            let queue = self.registry.get(pending.guild_id);
            let queue = queue.lock().await;
            if queue.generation() != pending.generation {
                debug!(
                    "Attempt {} for guild {} was superseded before lookup",
                    pending.generation, pending.guild_id
                );
                return StartResult::Superseded;
            }
        }

        self.resolve_and_play(pending).await
    }

    /// `enqueue` followed by `start` when the guild was idle.
    pub async fn enqueue_and_maybe_start(
        &self,
        guild_id: GuildId,
        track: TrackRequest,
    ) -> PlayOutcome {
        match self.enqueue(guild_id, track).await {
            EnqueueOutcome::Queued { position } => PlayOutcome::Queued { position },
            EnqueueOutcome::Next(pending) => {
                let track = pending.track().clone();
                let result = self.start(pending).await;
                PlayOutcome::Started { track, result }
            }
        }
    }

    /// Move to the next pending track, or go idle if there is none.
    pub async fn advance(&self, guild_id: GuildId) {
        let step = {
            let queue = self.registry.get(guild_id);
            let mut queue = queue.lock().await;
            Self::next_step(guild_id, &mut queue)
        };

        self.run_step(guild_id, step).await;
    }

    /// Apply a completion signal. Signals from superseded attempts are ignored.
    pub async fn handle_completion(&self, completion: PlaybackCompletion) {
        let PlaybackCompletion {
            guild_id,
            generation,
            error,
        } = completion;

        if let Some(error) = &error {
            warn!("Player error in guild {}: {}", guild_id, error);
        }

        let step = {
            let queue = self.registry.get(guild_id);
            let mut queue = queue.lock().await;

            if queue.generation() != generation || queue.state() != PlaybackState::Playing {
                debug!(
                    "Ignoring stale completion for guild {} (generation {}, current {})",
                    guild_id,
                    generation,
                    queue.generation()
                );
                return;
            }

            Self::next_step(guild_id, &mut queue)
        };

        self.run_step(guild_id, step).await;
    }

    /// Halt the current track; its completion signal advances the queue.
    pub async fn skip(&self, guild_id: GuildId) -> MusicResult<()> {
        let queue = self.registry.get(guild_id);
        let queue = queue.lock().await;

        match queue.handle() {
            Some(handle) if queue.state() == PlaybackState::Playing => {
                info!("Skipping current track in guild {}", guild_id);
                handle.stop()
            }
            _ => Err(MusicError::NotPlaying),
        }
    }

    /// Clear the queue, halt playback, and reset the channel topic.
    /// Returns whether a stream was running.
    pub async fn stop(&self, guild_id: GuildId) -> bool {
        let halted = self.clear(guild_id).await;
        self.update_topic(guild_id, IDLE_TOPIC).await;
        halted
    }

    /// Clear the queue and halt playback. Returns whether a stream was running.
    pub async fn clear(&self, guild_id: GuildId) -> bool {
        let handle = {
            let queue = self.registry.get(guild_id);
            let mut queue = queue.lock().await;
            queue.halt()
        };

        info!("Cleared queue for guild {}", guild_id);

        match handle {
            Some(handle) => {
                if let Err(e) = handle.stop() {
                    warn!("Failed to halt stream in guild {}: {}", guild_id, e);
                }
                true
            }
            None => false,
        }
    }

    pub async fn queue_view(&self, guild_id: GuildId) -> QueueView {
        let queue = self.registry.get(guild_id);
        let queue = queue.lock().await;
        queue.view(QUEUE_DISPLAY_LIMIT)
    }

    pub async fn state(&self, guild_id: GuildId) -> PlaybackState {
        let queue = self.registry.get(guild_id);
        let queue = queue.lock().await;
        queue.state()
    }

    fn next_step(guild_id: GuildId, queue: &mut GuildQueue) -> Step {
        match queue.dequeue_next() {
            Some(track) => {
                let generation = queue.begin_attempt(track.clone());
                Step::Play(PendingStart {
                    guild_id,
                    track,
                    generation,
                })
            }
            None => {
                queue.go_idle();
                Step::Idle
            }
        }
    }

    async fn run_step(&self, guild_id: GuildId, step: Step) {
        match step {
            Step::Idle => {
                info!("Queue finished for guild {}", guild_id);
                self.update_topic(guild_id, IDLE_TOPIC).await;
                self.notifier.notify(guild_id, Notice::QueueEmpty).await;
            }
            Step::Play(pending) => {
                self.resolve_and_play(pending).await;
            }
        }
    }

    async fn resolve_and_play(&self, pending: PendingStart) -> StartResult {
        let PendingStart {
            guild_id,
            track,
            generation,
        } = pending;
        info!(
            "Resolving '{}' for guild {} (generation {})",
            track.search_query, guild_id, generation
        );

        let resolved = self.resolver.resolve(&track.search_query).await;

        let queue = self.registry.get(guild_id);
        let mut queue = queue.lock().await;

        if queue.generation() != generation {
            debug!(
                "Attempt {} for guild {} was superseded during lookup",
                generation, guild_id
            );
            return StartResult::Superseded;
        }

        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(e) => {
                // The track is dropped and the loop stops here until the next play request
                error!("Failed to resolve '{}': {}", track.search_query, e);
                queue.go_idle();
                drop(queue);
                self.notifier
                    .notify(
                        guild_id,
                        Notice::ResolutionFailed {
                            title: track.display_title,
                            reason: e.to_string(),
                        },
                    )
                    .await;
                return StartResult::Failed;
            }
        };

        let signal = CompletionSignal::new(guild_id, generation, self.completions.clone());
        match self.driver.start(guild_id, &resolved.locator, signal).await {
            Ok(handle) => queue.attach_handle(handle),
            Err(e) => {
                error!("Failed to start '{}': {}", resolved.title, e);
                queue.go_idle();
                drop(queue);
                self.notifier
                    .notify(
                        guild_id,
                        Notice::PlaybackFailed {
                            title: resolved.title,
                            reason: e.to_string(),
                        },
                    )
                    .await;
                return StartResult::Failed;
            }
        }
        drop(queue);

        info!("Now playing '{}' in guild {}", resolved.title, guild_id);
        self.update_topic(guild_id, &format!("🎵 Now Playing: {}", resolved.title))
            .await;
        self.notifier
            .notify(
                guild_id,
                Notice::NowPlaying {
                    title: resolved.title,
                    requester: track.requester_name,
                    duration: resolved.duration,
                    url: resolved.webpage_url,
                },
            )
            .await;
        StartResult::Playing
    }

    async fn update_topic(&self, guild_id: GuildId, topic: &str) {
        match self.notifier.set_topic(guild_id, topic).await {
            Ok(()) => {}
            Err(MusicError::PermissionDenied) => {
                debug!("No permission to edit topic in guild {}", guild_id);
            }
            Err(e) => debug!("Topic update failed in guild {}: {}", guild_id, e),
        }
    }
}
