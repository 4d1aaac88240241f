use super::player::PlaybackHandle;
use crate::commands::music::audio_sources::track_metadata::TrackRequest;
use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Number of upcoming tracks listed by the queue command
pub const QUEUE_DISPLAY_LIMIT: usize = 10;

/// Where a guild is in the play cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    /// A track was dequeued and is being looked up.
    Resolving,
    Playing,
}

/// What the queue command shows: the current track, the head of the queue and how many are hidden.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueView {
    pub current: Option<TrackRequest>,
    pub upcoming: Vec<TrackRequest>,
    pub overflow: usize,
}

impl QueueView {
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.upcoming.is_empty()
    }
}

/// Per-guild queue state.
///
/// `is_playing` implies `current` is set, and `current` is never also in `pending`.
/// `generation` counts playback attempts; the player compares it against the
/// tag carried by completion signals to drop stale ones.
#[derive(Default)]
pub struct GuildQueue {
    pending: VecDeque<TrackRequest>,
    current: Option<TrackRequest>,
    is_playing: bool,
    generation: u64,
    handle: Option<Box<dyn PlaybackHandle>>,
}

impl GuildQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track, returning the new queue length
    pub fn enqueue(&mut self, track: TrackRequest) -> usize {
        self.pending.push_back(track);
        self.pending.len()
    }

    pub fn dequeue_next(&mut self) -> Option<TrackRequest> {
        self.pending.pop_front()
    }

    /// Drop all pending tracks and forget the current one. Does not stop playback.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.current = None;
    }

    pub fn snapshot(&self) -> Vec<TrackRequest> {
        self.pending.iter().cloned().collect()
    }

    pub fn current(&self) -> Option<&TrackRequest> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> PlaybackState {
        match (self.is_playing, self.handle.is_some()) {
            (false, _) => PlaybackState::Idle,
            (true, false) => PlaybackState::Resolving,
            (true, true) => PlaybackState::Playing,
        }
    }

    pub fn view(&self, limit: usize) -> QueueView {
        QueueView {
            current: self.current.clone(),
            upcoming: self.pending.iter().take(limit).cloned().collect(),
            overflow: self.pending.len().saturating_sub(limit),
        }
    }

    /// Promote `track` to current and open a new playback attempt
    pub(crate) fn begin_attempt(&mut self, track: TrackRequest) -> u64 {
        self.generation += 1;
        self.current = Some(track);
        self.is_playing = true;
        self.handle = None;
        self.generation
    }

    pub(crate) fn attach_handle(&mut self, handle: Box<dyn PlaybackHandle>) {
        self.handle = Some(handle);
    }

    pub(crate) fn handle(&self) -> Option<&dyn PlaybackHandle> {
        self.handle.as_deref()
    }

    /// Back to idle with whatever is still pending left in place
    pub(crate) fn go_idle(&mut self) {
        self.current = None;
        self.is_playing = false;
        self.handle = None;
    }

    /// Clear everything and invalidate the running attempt, handing back its stream handle
    pub(crate) fn halt(&mut self) -> Option<Box<dyn PlaybackHandle>> {
        self.clear();
        self.is_playing = false;
        self.generation += 1;
        self.handle.take()
    }
}

/// Guild id to queue map, filled lazily. Entries live for the whole process.
#[derive(Default)]
pub struct QueueRegistry {
    queues: DashMap<GuildId, Arc<Mutex<GuildQueue>>>,
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing queue for the guild, or a fresh empty one
    pub fn get(&self, guild_id: GuildId) -> Arc<Mutex<GuildQueue>> {
        let entry = self.queues.entry(guild_id).or_insert_with(|| {
            debug!("Creating queue for guild {}", guild_id);
            Arc::new(Mutex::new(GuildQueue::new()))
        });
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
