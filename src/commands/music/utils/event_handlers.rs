use super::player::CompletionSignal;
use serenity::async_trait;
use songbird::tracks::PlayMode;
use songbird::{Event, EventContext};
use tracing::{debug, info};

/// Songbird event handler forwarding the end of a track to the player.
///
/// Registered for both `TrackEvent::End` and `TrackEvent::Error`; the shared
/// signal makes sure only the first of the two reaches the player.
pub struct SongEndNotifier {
    pub signal: CompletionSignal,
}

#[async_trait]
impl songbird::EventHandler for SongEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            let error = tracks.iter().find_map(|(state, _)| match &state.playing {
                PlayMode::Errored(e) => Some(format!("{:?}", e)),
                _ => None,
            });

            info!(
                "Track ended for guild {} (generation {})",
                self.signal.guild_id(),
                self.signal.generation()
            );

            if !self.signal.complete(error) {
                debug!("End of track already reported");
            }
        }
        None
    }
}
