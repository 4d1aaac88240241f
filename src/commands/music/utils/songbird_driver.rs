use super::event_handlers::SongEndNotifier;
use super::music_manager::{MusicError, MusicResult};
use super::player::{CompletionSignal, PlaybackDriver, PlaybackHandle};
use crate::commands::music::audio_sources::track_metadata::MediaLocator;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serenity::async_trait;
use serenity::model::id::GuildId;
use songbird::input::{HttpRequest, Input};
use songbird::tracks::TrackHandle;
use songbird::{Event, Songbird, TrackEvent};
use std::sync::Arc;
use tracing::{info, warn};

/// Plays direct stream URLs through the guild's Songbird call
pub struct SongbirdDriver {
    manager: Arc<Songbird>,
    http_client: reqwest::Client,
}

impl SongbirdDriver {
    pub fn new(manager: Arc<Songbird>, http_client: reqwest::Client) -> Self {
        Self {
            manager,
            http_client,
        }
    }

    fn header_map(headers: &[(String, String)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!("Skipping invalid stream header {:?}", name),
            }
        }
        map
    }
}

#[async_trait]
impl PlaybackDriver for SongbirdDriver {
    async fn start(
        &self,
        guild_id: GuildId,
        locator: &MediaLocator,
        on_complete: CompletionSignal,
    ) -> MusicResult<Box<dyn PlaybackHandle>> {
        let call = self.manager.get(guild_id).ok_or(MusicError::NotConnected)?;

        let request = HttpRequest::new_with_headers(
            self.http_client.clone(),
            locator.url.clone(),
            Self::header_map(&locator.headers),
        );
        let input: Input = request.into();

        let track_handle = {
            let mut handler = call.lock().await;
            // Our own queue decides what plays next; never mix two streams
            handler.stop();
            handler.play_input(input)
        };

        for event in [TrackEvent::End, TrackEvent::Error] {
            track_handle
                .add_event(
                    Event::Track(event),
                    SongEndNotifier {
                        signal: on_complete.clone(),
                    },
                )
                .map_err(|e| MusicError::PlaybackError(e.to_string()))?;
        }

        info!("Streaming started in guild {}", guild_id);
        Ok(Box::new(SongbirdHandle(track_handle)))
    }
}

struct SongbirdHandle(TrackHandle);

impl PlaybackHandle for SongbirdHandle {
    fn stop(&self) -> MusicResult<()> {
        self.0
            .stop()
            .map_err(|e| MusicError::PlaybackError(e.to_string()))
    }
}
