//! This module defines the structure and traits for turning user input into playable tracks.
//! Link-based input is handed to an `AudioApi` implementation (Spotify), plain text becomes
//! a search request, and the `youtube` resolver turns requests into stream locators.

/// Submodule implementing the `AudioApi` trait for Spotify track links.
pub mod spotify;
/// Submodule defining `TrackRequest`, `ResolvedTrack` and `MediaLocator`.
pub mod track_metadata;
/// Submodule implementing the `Resolver` trait on top of `yt-dlp`.
pub mod youtube;

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use serenity::async_trait;
use track_metadata::TrackRequest;
use tracing::info;
use url::Url;

/// Common interface for link metadata services (e.g. Spotify).
/// Requires `Send + Sync` to be safely used across async tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioApi: Send + Sync {
    /// Checks if the given input is a link this service understands.
    fn is_valid_url(&self, url: &str) -> bool;

    /// Looks the link up and builds the request to enqueue.
    ///
    /// # Arguments
    ///
    /// * `url` - The link the user sent.
    /// * `requester_name` - The name of the user who requested the track.
    async fn track_request(&self, url: &str, requester_name: String) -> MusicResult<TrackRequest>;
}

/// A utility struct providing general helper functions related to audio sources.
pub struct AudioSource;

impl AudioSource {
    /// Performs a basic check if the input string can be parsed as an http(s) URL.
    pub fn is_url(input: &str) -> bool {
        Url::parse(input.trim())
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }

    /// Builds the queue entry for raw user input.
    ///
    /// The first `AudioApi` claiming the input handles it; anything else is
    /// treated as search text (YouTube links included, which `yt-dlp` opens directly).
    pub async fn request_from_query(
        query: &str,
        requester_name: &str,
        apis: &[Box<dyn AudioApi>],
    ) -> MusicResult<TrackRequest> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MusicError::ResolutionError {
                query: String::new(),
                reason: "Empty query".to_string(),
            });
        }

        if let Some(api) = apis.iter().find(|api| api.is_valid_url(query)) {
            info!("Looking up link metadata for: {}", query);
            return api.track_request(query, requester_name.to_string()).await;
        }

        Ok(TrackRequest::from_search(query, requester_name))
    }
}
