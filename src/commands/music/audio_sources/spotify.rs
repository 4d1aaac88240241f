//! Implements the `AudioApi` trait for Spotify track links.
//! Handles authentication (client credentials flow), URL parsing, and the track lookup.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;
use reqwest::header;
use serde::Deserialize;
use serenity::async_trait;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use crate::config::SpotifyCredentials;

use super::{AudioApi, TrackRequest};

const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
const API_BASE_URL: &str = "https://api.spotify.com";

/// Represents basic track information retrieved from Spotify.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotifyTrack {
    /// The name of the track.
    pub name: String,
    /// A list of artist names associated with the track.
    pub artists: Vec<String>,
}

impl SpotifyTrack {
    fn first_artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or("Unknown Artist")
    }

    /// Text used to find the track on YouTube.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.name, self.first_artist())
    }

    /// Title shown to users while the track waits in the queue.
    pub fn display_title(&self) -> String {
        format!("{} by {}", self.name, self.first_artist())
    }
}

/// Represents the response from Spotify's token endpoint.
#[derive(Debug, Deserialize)]
struct SpotifyToken {
    /// The OAuth2 access token.
    access_token: String,
    /// The duration in seconds for which the token is valid.
    expires_in: u64,
    /// The time when the token was created, used to check expiry.
    #[serde(skip, default = "Instant::now")]
    created_at: Instant,
}

impl SpotifyToken {
    /// Considers the token expired 30 seconds before its actual expiry time
    fn is_expired(&self) -> bool {
        let expiry = Duration::from_secs(self.expires_in);
        self.created_at.elapsed() > expiry.saturating_sub(Duration::from_secs(30))
    }
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistResponse>,
}

#[derive(Debug, Deserialize)]
struct ArtistResponse {
    name: String,
}

/// Regex to match and capture Spotify track URLs.
static SPOTIFY_TRACK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?open\.spotify\.com/(intl-[a-z]+/)?track/([a-zA-Z0-9]+)(\?.*)?$")
        .expect("valid spotify track regex")
});

pub struct SpotifyApi {
    client: reqwest::Client,
    credentials: Option<SpotifyCredentials>,
    accounts_base_url: String,
    api_base_url: String,
    token: Mutex<Option<SpotifyToken>>,
}

impl SpotifyApi {
    pub fn new(client: reqwest::Client, credentials: Option<SpotifyCredentials>) -> Self {
        Self::with_base_urls(client, credentials, ACCOUNTS_BASE_URL, API_BASE_URL)
    }

    /// Points the client at different hosts (used against a local mock server).
    pub fn with_base_urls(
        client: reqwest::Client,
        credentials: Option<SpotifyCredentials>,
        accounts_base_url: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            accounts_base_url: accounts_base_url.into(),
            api_base_url: api_base_url.into(),
            token: Mutex::new(None),
        }
    }

    /// Any link on the Spotify web player host.
    pub fn is_spotify_url(url: &str) -> bool {
        url.contains("open.spotify.com")
    }

    /// Attempts to extract the Spotify track ID from a URL using the track regex.
    pub fn extract_track_id(url: &str) -> Option<String> {
        SPOTIFY_TRACK_REGEX
            .captures(url.trim())
            .and_then(|cap| cap.get(3))
            .map(|m| m.as_str().to_string())
    }

    /// Returns a cached access token, requesting a new one when missing or expired.
    async fn get_access_token(&self) -> MusicResult<String> {
        let mut token_lock = self.token.lock().await;

        if let Some(token) = &*token_lock {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            MusicError::ConfigError("Spotify credentials are not configured".to_string())
        })?;

        let auth = BASE64_STANDARD.encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ));

        debug!("Requesting new Spotify access token");
        let response = self
            .client
            .post(format!("{}/api/token", self.accounts_base_url))
            .header(header::AUTHORIZATION, format!("Basic {}", auth))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                MusicError::ExternalApiError(format!("Failed to request Spotify token: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Cannot read response".to_string());
            return Err(MusicError::ExternalApiError(format!(
                "Spotify API error: {} - {}",
                status, text
            )));
        }

        let token = response.json::<SpotifyToken>().await.map_err(|e| {
            MusicError::ExternalApiError(format!("Failed to parse Spotify token: {}", e))
        })?;

        let access_token = token.access_token.clone();
        *token_lock = Some(token);

        Ok(access_token)
    }

    /// Fetches name and artists for a single Spotify track by its ID.
    pub async fn get_track(&self, track_id: &str) -> MusicResult<SpotifyTrack> {
        let token = self.get_access_token().await?;

        let response = self
            .client
            .get(format!("{}/v1/tracks/{}", self.api_base_url, track_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                MusicError::ExternalApiError(format!("Failed to request Spotify track: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Cannot read response".to_string());
            return Err(MusicError::ExternalApiError(format!(
                "Spotify API error: {} - {}",
                status, text
            )));
        }

        let track = response.json::<TrackResponse>().await.map_err(|e| {
            MusicError::ExternalApiError(format!("Failed to parse Spotify track data: {}", e))
        })?;

        Ok(SpotifyTrack {
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
        })
    }
}

#[async_trait]
impl AudioApi for SpotifyApi {
    fn is_valid_url(&self, url: &str) -> bool {
        SpotifyApi::is_spotify_url(url)
    }

    /// Only single tracks are supported; playlists and albums are refused.
    async fn track_request(&self, url: &str, requester_name: String) -> MusicResult<TrackRequest> {
        let track_id = SpotifyApi::extract_track_id(url).ok_or_else(|| {
            MusicError::UnsupportedLink(
                "Only individual track links are supported for now.".to_string(),
            )
        })?;

        info!("Looking up Spotify track {}", track_id);
        let track = self.get_track(&track_id).await?;

        Ok(TrackRequest::new(
            track.search_query(),
            track.display_title(),
            requester_name,
        ))
    }
}
