//! Defines `TrackRequest`, the unit of work held in a guild queue, and `ResolvedTrack`,
//! the playable result of looking a request up with `yt-dlp`.

use crate::commands::music::utils::music_manager::MusicError;
use std::process::Output;
use std::time::Duration;

/// A playback request as enqueued by a user. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest {
    /// Text handed to the resolver.
    pub search_query: String,
    /// Title shown in queue listings; may differ from the resolved title.
    pub display_title: String,
    /// Display name of the user who asked for the track.
    pub requester_name: String,
}

impl TrackRequest {
    pub fn new(
        search_query: impl Into<String>,
        display_title: impl Into<String>,
        requester_name: impl Into<String>,
    ) -> Self {
        Self {
            search_query: search_query.into(),
            display_title: display_title.into(),
            requester_name: requester_name.into(),
        }
    }

    /// A plain search: the query doubles as the display title.
    pub fn from_search(query: &str, requester_name: impl Into<String>) -> Self {
        Self::new(query, query, requester_name)
    }
}

/// Where the audio stream lives, plus any headers the host expects on the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLocator {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl MediaLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }
}

/// Result of a successful resolver lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTrack {
    pub locator: MediaLocator,
    pub title: String,
    pub duration: Option<Duration>,
    /// Public page of the track, if the extractor reported one.
    pub webpage_url: Option<String>,
}

impl ResolvedTrack {
    /// Parses the JSON document printed by `yt-dlp -j`.
    pub fn from_ytdlp_json(json: &str) -> Result<Self, String> {
        let value: serde_json::Value = serde_json::from_str(json.trim())
            .map_err(|e| format!("Failed to parse yt-dlp output: {}", e))?;

        // `ytsearch:` without --flat-playlist may still wrap the hit in `entries`
        let entry = match value["entries"].as_array() {
            Some(entries) => entries
                .first()
                .ok_or_else(|| "No search results".to_string())?,
            None => &value,
        };

        let url = entry["url"]
            .as_str()
            .ok_or_else(|| "No playable stream in result".to_string())?
            .to_string();

        let title = entry["title"].as_str().unwrap_or("Unknown Title").to_string();

        let duration = entry["duration"]
            .as_f64()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

        let webpage_url = entry["webpage_url"].as_str().map(|s| s.to_string());

        let headers = entry["http_headers"]
            .as_object()
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            locator: MediaLocator { url, headers },
            title,
            duration,
            webpage_url,
        })
    }

    /// Converts a finished `yt-dlp` process into a resolved track, treating a
    /// failed exit or empty output as "nothing found" for `query`.
    pub fn from_ytdlp_output(query: &str, output: Output) -> Result<Self, MusicError> {
        let failure = |reason: String| MusicError::ResolutionError {
            query: query.to_string(),
            reason,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("yt-dlp exited with an error")
                .to_string();
            return Err(failure(reason));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        // One JSON document per line; the first line is the top search hit
        let first = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| failure("No search results".to_string()))?;

        Self::from_ytdlp_json(first).map_err(failure)
    }
}
