//! Implements the `Resolver` trait using the `yt-dlp` command-line tool.

use std::time::Duration;

use serenity::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::AudioSource;
use super::track_metadata::ResolvedTrack;
use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use crate::commands::music::utils::player::Resolver;

/// m4a first: symphonia decodes AAC in MP4 without ffmpeg
const FORMAT_SELECTOR: &str = "bestaudio[ext=m4a]/bestaudio/best";

pub struct YtDlpResolver {
    program: String,
    timeout: Duration,
}

impl YtDlpResolver {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Links are opened directly, anything else goes through YouTube search
    pub fn target_for(query: &str) -> String {
        let query = query.trim();
        if AudioSource::is_url(query) {
            query.to_string()
        } else {
            format!("ytsearch:{}", query)
        }
    }

    fn args(target: &str) -> Vec<String> {
        vec![
            "-j".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "-f".to_string(),
            FORMAT_SELECTOR.to_string(),
            target.to_string(),
        ]
    }
}

#[async_trait]
impl Resolver for YtDlpResolver {
    async fn resolve(&self, query: &str) -> MusicResult<ResolvedTrack> {
        let target = Self::target_for(query);
        info!("Resolving audio source for: {}", target);

        let run = Command::new(&self.program)
            .args(Self::args(&target))
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| MusicError::ResolutionError {
                query: query.to_string(),
                reason: format!("lookup timed out after {}s", self.timeout.as_secs()),
            })?
            .map_err(|e| MusicError::ResolutionError {
                query: query.to_string(),
                reason: format!("failed to run {}: {}", self.program, e),
            })?;

        let resolved = ResolvedTrack::from_ytdlp_output(query, output)?;
        debug!("Resolved '{}' to '{}'", query, resolved.title);
        Ok(resolved)
    }
}
