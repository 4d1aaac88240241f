//! Runtime configuration, read from the process environment (after `.env` is loaded).

use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_RESOLVE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_YTDLP_PATH: &str = "yt-dlp";

/// Errors raised while building a [`Config`].
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },

    #[error("{present} is set but {missing} is not")]
    IncompleteSpotifyCredentials {
        present: &'static str,
        missing: &'static str,
    },
}

/// Client credentials for the Spotify Web API.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    pub spotify: Option<SpotifyCredentials>,
    /// Upper bound on a single yt-dlp lookup.
    pub resolve_timeout: Duration,
    pub ytdlp_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let command_prefix = get("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let spotify = match (get("SPOTIFY_CLIENT_ID"), get("SPOTIFY_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::IncompleteSpotifyCredentials {
                    present: "SPOTIFY_CLIENT_ID",
                    missing: "SPOTIFY_CLIENT_SECRET",
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteSpotifyCredentials {
                    present: "SPOTIFY_CLIENT_SECRET",
                    missing: "SPOTIFY_CLIENT_ID",
                });
            }
        };

        let resolve_timeout = match get("RESOLVE_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "RESOLVE_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_RESOLVE_TIMEOUT_SECS),
        };

        let ytdlp_path = get("YTDLP_PATH").unwrap_or_else(|| DEFAULT_YTDLP_PATH.to_string());

        Ok(Self {
            discord_token,
            command_prefix,
            spotify,
            resolve_timeout,
            ytdlp_path,
        })
    }
}
