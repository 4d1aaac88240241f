//! Sample guilds, users and requests

use serenity::model::id::GuildId;
use tunequeue::commands::music::audio_sources::track_metadata::TrackRequest;

pub const SAMPLE_GUILD_ID: u64 = 123456789;

pub const OTHER_GUILD_ID: u64 = 987654321;

pub const SAMPLE_REQUESTER: &str = "listener";

pub fn guild() -> GuildId {
    GuildId::new(SAMPLE_GUILD_ID)
}

pub fn other_guild() -> GuildId {
    GuildId::new(OTHER_GUILD_ID)
}

/// A plain search request for `query`
pub fn track(query: &str) -> TrackRequest {
    TrackRequest::from_search(query, SAMPLE_REQUESTER)
}

/// Stream URL the scripted resolver hands out for `query`
pub fn stream_url(query: &str) -> String {
    format!("https://media.example/{}", query.replace(' ', "-"))
}

/// Track page the scripted resolver reports for `query`
pub fn page_url(query: &str) -> String {
    format!("https://video.example/{}", query.replace(' ', "-"))
}
