use poise::CreateReply;
use serenity::all::CreateEmbed;
use std::time::Duration;

use super::format_duration;
use super::music_manager::MusicError;
use super::player::Notice;
use super::queue_manager::QueueView;
use crate::commands::music::audio_sources::track_metadata::TrackRequest;

const SUCCESS_COLOR: u32 = 0x00ff41;
const ERROR_COLOR: u32 = 0xff0000;

fn error_embed(title: &str, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(ERROR_COLOR)
}

fn duration_text(duration: Option<Duration>) -> String {
    duration
        .map(format_duration)
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Embed for a player notice sent to the guild's text channel
pub fn notice(notice: &Notice) -> CreateEmbed {
    match notice {
        Notice::NowPlaying {
            title,
            requester,
            duration,
            url,
        } => {
            let embed = CreateEmbed::new()
                .title("🎵 Now Playing")
                .description(format!("**{}**", title))
                .field("Requested by", requester, true)
                .field("Duration", duration_text(*duration), true)
                .color(SUCCESS_COLOR);
            match url {
                Some(url) => embed.url(url),
                None => embed,
            }
        }
        Notice::QueueEmpty => CreateEmbed::new()
            .description("🎵 Queue is empty!")
            .color(SUCCESS_COLOR),
        Notice::ResolutionFailed { title, reason } => error_embed(
            "❌ Could not play track",
            format!("**{}**\n{}", title, reason),
        ),
        Notice::PlaybackFailed { title, reason } => error_embed(
            "❌ Playback failed",
            format!("**{}**\n{}", title, reason),
        ),
    }
}

/// Reply when the request kicked off playback
pub fn playing(track: &TrackRequest) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("▶️ Playing")
            .description(format!("**{}**", track.display_title))
            .field("Requested by", &track.requester_name, true)
            .color(SUCCESS_COLOR),
    )
}

/// Reply when the request was queued behind the current track
pub fn added_to_queue(track: &TrackRequest, position: usize) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("📝 Added to Queue")
            .description(format!("**{}**", track.display_title))
            .field("Position", format!("#{}", position), true)
            .field("Requested by", &track.requester_name, true)
            .color(SUCCESS_COLOR),
    )
}

/// Text of the "Up Next" field
pub fn up_next_text(view: &QueueView) -> String {
    if view.upcoming.is_empty() {
        return "No songs in queue".to_string();
    }

    let mut text = String::new();
    for (index, track) in view.upcoming.iter().enumerate() {
        text.push_str(&format!(
            "{}. **{}** - {}\n",
            index + 1,
            track.display_title,
            track.requester_name
        ));
    }

    if view.overflow > 0 {
        text.push_str(&format!("\n... and {} more songs", view.overflow));
    }

    text
}

/// Reply for the queue command
pub fn music_queue(view: &QueueView) -> CreateReply {
    if view.is_empty() {
        return CreateReply::default().content("📭 Queue is empty.");
    }

    let mut embed = CreateEmbed::new()
        .title("🎵 Music Queue")
        .color(SUCCESS_COLOR);

    if let Some(current) = &view.current {
        embed = embed.field(
            "🎵 Currently Playing",
            format!(
                "**{}**\nRequested by: {}",
                current.display_title, current.requester_name
            ),
            false,
        );
    }

    CreateReply::default().embed(embed.field("📋 Up Next", up_next_text(view), false))
}

pub fn connected(channel_name: &str) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🎧 Connected")
            .description(format!("Joined **{}**", channel_name))
            .color(SUCCESS_COLOR),
    )
}

pub fn not_in_voice_channel() -> CreateReply {
    CreateReply::default()
        .embed(error_embed(
            "❌ Connection Failed",
            "Please join a voice channel first!",
        ))
        .ephemeral(true)
}

pub fn failed_to_join(err: MusicError) -> CreateReply {
    CreateReply::default().embed(error_embed(
        "❌ Connection Failed",
        format!("Failed to join voice channel: {}", err),
    ))
}

/// Reply when a link lookup fails before anything is queued
pub fn lookup_failed(err: &MusicError) -> CreateReply {
    let description = match err {
        MusicError::UnsupportedLink(message) => format!("⚠️ {}", message),
        MusicError::ExternalApiError(_) | MusicError::ConfigError(_) => {
            "Failed to fetch Spotify track.".to_string()
        }
        other => other.to_string(),
    };
    CreateReply::default().embed(error_embed("❌ Request Failed", description))
}

pub fn skipped() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏭️ Track Skipped")
            .description("Moving to next song...")
            .color(SUCCESS_COLOR),
    )
}

pub fn skip_failed() -> CreateReply {
    CreateReply::default().embed(error_embed("❌ Skip Failed", "No music playing to skip"))
}

pub fn stopped() -> CreateReply {
    CreateReply::default().content("⏹️ Stopped and cleared queue.")
}

pub fn cleared() -> CreateReply {
    CreateReply::default().content("🗑️ Queue cleared!")
}

pub fn left_voice_channel() -> CreateReply {
    CreateReply::default().content("👋 Bye! See you soon.")
}

pub fn bot_not_in_voice_channel() -> CreateReply {
    CreateReply::default().content("❌ I'm not in a voice channel.")
}
