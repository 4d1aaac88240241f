use super::*;
use crate::commands::music::utils::{embedded_messages, music_manager::MusicError};
use tracing::warn;

/// Skip the currently playing song
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match ctx.data().player.skip(guild_id).await {
        Ok(()) => {
            ctx.send(embedded_messages::skipped()).await?;
        }
        Err(MusicError::NotPlaying) => {
            ctx.send(embedded_messages::skip_failed()).await?;
        }
        Err(err) => {
            warn!("Skip failed in guild {}: {}", guild_id, err);
            ctx.send(embedded_messages::skip_failed()).await?;
        }
    }

    Ok(())
}
