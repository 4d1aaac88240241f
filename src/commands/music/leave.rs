use super::*;
use crate::commands::music::utils::{embedded_messages, music_manager::MusicManager};

/// Clear the queue and leave the voice channel
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    if MusicManager::get_call(ctx.serenity_context(), guild_id)
        .await
        .is_err()
    {
        ctx.send(embedded_messages::bot_not_in_voice_channel())
            .await?;
        return Ok(());
    }

    ctx.data().player.clear(guild_id).await;

    if let Err(e) = MusicManager::leave_channel(ctx.serenity_context(), guild_id).await {
        tracing::warn!("Failed to leave voice channel in guild {}: {}", guild_id, e);
    }

    ctx.send(embedded_messages::left_voice_channel()).await?;

    Ok(())
}
