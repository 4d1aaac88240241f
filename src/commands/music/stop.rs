use super::*;
use crate::commands::music::utils::{embedded_messages, music_manager::MusicManager};

/// Stop playback and clear the queue
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    if MusicManager::get_call(ctx.serenity_context(), guild_id)
        .await
        .is_err()
    {
        ctx.send(embedded_messages::bot_not_in_voice_channel())
            .await?;
        return Ok(());
    }

    ctx.data().player.stop(guild_id).await;
    ctx.send(embedded_messages::stopped()).await?;

    Ok(())
}
