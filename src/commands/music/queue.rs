use super::*;
use crate::commands::music::utils::embedded_messages;

/// View the current music queue
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    let view = ctx.data().player.queue_view(guild_id).await;
    ctx.send(embedded_messages::music_queue(&view)).await?;

    Ok(())
}
