use super::*;
use crate::commands::music::utils::embedded_messages;

/// Clear the queue and halt the current track
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn clear(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    ctx.data().player.clear(guild_id).await;
    ctx.send(embedded_messages::cleared()).await?;

    Ok(())
}
