use super::*;
use crate::commands::music::utils::{embedded_messages, music_manager::MusicManager};

/// Join your voice channel
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn join(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    let channel_id =
        match MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) {
            Ok(channel_id) => channel_id,
            Err(_) => {
                ctx.send(embedded_messages::not_in_voice_channel()).await?;
                return Ok(());
            }
        };

    match MusicManager::join_channel(ctx.serenity_context(), guild_id, channel_id).await {
        Ok(_) => {
            ctx.data().notifier.bind_channel(guild_id, ctx.channel_id());
            let name = MusicManager::channel_name(ctx.serenity_context(), guild_id, channel_id)
                .unwrap_or_else(|| channel_id.to_string());
            ctx.send(embedded_messages::connected(&name)).await?;
        }
        Err(err) => {
            ctx.send(embedded_messages::failed_to_join(err)).await?;
        }
    }

    Ok(())
}
