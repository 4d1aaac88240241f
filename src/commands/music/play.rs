use super::*;
use crate::commands::music::audio_sources::AudioSource;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::MusicManager,
    player::EnqueueOutcome,
};
use tracing::{error, info};

/// Play a song from a search, a YouTube link or a Spotify track link
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"]
    #[rest]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = guild_id(&ctx)?;

    let channel_id =
        match MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) {
            Ok(channel_id) => channel_id,
            Err(_) => {
                ctx.send(embedded_messages::not_in_voice_channel()).await?;
                return Ok(());
            }
        };

    // Lookups can take a while
    ctx.defer().await?;

    if let Err(err) =
        MusicManager::ensure_connected(ctx.serenity_context(), guild_id, channel_id).await
    {
        ctx.send(embedded_messages::failed_to_join(err)).await?;
        return Ok(());
    }

    let data = ctx.data();
    data.notifier.bind_channel(guild_id, ctx.channel_id());

    let requester = ctx.author().name.clone();
    let request = match AudioSource::request_from_query(&query, &requester, &data.audio_apis).await
    {
        Ok(request) => request,
        Err(err) => {
            error!("Failed to build request for '{}': {}", query, err);
            ctx.send(embedded_messages::lookup_failed(&err)).await?;
            return Ok(());
        }
    };

    match data.player.enqueue(guild_id, request.clone()).await {
        EnqueueOutcome::Queued { position } => {
            ctx.send(embedded_messages::added_to_queue(&request, position))
                .await?;
        }
        EnqueueOutcome::Next(pending) => {
            let sent = ctx.send(embedded_messages::playing(pending.track())).await;
            // The pending track must be started even if the reply failed
            let result = data.player.start(pending).await;
            info!("Playback attempt in guild {} finished: {:?}", guild_id, result);
            sent?;
        }
    }

    Ok(())
}
