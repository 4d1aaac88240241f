use poise::serenity_prelude as serenity;
use tracing::info;

use crate::{Data, Error};

/// Gateway events the bot reacts to outside of commands
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot, .. } => {
            info!("✅ Logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::VoiceStateUpdate { new, .. } => {
            let bot_id = ctx.cache.current_user().id;

            // The bot itself was disconnected from voice: nothing left to play into
            if new.user_id == bot_id && new.channel_id.is_none() {
                if let Some(guild_id) = new.guild_id {
                    info!("Disconnected from voice in guild {}, clearing queue", guild_id);
                    data.player.clear(guild_id).await;
                }
            }
        }
        _ => {}
    }
    Ok(())
}
