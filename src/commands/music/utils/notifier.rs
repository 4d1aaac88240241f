use super::embedded_messages;
use super::music_manager::{MusicError, MusicResult};
use super::player::{Notice, Notifier};
use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serenity::all::{ChannelId, CreateMessage, EditChannel, GuildId, Http};
use serenity::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Sends player notices to the text channel each guild last used a music command in
pub struct DiscordNotifier {
    http: Arc<Http>,
    channels: DashMap<GuildId, ChannelId>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            channels: DashMap::new(),
        }
    }

    /// Remember where to post notices for this guild
    pub fn bind_channel(&self, guild_id: GuildId, channel_id: ChannelId) {
        self.channels.insert(guild_id, channel_id);
    }

    fn channel_for(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.channels.get(&guild_id).map(|entry| *entry.value())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, guild_id: GuildId, notice: Notice) {
        let Some(channel_id) = self.channel_for(guild_id) else {
            debug!("No text channel bound for guild {}, dropping notice", guild_id);
            return;
        };

        let message = CreateMessage::new().embed(embedded_messages::notice(&notice));
        if let Err(e) = channel_id.send_message(&self.http, message).await {
            warn!("Failed to send notice to channel {}: {}", channel_id, e);
        }
    }

    async fn set_topic(&self, guild_id: GuildId, topic: &str) -> MusicResult<()> {
        let channel_id = self.channel_for(guild_id).ok_or(MusicError::NotConnected)?;

        match channel_id
            .edit(&self.http, EditChannel::new().topic(topic))
            .await
        {
            Ok(_) => Ok(()),
            Err(serenity::Error::Http(e)) if e.status_code().map(|s| s.as_u16()) == Some(403) => {
                Err(MusicError::PermissionDenied)
            }
            Err(e) => Err(MusicError::ExternalApiError(e.to_string())),
        }
    }
}
