use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod events;

use commands::music::audio_sources::AudioApi;
use commands::music::utils::notifier::DiscordNotifier;
use commands::music::utils::player::MusicPlayer;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Shared state handed to every command invocation
pub struct Data {
    pub player: Arc<MusicPlayer>,
    /// Same notifier the player holds, kept for binding text channels to guilds.
    pub notifier: Arc<DiscordNotifier>,
    /// Link metadata services, asked in order.
    pub audio_apis: Vec<Box<dyn AudioApi>>,
}

/// Show the command list, or details for one command
#[poise::command(prefix_command, slash_command, category = "General")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: "Supported sources: YouTube links and searches, Spotify track links",
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
pub async fn register(ctx: Context<'_>) -> CommandResult {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}
