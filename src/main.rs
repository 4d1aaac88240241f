use std::sync::Arc;

use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::{SerenityInit, Songbird};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tunequeue::commands::music::{
    audio_sources::{AudioApi, spotify::SpotifyApi, youtube::YtDlpResolver},
    clear, join, leave, play, queue, skip, stop,
    utils::{notifier::DiscordNotifier, player::MusicPlayer, songbird_driver::SongbirdDriver},
};
use tunequeue::config::Config;
use tunequeue::{Data, Error, events, help, register};

#[tokio::main]
async fn main() -> Result<(), Error> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tunequeue=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let Config {
        discord_token,
        command_prefix,
        spotify,
        resolve_timeout,
        ytdlp_path,
    } = Config::from_env()?;

    if spotify.is_none() {
        info!("Spotify credentials not set, Spotify links are disabled");
    }

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let commands = vec![
        register(),
        help(),
        play(),
        skip(),
        stop(),
        clear(),
        queue(),
        join(),
        leave(),
    ];

    let songbird = Songbird::serenity();
    let voice_manager = Arc::clone(&songbird);
    let activity_text = format!("{}help", command_prefix);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(command_prefix),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                ctx.set_activity(Some(serenity::ActivityData::listening(activity_text)));

                let http_client = reqwest::Client::new();
                let notifier = Arc::new(DiscordNotifier::new(Arc::clone(&ctx.http)));
                let resolver = Arc::new(YtDlpResolver::new(ytdlp_path, resolve_timeout));
                let driver = Arc::new(SongbirdDriver::new(voice_manager, http_client.clone()));

                let (player, completions) =
                    MusicPlayer::new(resolver, driver, Arc::clone(&notifier) as _);
                let player = Arc::new(player);
                tokio::spawn(Arc::clone(&player).run_completions(completions));

                let audio_apis: Vec<Box<dyn AudioApi>> =
                    vec![Box::new(SpotifyApi::new(http_client, spotify))];

                info!("Music player ready");
                Ok(Data {
                    player,
                    notifier,
                    audio_apis,
                })
            })
        });

    let mut client = ClientBuilder::new(discord_token, intents)
        .framework(framework.build())
        .register_songbird_with(songbird)
        .await?;

    client.start().await.map_err(Into::into)
}
