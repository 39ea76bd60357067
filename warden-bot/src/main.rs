mod config;
mod events;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;

use config::BotConfig;
use warden_core::{Data, Error};
use warden_database::{CacheService, Database, MIGRATOR};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();
    let config = BotConfig::from_env()?;

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    info!(
        max_connections = config.database_max_connections,
        "PostgreSQL connection established."
    );

    let cache = build_cache(&config).await;
    let db = Database::with_cache(db_pool, cache);

    if config.auto_run_migrations {
        MIGRATOR.run(db.pool()).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let data = Data::new(db, config.ticket_defaults.clone());
    let guild_id = config.guild_id.map(serenity::GuildId::new);

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: warden_commands::commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(warden_utils::COMMAND_PREFIX.to_string()),
                mention_as_prefix: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {} (ID: {})", ready.user.name, ready.user.id);

                let commands = &framework.options().commands;
                let registration = match guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(ctx, commands, guild_id).await
                    }
                    None => poise::builtins::register_globally(ctx, commands).await,
                };
                match registration {
                    Ok(()) => info!(
                        count = commands.len(),
                        guild_id = guild_id.map(|id| id.get()),
                        "Application commands registered."
                    ),
                    Err(source) => error!(?source, "failed to register application commands"),
                }

                events::slowmode::spawn_slowmode_sweeper(ctx.http.clone(), data.clone());
                Ok(data)
            })
        })
        .build();

    info!("Warden is connecting...");

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    client.start().await?;
    Ok(())
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        if *metadata.level() > tracing::Level::INFO {
            return false;
        }
        let target = metadata.target();
        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();
}

async fn build_cache(config: &BotConfig) -> CacheService {
    let prefix = config.redis_key_prefix.clone();
    if !config.redis_enabled {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        return CacheService::disabled(prefix);
    }

    let Some(redis_url) = config.redis_url.as_deref() else {
        warn!(key_prefix = %prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
        return CacheService::disabled(prefix);
    };

    let cache = match CacheService::redis(redis_url, prefix.clone()) {
        Ok(cache) => cache,
        Err(source) => {
            warn!(?source, key_prefix = %prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
            return CacheService::disabled(prefix);
        }
    };

    match cache.ping().await {
        Ok(()) => info!(key_prefix = %prefix, "Redis cache enabled."),
        Err(source) => warn!(
            ?source,
            "Redis cache ping failed; cache operations will fall back to the database."
        ),
    }
    cache
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(?error, command = %ctx.command().qualified_name, "command error");

            let embed = serenity::CreateEmbed::new()
                .title("Command Error")
                .description("Something went wrong while running this command.")
                .color(warden_utils::embed::DEFAULT_EMBED_COLOR);

            let _ = ctx
                .send(poise::CreateReply::default().ephemeral(true).embed(embed))
                .await;
        }
        poise::FrameworkError::ArgumentParse { ctx, input, .. } => {
            let usage = format!(
                "Usage: `{}{}`",
                warden_utils::COMMAND_PREFIX,
                ctx.command().qualified_name
            );
            let description = match input {
                Some(input) => format!("Invalid argument: `{input}`\n{usage}"),
                None => format!("Missing required argument.\n{usage}"),
            };
            let _ = ctx.say(description).await;
        }
        poise::FrameworkError::NotAnOwner { ctx, .. } => {
            let _ = ctx.say("Only the bot owners can use this command.").await;
        }
        poise::FrameworkError::GuildOnly { ctx, .. } => {
            let _ = ctx.say("This command only works in servers.").await;
        }
        poise::FrameworkError::CommandCheckFailed { ctx, error, .. } => {
            if let Some(error) = error {
                error!(?error, "command check errored");
            }
            let _ = ctx.say("You can't use this command here.").await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            debug!("unknown command invocation");
        }
        other => {
            error!(?other, "framework error");
        }
    }
}

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            let removed =
                events::word_filter::handle_message_word_filter(ctx, data, new_message).await;
            if !removed {
                events::afk::handle_message_afk(ctx, data, new_message).await;
            }
            events::slowmode::handle_message_slowmode(ctx, data, new_message).await;
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            events::welcome::handle_member_join_welcome(ctx, data, new_member).await;
        }
        serenity::FullEvent::InteractionCreate { interaction } => {
            events::tickets::handle_interaction_tickets(ctx, data, interaction).await;
        }
        serenity::FullEvent::ChannelDelete { channel, .. } => {
            events::tickets::handle_channel_delete_tickets(data, channel).await;
        }
        _ => {}
    }

    Ok(())
}
