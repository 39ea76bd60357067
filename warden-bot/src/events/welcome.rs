use poise::serenity_prelude as serenity;
use tracing::{error, warn};

use warden_commands::community::welcome::welcome_message;
use warden_core::Data;
use warden_database::impls::guild_config::get_guild_config;
use warden_utils::permissions::is_missing_permissions_error;

pub async fn handle_member_join_welcome(
    ctx: &serenity::Context,
    data: &Data,
    member: &serenity::Member,
) {
    if member.user.bot {
        return;
    }
    let guild_id = member.guild_id;

    let config = match get_guild_config(&data.db, guild_id.get()).await {
        Ok(config) => config,
        Err(source) => {
            error!(?source, guild_id = guild_id.get(), "failed to read welcome config");
            return;
        }
    };
    if config.welcome_channel_id.is_none() {
        return;
    }

    let cached = guild_id
        .to_guild_cached(&ctx.cache)
        .map(|guild| (guild.name.clone(), guild.member_count));
    let (server_name, member_count) = match cached {
        Some(cached) => cached,
        None => match guild_id.to_partial_guild_with_counts(&ctx.http).await {
            Ok(guild) => (
                guild.name,
                guild.approximate_member_count.unwrap_or_default(),
            ),
            Err(source) => {
                warn!(?source, guild_id = guild_id.get(), "failed to fetch guild for welcome");
                (format!("Server {}", guild_id.get()), 0)
            }
        },
    };

    let Some((channel_id, text)) = welcome_message(&config, &member.user, &server_name, member_count)
    else {
        return;
    };

    let allowed = serenity::CreateAllowedMentions::new().users([member.user.id]);
    let builder = serenity::CreateMessage::new()
        .content(text)
        .allowed_mentions(allowed);
    if let Err(source) = channel_id.send_message(&ctx.http, builder).await {
        if is_missing_permissions_error(&source) {
            warn!(channel_id = channel_id.get(), "missing permissions to post welcome message");
        } else {
            error!(?source, channel_id = channel_id.get(), "failed to post welcome message");
        }
    }
}
