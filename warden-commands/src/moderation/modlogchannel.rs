use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::guild_with_permission;
use warden_core::{Context, Error};
use warden_database::impls::guild_config::{
    clear_modlog_channel_id, get_modlog_channel_id, set_modlog_channel_id,
};
use warden_utils::parse::parse_channel_id;

pub const META: CommandMeta = CommandMeta {
    name: "modlogchannel",
    desc: "Set, view or clear the moderation log channel.",
    category: "moderation",
    usage: "!modlogchannel [#channel|channel_id|clear]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn modlogchannel(
    ctx: Context<'_>,
    #[description = "Channel mention/id, or 'clear'"]
    #[rest]
    input: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    let db = &ctx.data().db;
    let Some(input) = input.as_deref().map(str::trim).filter(|entry| !entry.is_empty()) else {
        let reply = match get_modlog_channel_id(db, guild_id.get()).await? {
            Some(channel_id) => format!("Current modlog channel: <#{channel_id}>"),
            None => "No modlog channel configured.".to_owned(),
        };
        ctx.say(reply).await?;
        return Ok(());
    };

    if input.eq_ignore_ascii_case("clear") {
        clear_modlog_channel_id(db, guild_id.get()).await?;
        ctx.say("Modlog channel cleared.").await?;
        return Ok(());
    }

    let Some(channel_id) = parse_channel_id(input) else {
        ctx.say("Provide a valid channel mention/id, or `clear`.").await?;
        return Ok(());
    };

    set_modlog_channel_id(db, guild_id.get(), Some(channel_id)).await?;
    ctx.say(format!("Modlog channel set to <#{channel_id}>.")).await?;
    Ok(())
}
