use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::usage_message;
use crate::moderation::guild_with_permission;
use crate::tickets::resolve_ticket_settings;
use warden_core::{Context, Error};
use warden_database::impls::guild_config::{
    get_guild_config, set_ticket_category_name, set_ticket_channel_prefix, set_ticket_staff_role,
};
use warden_utils::embed::titled_embed;
use warden_utils::parse::parse_role_id;
use warden_utils::text::truncate_chars;

pub const META: CommandMeta = CommandMeta {
    name: "ticketconfig",
    desc: "Configure the ticket staff role, category and channel prefix.",
    category: "tickets",
    usage: "!ticketconfig [staffrole <@role|clear>|category <name>|prefix <text>]",
};

const CATEGORY_NAME_LIMIT: usize = 100;
const PREFIX_LIMIT: usize = 32;

/// Category names are kept verbatim; only length is bounded.
fn clean_category_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| truncate_chars(trimmed, CATEGORY_NAME_LIMIT).to_owned())
}

/// Prefixes end up in channel names, so restrict them to channel-safe characters.
fn clean_channel_prefix(raw: &str) -> Option<String> {
    let prefix = raw.trim().to_lowercase();
    let valid = !prefix.is_empty()
        && prefix.chars().count() <= PREFIX_LIMIT
        && prefix
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '-' || ch == '_');
    valid.then_some(prefix)
}

#[poise::command(
    prefix_command,
    slash_command,
    category = "Tickets",
    subcommands("staffrole", "category", "prefix")
)]
pub async fn ticketconfig(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    let data = ctx.data();
    let settings = resolve_ticket_settings(
        &get_guild_config(&data.db, guild_id.get()).await?,
        &data.ticket_defaults,
    );

    let staff = settings
        .staff_role_id
        .map_or_else(|| "Not set".to_owned(), |role_id| format!("<@&{role_id}>"));
    let embed = titled_embed(
        "Ticket Settings",
        format!(
            "**Staff role :** {}\n**Category :** {}\n**Channel prefix :** `{}`",
            staff, settings.category_name, settings.channel_prefix
        ),
    )
    .footer(serenity::CreateEmbedFooter::new(
        "Subcommands: staffrole, category, prefix",
    ));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Role allowed to see and close tickets.
#[poise::command(prefix_command, slash_command, category = "Tickets")]
pub async fn staffrole(
    ctx: Context<'_>,
    #[description = "Role mention/id, or 'clear'"] role: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    let Some(raw) = role.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) else {
        ctx.say(usage_message("!ticketconfig staffrole <@role|clear>")).await?;
        return Ok(());
    };

    if raw.eq_ignore_ascii_case("clear") {
        set_ticket_staff_role(&ctx.data().db, guild_id.get(), None).await?;
        ctx.say("Ticket staff role cleared.").await?;
        return Ok(());
    }

    let Some(role_id) = parse_role_id(raw) else {
        ctx.say("Provide a valid role mention/id, or `clear`.").await?;
        return Ok(());
    };

    set_ticket_staff_role(&ctx.data().db, guild_id.get(), Some(role_id)).await?;
    ctx.say(format!("Ticket staff role set to <@&{role_id}>.")).await?;
    Ok(())
}

/// Category new ticket channels are created in.
#[poise::command(prefix_command, slash_command, category = "Tickets")]
pub async fn category(
    ctx: Context<'_>,
    #[description = "Category name"] #[rest] name: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    let Some(name) = name.as_deref().and_then(clean_category_name) else {
        ctx.say(usage_message("!ticketconfig category <name>")).await?;
        return Ok(());
    };

    set_ticket_category_name(&ctx.data().db, guild_id.get(), Some(&name)).await?;
    ctx.say(format!("Ticket category set to **{name}**.")).await?;
    Ok(())
}

/// Prefix for new ticket channel names.
#[poise::command(prefix_command, slash_command, category = "Tickets")]
pub async fn prefix(
    ctx: Context<'_>,
    #[description = "Prefix such as ticket-"] prefix: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    let Some(prefix) = prefix.as_deref().and_then(clean_channel_prefix) else {
        ctx.say(format!(
            "{} (letters, digits, `-` and `_`, at most {PREFIX_LIMIT} characters)",
            usage_message("!ticketconfig prefix <text>")
        ))
        .await?;
        return Ok(());
    };

    set_ticket_channel_prefix(&ctx.data().db, guild_id.get(), Some(&prefix)).await?;
    ctx.say(format!("Ticket channel prefix set to `{prefix}`.")).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names() {
        assert_eq!(clean_category_name("  Support Tickets "), Some("Support Tickets".to_owned()));
        assert_eq!(clean_category_name("   "), None);
        assert_eq!(
            clean_category_name(&"c".repeat(150)).map(|name| name.len()),
            Some(CATEGORY_NAME_LIMIT)
        );
    }

    #[test]
    fn channel_prefixes() {
        assert_eq!(clean_channel_prefix("Help-"), Some("help-".to_owned()));
        assert_eq!(clean_channel_prefix("help me"), None);
        assert_eq!(clean_channel_prefix(""), None);
        assert_eq!(clean_channel_prefix(&"p".repeat(PREFIX_LIMIT + 1)), None);
    }
}
