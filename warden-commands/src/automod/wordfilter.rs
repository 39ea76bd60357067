use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::usage_message;
use crate::moderation::guild_with_permission;
use warden_core::{Context, Error};
use warden_database::impls::word_filter::{
    add_filter_word, get_word_filter_config, list_filter_words, remove_filter_word,
    set_word_filter_action, set_word_filter_enabled,
};
use warden_database::model::word_filter::{
    ACTION_DELETE, ACTION_LOG, ACTION_TIMEOUT, ACTION_WARN, parse_filter_action,
};
use warden_utils::embed::titled_embed;
use warden_utils::pagination::{page_window, paginate_embed_pages, total_pages};
use warden_utils::text::normalize_filter_word;

pub const META: CommandMeta = CommandMeta {
    name: "wordfilter",
    desc: "Manage the blocked-word filter.",
    category: "automod",
    usage: "!wordfilter [enable|disable|action <delete|warn|timeout|log>|add <word>|remove <word>|list]",
};

const WORDS_PER_PAGE: usize = 25;

pub fn action_label(action: &str) -> &'static str {
    match action {
        ACTION_DELETE => "Delete & Log",
        ACTION_WARN => "Warn, Delete & Log",
        ACTION_TIMEOUT => "Timeout, Delete & Log",
        ACTION_LOG => "Log Only",
        _ => "Unknown",
    }
}

#[poise::command(
    prefix_command,
    slash_command,
    category = "Automod",
    subcommands("enable", "disable", "action", "add", "remove", "list")
)]
pub async fn wordfilter(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    let db = &ctx.data().db;
    let config = get_word_filter_config(db, guild_id.get()).await?;
    let word_count = list_filter_words(db, guild_id.get()).await?.len();
    let (enabled, action) = config
        .map(|config| (config.enabled, config.action))
        .unwrap_or((false, ACTION_DELETE.to_owned()));

    let embed = titled_embed(
        "Word Filter",
        format!(
            "**Status :** {}\n**Action :** {}\n**Blocked words :** {}",
            if enabled { "Enabled" } else { "Disabled" },
            action_label(&action),
            word_count,
        ),
    )
    .footer(serenity::CreateEmbedFooter::new(
        "Subcommands: enable, disable, action, add, remove, list",
    ));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Turn the word filter on.
#[poise::command(prefix_command, slash_command, category = "Automod")]
pub async fn enable(ctx: Context<'_>) -> Result<(), Error> {
    toggle(ctx, true).await
}

/// Turn the word filter off.
#[poise::command(prefix_command, slash_command, category = "Automod")]
pub async fn disable(ctx: Context<'_>) -> Result<(), Error> {
    toggle(ctx, false).await
}

async fn toggle(ctx: Context<'_>, enabled: bool) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    set_word_filter_enabled(&ctx.data().db, guild_id.get(), enabled).await?;
    ctx.say(format!(
        "Word filter has been **{}**.",
        if enabled { "enabled" } else { "disabled" }
    ))
    .await?;
    Ok(())
}

/// Choose what happens to messages containing a blocked word.
#[poise::command(prefix_command, slash_command, category = "Automod")]
pub async fn action(
    ctx: Context<'_>,
    #[description = "delete, warn, timeout or log"] action: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    let Some(action) = action.as_deref().and_then(parse_filter_action) else {
        ctx.say(usage_message("!wordfilter action <delete|warn|timeout|log>"))
            .await?;
        return Ok(());
    };

    set_word_filter_action(&ctx.data().db, guild_id.get(), action).await?;
    ctx.say(format!("Word filter action set to **{}**.", action_label(action)))
        .await?;
    Ok(())
}

/// Block a word.
#[poise::command(prefix_command, slash_command, category = "Automod")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Single word to block"] word: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    let Some(word) = word.as_deref().and_then(normalize_filter_word) else {
        ctx.say("Provide a single word made of letters or digits.").await?;
        return Ok(());
    };

    let reply = if add_filter_word(&ctx.data().db, guild_id.get(), &word).await? {
        format!("Added `{word}` to the word filter.")
    } else {
        format!("`{word}` is already filtered.")
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Unblock a word.
#[poise::command(prefix_command, slash_command, category = "Automod")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Word to unblock"] word: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    let Some(word) = word.as_deref().and_then(normalize_filter_word) else {
        ctx.say(usage_message("!wordfilter remove <word>")).await?;
        return Ok(());
    };

    let reply = if remove_filter_word(&ctx.data().db, guild_id.get(), &word).await? {
        format!("Removed `{word}` from the word filter.")
    } else {
        format!("`{word}` was not in the word filter.")
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Show blocked words.
#[poise::command(prefix_command, slash_command, category = "Automod")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };

    let words: Vec<String> = list_filter_words(&ctx.data().db, guild_id.get())
        .await?
        .into_iter()
        .map(|entry| entry.word)
        .collect();

    if words.is_empty() {
        ctx.say("The word filter list is empty.").await?;
        return Ok(());
    }

    let pages: Vec<String> = (1..=total_pages(words.len(), WORDS_PER_PAGE))
        .map(|page| {
            page_window(&words, WORDS_PER_PAGE, page)
                .iter()
                .map(|word| format!("`{word}`"))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect();

    paginate_embed_pages(ctx, "Filtered Words", &pages, 1).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::action_label;

    #[test]
    fn labels_cover_every_action() {
        assert_eq!(action_label("delete_and_log"), "Delete & Log");
        assert_eq!(action_label("warn_and_log"), "Warn, Delete & Log");
        assert_eq!(action_label("timeout_delete_and_log"), "Timeout, Delete & Log");
        assert_eq!(action_label("log_only"), "Log Only");
        assert_eq!(action_label("other"), "Unknown");
    }
}
