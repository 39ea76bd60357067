use poise::serenity_prelude as serenity;

use warden_utils::embed::DEFAULT_EMBED_COLOR;
use warden_utils::text::sanitize_mentions;

pub const NO_REASON: &str = "No reason provided";

#[derive(Clone, Debug)]
pub struct TargetProfile {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

pub fn target_profile_from_user(user: &serenity::User) -> TargetProfile {
    TargetProfile {
        display_name: user.global_name.clone().unwrap_or_else(|| user.name.clone()),
        avatar_url: Some(user.face()),
    }
}

pub async fn fetch_target_profile(http: &serenity::Http, user_id: serenity::UserId) -> TargetProfile {
    match http.get_user(user_id).await {
        Ok(user) => target_profile_from_user(&user),
        Err(_) => TargetProfile {
            display_name: format!("User {}", user_id.get()),
            avatar_url: None,
        },
    }
}

fn detail_lines(target: Option<serenity::UserId>, reason: Option<&str>, duration: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(target) = target {
        lines.push(format!("**Target :** <@{}>", target.get()));
    }
    if let Some(reason) = reason {
        lines.push(format!("**Reason :** {}", sanitize_mentions(reason)));
    }
    if let Some(duration) = duration {
        lines.push(format!("**Duration :** {duration}"));
    }
    lines
}

/// Public reply posted after a moderation action succeeds.
pub fn moderation_action_embed(
    target_profile: &TargetProfile,
    target_user_id: serenity::UserId,
    action_past_tense: &str,
    reason: &str,
    duration: Option<&str>,
) -> serenity::CreateEmbed {
    let heading = format!("{} has been {}", target_profile.display_name, action_past_tense);
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(detail_lines(Some(target_user_id), Some(reason), duration).join("\n"));

    match target_profile.avatar_url.as_deref() {
        Some(url) => embed.author(serenity::CreateEmbedAuthor::new(heading).icon_url(url)),
        None => embed.title(heading),
    }
}

pub fn moderation_target_dm_embed(
    guild_name: &str,
    action_past_tense: &str,
    reason: Option<&str>,
    duration: Option<&str>,
) -> serenity::CreateEmbed {
    let details = detail_lines(None, reason, duration);
    let description = if details.is_empty() {
        "No additional details were provided.".to_owned()
    } else {
        details.join("\n")
    };

    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(format!("You have been {action_past_tense} in {guild_name}"))
        .description(description)
}

/// DM the target about an action taken against them in `guild_id`.
///
/// Users with closed DMs are common, so callers usually ignore the error.
pub async fn send_moderation_target_dm_for_guild(
    http: &serenity::Http,
    target_user: &serenity::User,
    guild_id: serenity::GuildId,
    action_past_tense: &str,
    reason: Option<&str>,
    duration: Option<&str>,
) -> Result<(), serenity::Error> {
    let guild_name = match guild_id.to_partial_guild(http).await {
        Ok(guild) => guild.name,
        Err(_) => format!("Server {}", guild_id.get()),
    };

    let embed = moderation_target_dm_embed(&guild_name, action_past_tense, reason, duration);
    let dm_channel = target_user.create_dm_channel(http).await?;
    dm_channel
        .send_message(http, serenity::CreateMessage::new().embed(embed))
        .await?;

    Ok(())
}

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub fn permission_denied_message() -> &'static str {
    "You are not permitted to use this command."
}

/// Refusal text when `target` cannot be acted on by `author`.
pub fn target_refusal(
    author_id: serenity::UserId,
    target: &serenity::User,
    verb: &str,
) -> Option<String> {
    if target.id == author_id {
        return Some(format!("You can't {verb} yourself."));
    }
    if target.bot {
        return Some("You can't use moderation actions on bots or application accounts.".to_owned());
    }
    None
}

pub fn warnings_window_label_days(days: u64) -> String {
    format!("last {days} day(s)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, bot: bool) -> serenity::User {
        let mut user = serenity::User::default();
        user.id = serenity::UserId::new(id);
        user.bot = bot;
        user
    }

    #[test]
    fn refuses_self_and_bots() {
        let author = serenity::UserId::new(1);
        assert_eq!(
            target_refusal(author, &user(1, false), "ban").as_deref(),
            Some("You can't ban yourself.")
        );
        assert!(target_refusal(author, &user(2, true), "kick").is_some());
        assert!(target_refusal(author, &user(2, false), "kick").is_none());
    }

    #[test]
    fn details_skip_missing_parts() {
        assert_eq!(
            detail_lines(None, Some("spam @everyone"), None),
            vec!["**Reason :** spam @\u{200B}everyone".to_owned()]
        );
        assert_eq!(detail_lines(None, None, None).len(), 0);
        assert_eq!(
            detail_lines(Some(serenity::UserId::new(5)), None, Some("10m")),
            vec!["**Target :** <@5>".to_owned(), "**Duration :** 10m".to_owned()]
        );
    }
}
