use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use warden_core::{Context, Error};
use warden_database::impls::afk::set_afk;
use warden_database::impls::premium::is_premium;
use warden_database::model::afk::AfkEntry;
use warden_utils::text::sanitize_mentions;

pub const META: CommandMeta = CommandMeta {
    name: "afk",
    desc: "Mark yourself as away; mentions of you get an automatic reply.",
    category: "community",
    usage: "!afk [reason]",
};

pub const DEFAULT_AFK_REASON: &str = "AFK";
pub const AFK_REASON_LIMIT: usize = 100;
pub const PREMIUM_AFK_REASON_LIMIT: usize = 500;

/// Most AFK notices sent for a single message.
pub const MAX_AFK_NOTICES: usize = 5;

pub fn afk_reason_limit(premium: bool) -> usize {
    if premium {
        PREMIUM_AFK_REASON_LIMIT
    } else {
        AFK_REASON_LIMIT
    }
}

/// Normalised reason, or an error message when it exceeds the user's limit.
pub fn validate_afk_reason(raw: Option<&str>, premium: bool) -> Result<String, String> {
    let reason = raw.map(str::trim).filter(|reason| !reason.is_empty());
    let Some(reason) = reason else {
        return Ok(DEFAULT_AFK_REASON.to_owned());
    };

    let limit = afk_reason_limit(premium);
    if reason.chars().count() > limit {
        let hint = if premium {
            ""
        } else {
            " Premium members can use up to 500."
        };
        return Err(format!("AFK reasons can be at most {limit} characters.{hint}"));
    }

    Ok(sanitize_mentions(reason))
}

pub fn welcome_back_message(user_id: u64) -> String {
    format!("Welcome back, <@{user_id}>! I removed your AFK.")
}

pub fn afk_notice(display_name: &str, entry: &AfkEntry) -> String {
    format!(
        "{} is AFK: {} (<t:{}:R>)",
        sanitize_mentions(display_name),
        entry.reason,
        entry.since
    )
}

#[poise::command(prefix_command, slash_command, category = "Community")]
pub async fn afk(
    ctx: Context<'_>,
    #[description = "Why you're away"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let author: &serenity::User = ctx.author();
    let premium = is_premium(&ctx.data().db, author.id.get()).await?;

    let reason = match validate_afk_reason(reason.as_deref(), premium) {
        Ok(reason) => reason,
        Err(message) => {
            ctx.say(message).await?;
            return Ok(());
        }
    };

    let entry = set_afk(&ctx.data().db, author.id.get(), &reason).await?;
    ctx.say(format!("<@{}> is now AFK: {}", author.id.get(), entry.reason))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_reason_defaults() {
        assert_eq!(validate_afk_reason(None, false), Ok("AFK".to_owned()));
        assert_eq!(validate_afk_reason(Some("   "), false), Ok("AFK".to_owned()));
    }

    #[test]
    fn reason_limits_depend_on_premium() {
        let long = "a".repeat(AFK_REASON_LIMIT + 1);
        assert!(validate_afk_reason(Some(&long), false).is_err());
        assert_eq!(validate_afk_reason(Some(&long), true), Ok(long.clone()));

        let too_long = "a".repeat(PREMIUM_AFK_REASON_LIMIT + 1);
        assert!(validate_afk_reason(Some(&too_long), true).is_err());
        assert!(validate_afk_reason(Some(&"a".repeat(AFK_REASON_LIMIT)), false).is_ok());
    }

    #[test]
    fn notices() {
        let entry = AfkEntry {
            user_id: 3,
            reason: "lunch".to_owned(),
            since: 1_700_000_000,
        };
        assert_eq!(afk_notice("alice", &entry), "alice is AFK: lunch (<t:1700000000:R>)");
        assert_eq!(welcome_back_message(3), "Welcome back, <@3>! I removed your AFK.");
    }
}
