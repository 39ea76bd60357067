use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    NO_REASON, send_moderation_target_dm_for_guild, target_refusal, usage_message,
};
use crate::moderation::{CompletedAction, finish_action, guild_with_permission};
use warden_core::{Context, Error};
use warden_database::impls::now_unix_secs;
use warden_utils::formatting::format_compact_duration;
use warden_utils::parse::{has_duration_unit, parse_duration_seconds};

pub const META: CommandMeta = CommandMeta {
    name: "timeout",
    desc: "Timeout a user for a duration (default: 10m, max: 28d).",
    category: "moderation",
    usage: "!timeout <user> [duration] [reason]",
};

const DEFAULT_TIMEOUT_SECS: u64 = 10 * 60;
pub const MAX_TIMEOUT_SECS: u64 = 28 * 24 * 60 * 60;

fn is_duration_token(raw: &str) -> bool {
    has_duration_unit(raw) && parse_duration_seconds(raw).is_some()
}

/// Split the optional duration slot from the reason.
///
/// A prefix invocation like `!timeout @user spamming links` lands `spamming`
/// in the duration slot; anything that is not a duration is folded back into
/// the reason.
fn split_duration_argument(duration: Option<&str>, reason: Option<&str>) -> (u64, Option<String>) {
    let duration = duration.map(str::trim).filter(|raw| !raw.is_empty());
    let reason = reason.map(str::trim).filter(|raw| !raw.is_empty());

    match duration {
        Some(raw) if is_duration_token(raw) => (
            parse_duration_seconds(raw).unwrap_or(DEFAULT_TIMEOUT_SECS),
            reason.map(str::to_owned),
        ),
        Some(raw) => (
            DEFAULT_TIMEOUT_SECS,
            Some(match reason {
                Some(rest) => format!("{raw} {rest}"),
                None => raw.to_owned(),
            }),
        ),
        None => (DEFAULT_TIMEOUT_SECS, reason.map(str::to_owned)),
    }
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "The user to timeout"] user: Option<serenity::User>,
    #[description = "Duration (e.g. 10m, 2h, 1h30m)"] duration: Option<String>,
    #[description = "Reason for timeout"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MODERATE_MEMBERS).await?
    else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if let Some(refusal) = target_refusal(ctx.author().id, &user, "timeout") {
        ctx.say(refusal).await?;
        return Ok(());
    }

    let (seconds, reason) = split_duration_argument(duration.as_deref(), reason.as_deref());
    if seconds > MAX_TIMEOUT_SECS {
        ctx.say(format!(
            "Timeouts can last at most {}.",
            format_compact_duration(MAX_TIMEOUT_SECS)
        ))
        .await?;
        return Ok(());
    }
    let reason = reason.unwrap_or_else(|| NO_REASON.to_owned());

    let until_unix = now_unix_secs().saturating_add(seconds);
    let until = serenity::Timestamp::from_unix_timestamp(i64::try_from(until_unix)?)?;
    let edit = serenity::EditMember::new()
        .disable_communication_until_datetime(until)
        .audit_log_reason(&reason);

    if let Err(source) = guild_id.edit_member(ctx.http(), user.id, edit).await {
        error!(?source, "timeout request failed");
        ctx.say("I couldn't timeout that user. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    let duration_label = format_compact_duration(seconds);
    let _ = send_moderation_target_dm_for_guild(
        ctx.http(),
        &user,
        guild_id,
        "timed out",
        Some(&reason),
        Some(&duration_label),
    )
    .await;

    finish_action(
        &ctx,
        guild_id,
        CompletedAction {
            target: &user,
            action: "timeout",
            past_tense: "timed out",
            reason: &reason,
            duration_seconds: Some(seconds),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_duration_is_used() {
        assert_eq!(
            split_duration_argument(Some("1h30m"), Some("flooding")),
            (5_400, Some("flooding".to_owned()))
        );
    }

    #[test]
    fn missing_duration_defaults_to_ten_minutes() {
        assert_eq!(split_duration_argument(None, None), (600, None));
        assert_eq!(split_duration_argument(Some("  "), None), (600, None));
    }

    #[test]
    fn non_duration_word_joins_the_reason() {
        assert_eq!(
            split_duration_argument(Some("spam"), Some("in general")),
            (600, Some("spam in general".to_owned()))
        );
        assert_eq!(
            split_duration_argument(Some("rude"), None),
            (600, Some("rude".to_owned()))
        );
    }

    #[test]
    fn max_is_twenty_eight_days() {
        let (seconds, _) = split_duration_argument(Some("28d"), None);
        assert_eq!(seconds, MAX_TIMEOUT_SECS);
        let (seconds, _) = split_duration_argument(Some("29d"), None);
        assert!(seconds > MAX_TIMEOUT_SECS);
    }
}
