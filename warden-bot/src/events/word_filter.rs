use std::time::{Duration, SystemTime, UNIX_EPOCH};

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use warden_commands::moderation::{record_and_publish_case, send_moderation_target_dm_for_guild};
use warden_core::Data;
use warden_database::impls::cases::NewCase;
use warden_database::impls::warnings::record_warning;
use warden_database::impls::word_filter::{
    get_all_filter_words_for_guild, get_word_filter_if_enabled,
};
use warden_database::model::word_filter::{
    ACTION_DELETE, ACTION_TIMEOUT, ACTION_WARN, action_deletes_message,
};
use warden_utils::formatting::format_compact_duration;
use warden_utils::parse::prefix_command_name;
use warden_utils::permissions::{has_user_permission, is_missing_permissions_error};
use warden_utils::text::find_filtered_word;

const FILTER_TIMEOUT: Duration = Duration::from_secs(5 * 60);

fn case_action(action: &str) -> &'static str {
    match action {
        ACTION_DELETE => "word_filter_delete",
        ACTION_WARN => "word_filter_warn",
        ACTION_TIMEOUT => "word_filter_timeout",
        _ => "word_filter_log",
    }
}

/// `wordfilter` invocations name blocked words on purpose; managers using it are not filtered.
fn is_filter_management(content: &str) -> bool {
    prefix_command_name(content).is_some_and(|name| name.eq_ignore_ascii_case("wordfilter"))
}

async fn can_manage_filter(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> bool {
    match has_user_permission(&ctx.http, guild_id, user_id, serenity::Permissions::MANAGE_GUILD).await {
        Ok(allowed) => allowed,
        Err(source) => {
            warn!(?source, user_id = user_id.get(), "failed to resolve word filter manager permissions");
            false
        }
    }
}

/// Run the guild's word filter against a message.
///
/// Returns `true` when the message was deleted.
pub async fn handle_message_word_filter(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> bool {
    if message.author.bot || message.webhook_id.is_some() {
        return false;
    }
    let Some(guild_id) = message.guild_id else {
        return false;
    };
    if is_filter_management(&message.content)
        && can_manage_filter(ctx, guild_id, message.author.id).await
    {
        return false;
    }

    let config = match get_word_filter_if_enabled(&data.db, guild_id.get()).await {
        Ok(Some(config)) => config,
        Ok(None) => return false,
        Err(source) => {
            error!(?source, guild_id = guild_id.get(), "failed to read word filter config");
            return false;
        }
    };

    let words = match get_all_filter_words_for_guild(&data.db, guild_id.get()).await {
        Ok(words) => words,
        Err(source) => {
            error!(?source, guild_id = guild_id.get(), "failed to load word filter list");
            return false;
        }
    };

    let Some(matched) = find_filtered_word(&message.content, &words) else {
        return false;
    };
    let action = config.action.as_str();
    let bot_user_id = ctx.cache.current_user().id.get();
    let reason = format!("Word filter: {matched}");

    info!(
        guild_id = guild_id.get(),
        channel_id = message.channel_id.get(),
        user_id = message.author.id.get(),
        action,
        "word filter hit"
    );

    let removed = action_deletes_message(action) && delete_message(ctx, message).await;

    match action {
        ACTION_WARN => {
            if let Err(source) = record_warning(
                &data.db,
                guild_id.get(),
                message.author.id.get(),
                bot_user_id,
                &reason,
            )
            .await
            {
                error!(?source, "failed to record word filter warning");
            }
            notify_target(ctx, &message.author, guild_id, "warned", &reason, None).await;
        }
        ACTION_TIMEOUT => {
            timeout_author(ctx, guild_id, &message.author, &reason).await;
            let duration = format_compact_duration(FILTER_TIMEOUT.as_secs());
            notify_target(ctx, &message.author, guild_id, "timed out", &reason, Some(&duration))
                .await;
        }
        _ => {}
    }

    let new_case = NewCase {
        guild_id: guild_id.get(),
        target_user_id: Some(message.author.id.get()),
        moderator_user_id: bot_user_id,
        action: case_action(action),
        reason: matched,
        status: "completed",
        duration_seconds: (action == ACTION_TIMEOUT).then_some(FILTER_TIMEOUT.as_secs()),
    };
    record_and_publish_case(&ctx.http, &data.db, new_case).await;

    removed
}

async fn delete_message(ctx: &serenity::Context, message: &serenity::Message) -> bool {
    match message.delete(&ctx.http).await {
        Ok(()) => true,
        Err(source) if is_missing_permissions_error(&source) => {
            warn!(
                channel_id = message.channel_id.get(),
                "missing permissions to delete filtered message"
            );
            false
        }
        Err(source) => {
            error!(?source, "failed to delete filtered message");
            false
        }
    }
}

async fn timeout_author(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    author: &serenity::User,
    reason: &str,
) {
    let until_unix = SystemTime::now()
        .checked_add(FILTER_TIMEOUT)
        .and_then(|until| until.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |until| until.as_secs());
    let Some(until) = i64::try_from(until_unix)
        .ok()
        .and_then(|secs| serenity::Timestamp::from_unix_timestamp(secs).ok())
    else {
        return;
    };

    let edit = serenity::EditMember::new()
        .disable_communication_until_datetime(until)
        .audit_log_reason(reason);
    match guild_id.edit_member(&ctx.http, author.id, edit).await {
        Ok(_) => {}
        Err(source) if is_missing_permissions_error(&source) => {
            warn!(
                user_id = author.id.get(),
                "missing permissions to time out word filter offender"
            );
        }
        Err(source) => error!(?source, "failed to time out word filter offender"),
    }
}

async fn notify_target(
    ctx: &serenity::Context,
    target: &serenity::User,
    guild_id: serenity::GuildId,
    past_tense: &str,
    reason: &str,
    duration: Option<&str>,
) {
    if let Err(source) = send_moderation_target_dm_for_guild(
        &ctx.http,
        target,
        guild_id,
        past_tense,
        Some(reason),
        duration,
    )
    .await
    {
        warn!(?source, user_id = target.id.get(), "could not DM word filter offender");
    }
}

#[cfg(test)]
mod tests {
    use super::{case_action, is_filter_management};

    #[test]
    fn case_actions_follow_filter_action() {
        assert_eq!(case_action("delete_and_log"), "word_filter_delete");
        assert_eq!(case_action("warn_and_log"), "word_filter_warn");
        assert_eq!(case_action("timeout_delete_and_log"), "word_filter_timeout");
        assert_eq!(case_action("log_only"), "word_filter_log");
    }

    #[test]
    fn filter_management_commands_are_exempt() {
        assert!(is_filter_management("!wordfilter remove bad"));
        assert!(is_filter_management("!WordFilter add bad"));
        assert!(!is_filter_management("this is bad"));
        assert!(!is_filter_management("!warn @someone bad"));
    }
}
