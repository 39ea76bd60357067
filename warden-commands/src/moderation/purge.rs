use tokio::time::{Duration, sleep};
use tracing::{error, warn};

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::usage_message;
use crate::moderation::guild_with_permission;
use crate::moderation::logging::record_and_publish_case;
use warden_core::{Context, Error};
use warden_database::impls::cases::NewCase;
use warden_utils::permissions::is_missing_permissions_error;

pub const META: CommandMeta = CommandMeta {
    name: "purge",
    desc: "Delete the latest messages in this channel.",
    category: "moderation",
    usage: "!purge <amount>",
};

const MAX_PURGE: u8 = 100;
const CONFIRMATION_LIFETIME: Duration = Duration::from_secs(3);

/// Messages to fetch before the invocation; a prefix invocation is deleted on its own.
fn fetch_limit(requested: u8) -> u8 {
    requested.min(MAX_PURGE)
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn purge(
    ctx: Context<'_>,
    #[description = "Amount of messages to purge (1-100)"] amount: Option<u8>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_MESSAGES).await?
    else {
        return Ok(());
    };

    let Some(requested) = amount.filter(|amount| *amount > 0) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let invocation_id = match ctx {
        poise::Context::Prefix(prefix) => Some(prefix.msg.id),
        poise::Context::Application(_) => None,
    };
    let is_prefix = invocation_id.is_some();
    if !is_prefix {
        ctx.defer_ephemeral().await?;
    }

    let channel_id = ctx.channel_id();
    let mut request = serenity::GetMessages::new().limit(fetch_limit(requested));
    if let Some(invocation_id) = invocation_id {
        request = request.before(invocation_id);
    }
    let ids: Vec<serenity::MessageId> = channel_id
        .messages(ctx.http(), request)
        .await?
        .into_iter()
        .map(|message| message.id)
        .collect();

    if let Some(invocation_id) = invocation_id
        && let Err(source) = channel_id.delete_message(ctx.http(), invocation_id).await
    {
        warn!(?source, "failed to delete purge invocation");
    }

    let deleted = ids.len();
    let delete_result = match ids.as_slice() {
        [] => Ok(()),
        [only] => channel_id.delete_message(ctx.http(), *only).await,
        _ => channel_id.delete_messages(ctx.http(), &ids).await,
    };

    if let Err(source) = delete_result {
        if !is_missing_permissions_error(&source) {
            error!(?source, "purge delete request failed");
        }
        ctx.say("I couldn't delete messages. I likely need the 'Manage Messages' permission.")
            .await?;
        return Ok(());
    }

    let reason = format!("Purged {deleted} message(s) in <#{}>", channel_id.get());
    record_and_publish_case(
        ctx.http(),
        &ctx.data().db,
        NewCase {
            guild_id: guild_id.get(),
            target_user_id: None,
            moderator_user_id: ctx.author().id.get(),
            action: "purge",
            reason: &reason,
            status: "completed",
            duration_seconds: None,
        },
    )
    .await;

    let confirmation = ctx.say(format!("Purged {deleted} message(s).")).await?;
    if is_prefix {
        sleep(CONFIRMATION_LIFETIME).await;
        let _ = confirmation.delete(ctx).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::fetch_limit;

    #[test]
    fn full_purge_is_not_reduced_by_the_invocation() {
        assert_eq!(fetch_limit(100), 100);
        assert_eq!(fetch_limit(10), 10);
    }

    #[test]
    fn fetch_is_capped_at_one_hundred() {
        assert_eq!(fetch_limit(200), 100);
    }
}
