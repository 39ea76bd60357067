use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{NO_REASON, usage_message};
use crate::moderation::{CompletedAction, finish_action, guild_with_permission};
use warden_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "untimeout",
    desc: "Remove an active timeout from a user.",
    category: "moderation",
    usage: "!untimeout <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn untimeout(
    ctx: Context<'_>,
    #[description = "The user to release"] user: Option<serenity::User>,
    #[description = "Reason for removing the timeout"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MODERATE_MEMBERS).await?
    else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let reason = reason.unwrap_or_else(|| NO_REASON.to_owned());
    let edit = serenity::EditMember::new()
        .enable_communication()
        .audit_log_reason(&reason);

    if let Err(source) = guild_id.edit_member(ctx.http(), user.id, edit).await {
        error!(?source, "untimeout request failed");
        ctx.say("I couldn't remove that timeout. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    finish_action(
        &ctx,
        guild_id,
        CompletedAction {
            target: &user,
            action: "untimeout",
            past_tense: "released from timeout",
            reason: &reason,
            duration_seconds: None,
        },
    )
    .await
}
