use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{NO_REASON, usage_message};
use crate::moderation::{CompletedAction, finish_action, guild_with_permission};
use warden_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "unban",
    desc: "Unban a user from the server.",
    category: "moderation",
    usage: "!unban <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn unban(
    ctx: Context<'_>,
    #[description = "The user to unban"] user: Option<serenity::User>,
    #[description = "Reason for the unban"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::BAN_MEMBERS).await? else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if let Err(source) = guild_id.unban(ctx.http(), user.id).await {
        error!(?source, "unban request failed");
        ctx.say("I couldn't unban that user. They may not be banned, or I lack permissions.")
            .await?;
        return Ok(());
    }

    let reason = reason.unwrap_or_else(|| NO_REASON.to_owned());
    finish_action(
        &ctx,
        guild_id,
        CompletedAction {
            target: &user,
            action: "unban",
            past_tense: "unbanned",
            reason: &reason,
            duration_seconds: None,
        },
    )
    .await
}
