use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    NO_REASON, send_moderation_target_dm_for_guild, target_refusal, usage_message,
};
use crate::moderation::{CompletedAction, finish_action, guild_with_permission};
use warden_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "kick",
    desc: "Kick a user from the server.",
    category: "moderation",
    usage: "!kick <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "The user to kick"] user: Option<serenity::User>,
    #[description = "Reason for the kick"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::KICK_MEMBERS).await? else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if let Some(refusal) = target_refusal(ctx.author().id, &user, "kick") {
        ctx.say(refusal).await?;
        return Ok(());
    }

    let reason = reason.unwrap_or_else(|| NO_REASON.to_owned());

    let _ = send_moderation_target_dm_for_guild(
        ctx.http(),
        &user,
        guild_id,
        "kicked",
        Some(&reason),
        None,
    )
    .await;

    if let Err(source) = guild_id.kick_with_reason(ctx.http(), user.id, &reason).await {
        error!(?source, "kick request failed");
        ctx.say("I couldn't kick that user. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    finish_action(
        &ctx,
        guild_id,
        CompletedAction {
            target: &user,
            action: "kick",
            past_tense: "kicked",
            reason: &reason,
            duration_seconds: None,
        },
    )
    .await
}
