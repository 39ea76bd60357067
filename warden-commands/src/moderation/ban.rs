use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    NO_REASON, send_moderation_target_dm_for_guild, target_refusal, usage_message,
};
use crate::moderation::{CompletedAction, finish_action, guild_with_permission};
use warden_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "ban",
    desc: "Ban a user from the server.",
    category: "moderation",
    usage: "!ban <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "The user to ban"] user: Option<serenity::User>,
    #[description = "Reason for the ban"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::BAN_MEMBERS).await? else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if let Some(refusal) = target_refusal(ctx.author().id, &user, "ban") {
        ctx.say(refusal).await?;
        return Ok(());
    }

    let reason = reason.unwrap_or_else(|| NO_REASON.to_owned());

    // Once banned the user no longer shares a guild with the bot, so DM first.
    let _ = send_moderation_target_dm_for_guild(
        ctx.http(),
        &user,
        guild_id,
        "banned",
        Some(&reason),
        None,
    )
    .await;

    if let Err(source) = guild_id.ban_with_reason(ctx.http(), user.id, 0, &reason).await {
        error!(?source, "ban request failed");
        ctx.say("I couldn't ban that user. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    finish_action(
        &ctx,
        guild_id,
        CompletedAction {
            target: &user,
            action: "ban",
            past_tense: "banned",
            reason: &reason,
            duration_seconds: None,
        },
    )
    .await
}
