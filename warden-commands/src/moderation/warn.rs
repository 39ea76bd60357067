use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    NO_REASON, send_moderation_target_dm_for_guild, target_refusal, usage_message,
};
use crate::moderation::{CompletedAction, finish_action, guild_with_permission};
use warden_core::{Context, Error};
use warden_database::impls::warnings::record_warning;

pub const META: CommandMeta = CommandMeta {
    name: "warn",
    desc: "Issue a warning to a user.",
    category: "moderation",
    usage: "!warn <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "The user to warn"] user: Option<serenity::User>,
    #[description = "Reason for warning"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_MESSAGES).await?
    else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if let Some(refusal) = target_refusal(ctx.author().id, &user, "warn") {
        ctx.say(refusal).await?;
        return Ok(());
    }

    let reason = reason.unwrap_or_else(|| NO_REASON.to_owned());
    let warning = record_warning(
        &ctx.data().db,
        guild_id.get(),
        user.id.get(),
        ctx.author().id.get(),
        &reason,
    )
    .await?;

    let _ = send_moderation_target_dm_for_guild(
        ctx.http(),
        &user,
        guild_id,
        "warned",
        Some(&reason),
        None,
    )
    .await;

    let past_tense = format!("warned (warning #{})", warning.warn_number);
    finish_action(
        &ctx,
        guild_id,
        CompletedAction {
            target: &user,
            action: "warn",
            past_tense: &past_tense,
            reason: &reason,
            duration_seconds: None,
        },
    )
    .await
}
