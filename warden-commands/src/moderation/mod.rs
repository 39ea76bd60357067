pub mod ban;
pub mod kick;
pub mod modlogchannel;
pub mod modlogs;
pub mod notes;
pub mod purge;
pub mod timeout;
pub mod unban;
pub mod untimeout;
pub mod unwarn;
pub mod warn;
pub mod warnings;

pub(crate) mod embeds;
pub mod logging;

pub use embeds::send_moderation_target_dm_for_guild;
pub use logging::record_and_publish_case;

use poise::serenity_prelude as serenity;

use warden_core::{Context, Error};
use warden_database::impls::cases::NewCase;
use warden_utils::formatting::format_compact_duration;
use warden_utils::permissions::has_user_permission;

use embeds::{
    guild_only_message, moderation_action_embed, permission_denied_message,
    target_profile_from_user,
};
use logging::case_label;

/// Resolve the guild and check the author's permission, replying when either is missing.
pub(crate) async fn guild_with_permission(
    ctx: &Context<'_>,
    required: serenity::Permissions,
) -> Result<Option<serenity::GuildId>, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(None);
    };

    if !has_user_permission(ctx.http(), guild_id, ctx.author().id, required).await? {
        ctx.say(permission_denied_message()).await?;
        return Ok(None);
    }

    Ok(Some(guild_id))
}

/// A moderation action that already succeeded against `target`.
pub(crate) struct CompletedAction<'a> {
    pub target: &'a serenity::User,
    pub action: &'a str,
    pub past_tense: &'a str,
    pub reason: &'a str,
    pub duration_seconds: Option<u64>,
}

/// Record the case, publish it, and reply with the action embed footed by the case label.
pub(crate) async fn finish_action(
    ctx: &Context<'_>,
    guild_id: serenity::GuildId,
    completed: CompletedAction<'_>,
) -> Result<(), Error> {
    let case = record_and_publish_case(
        ctx.http(),
        &ctx.data().db,
        NewCase {
            guild_id: guild_id.get(),
            target_user_id: Some(completed.target.id.get()),
            moderator_user_id: ctx.author().id.get(),
            action: completed.action,
            reason: completed.reason,
            status: "active",
            duration_seconds: completed.duration_seconds,
        },
    )
    .await;

    let duration_label = completed.duration_seconds.map(format_compact_duration);
    let mut embed = moderation_action_embed(
        &target_profile_from_user(completed.target),
        completed.target.id,
        completed.past_tense,
        completed.reason,
        duration_label.as_deref(),
    );
    if let Some(case) = case {
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!("#{}", case_label(&case))));
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
