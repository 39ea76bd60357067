use tracing::info;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::usage_message;
use warden_core::{Context, Error};
use warden_database::impls::now_unix_secs;
use warden_database::impls::premium::{get_premium, grant_premium, revoke_premium};
use warden_database::model::premium::PremiumGrant;
use warden_utils::formatting::{discord_timestamp_pair, format_compact_duration};
use warden_utils::parse::parse_duration_seconds;

pub const META: CommandMeta = CommandMeta {
    name: "premium",
    desc: "Check premium status; owners can grant or revoke it.",
    category: "community",
    usage: "!premium [status [user]|grant <user> <duration>|revoke <user>]",
};

fn status_line(user_id: u64, grant: Option<&PremiumGrant>, now: u64) -> String {
    match grant {
        Some(grant) if grant.is_active(now) => format!(
            "<@{user_id}> has **active** premium, expiring {}.",
            discord_timestamp_pair(grant.expires_at)
        ),
        Some(grant) => format!(
            "<@{user_id}>'s premium **expired** {}.",
            discord_timestamp_pair(grant.expires_at)
        ),
        None => format!("<@{user_id}> has **no** premium."),
    }
}

#[poise::command(
    prefix_command,
    slash_command,
    category = "Community",
    subcommands("status", "grant", "revoke")
)]
pub async fn premium(ctx: Context<'_>) -> Result<(), Error> {
    show_status(ctx, ctx.author().id).await
}

/// Show premium status for you or another user.
#[poise::command(prefix_command, slash_command, category = "Community")]
pub async fn status(
    ctx: Context<'_>,
    #[description = "User to check (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let user_id = user.map_or(ctx.author().id, |user| user.id);
    show_status(ctx, user_id).await
}

async fn show_status(ctx: Context<'_>, user_id: serenity::UserId) -> Result<(), Error> {
    let grant = get_premium(&ctx.data().db, user_id.get()).await?;
    ctx.say(status_line(user_id.get(), grant.as_ref(), now_unix_secs()))
        .await?;
    Ok(())
}

/// Grant or extend premium.
#[poise::command(prefix_command, slash_command, owners_only, category = "Community")]
pub async fn grant(
    ctx: Context<'_>,
    #[description = "User to grant premium to"] user: Option<serenity::User>,
    #[description = "Duration such as 30d or 1w"] duration: Option<String>,
) -> Result<(), Error> {
    let (Some(user), Some(seconds)) = (user, duration.as_deref().and_then(parse_duration_seconds))
    else {
        ctx.say(usage_message("!premium grant <user> <duration>")).await?;
        return Ok(());
    };

    let grant = grant_premium(&ctx.data().db, user.id.get(), ctx.author().id.get(), seconds).await?;
    info!(
        user_id = user.id.get(),
        granted_by = ctx.author().id.get(),
        expires_at = grant.expires_at,
        "premium granted"
    );

    ctx.say(format!(
        "Granted {} of premium to <@{}>. It now expires {}.",
        format_compact_duration(seconds),
        user.id.get(),
        discord_timestamp_pair(grant.expires_at)
    ))
    .await?;
    Ok(())
}

/// Remove premium.
#[poise::command(prefix_command, slash_command, owners_only, category = "Community")]
pub async fn revoke(
    ctx: Context<'_>,
    #[description = "User to revoke premium from"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(user) = user else {
        ctx.say(usage_message("!premium revoke <user>")).await?;
        return Ok(());
    };

    let reply = if revoke_premium(&ctx.data().db, user.id.get()).await? {
        info!(user_id = user.id.get(), revoked_by = ctx.author().id.get(), "premium revoked");
        format!("Revoked premium from <@{}>.", user.id.get())
    } else {
        format!("<@{}> had no premium to revoke.", user.id.get())
    };
    ctx.say(reply).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant_expiring(expires_at: u64) -> PremiumGrant {
        PremiumGrant {
            user_id: 1,
            expires_at,
            granted_by: 2,
            granted_at: 0,
        }
    }

    #[test]
    fn status_lines() {
        assert!(status_line(1, Some(&grant_expiring(200)), 100).contains("**active**"));
        assert!(status_line(1, Some(&grant_expiring(100)), 100).contains("**expired**"));
        assert_eq!(status_line(1, None, 100), "<@1> has **no** premium.");
    }
}
