use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::usage_message;
use crate::moderation::guild_with_permission;
use crate::moderation::logging::{case_label, record_and_publish_case};
use warden_core::{Context, Error};
use warden_database::impls::cases::NewCase;
use warden_database::impls::warnings::{clear_warnings, remove_warning_by_number};

pub const META: CommandMeta = CommandMeta {
    name: "unwarn",
    desc: "Remove a warning by number, or clear all warnings for a user.",
    category: "moderation",
    usage: "!unwarn <user> <warn_number|all>",
};

#[derive(Debug, PartialEq, Eq)]
enum Selector {
    All,
    Number(usize),
}

fn parse_selector(raw: &str) -> Result<Selector, &'static str> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("all") {
        return Ok(Selector::All);
    }

    match raw.trim_start_matches('#').parse::<usize>() {
        Ok(0) => Err("Warning number must be 1 or greater."),
        Ok(number) => Ok(Selector::Number(number)),
        Err(_) => Err("Selector must be a warning number or 'all'."),
    }
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn unwarn(
    ctx: Context<'_>,
    #[description = "The user to modify warnings for"] user: Option<serenity::User>,
    #[description = "Warning number or 'all'"] selector: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_MESSAGES).await?
    else {
        return Ok(());
    };

    let (Some(user), Some(selector)) = (user, selector) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let selector = match parse_selector(&selector) {
        Ok(selector) => selector,
        Err(message) => {
            ctx.say(message).await?;
            return Ok(());
        }
    };

    let db = &ctx.data().db;
    let (action, reason, reply) = match selector {
        Selector::All => {
            let removed = clear_warnings(db, guild_id.get(), user.id.get()).await?;
            (
                "unwarn_all",
                format!("Cleared {removed} warning(s)"),
                format!("Removed {removed} warning(s) for <@{}>.", user.id.get()),
            )
        }
        Selector::Number(number) => {
            if !remove_warning_by_number(db, guild_id.get(), user.id.get(), number).await? {
                ctx.say(format!(
                    "Warning #{number} was not found for <@{}>.",
                    user.id.get()
                ))
                .await?;
                return Ok(());
            }
            (
                "unwarn",
                format!("Removed warning #{number}"),
                format!("Removed warning #{number} for <@{}>.", user.id.get()),
            )
        }
    };

    let case = record_and_publish_case(
        ctx.http(),
        db,
        NewCase {
            guild_id: guild_id.get(),
            target_user_id: Some(user.id.get()),
            moderator_user_id: ctx.author().id.get(),
            action,
            reason: &reason,
            status: "completed",
            duration_seconds: None,
        },
    )
    .await;

    let reply = match case {
        Some(case) => format!("{reply} (#{})", case_label(&case)),
        None => reply,
    };
    ctx.say(reply).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors() {
        assert_eq!(parse_selector("all"), Ok(Selector::All));
        assert_eq!(parse_selector(" 3 "), Ok(Selector::Number(3)));
        assert_eq!(parse_selector("#2"), Ok(Selector::Number(2)));
        assert!(parse_selector("0").is_err());
        assert!(parse_selector("first").is_err());
    }
}
