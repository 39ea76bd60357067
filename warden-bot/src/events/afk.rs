use poise::serenity_prelude as serenity;
use tracing::{error, warn};

use warden_commands::community::afk::{MAX_AFK_NOTICES, afk_notice, welcome_back_message};
use warden_core::Data;
use warden_database::impls::afk::{clear_afk, get_afk};
use warden_utils::parse::prefix_command_name;

/// Whether the message is a prefixed `afk` command, which must not clear the status it sets.
fn is_afk_invocation(content: &str) -> bool {
    prefix_command_name(content).is_some_and(|name| name.eq_ignore_ascii_case("afk"))
}

/// Distinct non-bot mentioned users other than the author, capped at the notice limit.
fn mention_candidates<'m>(
    author_id: serenity::UserId,
    mentions: &'m [serenity::User],
) -> Vec<&'m serenity::User> {
    let mut seen: Vec<&serenity::User> = Vec::new();
    for user in mentions {
        if user.bot || user.id == author_id || seen.iter().any(|known| known.id == user.id) {
            continue;
        }
        seen.push(user);
        if seen.len() == MAX_AFK_NOTICES {
            break;
        }
    }
    seen
}

pub async fn handle_message_afk(ctx: &serenity::Context, data: &Data, message: &serenity::Message) {
    if message.author.bot || message.webhook_id.is_some() {
        return;
    }

    if !is_afk_invocation(&message.content) {
        match clear_afk(&data.db, message.author.id.get()).await {
            Ok(Some(_)) => reply(ctx, message, welcome_back_message(message.author.id.get())).await,
            Ok(None) => {}
            Err(source) => error!(?source, user_id = message.author.id.get(), "failed to clear AFK"),
        }
    }

    let mut notices = Vec::new();
    for user in mention_candidates(message.author.id, &message.mentions) {
        match get_afk(&data.db, user.id.get()).await {
            Ok(Some(entry)) => {
                let name = user.global_name.as_deref().unwrap_or(&user.name);
                notices.push(afk_notice(name, &entry));
            }
            Ok(None) => {}
            Err(source) => error!(?source, user_id = user.id.get(), "failed to read AFK status"),
        }
    }

    if !notices.is_empty() {
        reply(ctx, message, notices.join("\n")).await;
    }
}

async fn reply(ctx: &serenity::Context, message: &serenity::Message, content: String) {
    let allowed = serenity::CreateAllowedMentions::new().users([message.author.id]);
    let builder = serenity::CreateMessage::new()
        .content(content)
        .reference_message(message)
        .allowed_mentions(allowed);
    if let Err(source) = message.channel_id.send_message(&ctx.http, builder).await {
        warn!(?source, channel_id = message.channel_id.get(), "failed to send AFK reply");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, bot: bool) -> serenity::User {
        let mut user = serenity::User::default();
        user.id = serenity::UserId::new(id);
        user.bot = bot;
        user
    }

    #[test]
    fn detects_afk_invocations() {
        assert!(is_afk_invocation("!afk lunch"));
        assert!(is_afk_invocation("  !AFK"));
        assert!(!is_afk_invocation("!afkk"));
        assert!(!is_afk_invocation("afk"));
        assert!(!is_afk_invocation("!ping afk"));
    }

    #[test]
    fn mentions_are_distinct_and_capped() {
        let mentions = vec![
            user(1, false),
            user(2, false),
            user(2, false),
            user(3, true),
            user(4, false),
            user(5, false),
            user(6, false),
            user(7, false),
            user(8, false),
        ];
        let ids: Vec<u64> = mention_candidates(serenity::UserId::new(1), &mentions)
            .iter()
            .map(|user| user.id.get())
            .collect();
        assert_eq!(ids, vec![2, 4, 5, 6, 7]);
    }
}
