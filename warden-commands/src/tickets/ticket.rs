use std::future::Future;

use tracing::{info, warn};

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::guild_only_message;
use crate::tickets::{TicketSettings, close_button, resolve_ticket_settings};
use warden_core::{Context, Error};
use warden_database::impls::guild_config::get_guild_config;
use warden_database::Database;
use warden_database::impls::tickets::{create_ticket, delete_ticket_for_channel, open_ticket_for_owner};
use warden_utils::embed::TICKET_EMBED_COLOR;
use warden_utils::text::{safe_channel_name, truncate_chars};

pub const META: CommandMeta = CommandMeta {
    name: "ticket",
    desc: "Open a private support ticket with the staff team.",
    category: "tickets",
    usage: "/ticket [reason] [image]",
};

const REASON_FIELD_LIMIT: usize = 1024;

/// Ticket channel name, falling back to `<name>-<user id>` when the plain name is taken.
fn ticket_channel_name<'a>(
    prefix: &str,
    username: &str,
    user_id: u64,
    existing: impl IntoIterator<Item = &'a str>,
) -> String {
    let base = safe_channel_name(&format!("{prefix}{username}"));
    let base = if base.is_empty() {
        format!("ticket-{user_id}")
    } else {
        base
    };

    if existing.into_iter().any(|name| name == base) {
        format!("{base}-{user_id}")
    } else {
        base
    }
}

fn ticket_overwrites(
    guild_id: serenity::GuildId,
    owner_id: serenity::UserId,
    staff_role_id: Option<serenity::RoleId>,
) -> Vec<serenity::PermissionOverwrite> {
    use serenity::Permissions as P;

    let mut overwrites = vec![
        serenity::PermissionOverwrite {
            allow: P::empty(),
            deny: P::VIEW_CHANNEL,
            kind: serenity::PermissionOverwriteType::Role(serenity::RoleId::new(guild_id.get())),
        },
        serenity::PermissionOverwrite {
            allow: P::VIEW_CHANNEL
                | P::SEND_MESSAGES
                | P::ATTACH_FILES
                | P::EMBED_LINKS
                | P::READ_MESSAGE_HISTORY,
            deny: P::empty(),
            kind: serenity::PermissionOverwriteType::Member(owner_id),
        },
    ];

    if let Some(staff_role_id) = staff_role_id {
        overwrites.push(serenity::PermissionOverwrite {
            allow: P::VIEW_CHANNEL | P::SEND_MESSAGES | P::MANAGE_MESSAGES | P::READ_MESSAGE_HISTORY,
            deny: P::empty(),
            kind: serenity::PermissionOverwriteType::Role(staff_role_id),
        });
    }

    overwrites
}

async fn ensure_category(
    ctx: &Context<'_>,
    guild_id: serenity::GuildId,
    channels: &[serenity::GuildChannel],
    name: &str,
) -> Result<serenity::ChannelId, Error> {
    if let Some(category) = channels
        .iter()
        .find(|channel| channel.kind == serenity::ChannelType::Category && channel.name == name)
    {
        return Ok(category.id);
    }

    let category = guild_id
        .create_channel(
            ctx.http(),
            serenity::CreateChannel::new(name).kind(serenity::ChannelType::Category),
        )
        .await?;
    info!(guild_id = guild_id.get(), name, "created ticket category");
    Ok(category.id)
}

/// Run `rollback` when `result` is an error, then hand `result` back.
async fn rollback_on_err<T, E, R, Fut>(result: Result<T, E>, rollback: R) -> Result<T, E>
where
    R: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    if result.is_err() {
        rollback().await;
    }
    result
}

/// Remove a half-created ticket: its row, if any, and its channel.
async fn discard_ticket_channel(http: &serenity::Http, db: &Database, channel_id: serenity::ChannelId) {
    if let Err(source) = delete_ticket_for_channel(db, channel_id.get()).await {
        warn!(?source, channel_id = channel_id.get(), "failed to remove discarded ticket row");
    }
    if let Err(source) = channel_id.delete(http).await {
        warn!(?source, channel_id = channel_id.get(), "failed to delete discarded ticket channel");
    }
}

/// Open a support ticket.
#[poise::command(slash_command, category = "Tickets")]
pub async fn ticket(
    ctx: Context<'_>,
    #[description = "Short reason for the ticket"] reason: Option<String>,
    #[description = "Optional image attachment"] image: Option<serenity::Attachment>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    ctx.defer_ephemeral().await?;

    let data = ctx.data();
    let author = ctx.author();

    if let Some(open) = open_ticket_for_owner(&data.db, guild_id.get(), author.id.get()).await? {
        ctx.say(format!("You already have an open ticket: <#{}>", open.channel_id))
            .await?;
        return Ok(());
    }

    let config = get_guild_config(&data.db, guild_id.get()).await?;
    let TicketSettings {
        staff_role_id,
        category_name,
        channel_prefix,
    } = resolve_ticket_settings(&config, &data.ticket_defaults);

    let channels: Vec<serenity::GuildChannel> =
        guild_id.channels(ctx.http()).await?.into_values().collect();
    let category_id = ensure_category(&ctx, guild_id, &channels, &category_name).await?;

    let staff_role_id = match staff_role_id.map(serenity::RoleId::new) {
        Some(role_id) if guild_id.roles(ctx.http()).await?.contains_key(&role_id) => Some(role_id),
        _ => None,
    };

    let channel_name = ticket_channel_name(
        &channel_prefix,
        &author.name,
        author.id.get(),
        channels.iter().map(|channel| channel.name.as_str()),
    );

    let channel = guild_id
        .create_channel(
            ctx.http(),
            serenity::CreateChannel::new(&channel_name)
                .kind(serenity::ChannelType::Text)
                .category(category_id)
                .permissions(ticket_overwrites(guild_id, author.id, staff_role_id))
                .audit_log_reason(&format!("Ticket created by {}", author.tag())),
        )
        .await?;

    let reason = reason.map(|reason| reason.trim().to_owned()).filter(|reason| !reason.is_empty());

    let http = ctx.http();
    let db = &data.db;
    let channel_id = channel.id;
    let discard = move || discard_ticket_channel(http, db, channel_id);

    let created = rollback_on_err(
        create_ticket(
            db,
            guild_id.get(),
            channel_id.get(),
            author.id.get(),
            reason.as_deref(),
        )
        .await,
        discard,
    )
    .await?;
    if created.is_none() {
        discard().await;
        let reply = match open_ticket_for_owner(db, guild_id.get(), author.id.get()).await? {
            Some(open) => format!("You already have an open ticket: <#{}>", open.channel_id),
            None => "You already have an open ticket.".to_owned(),
        };
        ctx.say(reply).await?;
        return Ok(());
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("New Ticket")
        .color(TICKET_EMBED_COLOR)
        .timestamp(serenity::Timestamp::now())
        .field("User", format!("<@{}> ({})", author.id.get(), author.tag()), false);
    if let Some(reason) = reason.as_deref() {
        embed = embed.field("Reason", truncate_chars(reason, REASON_FIELD_LIMIT), false);
    }
    if let Some(image) = image.as_ref() {
        embed = embed.image(&image.url);
    }

    let welcome = channel
        .send_message(
            http,
            serenity::CreateMessage::new()
                .content(format!(
                    "<@{}> Thank you, a staff member will be with you shortly.",
                    author.id.get()
                ))
                .embed(embed)
                .components(vec![serenity::CreateActionRow::Buttons(vec![close_button(
                    author.id.get(),
                )])]),
        )
        .await;
    rollback_on_err(welcome, discard).await?;

    info!(
        guild_id = guild_id.get(),
        channel_id = channel.id.get(),
        owner_id = author.id.get(),
        "ticket opened"
    );

    ctx.say(format!("Ticket created: <#{}>", channel.id.get())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn failed_steps_roll_back() {
        let rolled_back = Cell::new(false);
        let flag = &rolled_back;

        let result = rollback_on_err(Err::<(), _>("insert failed"), move || async move {
            flag.set(true);
        })
        .await;
        assert_eq!(result, Err("insert failed"));
        assert!(rolled_back.get());
    }

    #[tokio::test]
    async fn successful_steps_keep_the_channel() {
        let rolled_back = Cell::new(false);
        let flag = &rolled_back;

        let result = rollback_on_err(Ok::<_, &str>(7), move || async move {
            flag.set(true);
        })
        .await;
        assert_eq!(result, Ok(7));
        assert!(!rolled_back.get());
    }

    #[test]
    fn channel_name_from_prefix_and_username() {
        assert_eq!(ticket_channel_name("ticket-", "Bob.Smith", 7, std::iter::empty()), "ticket-bob-smith");
    }

    #[test]
    fn taken_names_get_the_user_id() {
        assert_eq!(
            ticket_channel_name("ticket-", "bob", 7, ["general", "ticket-bob"]),
            "ticket-bob-7"
        );
    }

    #[test]
    fn unusable_names_fall_back_to_the_id() {
        assert_eq!(ticket_channel_name("", "!!!", 7, std::iter::empty()), "ticket-7");
    }

    #[test]
    fn staff_overwrite_only_when_configured() {
        let guild = serenity::GuildId::new(1);
        let owner = serenity::UserId::new(2);
        assert_eq!(ticket_overwrites(guild, owner, None).len(), 2);

        let with_staff = ticket_overwrites(guild, owner, Some(serenity::RoleId::new(3)));
        assert_eq!(with_staff.len(), 3);
        assert!(with_staff[2].allow.contains(serenity::Permissions::MANAGE_MESSAGES));
        assert!(with_staff[0].deny.contains(serenity::Permissions::VIEW_CHANNEL));
    }
}
