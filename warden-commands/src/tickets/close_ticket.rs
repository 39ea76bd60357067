use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::guild_only_message;
use crate::tickets::closing::{CLOSED_MESSAGE, ClosingTicket, close_ticket_channel};
use crate::tickets::{can_close_ticket, resolve_ticket_settings};
use warden_core::{Context, Error};
use warden_database::impls::guild_config::get_guild_config;
use warden_database::impls::tickets::get_ticket_by_channel;
use warden_utils::permissions::{has_user_permission, member_has_role};

pub const META: CommandMeta = CommandMeta {
    name: "close_ticket",
    desc: "Close the ticket in this channel (staff only).",
    category: "tickets",
    usage: "!close_ticket",
};

/// Close the ticket in this channel.
#[poise::command(prefix_command, slash_command, category = "Tickets")]
pub async fn close_ticket(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let data = ctx.data();
    let settings = resolve_ticket_settings(
        &get_guild_config(&data.db, guild_id.get()).await?,
        &data.ticket_defaults,
    );
    let staff_role_id = settings.staff_role_id.map(serenity::RoleId::new);

    let is_staff = match staff_role_id {
        Some(role_id) => member_has_role(ctx.http(), guild_id, ctx.author().id, role_id).await?,
        None => false,
    };
    let can_manage_channels = has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_CHANNELS,
    )
    .await?;

    if !can_close_ticket(false, is_staff, can_manage_channels) {
        ctx.send(
            poise::CreateReply::default()
                .content("You don't have permission to close this ticket.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let channel_id = ctx.channel_id();
    let ticket = get_ticket_by_channel(&data.db, channel_id.get()).await?;
    let Some(ticket) = ticket.filter(|ticket| ticket.is_open()) else {
        ctx.send(
            poise::CreateReply::default()
                .content("This channel is not an open ticket.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };

    ctx.defer().await?;

    let channel_name = match ctx.guild_channel().await {
        Some(channel) => channel.name,
        None => format!("ticket-{}", ticket.id),
    };

    let closing = ClosingTicket {
        guild_id,
        channel_id,
        channel_name: &channel_name,
        owner_id: serenity::UserId::new(ticket.owner_user_id),
        staff_role_id,
        closed_by: ctx.author().id,
    };

    close_ticket_channel(ctx.http(), data, closing, |attachment| async move {
        ctx.send(
            poise::CreateReply::default()
                .content(CLOSED_MESSAGE)
                .attachment(attachment),
        )
        .await
        .map(|_| ())
    })
    .await
}
