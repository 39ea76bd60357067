use std::future::Future;

use tracing::{error, info, warn};

use poise::serenity_prelude as serenity;

use crate::tickets::{
    can_close_ticket, close_button, closed_channel_name, parse_close_button_id,
    resolve_ticket_settings,
};
use warden_core::{Data, Error};
use warden_database::impls::guild_config::get_guild_config;
use warden_database::impls::tickets::{close_ticket, get_ticket_by_channel};
use warden_database::model::tickets::Ticket;
use warden_utils::permissions::permits;
use warden_utils::transcript::{fetch_transcript_entries, render_transcript, transcript_filename};

pub const CLOSED_MESSAGE: &str = "Ticket closed. Transcript attached.";

/// A ticket channel about to be closed.
pub struct ClosingTicket<'a> {
    pub guild_id: serenity::GuildId,
    pub channel_id: serenity::ChannelId,
    pub channel_name: &'a str,
    pub owner_id: serenity::UserId,
    pub staff_role_id: Option<serenity::RoleId>,
    pub closed_by: serenity::UserId,
}

/// Run the closing sequence: transcript, lock, rename, and the database update.
///
/// `post_transcript` publishes the transcript in the channel; when it fails the
/// owner gets the transcript by DM instead. Discord-side failures after the
/// transcript are logged and do not abort the sequence.
pub async fn close_ticket_channel<F, Fut>(
    http: &serenity::Http,
    data: &Data,
    closing: ClosingTicket<'_>,
    post_transcript: F,
) -> Result<(), Error>
where
    F: FnOnce(serenity::CreateAttachment) -> Fut,
    Fut: Future<Output = Result<(), serenity::Error>>,
{
    let entries = fetch_transcript_entries(http, closing.channel_id).await?;
    let attachment = serenity::CreateAttachment::bytes(
        render_transcript(&entries).into_bytes(),
        transcript_filename(closing.channel_name),
    );

    if let Err(source) = post_transcript(attachment.clone()).await {
        warn!(
            ?source,
            channel_id = closing.channel_id.get(),
            "posting transcript failed, sending it to the owner"
        );
        if let Err(source) = dm_transcript(http, closing.owner_id, attachment).await {
            warn!(?source, "transcript DM to ticket owner failed");
        }
    }

    lock_channel(http, &closing).await;

    if let Some(new_name) = closed_channel_name(closing.channel_name) {
        let edit = serenity::EditChannel::new()
            .name(new_name)
            .audit_log_reason("Ticket closed");
        if let Err(source) = closing.channel_id.edit(http, edit).await {
            warn!(?source, "failed to rename closed ticket channel");
        }
    }

    close_ticket(&data.db, closing.channel_id.get(), closing.closed_by.get()).await?;
    info!(
        guild_id = closing.guild_id.get(),
        channel_id = closing.channel_id.get(),
        closed_by = closing.closed_by.get(),
        entries = entries.len(),
        "ticket closed"
    );

    Ok(())
}

async fn dm_transcript(
    http: &serenity::Http,
    owner_id: serenity::UserId,
    attachment: serenity::CreateAttachment,
) -> Result<(), serenity::Error> {
    let dm_channel = owner_id.create_dm_channel(http).await?;
    dm_channel
        .send_message(
            http,
            serenity::CreateMessage::new()
                .content("Here is your ticket transcript:")
                .add_file(attachment),
        )
        .await?;
    Ok(())
}

/// `@everyone` loses access; the owner and staff keep read-only access.
async fn lock_channel(http: &serenity::Http, closing: &ClosingTicket<'_>) {
    let read_only = |kind| serenity::PermissionOverwrite {
        allow: serenity::Permissions::VIEW_CHANNEL,
        deny: serenity::Permissions::SEND_MESSAGES,
        kind,
    };

    let mut overwrites = vec![
        serenity::PermissionOverwrite {
            allow: serenity::Permissions::empty(),
            deny: serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::SEND_MESSAGES,
            kind: serenity::PermissionOverwriteType::Role(serenity::RoleId::new(
                closing.guild_id.get(),
            )),
        },
        read_only(serenity::PermissionOverwriteType::Member(closing.owner_id)),
    ];
    if let Some(staff_role_id) = closing.staff_role_id {
        overwrites.push(read_only(serenity::PermissionOverwriteType::Role(staff_role_id)));
    }

    for overwrite in overwrites {
        if let Err(source) = closing.channel_id.create_permission(http, overwrite).await {
            warn!(?source, "failed to lock closed ticket channel");
        }
    }
}

async fn reply_ephemeral(
    http: &serenity::Http,
    interaction: &serenity::ComponentInteraction,
    content: &str,
) -> Result<(), serenity::Error> {
    interaction
        .create_response(
            http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await
}

/// Handle a press of a ticket's close button.
pub async fn handle_close_button(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let Some(owner_user_id) = parse_close_button_id(&interaction.data.custom_id) else {
        return Ok(());
    };
    let (Some(guild_id), Some(member)) = (interaction.guild_id, interaction.member.as_ref()) else {
        return Ok(());
    };

    let ticket: Option<Ticket> = get_ticket_by_channel(&data.db, interaction.channel_id.get()).await?;
    let Some(ticket) = ticket.filter(Ticket::is_open) else {
        reply_ephemeral(&ctx.http, interaction, "This ticket is already closed.").await?;
        return Ok(());
    };

    let config = get_guild_config(&data.db, guild_id.get()).await?;
    let settings = resolve_ticket_settings(&config, &data.ticket_defaults);
    let staff_role_id = settings.staff_role_id.map(serenity::RoleId::new);

    let is_owner = interaction.user.id.get() == owner_user_id;
    let is_staff = staff_role_id.is_some_and(|role_id| member.roles.contains(&role_id));
    let can_manage_channels = member
        .permissions
        .is_some_and(|perms| permits(perms, serenity::Permissions::MANAGE_CHANNELS));

    if !can_close_ticket(is_owner, is_staff, can_manage_channels) {
        reply_ephemeral(
            &ctx.http,
            interaction,
            "You don't have permission to close this ticket.",
        )
        .await?;
        return Ok(());
    }

    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Defer(
                serenity::CreateInteractionResponseMessage::new(),
            ),
        )
        .await?;

    let channel_name = interaction
        .channel_id
        .to_channel(&ctx.http)
        .await?
        .guild()
        .map(|channel| channel.name)
        .unwrap_or_else(|| format!("ticket-{}", ticket.id));

    let closing = ClosingTicket {
        guild_id,
        channel_id: interaction.channel_id,
        channel_name: &channel_name,
        owner_id: serenity::UserId::new(ticket.owner_user_id),
        staff_role_id,
        closed_by: interaction.user.id,
    };

    close_ticket_channel(&ctx.http, data, closing, |attachment| async move {
        interaction
            .create_followup(
                &ctx.http,
                serenity::CreateInteractionResponseFollowup::new()
                    .content(CLOSED_MESSAGE)
                    .add_file(attachment),
            )
            .await
            .map(|_| ())
    })
    .await?;

    let disabled = serenity::EditMessage::new().components(vec![serenity::CreateActionRow::Buttons(
        vec![close_button(owner_user_id).disabled(true)],
    )]);
    if let Err(source) = interaction
        .message
        .channel_id
        .edit_message(&ctx.http, interaction.message.id, disabled)
        .await
    {
        error!(?source, "failed to disable ticket close button");
    }

    Ok(())
}
