use poise::serenity_prelude as serenity;
use tracing::{error, info};

use warden_commands::tickets::{CLOSE_BUTTON_PREFIX, handle_close_button};
use warden_core::Data;
use warden_database::impls::tickets::delete_ticket_for_channel;

pub async fn handle_interaction_tickets(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::Interaction,
) {
    let Some(component) = interaction.as_message_component() else {
        return;
    };
    if !component.data.custom_id.starts_with(CLOSE_BUTTON_PREFIX) {
        return;
    }

    if let Err(source) = handle_close_button(ctx, data, component).await {
        error!(
            ?source,
            channel_id = component.channel_id.get(),
            "failed to handle ticket close button"
        );
    }
}

/// Drop the ticket record of a channel that was deleted outside the bot.
pub async fn handle_channel_delete_tickets(data: &Data, channel: &serenity::GuildChannel) {
    match delete_ticket_for_channel(&data.db, channel.id.get()).await {
        Ok(true) => info!(channel_id = channel.id.get(), "removed ticket for deleted channel"),
        Ok(false) => {}
        Err(source) => error!(?source, channel_id = channel.id.get(), "failed to remove ticket record"),
    }
}
