use std::time::Duration;

use poise::serenity_prelude as serenity;

/// Messages shown on the prompt once the user answers (or doesn't).
pub struct ConfirmationTexts<'a> {
    pub timed_out: &'a str,
    pub declined: &'a str,
    pub processing: &'a str,
}

/// Ask the invoking user to confirm an action with Confirm/Decline buttons.
///
/// Returns `true` only when the author pressed Confirm before `timeout`. The
/// prompt is rewritten to the matching text from `texts` with buttons removed.
pub async fn confirm<U, E>(
    ctx: poise::Context<'_, U, E>,
    embed: serenity::CreateEmbed,
    timeout: Duration,
    texts: ConfirmationTexts<'_>,
) -> Result<bool, serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    let ctx_id = ctx.id();
    let confirm_id = format!("{}_confirm", ctx_id);
    let decline_id = format!("{}_decline", ctx_id);

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(embed)
                .components(vec![serenity::CreateActionRow::Buttons(vec![
                    serenity::CreateButton::new(&confirm_id)
                        .label("Confirm")
                        .style(serenity::ButtonStyle::Danger),
                    serenity::CreateButton::new(&decline_id)
                        .label("Decline")
                        .style(serenity::ButtonStyle::Secondary),
                ])]),
        )
        .await?;

    let message = reply.message().await?.into_owned();
    let pressed = message
        .await_component_interaction(ctx)
        .author_id(ctx.author().id)
        .timeout(timeout)
        .await;

    let Some(interaction) = pressed else {
        message
            .channel_id
            .edit_message(
                ctx.http(),
                message.id,
                serenity::EditMessage::new()
                    .content(texts.timed_out)
                    .embeds(vec![])
                    .components(vec![]),
            )
            .await?;
        return Ok(false);
    };

    let confirmed = interaction.data.custom_id == confirm_id;
    let text = if confirmed {
        texts.processing
    } else {
        texts.declined
    };

    interaction
        .create_response(
            ctx.http(),
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .content(text)
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await?;

    Ok(confirmed)
}
