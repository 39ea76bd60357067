use std::time::Duration;

use poise::serenity_prelude as serenity;

use crate::embed::{DEFAULT_EMBED_COLOR, page_footer_text};

pub const PAGINATION_TIMEOUT_SECS: u64 = 60 * 3;

/// Number of pages needed for `item_count` items at `per_page` each (at least one).
pub fn total_pages(item_count: usize, per_page: usize) -> usize {
    item_count.div_ceil(per_page.max(1)).max(1)
}

/// Slice of `items` shown on 1-based `page`; out-of-range pages clamp.
pub fn page_window<T>(items: &[T], per_page: usize, page: usize) -> &[T] {
    let per_page = per_page.max(1);
    let page = page.clamp(1, total_pages(items.len(), per_page));
    let start = ((page - 1) * per_page).min(items.len());
    let end = (start + per_page).min(items.len());
    &items[start..end]
}

struct PageView<'a> {
    title: &'a str,
    pages: &'a [String],
    current: usize,
    prev_id: String,
    jump_id: String,
    next_id: String,
}

impl PageView<'_> {
    fn embed(&self) -> serenity::CreateEmbed {
        let mut embed = serenity::CreateEmbed::new()
            .color(DEFAULT_EMBED_COLOR)
            .title(self.title)
            .description(self.pages[self.current].clone());

        let footer = page_footer_text(self.current + 1, self.pages.len());
        if !footer.is_empty() {
            embed = embed.footer(serenity::CreateEmbedFooter::new(footer));
        }

        embed
    }

    fn components(&self) -> Vec<serenity::CreateActionRow> {
        let button = |id: &str, label: &str| {
            serenity::CreateButton::new(id)
                .label(label)
                .style(serenity::ButtonStyle::Secondary)
        };

        vec![serenity::CreateActionRow::Buttons(vec![
            button(&self.prev_id, "Prev").disabled(self.current == 0),
            button(&self.jump_id, "Jump"),
            button(&self.next_id, "Next").disabled(self.current + 1 >= self.pages.len()),
        ])]
    }
}

/// Send `pages` as one embed with Prev/Jump/Next buttons for the invoking user.
///
/// A single page is sent without buttons. After the timeout the buttons are removed.
pub async fn paginate_embed_pages<U, E>(
    ctx: poise::Context<'_, U, E>,
    title: &str,
    pages: &[String],
    start_page: usize,
) -> Result<(), serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    if pages.is_empty() {
        return Ok(());
    }

    let ctx_id = ctx.id();
    let mut view = PageView {
        title,
        pages,
        current: start_page.clamp(1, pages.len()) - 1,
        prev_id: format!("{}_prev", ctx_id),
        jump_id: format!("{}_jump", ctx_id),
        next_id: format!("{}_next", ctx_id),
    };

    if pages.len() == 1 {
        ctx.send(poise::CreateReply::default().embed(view.embed()))
            .await?;
        return Ok(());
    }

    let jump_modal_id = format!("{}_jump_modal", ctx_id);
    let jump_input_id = format!("{}_jump_input", ctx_id);

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(view.embed())
                .components(view.components()),
        )
        .await?;

    let message = reply.message().await?;
    let message_id = message.id;
    let channel_id = message.channel_id;
    let author_id = ctx.author().id;

    while let Some(press) = serenity::collector::ComponentInteractionCollector::new(ctx)
        .filter({
            let prefix = ctx_id.to_string();
            move |interaction| {
                interaction.data.custom_id.starts_with(&prefix)
                    && interaction.user.id == author_id
                    && interaction.message.id == message_id
            }
        })
        .timeout(Duration::from_secs(PAGINATION_TIMEOUT_SECS))
        .await
    {
        let custom_id = press.data.custom_id.as_str();

        if custom_id == view.next_id || custom_id == view.prev_id {
            view.current = if custom_id == view.next_id {
                (view.current + 1).min(pages.len() - 1)
            } else {
                view.current.saturating_sub(1)
            };

            press
                .create_response(
                    ctx.http(),
                    serenity::CreateInteractionResponse::UpdateMessage(
                        serenity::CreateInteractionResponseMessage::new()
                            .embed(view.embed())
                            .components(view.components()),
                    ),
                )
                .await?;
            continue;
        }

        if custom_id != view.jump_id {
            continue;
        }

        press
            .create_response(
                ctx.http(),
                serenity::CreateInteractionResponse::Modal(
                    serenity::CreateModal::new(&jump_modal_id, "Jump to Page").components(vec![
                        serenity::CreateActionRow::InputText(
                            serenity::CreateInputText::new(
                                serenity::InputTextStyle::Short,
                                "Page Number",
                                &jump_input_id,
                            )
                            .placeholder(format!("1-{}", pages.len()))
                            .required(true),
                        ),
                    ]),
                ),
            )
            .await?;

        let Some(modal) = serenity::collector::ModalInteractionCollector::new(ctx)
            .author_id(author_id)
            .channel_id(ctx.channel_id())
            .custom_ids(vec![jump_modal_id.clone()])
            .timeout(Duration::from_secs(PAGINATION_TIMEOUT_SECS))
            .await
        else {
            continue;
        };

        modal
            .create_response(ctx.http(), serenity::CreateInteractionResponse::Acknowledge)
            .await?;

        let target = modal
            .data
            .components
            .iter()
            .flat_map(|row| row.components.iter())
            .find_map(|component| match component {
                serenity::ActionRowComponent::InputText(input) if input.custom_id == jump_input_id => {
                    input.value.as_deref()?.trim().parse::<usize>().ok()
                }
                _ => None,
            })
            .filter(|page| (1..=pages.len()).contains(page));

        if let Some(target) = target {
            view.current = target - 1;
            channel_id
                .edit_message(
                    ctx.http(),
                    message_id,
                    serenity::EditMessage::new()
                        .embed(view.embed())
                        .components(view.components()),
                )
                .await?;
        }
    }

    let _ = channel_id
        .edit_message(
            ctx.http(),
            message_id,
            serenity::EditMessage::new()
                .embed(view.embed())
                .components(vec![]),
        )
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{page_window, total_pages};

    #[test]
    fn page_counts() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn windows_clamp_to_last_page() {
        let items: Vec<u32> = (1..=12).collect();
        assert_eq!(page_window(&items, 5, 1), &[1, 2, 3, 4, 5]);
        assert_eq!(page_window(&items, 5, 3), &[11, 12]);
        assert_eq!(page_window(&items, 5, 9), &[11, 12]);
        assert!(page_window::<u32>(&[], 5, 1).is_empty());
    }
}
