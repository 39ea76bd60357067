use poise::serenity_prelude as serenity;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x4A_6F_A5;

/// Color for ticket embeds.
pub const TICKET_EMBED_COLOR: u32 = 0x34_98_DB;

/// Build an embed in the default color with a title and description.
pub fn titled_embed(title: impl Into<String>, description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(title)
        .description(description)
}

/// Footer text for a paginated embed; empty for single-page output.
pub fn page_footer_text(page: usize, total_pages: usize) -> String {
    let total_pages = total_pages.max(1);
    if total_pages > 1 {
        format!("Page {}/{}", page.clamp(1, total_pages), total_pages)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::page_footer_text;

    #[test]
    fn single_page_has_no_footer() {
        assert_eq!(page_footer_text(1, 1), "");
        assert_eq!(page_footer_text(1, 0), "");
    }

    #[test]
    fn page_is_clamped_into_range() {
        assert_eq!(page_footer_text(2, 3), "Page 2/3");
        assert_eq!(page_footer_text(9, 3), "Page 3/3");
        assert_eq!(page_footer_text(0, 3), "Page 1/3");
    }
}
