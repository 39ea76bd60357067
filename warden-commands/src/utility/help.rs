use crate::utility::embeds::{
    grouped_help_description, page_out_of_range_message, unknown_category_message,
};
use crate::{COMMANDS, CommandMeta};
use warden_core::{Context, Error};
use warden_utils::pagination::{page_window, paginate_embed_pages, total_pages};

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "List available commands by category.",
    category: "utility",
    usage: "!help [page|category]",
};

const COMMANDS_PER_PAGE: usize = 15;

#[derive(Debug, PartialEq, Eq)]
enum HelpQuery<'a> {
    Page(usize),
    Category(&'a str),
}

fn parse_help_query(raw: Option<&str>) -> HelpQuery<'_> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return HelpQuery::Page(1);
    };
    match raw.parse::<usize>() {
        Ok(page) => HelpQuery::Page(page.max(1)),
        Err(_) => HelpQuery::Category(raw),
    }
}

fn known_categories() -> Vec<&'static str> {
    let mut categories: Vec<&str> = COMMANDS.iter().map(|command| command.category).collect();
    categories.sort_unstable();
    categories.dedup();
    categories
}

/// Commands sorted by category then name, optionally limited to one category.
fn listed_commands(category: Option<&str>) -> Vec<&'static CommandMeta> {
    let mut listed: Vec<&'static CommandMeta> = COMMANDS
        .iter()
        .filter(|command| category.is_none_or(|wanted| command.category == wanted))
        .collect();
    listed.sort_unstable_by_key(|command| (command.category, command.name));
    listed
}

fn help_pages(commands: &[&CommandMeta]) -> Vec<String> {
    (1..=total_pages(commands.len(), COMMANDS_PER_PAGE))
        .map(|page| grouped_help_description(page_window(commands, COMMANDS_PER_PAGE, page)))
        .collect()
}

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Page number or category"] query: Option<String>,
) -> Result<(), Error> {
    let (category, page) = match parse_help_query(query.as_deref()) {
        HelpQuery::Page(page) => (None, page),
        HelpQuery::Category(raw) => {
            let wanted = raw.to_ascii_lowercase();
            let categories = known_categories();
            let Some(category) = categories.iter().copied().find(|known| *known == wanted) else {
                ctx.say(unknown_category_message(&wanted, &categories)).await?;
                return Ok(());
            };
            (Some(category), 1)
        }
    };

    let pages = help_pages(&listed_commands(category));
    if page > pages.len() {
        ctx.say(page_out_of_range_message(page, pages.len())).await?;
        return Ok(());
    }

    paginate_embed_pages(ctx, "Warden commands", &pages, page).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_queries() {
        assert_eq!(parse_help_query(None), HelpQuery::Page(1));
        assert_eq!(parse_help_query(Some("3")), HelpQuery::Page(3));
        assert_eq!(parse_help_query(Some("0")), HelpQuery::Page(1));
        assert_eq!(parse_help_query(Some(" tickets ")), HelpQuery::Category("tickets"));
    }

    #[test]
    fn every_command_lands_on_a_page() {
        let all = listed_commands(None);
        assert_eq!(all.len(), COMMANDS.len());
        let pages = help_pages(&all);
        assert_eq!(pages.len(), total_pages(COMMANDS.len(), COMMANDS_PER_PAGE));
        for command in COMMANDS {
            let line = format!("`{}` ", command.name);
            assert!(pages.iter().any(|page| page.contains(&line)), "{}", command.name);
        }
    }

    #[test]
    fn category_filter_and_ordering() {
        let listed = listed_commands(Some("utility"));
        assert!(!listed.is_empty());
        assert!(listed.iter().all(|command| command.category == "utility"));
        assert!(listed.windows(2).all(|pair| pair[0].name <= pair[1].name));
        assert!(known_categories().contains(&"tickets"));
    }
}
