use std::fmt::Write as _;

use crate::CommandMeta;

pub fn category_title(category: &str) -> String {
    let mut chars = category.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

pub fn unknown_category_message(wanted: &str, known: &[&str]) -> String {
    let known = known
        .iter()
        .map(|category| format!("`{category}`"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Unknown category `{wanted}`. Try one of: {known}")
}

pub fn page_out_of_range_message(requested: usize, total: usize) -> String {
    format!("There is no page {requested}; help has {total} page(s).")
}

/// Render commands as `**Category**` headings followed by one line per command.
///
/// `commands` must already be grouped by category.
pub fn grouped_help_description(commands: &[&CommandMeta]) -> String {
    let mut out = String::new();
    let mut heading: Option<&str> = None;

    for command in commands {
        if heading != Some(command.category) {
            if heading.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "**{}**", category_title(command.category));
            heading = Some(command.category);
        }
        let _ = writeln!(out, "`{}` {}", command.name, command.desc);
    }

    if out.is_empty() {
        return "No commands available.".to_owned();
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: CommandMeta = CommandMeta {
        name: "ban",
        desc: "Ban a member.",
        category: "moderation",
        usage: "!ban",
    };
    const B: CommandMeta = CommandMeta {
        name: "kick",
        desc: "Kick a member.",
        category: "moderation",
        usage: "!kick",
    };
    const C: CommandMeta = CommandMeta {
        name: "ping",
        desc: "Pong.",
        category: "utility",
        usage: "!ping",
    };

    #[test]
    fn groups_under_headings() {
        assert_eq!(
            grouped_help_description(&[&A, &B, &C]),
            "**Moderation**\n`ban` Ban a member.\n`kick` Kick a member.\n\n**Utility**\n`ping` Pong."
        );
        assert_eq!(grouped_help_description(&[]), "No commands available.");
    }

    #[test]
    fn titles_and_messages() {
        assert_eq!(category_title("automod"), "Automod");
        assert_eq!(category_title(""), "");
        assert_eq!(
            unknown_category_message("fun", &["community", "utility"]),
            "Unknown category `fun`. Try one of: `community`, `utility`"
        );
    }
}
