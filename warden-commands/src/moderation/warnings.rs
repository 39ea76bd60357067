use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{fetch_target_profile, usage_message, warnings_window_label_days};
use crate::moderation::guild_with_permission;
use warden_core::{Context, Error};
use warden_database::impls::now_unix_secs;
use warden_database::impls::warnings::warnings_since;
use warden_database::model::warnings::WarningEntry;
use warden_utils::formatting::discord_timestamp_pair;
use warden_utils::pagination::{page_window, paginate_embed_pages, total_pages};
use warden_utils::text::sanitize_mentions;

pub const META: CommandMeta = CommandMeta {
    name: "warnings",
    desc: "Show warning history for a user in a time window.",
    category: "moderation",
    usage: "!warnings <user> [days|all]",
};

const DEFAULT_DAYS: u64 = 30;
const WARNINGS_PER_PAGE: usize = 5;

#[derive(Debug, PartialEq, Eq)]
enum WarningWindow {
    Days(u64),
    All,
}

impl WarningWindow {
    fn parse(value: Option<&str>) -> Self {
        let Some(raw) = value.and_then(|entry| entry.split_whitespace().next()) else {
            return Self::Days(DEFAULT_DAYS);
        };

        if raw.eq_ignore_ascii_case("all") {
            return Self::All;
        }

        raw.parse::<u64>()
            .ok()
            .filter(|days| *days > 0)
            .map_or(Self::Days(DEFAULT_DAYS), Self::Days)
    }

    fn since(&self, now: u64) -> u64 {
        match self {
            Self::Days(days) => now.saturating_sub(days.saturating_mul(86_400)),
            Self::All => 0,
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Days(days) => warnings_window_label_days(*days),
            Self::All => "all time".to_owned(),
        }
    }
}

/// Newest warnings first; numbers stay the oldest-first numbers `unwarn` accepts.
fn warning_pages(entries: &[WarningEntry], window_label: &str) -> Vec<String> {
    let header = format!("Total warnings in {}: **{}**", window_label, entries.len());
    if entries.is_empty() {
        return vec![format!("{header}\n\nNo warnings in this period.")];
    }

    let numbered: Vec<(usize, &WarningEntry)> = entries.iter().enumerate().rev().collect();
    (1..=total_pages(numbered.len(), WARNINGS_PER_PAGE))
        .map(|page| {
            let body = page_window(&numbered, WARNINGS_PER_PAGE, page)
                .iter()
                .map(|(index, entry)| {
                    format!(
                        "#{} • by <@{}>\n**Reason :** {}\n**When :** {}",
                        index + 1,
                        entry.moderator_id,
                        sanitize_mentions(&entry.reason),
                        discord_timestamp_pair(entry.warned_at),
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n");
            format!("{header}\n\n{body}")
        })
        .collect()
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "The user to check"] user: Option<serenity::User>,
    #[description = "Days or 'all'"] window: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_MESSAGES).await?
    else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let window = WarningWindow::parse(window.as_deref());
    let entries = warnings_since(
        &ctx.data().db,
        guild_id.get(),
        user.id.get(),
        window.since(now_unix_secs()),
    )
    .await?;
    let target_profile = fetch_target_profile(ctx.http(), user.id).await;

    paginate_embed_pages(
        ctx,
        &format!("Warnings for {}", target_profile.display_name),
        &warning_pages(&entries, &window.label()),
        1,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(warned_at: u64) -> WarningEntry {
        WarningEntry {
            warned_at,
            moderator_id: 1,
            reason: format!("reason {warned_at}"),
        }
    }

    #[test]
    fn window_parsing() {
        assert_eq!(WarningWindow::parse(None), WarningWindow::Days(30));
        assert_eq!(WarningWindow::parse(Some("ALL")), WarningWindow::All);
        assert_eq!(WarningWindow::parse(Some("7")), WarningWindow::Days(7));
        assert_eq!(WarningWindow::parse(Some("0")), WarningWindow::Days(30));
        assert_eq!(WarningWindow::parse(Some("soon")), WarningWindow::Days(30));
    }

    #[test]
    fn window_start() {
        assert_eq!(WarningWindow::Days(1).since(100_000), 13_600);
        assert_eq!(WarningWindow::Days(2).since(10), 0);
        assert_eq!(WarningWindow::All.since(10), 0);
    }

    #[test]
    fn pages_list_newest_first_with_stable_numbers() {
        let entries: Vec<WarningEntry> = (1..=7).map(entry).collect();
        let pages = warning_pages(&entries, "all time");

        assert_eq!(pages.len(), 2);
        assert!(pages[0].starts_with("Total warnings in all time: **7**"));
        assert!(pages[0].contains("#7 • by <@1>"));
        assert!(!pages[0].contains("#2 •"));
        assert!(pages[1].contains("#1 • by <@1>"));
    }

    #[test]
    fn empty_history_is_one_page() {
        let pages = warning_pages(&[], "last 30 day(s)");
        assert_eq!(pages.len(), 1);
        assert!(pages[0].ends_with("No warnings in this period."));
    }
}
