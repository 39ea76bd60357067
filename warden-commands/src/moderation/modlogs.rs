use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::guild_with_permission;
use crate::moderation::logging::{case_label, modlog_case_description};
use warden_core::{Context, Error};
use warden_database::impls::cases::{CaseFilters, list_recent_cases};
use warden_database::model::cases::CaseSummary;
use warden_utils::pagination::{page_window, paginate_embed_pages, total_pages};

pub const META: CommandMeta = CommandMeta {
    name: "modlogs",
    desc: "View recent moderation actions.",
    category: "moderation",
    usage: "!modlogs [target_user] [moderator] [action]",
};

const CASES_PER_PAGE: usize = 5;
const CASE_LOOKUP_LIMIT: u32 = 200;

fn case_pages(cases: &[CaseSummary]) -> Vec<String> {
    let header = format!("Total cases: **{}**", cases.len());
    (1..=total_pages(cases.len(), CASES_PER_PAGE))
        .map(|page| {
            let body = page_window(cases, CASES_PER_PAGE, page)
                .iter()
                .map(|case| format!("#{}\n{}", case_label(case), modlog_case_description(case)))
                .collect::<Vec<_>>()
                .join("\n\n");
            format!("{header}\n\n{body}")
        })
        .collect()
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn modlogs(
    ctx: Context<'_>,
    #[description = "Filter by target user"] target_user: Option<serenity::User>,
    #[description = "Filter by moderator"] moderator: Option<serenity::User>,
    #[description = "Filter by action (ban, warn, etc.)"] action: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_MESSAGES).await?
    else {
        return Ok(());
    };

    let cases = list_recent_cases(
        &ctx.data().db,
        guild_id.get(),
        CaseFilters {
            target_user_id: target_user.as_ref().map(|user| user.id.get()),
            moderator_user_id: moderator.as_ref().map(|user| user.id.get()),
            action: action.as_deref().map(str::trim).filter(|value| !value.is_empty()),
            limit: CASE_LOOKUP_LIMIT,
        },
    )
    .await?;

    if cases.is_empty() {
        ctx.say("No matching moderation cases found.").await?;
        return Ok(());
    }

    paginate_embed_pages(ctx, "Moderation Logs", &case_pages(&cases), 1).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(number: u64) -> CaseSummary {
        CaseSummary {
            case_number: number,
            case_code: "w".to_owned(),
            action_case_number: number,
            target_user_id: Some(3),
            moderator_user_id: 4,
            action: "warn".to_owned(),
            reason: "spam".to_owned(),
            duration_seconds: None,
            created_at: 0,
        }
    }

    #[test]
    fn pages_hold_five_cases() {
        let cases: Vec<CaseSummary> = (1..=6).map(case).collect();
        let pages = case_pages(&cases);
        assert_eq!(pages.len(), 2);
        assert!(pages[0].starts_with("Total cases: **6**"));
        assert!(pages[0].contains("#W5\n"));
        assert!(pages[1].contains("#W6\n"));
    }
}
