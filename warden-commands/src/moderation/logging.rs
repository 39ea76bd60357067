use tracing::error;

use poise::serenity_prelude as serenity;

use warden_database::Database;
use warden_database::impls::cases::{NewCase, create_case};
use warden_database::impls::guild_config::get_modlog_channel_id;
use warden_database::model::cases::CaseSummary;
use warden_utils::embed::DEFAULT_EMBED_COLOR;
use warden_utils::formatting::{
    action_display_name, discord_timestamp_pair, format_case_label, format_compact_duration,
};
use warden_utils::text::sanitize_mentions;

/// Create a moderation case and publish it to the modlog channel when one is set.
///
/// Failures are logged; returns `None` when the case could not be stored.
pub async fn record_and_publish_case(
    http: &serenity::Http,
    db: &Database,
    new_case: NewCase<'_>,
) -> Option<CaseSummary> {
    let guild_id = serenity::GuildId::new(new_case.guild_id);
    let case = match create_case(db, new_case).await {
        Ok(case) => case,
        Err(source) => {
            error!(?source, "failed to create moderation case");
            return None;
        }
    };

    if let Err(source) = publish_case_to_modlog_channel(http, db, guild_id, &case).await {
        error!(?source, "failed to publish case to configured modlog channel");
    }

    Some(case)
}

pub fn case_label(case: &CaseSummary) -> String {
    format_case_label(&case.case_code, case.action_case_number)
}

pub fn modlog_case_description(case: &CaseSummary) -> String {
    let mut fields = vec![format!("**Action :** {}", action_display_name(&case.action))];

    if let Some(target_user_id) = case.target_user_id {
        fields.push(format!("**Target :** <@{target_user_id}>"));
    }

    fields.push(format!("**Reason :** {}", sanitize_mentions(&case.reason)));

    if let Some(duration_seconds) = case.duration_seconds {
        fields.push(format!(
            "**Duration :** {}",
            format_compact_duration(duration_seconds)
        ));
    }

    fields.push(format!("**Moderator :** <@{}>", case.moderator_user_id));
    fields.push(format!("**When :** {}", discord_timestamp_pair(case.created_at)));

    fields.join("\n")
}

async fn publish_case_to_modlog_channel(
    http: &serenity::Http,
    db: &Database,
    guild_id: serenity::GuildId,
    case: &CaseSummary,
) -> Result<(), serenity::Error> {
    let channel_id = match get_modlog_channel_id(db, guild_id.get()).await {
        Ok(channel_id) => channel_id,
        Err(source) => {
            error!(?source, "failed to read modlog channel config");
            None
        }
    };

    let Some(channel_id) = channel_id else {
        return Ok(());
    };

    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(format!("#{}", case_label(case)))
        .description(modlog_case_description(case));

    serenity::ChannelId::new(channel_id)
        .send_message(http, serenity::CreateMessage::new().embed(embed))
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(duration_seconds: Option<u64>, target_user_id: Option<u64>) -> CaseSummary {
        CaseSummary {
            case_number: 4,
            case_code: "t".to_owned(),
            action_case_number: 2,
            target_user_id,
            moderator_user_id: 9,
            action: "timeout".to_owned(),
            reason: "spam".to_owned(),
            duration_seconds,
            created_at: 100,
        }
    }

    #[test]
    fn label_is_uppercase_code_and_number() {
        assert_eq!(case_label(&case(None, None)), "T2");
    }

    #[test]
    fn description_includes_optional_fields() {
        let full = modlog_case_description(&case(Some(600), Some(5)));
        assert!(full.contains("**Target :** <@5>"));
        assert!(full.contains("**Duration :** 10m"));
        assert!(full.starts_with("**Action :** Timeout"));

        let bare = modlog_case_description(&case(None, None));
        assert!(!bare.contains("Target"));
        assert!(!bare.contains("Duration"));
    }
}
