pub mod close_ticket;
pub mod closing;
pub mod ticket;
pub mod ticketconfig;

pub use closing::handle_close_button;

use poise::serenity_prelude as serenity;

use warden_core::TicketDefaults;
use warden_database::model::guild_config::GuildConfig;

/// Custom-id prefix of the close button posted in every ticket channel.
pub const CLOSE_BUTTON_PREFIX: &str = "ticket_close:";

/// Prefix given to a ticket channel's name once it is closed.
pub const CLOSED_CHANNEL_PREFIX: &str = "closed-";

pub fn close_button_id(owner_user_id: u64) -> String {
    format!("{CLOSE_BUTTON_PREFIX}{owner_user_id}")
}

/// Owner id encoded in a close button custom id.
pub fn parse_close_button_id(custom_id: &str) -> Option<u64> {
    custom_id.strip_prefix(CLOSE_BUTTON_PREFIX)?.parse().ok()
}

pub fn close_button(owner_user_id: u64) -> serenity::CreateButton {
    serenity::CreateButton::new(close_button_id(owner_user_id))
        .label("Close ticket")
        .style(serenity::ButtonStyle::Danger)
        .emoji('🔒')
}

/// The ticket owner, staff, and channel managers may close a ticket.
pub fn can_close_ticket(is_owner: bool, is_staff: bool, can_manage_channels: bool) -> bool {
    is_owner || is_staff || can_manage_channels
}

/// `closed-<name>` unless the channel already carries the prefix.
pub fn closed_channel_name(current: &str) -> Option<String> {
    if current.starts_with(CLOSED_CHANNEL_PREFIX) {
        return None;
    }

    let renamed = format!("{CLOSED_CHANNEL_PREFIX}{current}");
    Some(warden_utils::text::truncate_chars(&renamed, 100).to_owned())
}

/// Effective ticket settings for one guild.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketSettings {
    pub staff_role_id: Option<u64>,
    pub category_name: String,
    pub channel_prefix: String,
}

/// Guild values win over the process-wide defaults; blank values count as unset.
pub fn resolve_ticket_settings(config: &GuildConfig, defaults: &TicketDefaults) -> TicketSettings {
    let non_blank = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };

    TicketSettings {
        staff_role_id: config.ticket_staff_role_id.or(defaults.staff_role_id),
        category_name: non_blank(&config.ticket_category_name)
            .unwrap_or_else(|| defaults.category_name.clone()),
        channel_prefix: non_blank(&config.ticket_channel_prefix)
            .unwrap_or_else(|| defaults.channel_prefix.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> TicketDefaults {
        TicketDefaults {
            staff_role_id: Some(5),
            category_name: "TICKETS".to_owned(),
            channel_prefix: "ticket-".to_owned(),
        }
    }

    #[test]
    fn close_button_id_round_trip() {
        let id = close_button_id(1234);
        assert_eq!(id, "ticket_close:1234");
        assert_eq!(parse_close_button_id(&id), Some(1234));
        assert_eq!(parse_close_button_id("ticket_close:abc"), None);
        assert_eq!(parse_close_button_id("other:1234"), None);
    }

    #[test]
    fn close_permission_rule() {
        assert!(can_close_ticket(true, false, false));
        assert!(can_close_ticket(false, true, false));
        assert!(can_close_ticket(false, false, true));
        assert!(!can_close_ticket(false, false, false));
    }

    #[test]
    fn closed_prefix_is_applied_once() {
        assert_eq!(closed_channel_name("ticket-bob").as_deref(), Some("closed-ticket-bob"));
        assert_eq!(closed_channel_name("closed-ticket-bob"), None);
        assert_eq!(closed_channel_name(&"a".repeat(99)).map(|name| name.len()), Some(100));
    }

    #[test]
    fn defaults_fill_unset_guild_values() {
        let config = GuildConfig::empty(1);
        assert_eq!(
            resolve_ticket_settings(&config, &defaults()),
            TicketSettings {
                staff_role_id: Some(5),
                category_name: "TICKETS".to_owned(),
                channel_prefix: "ticket-".to_owned(),
            }
        );
    }

    #[test]
    fn guild_values_override_defaults() {
        let mut config = GuildConfig::empty(1);
        config.ticket_staff_role_id = Some(9);
        config.ticket_category_name = Some("Support".to_owned());
        config.ticket_channel_prefix = Some("   ".to_owned());

        let settings = resolve_ticket_settings(&config, &defaults());
        assert_eq!(settings.staff_role_id, Some(9));
        assert_eq!(settings.category_name, "Support");
        assert_eq!(settings.channel_prefix, "ticket-");
    }
}
