use std::env;

use anyhow::Context as _;

use warden_core::TicketDefaults;

pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "warden:prod";
pub const DEFAULT_TICKETS_CATEGORY_NAME: &str = "TICKETS";
pub const DEFAULT_TICKET_CHANNEL_PREFIX: &str = "ticket-";

/// Process-level settings read once at startup.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub discord_token: String,
    pub database_url: String,
    /// Register commands in this guild only; global registration otherwise.
    pub guild_id: Option<u64>,
    pub database_max_connections: u32,
    pub auto_run_migrations: bool,
    pub redis_enabled: bool,
    pub redis_url: Option<String>,
    pub redis_key_prefix: String,
    pub ticket_defaults: TicketDefaults,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let discord_token = required("DISCORD_TOKEN")?;
        let database_url = required("DATABASE_URL")?;

        let database_max_connections = u32::try_from(env_u64(
            "DATABASE_MAX_CONNECTIONS",
            u64::from(DEFAULT_DATABASE_MAX_CONNECTIONS),
        ))
        .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS)
        .max(1);

        Ok(Self {
            discord_token,
            database_url,
            guild_id: env_opt_u64("DISCORD_GUILD_ID"),
            database_max_connections,
            auto_run_migrations: env_bool("AUTO_RUN_MIGRATIONS", true),
            redis_enabled: env_bool("REDIS_ENABLED", false),
            redis_url: non_empty(env::var("REDIS_URL").ok()),
            redis_key_prefix: env_string("REDIS_KEY_PREFIX", DEFAULT_REDIS_KEY_PREFIX),
            ticket_defaults: TicketDefaults {
                staff_role_id: env_opt_u64("STAFF_ROLE_ID"),
                category_name: env_string("TICKETS_CATEGORY_NAME", DEFAULT_TICKETS_CATEGORY_NAME),
                channel_prefix: env_string("TICKET_CHANNEL_PREFIX", DEFAULT_TICKET_CHANNEL_PREFIX),
            },
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    non_empty(env::var(key).ok()).with_context(|| format!("{key} must be set"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn env_string(key: &str, default: &str) -> String {
    non_empty(env::var(key).ok()).unwrap_or_else(|| default.to_owned())
}

pub fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |value| parse_bool(&value))
}

pub fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

pub fn env_opt_u64(key: &str) -> Option<u64> {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::{non_empty, parse_bool};

    #[test]
    fn booleans() {
        for truthy in ["1", "true", "YES", " on "] {
            assert!(parse_bool(truthy), "{truthy}");
        }
        for falsy in ["0", "false", "off", "", "maybe"] {
            assert!(!parse_bool(falsy), "{falsy}");
        }
    }

    #[test]
    fn blank_values_are_missing() {
        assert_eq!(non_empty(Some("  ".to_owned())), None);
        assert_eq!(non_empty(Some(" x ".to_owned())), Some("x".to_owned()));
        assert_eq!(non_empty(None), None);
    }
}
