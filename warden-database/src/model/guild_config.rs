use serde::{Deserialize, Serialize};

pub const DEFAULT_WELCOME_TEMPLATE: &str = "Welcome to {server}, {user}!";

/// Per-guild settings. A guild without a row behaves like `GuildConfig::empty`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuildConfig {
    pub guild_id: u64,
    pub modlog_channel_id: Option<u64>,
    pub welcome_channel_id: Option<u64>,
    pub welcome_template: Option<String>,
    pub ticket_staff_role_id: Option<u64>,
    pub ticket_category_name: Option<String>,
    pub ticket_channel_prefix: Option<String>,
    pub slowmode: SlowmodeConfig,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlowmodeConfig {
    pub enabled: bool,
    pub window_seconds: u32,
    pub high_threshold: u32,
    pub low_threshold: u32,
    pub delay_seconds: u32,
}

impl Default for SlowmodeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window_seconds: 10,
            high_threshold: 8,
            low_threshold: 3,
            delay_seconds: 5,
        }
    }
}

impl GuildConfig {
    pub fn empty(guild_id: u64) -> Self {
        Self {
            guild_id,
            modlog_channel_id: None,
            welcome_channel_id: None,
            welcome_template: None,
            ticket_staff_role_id: None,
            ticket_category_name: None,
            ticket_channel_prefix: None,
            slowmode: SlowmodeConfig::default(),
        }
    }

    pub fn welcome_template_or_default(&self) -> &str {
        self.welcome_template
            .as_deref()
            .filter(|template| !template.trim().is_empty())
            .unwrap_or(DEFAULT_WELCOME_TEMPLATE)
    }
}
