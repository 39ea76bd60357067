use serde::{Deserialize, Serialize};

/// Action values stored in `word_filter_config.action`.
pub const ACTION_DELETE: &str = "delete_and_log";
pub const ACTION_WARN: &str = "warn_and_log";
pub const ACTION_TIMEOUT: &str = "timeout_delete_and_log";
pub const ACTION_LOG: &str = "log_only";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordFilterConfig {
    pub guild_id: u64,
    pub enabled: bool,
    pub action: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordFilterWord {
    pub id: u64,
    pub guild_id: u64,
    pub word: String,
    pub created_at: u64,
}

/// Map the short names accepted by `!wordfilter action` onto stored action values.
pub fn parse_filter_action(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "delete" | "delete_and_log" => Some(ACTION_DELETE),
        "warn" | "warn_and_log" => Some(ACTION_WARN),
        "timeout" | "timeout_delete_and_log" => Some(ACTION_TIMEOUT),
        "log" | "log_only" => Some(ACTION_LOG),
        _ => None,
    }
}

/// Whether the action removes the offending message.
pub fn action_deletes_message(action: &str) -> bool {
    matches!(action, ACTION_DELETE | ACTION_WARN | ACTION_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_action_names_resolve() {
        assert_eq!(parse_filter_action("Delete"), Some(ACTION_DELETE));
        assert_eq!(parse_filter_action("warn"), Some(ACTION_WARN));
        assert_eq!(parse_filter_action(" timeout "), Some(ACTION_TIMEOUT));
        assert_eq!(parse_filter_action("log_only"), Some(ACTION_LOG));
        assert_eq!(parse_filter_action("explode"), None);
    }

    #[test]
    fn only_log_keeps_message() {
        assert!(action_deletes_message(ACTION_DELETE));
        assert!(action_deletes_message(ACTION_TIMEOUT));
        assert!(!action_deletes_message(ACTION_LOG));
    }
}
