/// Format a case ID label (e.g., "w", 5 -> "W5").
pub fn format_case_label(case_code: &str, action_case_number: u64) -> String {
    format!("{}{}", case_code.to_ascii_uppercase(), action_case_number)
}

/// Convert internal action identifiers to user-facing names.
pub fn action_display_name(action: &str) -> String {
    match action {
        "unwarn_all" => "Unwarn All".to_owned(),
        "word_filter_delete" => "Word Filter (Delete)".to_owned(),
        "word_filter_warn" => "Word Filter (Warn)".to_owned(),
        "word_filter_timeout" => "Word Filter (Timeout)".to_owned(),
        "word_filter_log" => "Word Filter (Log)".to_owned(),
        other => title_case_words(other),
    }
}

fn title_case_words(raw: &str) -> String {
    let words = raw
        .trim()
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!(
                    "{}{}",
                    first.to_uppercase(),
                    chars.as_str().to_ascii_lowercase()
                ),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>();

    if words.is_empty() {
        "Unknown".to_owned()
    } else {
        words.join(" ")
    }
}

/// Format seconds into a compact human-readable duration (e.g. 59s, 1m, 1h 30m, 1d 1h).
pub fn format_compact_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        return if hours > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{}d", days)
        };
    }

    let parts = [(hours, 'h'), (minutes, 'm'), (seconds, 's')]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect::<Vec<_>>();

    if parts.is_empty() {
        "0s".to_owned()
    } else {
        parts.join(" ")
    }
}

/// Discord relative + full timestamp markup for a unix time.
pub fn discord_timestamp_pair(unix_secs: u64) -> String {
    format!("<t:{unix_secs}:R> • <t:{unix_secs}:f>")
}

#[cfg(test)]
mod tests {
    use super::{action_display_name, discord_timestamp_pair, format_case_label, format_compact_duration};

    #[test]
    fn formats_case_labels_uppercase() {
        assert_eq!(format_case_label("w", 12), "W12");
        assert_eq!(format_case_label("uwa", 3), "UWA3");
    }

    #[test]
    fn action_names_are_user_friendly() {
        assert_eq!(action_display_name("warn"), "Warn");
        assert_eq!(action_display_name("unwarn_all"), "Unwarn All");
        assert_eq!(action_display_name("word_filter_warn"), "Word Filter (Warn)");
        assert_eq!(action_display_name("custom_action"), "Custom Action");
        assert_eq!(action_display_name("  "), "Unknown");
    }

    #[test]
    fn compact_duration_formatting() {
        assert_eq!(format_compact_duration(0), "0s");
        assert_eq!(format_compact_duration(59), "59s");
        assert_eq!(format_compact_duration(60), "1m");
        assert_eq!(format_compact_duration(61), "1m 1s");
        assert_eq!(format_compact_duration(3600), "1h");
        assert_eq!(format_compact_duration(3670), "1h 1m 10s");
        assert_eq!(format_compact_duration(3605), "1h 5s");
        assert_eq!(format_compact_duration(86400), "1d");
        assert_eq!(format_compact_duration(90000), "1d 1h");
    }

    #[test]
    fn timestamp_pair_markup() {
        assert_eq!(discord_timestamp_pair(10), "<t:10:R> • <t:10:f>");
    }
}
