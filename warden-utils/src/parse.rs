/// Parse a compact duration like `30s`, `10m`, `2h`, `1d`, `1h30m`, or plain seconds.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let mut total_seconds = 0_u64;
    let mut digits = String::new();
    let mut saw_unit_segment = false;
    let mut chars = compact.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            if chars.peek().is_some() {
                continue;
            }
            // A trailing bare number is only valid on its own (`90`), never after `1m`.
            if saw_unit_segment {
                return None;
            }
            total_seconds = total_seconds.checked_add(parse_positive(&digits)?)?;
            digits.clear();
            break;
        }

        let multiplier = match ch.to_ascii_lowercase() {
            's' => 1_u64,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 60 * 60 * 24,
            'w' => 60 * 60 * 24 * 7,
            _ => return None,
        };

        let part = parse_positive(&digits)?.checked_mul(multiplier)?;
        total_seconds = total_seconds.checked_add(part)?;
        digits.clear();
        saw_unit_segment = true;
    }

    (total_seconds > 0).then_some(total_seconds)
}

fn parse_positive(digits: &str) -> Option<u64> {
    digits.parse::<u64>().ok().filter(|value| *value > 0)
}

/// Whether the token ends in a duration unit (used to split `timeout` arguments).
pub fn has_duration_unit(raw: &str) -> bool {
    raw.trim()
        .chars()
        .last()
        .is_some_and(|last| matches!(last.to_ascii_lowercase(), 's' | 'm' | 'h' | 'd' | 'w'))
}

fn parse_snowflake_markup(raw: &str, open: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<u64>() {
        return Some(id);
    }

    raw.strip_prefix(open)?
        .strip_suffix('>')?
        .parse::<u64>()
        .ok()
}

/// Accept `123`, or a channel mention `<#123>`.
pub fn parse_channel_id(raw: &str) -> Option<u64> {
    parse_snowflake_markup(raw, "<#")
}

/// Accept `123`, or a role mention `<@&123>`.
pub fn parse_role_id(raw: &str) -> Option<u64> {
    parse_snowflake_markup(raw, "<@&")
}

/// Parse toggles such as `on`, `off`, `enable`, `false`.
pub fn parse_toggle(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "enable" | "enabled" | "true" | "yes" | "1" => Some(true),
        "off" | "disable" | "disabled" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Name of the prefixed command a message invokes, e.g. `wordfilter` for `!wordfilter add x`.
pub fn prefix_command_name(content: &str) -> Option<&str> {
    content
        .trim_start()
        .strip_prefix(crate::COMMAND_PREFIX)
        .and_then(|rest| rest.split_whitespace().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_unit_durations() {
        assert_eq!(parse_duration_seconds("30s"), Some(30));
        assert_eq!(parse_duration_seconds("10m"), Some(600));
        assert_eq!(parse_duration_seconds("2H"), Some(7_200));
        assert_eq!(parse_duration_seconds("1d"), Some(86_400));
        assert_eq!(parse_duration_seconds("1w"), Some(604_800));
    }

    #[test]
    fn parses_compound_and_bare_durations() {
        assert_eq!(parse_duration_seconds("1h30m"), Some(5_400));
        assert_eq!(parse_duration_seconds("1h 30m"), Some(5_400));
        assert_eq!(parse_duration_seconds("90"), Some(90));
    }

    #[test]
    fn rejects_bad_durations() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("0m"), None);
        assert_eq!(parse_duration_seconds("m"), None);
        assert_eq!(parse_duration_seconds("10x"), None);
        assert_eq!(parse_duration_seconds("1m30"), None);
        assert_eq!(parse_duration_seconds("99999999999999999999d"), None);
    }

    #[test]
    fn duration_unit_detection() {
        assert!(has_duration_unit("10m"));
        assert!(has_duration_unit("2D"));
        assert!(!has_duration_unit("spam"));
        assert!(!has_duration_unit(""));
    }

    #[test]
    fn channel_and_role_ids() {
        assert_eq!(parse_channel_id("<#42>"), Some(42));
        assert_eq!(parse_channel_id(" 42 "), Some(42));
        assert_eq!(parse_channel_id("<@&42>"), None);
        assert_eq!(parse_role_id("<@&7>"), Some(7));
        assert_eq!(parse_role_id("7"), Some(7));
        assert_eq!(parse_role_id("<#7>"), None);
    }

    #[test]
    fn toggles() {
        assert_eq!(parse_toggle("ON"), Some(true));
        assert_eq!(parse_toggle("disable"), Some(false));
        assert_eq!(parse_toggle("maybe"), None);
    }

    #[test]
    fn prefix_command_names() {
        assert_eq!(prefix_command_name("  !wordfilter add bad"), Some("wordfilter"));
        assert_eq!(prefix_command_name("!afk"), Some("afk"));
        assert_eq!(prefix_command_name("wordfilter add bad"), None);
        assert_eq!(prefix_command_name("! afk"), Some("afk"));
    }
}
