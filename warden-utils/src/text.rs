/// Longest channel name produced by [`safe_channel_name`].
pub const CHANNEL_NAME_LIMIT: usize = 90;

/// Turn arbitrary text into a Discord text-channel name.
///
/// Lower-cases, replaces every character that is not alphanumeric, `-` or `_`
/// with `-`, keeps at most [`CHANNEL_NAME_LIMIT`] characters and trims `-`
/// from both ends.
pub fn safe_channel_name(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect::<String>()
        .to_lowercase();

    truncate_chars(&mapped, CHANNEL_NAME_LIMIT)
        .trim_matches('-')
        .to_owned()
}

/// Prefix of at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(raw: &str, max_chars: usize) -> &str {
    match raw.char_indices().nth(max_chars) {
        Some((index, _)) => &raw[..index],
        None => raw,
    }
}

/// Break `@everyone`/`@here` so echoed user text cannot ping the server.
pub fn sanitize_mentions(raw: &str) -> String {
    raw.replace("@everyone", "@\u{200B}everyone")
        .replace("@here", "@\u{200B}here")
}

/// Values substituted into a welcome template.
pub struct WelcomeVars<'a> {
    pub user_mention: &'a str,
    pub username: &'a str,
    pub server: &'a str,
    pub member_count: u64,
}

/// Fill `{user}`, `{username}`, `{server}` and `{member_count}` in one pass.
///
/// Substituted values are never expanded again; other text is kept as is.
pub fn render_welcome_template(template: &str, vars: &WelcomeVars<'_>) -> String {
    let member_count = vars.member_count.to_string();
    let placeholders = [
        ("{user}", vars.user_mention),
        ("{username}", vars.username),
        ("{server}", vars.server),
        ("{member_count}", member_count.as_str()),
    ];

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match placeholders
            .iter()
            .find(|(placeholder, _)| tail.starts_with(placeholder))
        {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// First blocked word that appears as a whole token in `content`.
///
/// Tokens are the lower-cased runs of alphanumeric characters, so `ass` does
/// not match `class`.
pub fn find_filtered_word<'w>(content: &str, words: &'w [String]) -> Option<&'w str> {
    let lowered = content.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();

    words
        .iter()
        .map(String::as_str)
        .find(|word| tokens.contains(word))
}

/// Normalise a word for storage in the blocklist.
pub fn normalize_filter_word(raw: &str) -> Option<String> {
    let word = raw.trim().to_lowercase();
    (!word.is_empty() && word.chars().all(char::is_alphanumeric)).then_some(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_are_sanitized() {
        assert_eq!(safe_channel_name("ticket-Some User!"), "ticket-some-user");
        assert_eq!(safe_channel_name("--ab_c--"), "ab_c");
        assert_eq!(safe_channel_name("ticket-ÉLAN"), "ticket-élan");
    }

    #[test]
    fn channel_names_are_truncated_before_trimming() {
        let raw = format!("{}!!!", "a".repeat(89));
        assert_eq!(safe_channel_name(&raw), "a".repeat(89));
        assert_eq!(safe_channel_name(&"b".repeat(200)).len(), CHANNEL_NAME_LIMIT);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn mass_mentions_are_defused() {
        let out = sanitize_mentions("hi @everyone and @here");
        assert!(!out.contains("@everyone"));
        assert!(!out.contains("@here"));
    }

    #[test]
    fn welcome_placeholders() {
        let vars = WelcomeVars {
            user_mention: "<@1>",
            username: "alice",
            server: "Rustaceans",
            member_count: 42,
        };
        assert_eq!(
            render_welcome_template("Welcome to {server}, {user}! ({username} #{member_count}) {other}", &vars),
            "Welcome to Rustaceans, <@1>! (alice #42) {other}"
        );
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let vars = WelcomeVars {
            user_mention: "<@1>",
            username: "{server}{member_count}",
            server: "S",
            member_count: 9,
        };
        assert_eq!(
            render_welcome_template("Hi {username}", &vars),
            "Hi {server}{member_count}"
        );
        assert_eq!(render_welcome_template("{{user}} {", &vars), "{<@1>} {");
    }

    #[test]
    fn filter_matches_whole_words_only() {
        let words = vec!["bad".to_owned(), "worse".to_owned()];
        assert_eq!(find_filtered_word("this is BAD!", &words), Some("bad"));
        assert_eq!(find_filtered_word("badge of honour", &words), None);
        assert_eq!(find_filtered_word("even worse.", &words), Some("worse"));
        assert_eq!(find_filtered_word("", &words), None);
    }

    #[test]
    fn filter_words_are_normalized() {
        assert_eq!(normalize_filter_word("  Spam "), Some("spam".to_owned()));
        assert_eq!(normalize_filter_word("two words"), None);
        assert_eq!(normalize_filter_word(""), None);
    }
}
