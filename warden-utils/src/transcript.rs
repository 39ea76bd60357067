use poise::serenity_prelude as serenity;

/// Upper bound on messages collected for one transcript.
pub const TRANSCRIPT_MESSAGE_LIMIT: usize = 1000;

/// Page size used when walking channel history.
pub const TRANSCRIPT_PAGE_SIZE: u8 = 100;

/// One message as it appears in a ticket transcript.
#[derive(Clone, Debug)]
pub struct TranscriptEntry {
    pub message_id: u64,
    pub timestamp: serenity::Timestamp,
    pub author_tag: String,
    pub author_id: u64,
    pub content: String,
    pub attachment_urls: Vec<String>,
}

impl From<&serenity::Message> for TranscriptEntry {
    fn from(message: &serenity::Message) -> Self {
        Self {
            message_id: message.id.get(),
            timestamp: message.timestamp,
            author_tag: message.author.tag(),
            author_id: message.author.id.get(),
            content: message.content.clone(),
            attachment_urls: message
                .attachments
                .iter()
                .map(|attachment| attachment.url.clone())
                .collect(),
        }
    }
}

impl TranscriptEntry {
    fn render(&self) -> String {
        let mut line = format!(
            "[{} UTC] {} ({}): {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.author_tag,
            self.author_id,
            self.content
        );

        if !self.attachment_urls.is_empty() {
            line.push_str(&format!(
                "\n[attachments: {}]",
                self.attachment_urls.join(" ")
            ));
        }

        line
    }
}

/// Render entries oldest first, separated by blank lines.
///
/// Input order does not matter; entries are ordered by message id, which is
/// monotonic in creation time.
pub fn render_transcript(entries: &[TranscriptEntry]) -> String {
    let mut ordered: Vec<&TranscriptEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.message_id);

    ordered
        .into_iter()
        .map(TranscriptEntry::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Walk the channel history newest to oldest, up to [`TRANSCRIPT_MESSAGE_LIMIT`] messages.
pub async fn fetch_transcript_entries(
    http: &serenity::Http,
    channel_id: serenity::ChannelId,
) -> Result<Vec<TranscriptEntry>, serenity::Error> {
    let mut entries = Vec::new();
    let mut before: Option<serenity::MessageId> = None;

    while entries.len() < TRANSCRIPT_MESSAGE_LIMIT {
        let remaining = (TRANSCRIPT_MESSAGE_LIMIT - entries.len()).min(usize::from(TRANSCRIPT_PAGE_SIZE));
        let mut request = serenity::GetMessages::new().limit(remaining as u8);
        if let Some(before) = before {
            request = request.before(before);
        }

        let page = channel_id.messages(http, request).await?;
        let Some(oldest) = page.last() else {
            break;
        };
        before = Some(oldest.id);

        let exhausted = page.len() < remaining;
        entries.extend(page.iter().map(TranscriptEntry::from));
        if exhausted {
            break;
        }
    }

    Ok(entries)
}

pub fn transcript_filename(channel_name: &str) -> String {
    format!("transcript-{channel_name}.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message_id: u64, unix: i64, content: &str, attachments: &[&str]) -> TranscriptEntry {
        TranscriptEntry {
            message_id,
            timestamp: serenity::Timestamp::from_unix_timestamp(unix).expect("valid timestamp"),
            author_tag: "alice".to_owned(),
            author_id: 7,
            content: content.to_owned(),
            attachment_urls: attachments.iter().map(|url| (*url).to_owned()).collect(),
        }
    }

    #[test]
    fn renders_chronologically_with_blank_line_separator() {
        let entries = vec![
            entry(2, 60, "second", &[]),
            entry(1, 0, "first", &[]),
        ];

        assert_eq!(
            render_transcript(&entries),
            "[1970-01-01 00:00:00 UTC] alice (7): first\n\n[1970-01-01 00:01:00 UTC] alice (7): second"
        );
    }

    #[test]
    fn lists_attachments_after_content() {
        let rendered = render_transcript(&[entry(1, 0, "", &["https://a/1.png", "https://a/2.png"])]);
        assert_eq!(
            rendered,
            "[1970-01-01 00:00:00 UTC] alice (7): \n[attachments: https://a/1.png https://a/2.png]"
        );
    }

    #[test]
    fn empty_transcript_is_empty() {
        assert_eq!(render_transcript(&[]), "");
    }

    #[test]
    fn filename_uses_channel_name() {
        assert_eq!(transcript_filename("ticket-bob"), "transcript-ticket-bob.txt");
    }
}
