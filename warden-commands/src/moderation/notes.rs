use std::time::Duration;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::usage_message;
use crate::moderation::guild_with_permission;
use warden_core::{Context, Error};
use warden_database::impls::notes::{
    add_user_note, clear_user_notes, delete_user_note, list_user_notes,
};
use warden_database::model::notes::UserNote;
use warden_utils::confirmation::{ConfirmationTexts, confirm};
use warden_utils::embed::titled_embed;
use warden_utils::pagination::{page_window, paginate_embed_pages, total_pages};
use warden_utils::text::sanitize_mentions;

pub const META: CommandMeta = CommandMeta {
    name: "notes",
    desc: "Add, view, remove or clear moderator notes for a user.",
    category: "moderation",
    usage: "!notes <user> [note|remove <id>|clear]",
};

const NOTES_PER_PAGE: usize = 5;
const NOTE_MAX_CHARS: usize = 2000;
const CLEAR_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, PartialEq, Eq)]
enum NotesAction<'a> {
    List,
    Clear,
    Remove(u64),
    Add(&'a str),
}

fn parse_notes_action(raw: Option<&str>) -> Result<NotesAction<'_>, &'static str> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(NotesAction::List);
    };

    if raw.eq_ignore_ascii_case("clear") {
        return Ok(NotesAction::Clear);
    }

    let mut words = raw.splitn(2, char::is_whitespace);
    if words.next().is_some_and(|word| word.eq_ignore_ascii_case("remove")) {
        let id = words.next().map(|id| id.trim().trim_start_matches('#'));
        return id
            .and_then(|id| id.parse::<u64>().ok())
            .map(NotesAction::Remove)
            .ok_or("Provide the note number to remove, e.g. `remove 12`.");
    }

    if raw.chars().count() > NOTE_MAX_CHARS {
        return Err("Note content is too long (max 2000 characters).");
    }

    Ok(NotesAction::Add(raw))
}

fn note_pages(notes: &[UserNote]) -> Vec<String> {
    (1..=total_pages(notes.len(), NOTES_PER_PAGE))
        .map(|page| {
            page_window(notes, NOTES_PER_PAGE, page)
                .iter()
                .map(|note| {
                    format!(
                        "#{} • by <@{}> • <t:{}:R>\n{}",
                        note.id,
                        note.author_user_id,
                        note.created_at,
                        sanitize_mentions(&note.content),
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .collect()
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn notes(
    ctx: Context<'_>,
    #[description = "Target user"] user: Option<serenity::User>,
    #[description = "Note to add, `remove <id>`, or `clear`"] #[rest] note: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_MESSAGES).await?
    else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let action = match parse_notes_action(note.as_deref()) {
        Ok(action) => action,
        Err(message) => {
            ctx.say(message).await?;
            return Ok(());
        }
    };

    let db = &ctx.data().db;
    match action {
        NotesAction::List => {
            let notes = list_user_notes(db, guild_id.get(), user.id.get()).await?;
            if notes.is_empty() {
                ctx.say(format!("No notes found for <@{}>.", user.id.get())).await?;
                return Ok(());
            }
            paginate_embed_pages(ctx, &format!("Notes for {}", user.name), &note_pages(&notes), 1)
                .await?;
        }
        NotesAction::Add(content) => {
            let saved = add_user_note(db, guild_id.get(), user.id.get(), ctx.author().id.get(), content)
                .await?;
            ctx.say(format!("Added note #{} for <@{}>.", saved.id, saved.target_user_id))
                .await?;
        }
        NotesAction::Remove(note_id) => {
            let reply = if delete_user_note(db, guild_id.get(), note_id).await? {
                format!("Removed note #{note_id}.")
            } else {
                format!("Note #{note_id} was not found.")
            };
            ctx.say(reply).await?;
        }
        NotesAction::Clear => {
            let confirmed = confirm(
                ctx,
                titled_embed(
                    "Confirm note clear",
                    format!("This will clear all notes for <@{}>.", user.id.get()),
                ),
                CLEAR_CONFIRM_TIMEOUT,
                ConfirmationTexts {
                    timed_out: "Timed out.",
                    declined: "Note clear cancelled.",
                    processing: "Clearing notes...",
                },
            )
            .await?;

            if confirmed {
                let removed = clear_user_notes(db, guild_id.get(), user.id.get()).await?;
                ctx.say(format!("Cleared {removed} note(s) for <@{}>.", user.id.get()))
                    .await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parsing() {
        assert_eq!(parse_notes_action(None), Ok(NotesAction::List));
        assert_eq!(parse_notes_action(Some("  ")), Ok(NotesAction::List));
        assert_eq!(parse_notes_action(Some("CLEAR")), Ok(NotesAction::Clear));
        assert_eq!(parse_notes_action(Some("remove #12")), Ok(NotesAction::Remove(12)));
        assert!(parse_notes_action(Some("remove twelve")).is_err());
        assert_eq!(
            parse_notes_action(Some("talked to them about spam")),
            Ok(NotesAction::Add("talked to them about spam"))
        );
    }

    #[test]
    fn long_notes_are_rejected() {
        let long = "x".repeat(NOTE_MAX_CHARS + 1);
        assert!(parse_notes_action(Some(&long)).is_err());
    }
}
