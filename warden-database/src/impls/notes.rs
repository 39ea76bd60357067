use crate::{
    database::Database,
    impls::{from_db, now_unix_secs, opt_from_db, to_db},
    model::notes::UserNote,
};

const NOTE_COLUMNS: &str =
    "id, guild_id, target_user_id, author_user_id, content, created_at, updated_at, deleted_at";

#[derive(sqlx::FromRow)]
struct UserNoteRow {
    id: i64,
    guild_id: i64,
    target_user_id: i64,
    author_user_id: i64,
    content: String,
    created_at: i64,
    updated_at: i64,
    deleted_at: Option<i64>,
}

impl TryFrom<UserNoteRow> for UserNote {
    type Error = anyhow::Error;

    fn try_from(row: UserNoteRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: from_db(row.id, "id")?,
            guild_id: from_db(row.guild_id, "guild_id")?,
            target_user_id: from_db(row.target_user_id, "target_user_id")?,
            author_user_id: from_db(row.author_user_id, "author_user_id")?,
            content: row.content,
            created_at: from_db(row.created_at, "created_at")?,
            updated_at: from_db(row.updated_at, "updated_at")?,
            deleted_at: opt_from_db(row.deleted_at, "deleted_at")?,
        })
    }
}

pub async fn add_user_note(
    db: &Database,
    guild_id: u64,
    target_user_id: u64,
    author_user_id: u64,
    content: &str,
) -> anyhow::Result<UserNote> {
    let row: UserNoteRow = sqlx::query_as(&format!(
        "INSERT INTO user_notes (guild_id, target_user_id, author_user_id, content, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $5)
         RETURNING {NOTE_COLUMNS}"
    ))
    .bind(to_db(guild_id, "guild_id")?)
    .bind(to_db(target_user_id, "target_user_id")?)
    .bind(to_db(author_user_id, "author_user_id")?)
    .bind(content)
    .bind(to_db(now_unix_secs(), "now")?)
    .fetch_one(db.pool())
    .await?;

    row.try_into()
}

/// Live notes for a user, newest first.
pub async fn list_user_notes(
    db: &Database,
    guild_id: u64,
    target_user_id: u64,
) -> anyhow::Result<Vec<UserNote>> {
    let rows: Vec<UserNoteRow> = sqlx::query_as(&format!(
        "SELECT {NOTE_COLUMNS}
         FROM user_notes
         WHERE guild_id = $1 AND target_user_id = $2 AND deleted_at IS NULL
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(to_db(guild_id, "guild_id")?)
    .bind(to_db(target_user_id, "target_user_id")?)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(UserNote::try_from).collect()
}

/// Soft-delete a single note. Returns `false` if it was missing or already deleted.
pub async fn delete_user_note(db: &Database, guild_id: u64, note_id: u64) -> anyhow::Result<bool> {
    let now = to_db(now_unix_secs(), "now")?;

    let updated = sqlx::query(
        "UPDATE user_notes
         SET deleted_at = $1, updated_at = $1
         WHERE guild_id = $2 AND id = $3 AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(to_db(guild_id, "guild_id")?)
    .bind(to_db(note_id, "note_id")?)
    .execute(db.pool())
    .await?
    .rows_affected();

    Ok(updated > 0)
}

pub async fn clear_user_notes(
    db: &Database,
    guild_id: u64,
    target_user_id: u64,
) -> anyhow::Result<u64> {
    let now = to_db(now_unix_secs(), "now")?;

    let updated = sqlx::query(
        "UPDATE user_notes
         SET deleted_at = $1, updated_at = $1
         WHERE guild_id = $2 AND target_user_id = $3 AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(to_db(guild_id, "guild_id")?)
    .bind(to_db(target_user_id, "target_user_id")?)
    .execute(db.pool())
    .await?
    .rows_affected();

    Ok(updated)
}
