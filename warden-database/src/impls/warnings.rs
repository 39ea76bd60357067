use crate::{
    database::Database,
    impls::{from_db, now_unix_secs, to_db},
    model::warnings::{WarningEntry, WarningRecord},
};

#[derive(sqlx::FromRow)]
struct WarningRow {
    warned_at: i64,
    moderator_id: i64,
    reason: String,
}

/// Record a warning for a target user and return the new warning number.
pub async fn record_warning(
    db: &Database,
    guild_id: u64,
    user_id: u64,
    moderator_id: u64,
    reason: &str,
) -> anyhow::Result<WarningRecord> {
    let guild_id = to_db(guild_id, "guild_id")?;
    let user_id = to_db(user_id, "user_id")?;

    let mut tx = db.pool().begin().await?;

    sqlx::query(
        "INSERT INTO warnings (guild_id, user_id, moderator_id, reason, warned_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(guild_id)
    .bind(user_id)
    .bind(to_db(moderator_id, "moderator_id")?)
    .bind(reason)
    .bind(to_db(now_unix_secs(), "warned_at")?)
    .execute(&mut *tx)
    .await?;

    let warn_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM warnings WHERE guild_id = $1 AND user_id = $2")
            .bind(guild_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

    tx.commit().await?;

    Ok(WarningRecord {
        warn_number: usize::try_from(warn_count).unwrap_or(usize::MAX),
    })
}

/// Return warning entries for a target user warned at or after `since`, oldest first.
pub async fn warnings_since(
    db: &Database,
    guild_id: u64,
    user_id: u64,
    since: u64,
) -> anyhow::Result<Vec<WarningEntry>> {
    let rows: Vec<WarningRow> = sqlx::query_as(
        "SELECT warned_at, moderator_id, reason
         FROM warnings
         WHERE guild_id = $1 AND user_id = $2 AND warned_at >= $3
         ORDER BY warned_at ASC, id ASC",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(to_db(user_id, "user_id")?)
    .bind(to_db(since, "since")?)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(WarningEntry {
                warned_at: from_db(row.warned_at, "warned_at")?,
                moderator_id: from_db(row.moderator_id, "moderator_id")?,
                reason: row.reason,
            })
        })
        .collect()
}

pub async fn clear_warnings(db: &Database, guild_id: u64, user_id: u64) -> anyhow::Result<u64> {
    let deleted = sqlx::query("DELETE FROM warnings WHERE guild_id = $1 AND user_id = $2")
        .bind(to_db(guild_id, "guild_id")?)
        .bind(to_db(user_id, "user_id")?)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted)
}

/// Remove the n-th warning (1-based, oldest first). Returns `false` when it does not exist.
pub async fn remove_warning_by_number(
    db: &Database,
    guild_id: u64,
    user_id: u64,
    warning_number: usize,
) -> anyhow::Result<bool> {
    let warning_number = i64::try_from(warning_number).unwrap_or(i64::MAX);

    let deleted_row: Option<i64> = sqlx::query_scalar(
        "WITH ranked AS (
            SELECT id, ROW_NUMBER() OVER (ORDER BY warned_at ASC, id ASC) AS rn
            FROM warnings
            WHERE guild_id = $1 AND user_id = $2
        )
        DELETE FROM warnings w
        USING ranked r
        WHERE w.id = r.id AND r.rn = $3
        RETURNING w.id",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(to_db(user_id, "user_id")?)
    .bind(warning_number)
    .fetch_optional(db.pool())
    .await?;

    Ok(deleted_row.is_some())
}
