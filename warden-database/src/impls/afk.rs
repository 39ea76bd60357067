use crate::cache::{AFK_CACHE_TTL, afk_key, invalidate_afk};
use crate::database::Database;
use crate::impls::{from_db, now_unix_secs, to_db};
use crate::model::afk::AfkEntry;

pub async fn set_afk(db: &Database, user_id: u64, reason: &str) -> anyhow::Result<AfkEntry> {
    let since = now_unix_secs();

    sqlx::query(
        "INSERT INTO afk_status (user_id, reason, since)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id) DO UPDATE SET reason = EXCLUDED.reason, since = EXCLUDED.since",
    )
    .bind(to_db(user_id, "user_id")?)
    .bind(reason)
    .bind(to_db(since, "since")?)
    .execute(db.pool())
    .await?;

    invalidate_afk(db.cache(), user_id).await;

    Ok(AfkEntry {
        user_id,
        reason: reason.to_owned(),
        since,
    })
}

pub async fn get_afk(db: &Database, user_id: u64) -> anyhow::Result<Option<AfkEntry>> {
    let cache_key = afk_key(db.cache(), user_id);
    db.cache()
        .get_or_load_json(&cache_key, AFK_CACHE_TTL, || async {
            let row = sqlx::query_as::<_, (String, i64)>(
                "SELECT reason, since FROM afk_status WHERE user_id = $1",
            )
            .bind(to_db(user_id, "user_id")?)
            .fetch_optional(db.pool())
            .await?;

            row.map(|(reason, since)| {
                Ok(AfkEntry {
                    user_id,
                    reason,
                    since: from_db(since, "since")?,
                })
            })
            .transpose()
        })
        .await
}

/// Remove the AFK entry and return what was removed.
pub async fn clear_afk(db: &Database, user_id: u64) -> anyhow::Result<Option<AfkEntry>> {
    let row = sqlx::query_as::<_, (String, i64)>(
        "DELETE FROM afk_status WHERE user_id = $1 RETURNING reason, since",
    )
    .bind(to_db(user_id, "user_id")?)
    .fetch_optional(db.pool())
    .await?;

    invalidate_afk(db.cache(), user_id).await;

    row.map(|(reason, since)| {
        Ok(AfkEntry {
            user_id,
            reason,
            since: from_db(since, "since")?,
        })
    })
    .transpose()
}
