use crate::database::Database;
use crate::impls::{from_db, now_unix_secs, to_db};
use crate::model::premium::{PremiumGrant, extended_expiry};

pub async fn get_premium(db: &Database, user_id: u64) -> anyhow::Result<Option<PremiumGrant>> {
    let row = sqlx::query_as::<_, (i64, i64, i64)>(
        "SELECT expires_at, granted_by, granted_at FROM premium_users WHERE user_id = $1",
    )
    .bind(to_db(user_id, "user_id")?)
    .fetch_optional(db.pool())
    .await?;

    row.map(|(expires_at, granted_by, granted_at)| {
        Ok(PremiumGrant {
            user_id,
            expires_at: from_db(expires_at, "expires_at")?,
            granted_by: from_db(granted_by, "granted_by")?,
            granted_at: from_db(granted_at, "granted_at")?,
        })
    })
    .transpose()
}

pub async fn is_premium(db: &Database, user_id: u64) -> anyhow::Result<bool> {
    let now = now_unix_secs();
    Ok(get_premium(db, user_id)
        .await?
        .is_some_and(|grant| grant.is_active(now)))
}

/// Grant or extend premium by `duration_seconds` and return the stored grant.
pub async fn grant_premium(
    db: &Database,
    user_id: u64,
    granted_by: u64,
    duration_seconds: u64,
) -> anyhow::Result<PremiumGrant> {
    let now = now_unix_secs();
    let user_id_db = to_db(user_id, "user_id")?;

    let mut tx = db.pool().begin().await?;

    // Row locks miss a user without a row yet, so concurrent grants serialize on the user id.
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended('premium:' || $1::text, 0))")
        .bind(user_id_db)
        .execute(&mut *tx)
        .await?;

    let current: Option<i64> = sqlx::query_scalar(
        "SELECT expires_at FROM premium_users WHERE user_id = $1",
    )
    .bind(user_id_db)
    .fetch_optional(&mut *tx)
    .await?;

    let current = current.map(|value| from_db(value, "expires_at")).transpose()?;
    let expires_at = extended_expiry(current, now, duration_seconds);

    sqlx::query(
        "INSERT INTO premium_users (user_id, expires_at, granted_by, granted_at)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (user_id) DO UPDATE
         SET expires_at = EXCLUDED.expires_at,
             granted_by = EXCLUDED.granted_by,
             granted_at = EXCLUDED.granted_at",
    )
    .bind(user_id_db)
    .bind(to_db(expires_at, "expires_at")?)
    .bind(to_db(granted_by, "granted_by")?)
    .bind(to_db(now, "granted_at")?)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(PremiumGrant {
        user_id,
        expires_at,
        granted_by,
        granted_at: now,
    })
}

pub async fn revoke_premium(db: &Database, user_id: u64) -> anyhow::Result<bool> {
    let deleted = sqlx::query("DELETE FROM premium_users WHERE user_id = $1")
        .bind(to_db(user_id, "user_id")?)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted > 0)
}
