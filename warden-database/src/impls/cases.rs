use crate::{
    database::Database,
    impls::{from_db, now_unix_secs, opt_from_db, opt_to_db, to_db},
    model::cases::CaseSummary,
};

pub struct NewCase<'a> {
    pub guild_id: u64,
    pub target_user_id: Option<u64>,
    pub moderator_user_id: u64,
    pub action: &'a str,
    pub reason: &'a str,
    pub status: &'a str,
    pub duration_seconds: Option<u64>,
}

pub struct CaseFilters<'a> {
    pub target_user_id: Option<u64>,
    pub moderator_user_id: Option<u64>,
    pub action: Option<&'a str>,
    pub limit: u32,
}

#[derive(sqlx::FromRow)]
struct CaseSummaryRow {
    case_number: i64,
    case_code: String,
    action_case_number: i64,
    target_user_id: Option<i64>,
    moderator_user_id: i64,
    action: String,
    reason: String,
    duration_seconds: Option<i64>,
    created_at: i64,
}

impl TryFrom<CaseSummaryRow> for CaseSummary {
    type Error = anyhow::Error;

    fn try_from(row: CaseSummaryRow) -> anyhow::Result<Self> {
        Ok(Self {
            case_number: from_db(row.case_number, "case_number")?,
            case_code: row.case_code,
            action_case_number: from_db(row.action_case_number, "action_case_number")?,
            target_user_id: opt_from_db(row.target_user_id, "target_user_id")?,
            moderator_user_id: from_db(row.moderator_user_id, "moderator_user_id")?,
            action: row.action,
            reason: row.reason,
            duration_seconds: opt_from_db(row.duration_seconds, "duration_seconds")?,
            created_at: from_db(row.created_at, "created_at")?,
        })
    }
}

/// Insert a moderation case, allocating both the guild-wide case number and
/// the per-action number under a guild-scoped advisory lock.
pub async fn create_case(db: &Database, new_case: NewCase<'_>) -> anyhow::Result<CaseSummary> {
    let guild_id = to_db(new_case.guild_id, "guild_id")?;
    let now = to_db(now_unix_secs(), "now")?;
    let case_code = action_code(new_case.action);

    let mut tx = db.pool().begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(guild_id)
        .execute(&mut *tx)
        .await?;

    let (next_case_number, next_action_case_number): (i64, i64) = sqlx::query_as(
        "SELECT
            COALESCE(MAX(case_number), 0) + 1,
            COALESCE(MAX(action_case_number) FILTER (WHERE case_code = $2), 0) + 1
         FROM mod_cases
         WHERE guild_id = $1",
    )
    .bind(guild_id)
    .bind(case_code)
    .fetch_one(&mut *tx)
    .await?;

    let row: CaseSummaryRow = sqlx::query_as(
        "INSERT INTO mod_cases (
            guild_id,
            case_number,
            case_code,
            action_case_number,
            target_user_id,
            moderator_user_id,
            action,
            reason,
            status,
            duration_seconds,
            created_at,
            updated_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
         RETURNING case_number, case_code, action_case_number, target_user_id, moderator_user_id, action, reason, duration_seconds, created_at",
    )
    .bind(guild_id)
    .bind(next_case_number)
    .bind(case_code)
    .bind(next_action_case_number)
    .bind(opt_to_db(new_case.target_user_id, "target_user_id")?)
    .bind(to_db(new_case.moderator_user_id, "moderator_user_id")?)
    .bind(new_case.action)
    .bind(new_case.reason)
    .bind(new_case.status)
    .bind(opt_to_db(new_case.duration_seconds, "duration_seconds")?)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    row.try_into()
}

pub async fn list_recent_cases(
    db: &Database,
    guild_id: u64,
    filters: CaseFilters<'_>,
) -> anyhow::Result<Vec<CaseSummary>> {
    let limit = i64::from(filters.limit.clamp(1, 200));

    let rows: Vec<CaseSummaryRow> = sqlx::query_as(
        "SELECT case_number, case_code, action_case_number, target_user_id, moderator_user_id, action, reason, duration_seconds, created_at
         FROM mod_cases
         WHERE guild_id = $1
           AND ($2::BIGINT IS NULL OR target_user_id = $2)
           AND ($3::BIGINT IS NULL OR moderator_user_id = $3)
           AND ($4::TEXT IS NULL OR LOWER(action) = LOWER($4))
         ORDER BY case_number DESC
         LIMIT $5",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(opt_to_db(filters.target_user_id, "target_user_id")?)
    .bind(opt_to_db(filters.moderator_user_id, "moderator_user_id")?)
    .bind(filters.action)
    .bind(limit)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(CaseSummary::try_from).collect()
}

/// Short code used in case labels (`W3`, `B1`, ...).
pub fn action_code(action: &str) -> &'static str {
    match action {
        "warn" => "W",
        "ban" => "B",
        "kick" => "K",
        "timeout" => "T",
        "unban" => "UB",
        "untimeout" => "UT",
        "unwarn" => "UW",
        "unwarn_all" => "UWA",
        "purge" => "P",
        "word_filter_timeout" | "word_filter_delete" | "word_filter_log" | "word_filter_warn" => {
            "WF"
        }
        _ => "M",
    }
}

#[cfg(test)]
mod tests {
    use super::action_code;

    #[test]
    fn word_filter_actions_share_a_code() {
        assert_eq!(action_code("word_filter_warn"), "WF");
        assert_eq!(action_code("word_filter_log"), "WF");
    }

    #[test]
    fn unknown_actions_fall_back_to_misc() {
        assert_eq!(action_code("ban"), "B");
        assert_eq!(action_code("something_else"), "M");
    }
}
