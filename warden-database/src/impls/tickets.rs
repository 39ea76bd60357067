use crate::database::Database;
use crate::impls::{from_db, now_unix_secs, opt_from_db, to_db};
use crate::model::tickets::{STATUS_CLOSED, STATUS_OPEN, Ticket};

const TICKET_COLUMNS: &str = "id, guild_id, channel_id, owner_user_id, reason, status, created_at, closed_at, closed_by_user_id";

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i64,
    guild_id: i64,
    channel_id: i64,
    owner_user_id: i64,
    reason: Option<String>,
    status: String,
    created_at: i64,
    closed_at: Option<i64>,
    closed_by_user_id: Option<i64>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = anyhow::Error;

    fn try_from(row: TicketRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: from_db(row.id, "id")?,
            guild_id: from_db(row.guild_id, "guild_id")?,
            channel_id: from_db(row.channel_id, "channel_id")?,
            owner_user_id: from_db(row.owner_user_id, "owner_user_id")?,
            reason: row.reason,
            status: row.status,
            created_at: from_db(row.created_at, "created_at")?,
            closed_at: opt_from_db(row.closed_at, "closed_at")?,
            closed_by_user_id: opt_from_db(row.closed_by_user_id, "closed_by_user_id")?,
        })
    }
}

/// Insert an open ticket. Returns `None` when the owner already has an open ticket in the guild.
pub async fn create_ticket(
    db: &Database,
    guild_id: u64,
    channel_id: u64,
    owner_user_id: u64,
    reason: Option<&str>,
) -> anyhow::Result<Option<Ticket>> {
    let row: Option<TicketRow> = sqlx::query_as(&format!(
        "INSERT INTO tickets (guild_id, channel_id, owner_user_id, reason, status, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (guild_id, owner_user_id) WHERE status = 'open' DO NOTHING
         RETURNING {TICKET_COLUMNS}"
    ))
    .bind(to_db(guild_id, "guild_id")?)
    .bind(to_db(channel_id, "channel_id")?)
    .bind(to_db(owner_user_id, "owner_user_id")?)
    .bind(reason)
    .bind(STATUS_OPEN)
    .bind(to_db(now_unix_secs(), "now")?)
    .fetch_optional(db.pool())
    .await?;

    row.map(Ticket::try_from).transpose()
}

pub async fn get_ticket_by_channel(
    db: &Database,
    channel_id: u64,
) -> anyhow::Result<Option<Ticket>> {
    let row: Option<TicketRow> = sqlx::query_as(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE channel_id = $1"
    ))
    .bind(to_db(channel_id, "channel_id")?)
    .fetch_optional(db.pool())
    .await?;

    row.map(Ticket::try_from).transpose()
}

/// The owner's most recent open ticket in a guild, if any.
pub async fn open_ticket_for_owner(
    db: &Database,
    guild_id: u64,
    owner_user_id: u64,
) -> anyhow::Result<Option<Ticket>> {
    let row: Option<TicketRow> = sqlx::query_as(&format!(
        "SELECT {TICKET_COLUMNS}
         FROM tickets
         WHERE guild_id = $1 AND owner_user_id = $2 AND status = $3
         ORDER BY created_at DESC, id DESC
         LIMIT 1"
    ))
    .bind(to_db(guild_id, "guild_id")?)
    .bind(to_db(owner_user_id, "owner_user_id")?)
    .bind(STATUS_OPEN)
    .fetch_optional(db.pool())
    .await?;

    row.map(Ticket::try_from).transpose()
}

/// Mark an open ticket closed. Returns `false` when the channel has no open ticket.
pub async fn close_ticket(
    db: &Database,
    channel_id: u64,
    closed_by_user_id: u64,
) -> anyhow::Result<bool> {
    let updated = sqlx::query(
        "UPDATE tickets
         SET status = $1, closed_at = $2, closed_by_user_id = $3
         WHERE channel_id = $4 AND status = $5",
    )
    .bind(STATUS_CLOSED)
    .bind(to_db(now_unix_secs(), "now")?)
    .bind(to_db(closed_by_user_id, "closed_by_user_id")?)
    .bind(to_db(channel_id, "channel_id")?)
    .bind(STATUS_OPEN)
    .execute(db.pool())
    .await?
    .rows_affected();

    Ok(updated > 0)
}

/// Forget a ticket whose channel was deleted before it was closed.
pub async fn delete_ticket_for_channel(db: &Database, channel_id: u64) -> anyhow::Result<bool> {
    let deleted = sqlx::query("DELETE FROM tickets WHERE channel_id = $1")
        .bind(to_db(channel_id, "channel_id")?)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted > 0)
}
