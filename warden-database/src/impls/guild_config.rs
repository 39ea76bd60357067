use crate::cache::{CONFIG_CACHE_TTL, guild_config_key, invalidate_guild_config};
use crate::database::Database;
use crate::impls::{opt_from_db, opt_to_db, to_db};
use crate::model::guild_config::{GuildConfig, SlowmodeConfig};

#[derive(sqlx::FromRow)]
struct GuildConfigRow {
    modlog_channel_id: Option<i64>,
    welcome_channel_id: Option<i64>,
    welcome_template: Option<String>,
    ticket_staff_role_id: Option<i64>,
    ticket_category_name: Option<String>,
    ticket_channel_prefix: Option<String>,
    slowmode_enabled: bool,
    slowmode_window_seconds: i32,
    slowmode_high_threshold: i32,
    slowmode_low_threshold: i32,
    slowmode_delay_seconds: i32,
}

fn to_guild_config(guild_id: u64, row: GuildConfigRow) -> anyhow::Result<GuildConfig> {
    let non_negative = |value: i32| u32::try_from(value).unwrap_or(0);

    Ok(GuildConfig {
        guild_id,
        modlog_channel_id: opt_from_db(row.modlog_channel_id, "modlog_channel_id")?,
        welcome_channel_id: opt_from_db(row.welcome_channel_id, "welcome_channel_id")?,
        welcome_template: row.welcome_template,
        ticket_staff_role_id: opt_from_db(row.ticket_staff_role_id, "ticket_staff_role_id")?,
        ticket_category_name: row.ticket_category_name,
        ticket_channel_prefix: row.ticket_channel_prefix,
        slowmode: SlowmodeConfig {
            enabled: row.slowmode_enabled,
            window_seconds: non_negative(row.slowmode_window_seconds),
            high_threshold: non_negative(row.slowmode_high_threshold),
            low_threshold: non_negative(row.slowmode_low_threshold),
            delay_seconds: non_negative(row.slowmode_delay_seconds),
        },
    })
}

/// Load a guild's settings, falling back to defaults when no row exists.
pub async fn get_guild_config(db: &Database, guild_id: u64) -> anyhow::Result<GuildConfig> {
    let cache_key = guild_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            let row: Option<GuildConfigRow> = sqlx::query_as(
                "SELECT modlog_channel_id, welcome_channel_id, welcome_template,
                        ticket_staff_role_id, ticket_category_name, ticket_channel_prefix,
                        slowmode_enabled, slowmode_window_seconds, slowmode_high_threshold,
                        slowmode_low_threshold, slowmode_delay_seconds
                 FROM guild_config
                 WHERE guild_id = $1",
            )
            .bind(to_db(guild_id, "guild_id")?)
            .fetch_optional(db.pool())
            .await?;

            match row {
                Some(row) => to_guild_config(guild_id, row),
                None => Ok(GuildConfig::empty(guild_id)),
            }
        })
        .await
}

pub async fn get_modlog_channel_id(db: &Database, guild_id: u64) -> anyhow::Result<Option<u64>> {
    Ok(get_guild_config(db, guild_id).await?.modlog_channel_id)
}

pub async fn set_modlog_channel_id(
    db: &Database,
    guild_id: u64,
    channel_id: Option<u64>,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO guild_config (guild_id, modlog_channel_id)
         VALUES ($1, $2)
         ON CONFLICT (guild_id) DO UPDATE SET modlog_channel_id = EXCLUDED.modlog_channel_id",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(opt_to_db(channel_id, "channel_id")?)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await;
    Ok(())
}

pub async fn clear_modlog_channel_id(db: &Database, guild_id: u64) -> anyhow::Result<()> {
    set_modlog_channel_id(db, guild_id, None).await
}

/// Set (or clear, with `None`) the welcome channel and template together.
pub async fn set_welcome(
    db: &Database,
    guild_id: u64,
    channel_id: Option<u64>,
    template: Option<&str>,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO guild_config (guild_id, welcome_channel_id, welcome_template)
         VALUES ($1, $2, $3)
         ON CONFLICT (guild_id) DO UPDATE
         SET welcome_channel_id = EXCLUDED.welcome_channel_id,
             welcome_template = EXCLUDED.welcome_template",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(opt_to_db(channel_id, "channel_id")?)
    .bind(template)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await;
    Ok(())
}

pub async fn clear_welcome(db: &Database, guild_id: u64) -> anyhow::Result<()> {
    set_welcome(db, guild_id, None, None).await
}

pub async fn set_ticket_staff_role(
    db: &Database,
    guild_id: u64,
    role_id: Option<u64>,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO guild_config (guild_id, ticket_staff_role_id)
         VALUES ($1, $2)
         ON CONFLICT (guild_id) DO UPDATE SET ticket_staff_role_id = EXCLUDED.ticket_staff_role_id",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(opt_to_db(role_id, "role_id")?)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await;
    Ok(())
}

pub async fn set_ticket_category_name(
    db: &Database,
    guild_id: u64,
    name: Option<&str>,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO guild_config (guild_id, ticket_category_name)
         VALUES ($1, $2)
         ON CONFLICT (guild_id) DO UPDATE SET ticket_category_name = EXCLUDED.ticket_category_name",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(name)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await;
    Ok(())
}

pub async fn set_ticket_channel_prefix(
    db: &Database,
    guild_id: u64,
    prefix: Option<&str>,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO guild_config (guild_id, ticket_channel_prefix)
         VALUES ($1, $2)
         ON CONFLICT (guild_id) DO UPDATE SET ticket_channel_prefix = EXCLUDED.ticket_channel_prefix",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(prefix)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await;
    Ok(())
}

pub async fn set_slowmode_enabled(
    db: &Database,
    guild_id: u64,
    enabled: bool,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO guild_config (guild_id, slowmode_enabled)
         VALUES ($1, $2)
         ON CONFLICT (guild_id) DO UPDATE SET slowmode_enabled = EXCLUDED.slowmode_enabled",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(enabled)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await;
    Ok(())
}

/// Store the traffic thresholds; `params.enabled` is ignored. Callers validate the values beforehand.
pub async fn set_slowmode_params(
    db: &Database,
    guild_id: u64,
    params: SlowmodeConfig,
) -> anyhow::Result<()> {
    let as_int = |value: u32| i32::try_from(value).unwrap_or(i32::MAX);

    sqlx::query(
        "INSERT INTO guild_config (
            guild_id,
            slowmode_window_seconds,
            slowmode_high_threshold,
            slowmode_low_threshold,
            slowmode_delay_seconds
         ) VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (guild_id) DO UPDATE
         SET slowmode_window_seconds = EXCLUDED.slowmode_window_seconds,
             slowmode_high_threshold = EXCLUDED.slowmode_high_threshold,
             slowmode_low_threshold = EXCLUDED.slowmode_low_threshold,
             slowmode_delay_seconds = EXCLUDED.slowmode_delay_seconds",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(as_int(params.window_seconds))
    .bind(as_int(params.high_threshold))
    .bind(as_int(params.low_threshold))
    .bind(as_int(params.delay_seconds))
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await;
    Ok(())
}
