use crate::cache::{
    CONFIG_CACHE_TTL, WORD_LIST_CACHE_TTL, invalidate_word_filter, word_filter_config_key,
    word_filter_words_key,
};
use crate::database::Database;
use crate::impls::{from_db, to_db};
use crate::model::word_filter::{WordFilterConfig, WordFilterWord};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub async fn get_word_filter_config(
    db: &Database,
    guild_id: u64,
) -> anyhow::Result<Option<WordFilterConfig>> {
    let cache_key = word_filter_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            let row = sqlx::query_as::<_, (bool, String)>(
                "SELECT enabled, action FROM word_filter_config WHERE guild_id = $1",
            )
            .bind(to_db(guild_id, "guild_id")?)
            .fetch_optional(db.pool())
            .await?;

            Ok(row.map(|(enabled, action)| WordFilterConfig {
                guild_id,
                enabled,
                action,
            }))
        })
        .await
}

/// Return the config only when the filter is switched on.
pub async fn get_word_filter_if_enabled(
    db: &Database,
    guild_id: u64,
) -> anyhow::Result<Option<WordFilterConfig>> {
    Ok(get_word_filter_config(db, guild_id)
        .await?
        .filter(|config| config.enabled))
}

pub async fn set_word_filter_enabled(
    db: &Database,
    guild_id: u64,
    enabled: bool,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO word_filter_config (guild_id, enabled)
         VALUES ($1, $2)
         ON CONFLICT (guild_id) DO UPDATE SET enabled = EXCLUDED.enabled",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(enabled)
    .execute(db.pool())
    .await?;

    invalidate_word_filter(db.cache(), guild_id).await;
    Ok(())
}

pub async fn set_word_filter_action(
    db: &Database,
    guild_id: u64,
    action: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO word_filter_config (guild_id, action)
         VALUES ($1, $2)
         ON CONFLICT (guild_id) DO UPDATE SET action = EXCLUDED.action",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(action)
    .execute(db.pool())
    .await?;

    invalidate_word_filter(db.cache(), guild_id).await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Words
// ---------------------------------------------------------------------------

/// Add a word to the guild's blocklist. Returns `false` for duplicates.
pub async fn add_filter_word(db: &Database, guild_id: u64, word: &str) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "INSERT INTO word_filter_words (guild_id, word)
         VALUES ($1, $2)
         ON CONFLICT (guild_id, word) DO NOTHING",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .bind(word.to_lowercase())
    .execute(db.pool())
    .await?;

    invalidate_word_filter(db.cache(), guild_id).await;
    Ok(result.rows_affected() > 0)
}

/// Remove a word from the guild's blocklist. Returns `true` if removed.
pub async fn remove_filter_word(db: &Database, guild_id: u64, word: &str) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM word_filter_words WHERE guild_id = $1 AND word = $2")
        .bind(to_db(guild_id, "guild_id")?)
        .bind(word.to_lowercase())
        .execute(db.pool())
        .await?;

    invalidate_word_filter(db.cache(), guild_id).await;
    Ok(result.rows_affected() > 0)
}

pub async fn list_filter_words(
    db: &Database,
    guild_id: u64,
) -> anyhow::Result<Vec<WordFilterWord>> {
    let rows = sqlx::query_as::<_, (i64, i64, String, i64)>(
        "SELECT id, guild_id, word, created_at
         FROM word_filter_words
         WHERE guild_id = $1
         ORDER BY word ASC",
    )
    .bind(to_db(guild_id, "guild_id")?)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter()
        .map(|(id, gid, word, created_at)| {
            Ok(WordFilterWord {
                id: from_db(id, "id")?,
                guild_id: from_db(gid, "guild_id")?,
                word,
                created_at: from_db(created_at, "created_at")?,
            })
        })
        .collect()
}

/// Word strings only, for the message hot path.
pub async fn get_all_filter_words_for_guild(
    db: &Database,
    guild_id: u64,
) -> anyhow::Result<Vec<String>> {
    let cache_key = word_filter_words_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, WORD_LIST_CACHE_TTL, || async {
            let words: Vec<String> =
                sqlx::query_scalar("SELECT word FROM word_filter_words WHERE guild_id = $1")
                    .bind(to_db(guild_id, "guild_id")?)
                    .fetch_all(db.pool())
                    .await?;

            Ok(words)
        })
        .await
}
