mod noop_store;
mod redis_store;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use noop_store::NoopCacheStore;
use redis_store::RedisCacheStore;

/// TTL for per-guild configuration rows.
pub const CONFIG_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
/// TTL for word filter lists, which change less often than they are read.
pub const WORD_LIST_CACHE_TTL: Duration = Duration::from_secs(10 * 60);
/// TTL for per-user AFK entries. Reads happen on every message.
pub const AFK_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
enum CacheBackend {
    Disabled(NoopCacheStore),
    Redis(RedisCacheStore),
}

#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    backend: CacheBackend,
}

impl CacheService {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Disabled(NoopCacheStore),
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Redis(RedisCacheStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, CacheBackend::Redis(_))
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled(_) => Ok(()),
            CacheBackend::Redis(store) => store.ping().await,
        }
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    pub async fn get_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let value = match &self.backend {
            CacheBackend::Disabled(store) => store.get(key).await,
            CacheBackend::Redis(store) => store.get(key).await,
        }?;

        match value {
            Some(bytes) => {
                let parsed = serde_json::from_slice(&bytes).map_err(|e| {
                    anyhow::anyhow!("failed to deserialize cache value for `{key}`: {e}")
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let ttl_seconds = ttl.as_secs().max(1);
        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow::anyhow!("failed to serialize cache value for `{key}`: {e}"))?;

        match &self.backend {
            CacheBackend::Disabled(store) => store.set(key, payload, ttl_seconds).await,
            CacheBackend::Redis(store) => store.set(key, payload, ttl_seconds).await,
        }
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled(store) => store.del(key).await,
            CacheBackend::Redis(store) => store.del(key).await,
        }
    }

    pub async fn get_or_load_json<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match self.get_json::<T>(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => warn!(
                ?e,
                cache_key = key,
                "cache get failed; falling back to database"
            ),
        }

        let loaded = loader().await?;

        if let Err(e) = self.set_json(key, &loaded, ttl).await {
            warn!(
                ?e,
                cache_key = key,
                "cache set failed; returning database value"
            );
        }

        Ok(loaded)
    }

    /// Delete a key, logging instead of failing. Writes have already hit the
    /// database by the time this runs, so a stale entry only lives until TTL.
    async fn invalidate(&self, key: &str) {
        if let Err(e) = self.del(key).await {
            warn!(?e, cache_key = key, "cache invalidation failed");
        }
    }
}

pub fn guild_config_key(cache: &CacheService, guild_id: u64) -> String {
    cache.key(format!("guild_config:{guild_id}"))
}

pub fn word_filter_config_key(cache: &CacheService, guild_id: u64) -> String {
    cache.key(format!("word_filter:config:{guild_id}"))
}

pub fn word_filter_words_key(cache: &CacheService, guild_id: u64) -> String {
    cache.key(format!("word_filter:words:{guild_id}"))
}

pub fn afk_key(cache: &CacheService, user_id: u64) -> String {
    cache.key(format!("afk:{user_id}"))
}

pub async fn invalidate_guild_config(cache: &CacheService, guild_id: u64) {
    cache.invalidate(&guild_config_key(cache, guild_id)).await;
}

pub async fn invalidate_word_filter(cache: &CacheService, guild_id: u64) {
    cache
        .invalidate(&word_filter_config_key(cache, guild_id))
        .await;
    cache
        .invalidate(&word_filter_words_key(cache, guild_id))
        .await;
}

pub async fn invalidate_afk(cache: &CacheService, user_id: u64) {
    cache.invalidate(&afk_key(cache, user_id)).await;
}

#[cfg(test)]
mod tests {
    use super::{CONFIG_CACHE_TTL, CacheService, afk_key, guild_config_key, word_filter_words_key};

    #[test]
    fn keys_carry_prefix() {
        let cache = CacheService::disabled("warden:test");
        assert_eq!(guild_config_key(&cache, 42), "warden:test:guild_config:42");
        assert_eq!(
            word_filter_words_key(&cache, 7),
            "warden:test:word_filter:words:7"
        );
        assert_eq!(afk_key(&cache, 9), "warden:test:afk:9");
    }

    #[tokio::test]
    async fn disabled_cache_always_loads() {
        let cache = CacheService::disabled("warden:test");
        assert!(!cache.is_redis_enabled());

        let first: u32 = cache
            .get_or_load_json("k", CONFIG_CACHE_TTL, || async { Ok(1) })
            .await
            .unwrap();
        let second: u32 = cache
            .get_or_load_json("k", CONFIG_CACHE_TTL, || async { Ok(2) })
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }
}
