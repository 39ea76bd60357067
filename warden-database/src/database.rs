use sqlx::{PgPool, migrate::Migrator};

use crate::cache::CacheService;

/// Compile-time discovered SQLx migrations for the `warden-database` crate.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Shared database handle passed across crates.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
    cache: CacheService,
}

impl Database {
    /// Create a database handle from an existing pool with caching disabled.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: CacheService::disabled("warden:prod"),
        }
    }

    /// Create a database handle from an existing pool and cache service.
    pub fn with_cache(pool: PgPool, cache: CacheService) -> Self {
        Self { pool, cache }
    }

    /// Expose the underlying pool for query modules.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Expose the cache service for query modules.
    pub fn cache(&self) -> &CacheService {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::MIGRATOR;

    #[test]
    fn open_tickets_are_unique_per_owner() {
        let enforced = MIGRATOR.iter().any(|migration| {
            migration.sql.contains("CREATE UNIQUE INDEX")
                && migration.sql.contains("ON tickets (guild_id, owner_user_id)")
                && migration.sql.contains("WHERE status = 'open'")
        });
        assert!(enforced);
    }

    #[test]
    fn migrations_are_ordered() {
        let versions: Vec<i64> = MIGRATOR.iter().map(|migration| migration.version).collect();
        assert!(versions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(versions.len() >= 2);
    }
}
