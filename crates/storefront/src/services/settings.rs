//! TTL-cached access to site settings.
//!
//! Every storefront request that needs the free-shipping threshold, tax
//! rate, or bank details goes through this cache instead of the database.
//! The admin binary calls `refresh` over its own instance after a write;
//! storefront instances converge within the TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use fagot_core::settings::SiteSettings;

use crate::db::{RepositoryError, SettingsRepository};

/// Cached view over the `site_settings` row.
#[derive(Clone)]
pub struct SettingsCache {
    pool: PgPool,
    cache: Cache<(), SiteSettings>,
}

impl SettingsCache {
    /// Create a cache with the given TTL.
    #[must_use]
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { pool, cache }
    }

    /// Get the current settings, loading from the database on a cold or
    /// expired entry. Concurrent callers coalesce onto one load.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the underlying load fails.
    pub async fn get(&self) -> Result<SiteSettings, Arc<RepositoryError>> {
        self.cache
            .try_get_with((), async {
                SettingsRepository::new(&self.pool).get().await
            })
            .await
    }

    /// Drop the cached entry so the next `get` reads fresh data.
    pub async fn refresh(&self) {
        self.cache.invalidate(&()).await;
    }
}
