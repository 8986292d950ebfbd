//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::{ObjectStore, SettingsCache};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    settings: SettingsCache,
    storage: ObjectStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let settings = SettingsCache::new(
            pool.clone(),
            Duration::from_secs(config.settings_cache_ttl_secs),
        );
        let storage = ObjectStore::new(&config.storage);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                settings,
                storage,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the settings cache.
    #[must_use]
    pub fn settings(&self) -> &SettingsCache {
        &self.inner.settings
    }

    /// Get a reference to the object storage client.
    #[must_use]
    pub fn storage(&self) -> &ObjectStore {
        &self.inner.storage
    }
}
