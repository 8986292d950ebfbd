//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::{EmailService, ObjectStore, SettingsCache};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    settings: SettingsCache,
    storage: ObjectStore,
    email: EmailService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured.
    pub fn new(
        config: AdminConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let settings = SettingsCache::new(
            pool.clone(),
            Duration::from_secs(config.settings_cache_ttl_secs),
        );
        let storage = ObjectStore::new(&config.storage);
        let email = EmailService::new(&config.email)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                settings,
                storage,
                email,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
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

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }
}
