//! Settings repository: reads the single `site_settings` row.

use sqlx::PgPool;

use fagot_core::settings::SiteSettings;

use super::RepositoryError;

/// Repository for site settings reads.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the site settings. Falls back to defaults when the row has not
    /// been seeded yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` when the stored document no longer deserializes.
    pub async fn get(&self) -> Result<SiteSettings, RepositoryError> {
        let data: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT data FROM site_settings WHERE id = 1")
                .fetch_optional(self.pool)
                .await?;

        match data {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid site settings document: {e}"))
            }),
            None => Ok(SiteSettings::default()),
        }
    }
}
