//! Settings repository: read and write the single `site_settings` row.

use sqlx::PgPool;

use fagot_core::settings::SiteSettings;

use super::RepositoryError;

/// Repository for site settings.
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

    /// Replace the settings document, creating the row if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn put(&self, settings: &SiteSettings) -> Result<(), RepositoryError> {
        let data = serde_json::to_value(settings).map_err(|e| {
            RepositoryError::DataCorruption(format!("unserializable settings document: {e}"))
        })?;

        sqlx::query(
            "INSERT INTO site_settings (id, data) VALUES (1, $1)
             ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()",
        )
        .bind(data)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
