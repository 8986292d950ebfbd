//! Database operations for the back office.
//!
//! The admin binary owns every write path to the catalog and settings, and
//! drives order status transitions. It shares the `fagot` database with
//! the storefront; the schema lives in `crates/storefront/migrations/`.

pub mod categories;
pub mod orders;
pub mod products;
pub mod settings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::{CategoryRepository, NewCategory, UpdateCategory};
pub use orders::{OrderAdminRepository, OrderPage, UpdateStatusError};
pub use products::{NewProduct, ProductRepository, UpdateProduct};
pub use settings::SettingsRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique slug, referenced rows).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<fagot_core::rows::RowError> for RepositoryError {
    fn from(e: fagot_core::rows::RowError) -> Self {
        Self::DataCorruption(e.to_string())
    }
}

impl RepositoryError {
    /// Map unique and foreign-key violations onto `Conflict` with a
    /// readable message, leaving everything else as `Database`.
    pub(crate) fn from_write(e: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
