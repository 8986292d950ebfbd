//! Database operations for the storefront.
//!
//! One shared `fagot` database holds the catalog, orders, settings, and
//! intake tables. The storefront reads the catalog and settings, creates
//! orders at checkout, attaches receipts, and records newsletter/contact
//! submissions; all catalog and settings writes happen in the admin binary.
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` (the storefront owns
//! the schema) and run via:
//! ```bash
//! cargo run -p fagot-cli -- migrate
//! ```

pub mod categories;
pub mod intake;
pub mod orders;
pub mod products;
pub mod settings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use intake::IntakeRepository;
pub use orders::{CreateOrderError, NewOrder, NewOrderItem, OrderRepository};
pub use products::ProductRepository;
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

    /// Constraint violation (e.g., unique slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<fagot_core::rows::RowError> for RepositoryError {
    fn from(e: fagot_core::rows::RowError) -> Self {
        Self::DataCorruption(e.to_string())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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
