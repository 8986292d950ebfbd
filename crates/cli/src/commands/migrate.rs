//! Database migration command.
//!
//! The storefront crate owns the schema; this command applies its
//! migration directory to the database named by `DATABASE_URL`.

use super::CommandError;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` when the database is unreachable or a migration
/// fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;
    tracing::info!("Migrations complete");

    Ok(())
}
