//! Intake repository: newsletter signups and contact messages.

use sqlx::PgPool;

use fagot_core::types::Email;

use super::RepositoryError;

/// A contact-form submission to persist.
pub struct NewContactMessage {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

/// Repository for public intake writes.
pub struct IntakeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> IntakeRepository<'a> {
    /// Create a new intake repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a newsletter signup. Returns `false` when the address was
    /// already subscribed; duplicates are not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn subscribe_newsletter(&self, email: &Email) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO newsletter_subscribers (email)
            VALUES ($1)
            ON CONFLICT (email) DO NOTHING
            ",
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Store a contact-form message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_contact_message(
        &self,
        message: &NewContactMessage,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO contact_messages (name, email, phone, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&message.name)
        .bind(message.email.as_str())
        .bind(&message.phone)
        .bind(&message.subject)
        .bind(&message.message)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
