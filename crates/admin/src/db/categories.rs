//! Category repository: full CRUD for the back office.

use sqlx::PgPool;

use fagot_core::catalog::Category;
use fagot_core::types::CategoryId;

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    position: i32,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            position: row.position,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, name, slug, description, position, is_active, created_at, updated_at";

/// Fields for creating a category.
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub is_active: bool,
}

/// Full replacement of a category's editable fields.
pub struct UpdateCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub is_active: bool,
}

/// Repository for category management.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every category, active or not, in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {COLUMNS} FROM categories ORDER BY position, name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the slug is already taken.
    pub async fn create(&self, new: &NewCategory) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO categories (name, slug, description, position, is_active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.description)
        .bind(new.position)
        .bind(new.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "a category with this slug already exists"))?;

        Ok(row.into())
    }

    /// Replace a category's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id does not exist, or
    /// `Conflict` when the new slug is already taken.
    pub async fn update(
        &self,
        id: CategoryId,
        update: &UpdateCategory,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE categories
             SET name = $2, slug = $3, description = $4, position = $5, is_active = $6,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(&update.name)
        .bind(&update.slug)
        .bind(&update.description)
        .bind(update.position)
        .bind(update.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "a category with this slug already exists"))?;

        row.map(Category::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a category. Blocked while products still reference it; the
    /// foreign key surfaces as `Conflict` instead of cascading.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id does not exist, or
    /// `Conflict` when products reference the category.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_write(e, "category still has products attached")
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
