//! Product repository: full CRUD plus image attachment.

use rust_decimal::Decimal;
use sqlx::PgPool;

use fagot_core::catalog::Product;
use fagot_core::types::{Badge, CategoryId, ProductId, Unit};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    category_id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    essence: Option<String>,
    price: Decimal,
    compare_at_price: Option<Decimal>,
    unit: String,
    stock: i32,
    badges: Vec<String>,
    is_active: bool,
    image_url: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let unit: Unit = row.unit.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid unit in database: {e}"))
        })?;
        let badges = row
            .badges
            .iter()
            .map(|b| b.parse::<Badge>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid badge in database: {e}"))
            })?;

        Ok(Self {
            id: ProductId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            essence: row.essence,
            price: row.price,
            compare_at_price: row.compare_at_price,
            unit,
            stock: row.stock,
            badges,
            is_active: row.is_active,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = r"
    id, category_id, name, slug, description, essence, price, compare_at_price,
    unit, stock, badges, is_active, image_url, created_at, updated_at
";

/// Fields for creating a product.
pub struct NewProduct {
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub essence: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub unit: Unit,
    pub stock: i32,
    pub badges: Vec<Badge>,
    pub is_active: bool,
}

/// Full replacement of a product's editable fields. The image travels
/// through its own upload endpoint.
pub struct UpdateProduct {
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub essence: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub unit: Unit,
    pub stock: i32,
    pub badges: Vec<Badge>,
    pub is_active: bool,
}

fn badge_strings(badges: &[Badge]) -> Vec<String> {
    badges.iter().map(|b| b.as_str().to_owned()).collect()
}

/// Repository for product management.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, active or not, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` on an unknown unit or badge value.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the slug is taken or the
    /// category does not exist.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (category_id, name, slug, description, essence, price,
                                   compare_at_price, unit, stock, badges, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        ))
        .bind(new.category_id.as_i64())
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.description)
        .bind(&new.essence)
        .bind(new.price)
        .bind(new.compare_at_price)
        .bind(new.unit.as_str())
        .bind(new.stock)
        .bind(badge_strings(&new.badges))
        .bind(new.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, "slug already taken or category does not exist")
        })?;

        row.try_into()
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id does not exist, or
    /// `Conflict` on a slug/category constraint violation.
    pub async fn update(
        &self,
        id: ProductId,
        update: &UpdateProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products
             SET category_id = $2, name = $3, slug = $4, description = $5, essence = $6,
                 price = $7, compare_at_price = $8, unit = $9, stock = $10, badges = $11,
                 is_active = $12, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(update.category_id.as_i64())
        .bind(&update.name)
        .bind(&update.slug)
        .bind(&update.description)
        .bind(&update.essence)
        .bind(update.price)
        .bind(update.compare_at_price)
        .bind(update.unit.as_str())
        .bind(update.stock)
        .bind(badge_strings(&update.badges))
        .bind(update.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, "slug already taken or category does not exist")
        })?;

        row.map(Product::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Blocked while order items reference it so order
    /// history keeps its foreign keys intact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id does not exist, or
    /// `Conflict` when orders reference the product.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_write(e, "product appears in existing orders")
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Point a product at a newly uploaded image. Returns the updated row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id does not exist.
    pub async fn set_image(
        &self,
        id: ProductId,
        image_url: &str,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET image_url = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(image_url)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }
}
