//! Product repository: read-only catalog access for the storefront.

use rust_decimal::Decimal;
use sqlx::PgPool;

use fagot_core::catalog::Product;
use fagot_core::types::{Badge, CategoryId, ProductId, Unit};

use super::RepositoryError;

/// Raw `products` row before conversion to the domain type.
#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub essence: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub unit: String,
    pub stock: i32,
    pub badges: Vec<String>,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
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

const PRODUCT_COLUMNS: &str = r"
    id, category_id, name, slug, description, essence, price, compare_at_price,
    unit, stock, badges, is_active, image_url, created_at, updated_at
";

/// Repository for product reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on an unknown unit or badge value.
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// List active products of one category, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on an unknown unit or badge value.
    pub async fn list_active_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE is_active AND category_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(category_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get an active product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on an unknown unit or badge value.
    pub async fn get_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1 AND is_active"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Fetch live rows for a set of product ids, active or not.
    ///
    /// Checkout uses this to re-validate a client cart against current
    /// prices and stock; inactive products simply come back missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on an unknown unit or badge value.
    pub async fn get_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) AND is_active"
        ))
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }
}
