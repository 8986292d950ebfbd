//! Catalog route handlers: categories and products, read-only.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use tracing::instrument;

use fagot_core::api::ApiResponse;
use fagot_core::catalog::{Category, Product};

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::Result;
use crate::state::AppState;

/// A category together with its products.
#[derive(Debug, Serialize)]
pub struct CategoryProducts {
    pub category: Category,
    pub products: Vec<Product>,
}

/// List active categories in display order.
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = CategoryRepository::new(state.pool()).list_active().await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// List the active products of one category.
#[instrument(skip(state))]
pub async fn list_category_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CategoryProducts>>> {
    let category = CategoryRepository::new(state.pool())
        .get_active_by_slug(&slug)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("category {slug}")))?;

    let products = ProductRepository::new(state.pool())
        .list_active_by_category(category.id)
        .await?;

    Ok(Json(ApiResponse::ok(CategoryProducts { category, products })))
}

/// List all active products, newest first.
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = ProductRepository::new(state.pool()).list_active().await?;
    Ok(Json(ApiResponse::ok(products)))
}

/// Get one active product by slug.
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = ProductRepository::new(state.pool())
        .get_active_by_slug(&slug)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("product {slug}")))?;

    Ok(Json(ApiResponse::ok(product)))
}
