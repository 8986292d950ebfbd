//! Product management handlers, including catalog image upload.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use fagot_core::api::ApiResponse;
use fagot_core::catalog::Product;
use fagot_core::types::{Badge, CategoryId, ProductId, Unit};
use fagot_core::upload::check_image;

use crate::db::{NewProduct, ProductRepository, UpdateProduct};
use crate::error::{AppError, Result};
use crate::routes::check_payload;
use crate::services::ObjectStore;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    pub category_id: CategoryId,
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "slug is required"))]
    pub slug: String,
    #[validate(length(max = 5000, message = "description is too long"))]
    pub description: Option<String>,
    #[validate(length(max = 100, message = "essence is too long"))]
    pub essence: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub unit: Unit,
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: i32,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

fn check_prices(request: &ProductRequest) -> Result<()> {
    if request.price < Decimal::ZERO {
        return Err(AppError::field("price", "price cannot be negative"));
    }
    if let Some(compare_at) = request.compare_at_price
        && compare_at < Decimal::ZERO
    {
        return Err(AppError::field(
            "compare_at_price",
            "compare-at price cannot be negative",
        ));
    }
    Ok(())
}

/// List every product, including inactive ones.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(ApiResponse::ok(products)))
}

/// Create a product.
#[instrument(skip(state, request), fields(slug = %request.slug))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>)> {
    check_payload(&request)?;
    check_prices(&request)?;

    let product = ProductRepository::new(state.pool())
        .create(&NewProduct {
            category_id: request.category_id,
            name: request.name,
            slug: request.slug,
            description: request.description,
            essence: request.essence,
            price: request.price,
            compare_at_price: request.compare_at_price,
            unit: request.unit,
            stock: request.stock,
            badges: request.badges,
            is_active: request.is_active,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(product))))
}

/// Replace a product's fields.
#[instrument(skip(state, request), fields(slug = %request.slug))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<ApiResponse<Product>>> {
    check_payload(&request)?;
    check_prices(&request)?;

    let product = ProductRepository::new(state.pool())
        .update(
            id,
            &UpdateProduct {
                category_id: request.category_id,
                name: request.name,
                slug: request.slug,
                description: request.description,
                essence: request.essence,
                price: request.price,
                compare_at_price: request.compare_at_price,
                unit: request.unit,
                stock: request.stock,
                badges: request.badges,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(product)))
}

/// Delete a product. Answers 409 while order items still reference it.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(Json(ApiResponse::ok_message("product deleted")))
}

/// Upload a catalog image and point the product at it.
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Product>>> {
    let (filename, content_type, bytes) = read_file_part(&mut multipart).await?;
    check_image(bytes.len(), &content_type)?;

    let key = ObjectStore::object_key("products", &filename);
    let stored = state.storage().put(&key, bytes, &content_type).await?;

    let product = ProductRepository::new(state.pool())
        .set_image(id, &stored.url)
        .await?;

    tracing::info!(product_id = %id, key = %key, "product image updated");

    Ok(Json(ApiResponse::ok(product)))
}

/// Pull the single `file` part out of the multipart body.
async fn read_file_part(multipart: &mut Multipart) -> Result<(String, String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::field("file", e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map_or_else(|| "image".to_owned(), ToOwned::to_owned);
        let content_type = field
            .content_type()
            .map_or_else(|| "application/octet-stream".to_owned(), ToOwned::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::field("file", e.to_string()))?;

        return Ok((filename, content_type, bytes.to_vec()));
    }

    Err(AppError::field("file", "missing file part"))
}
