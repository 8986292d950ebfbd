//! Category management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use fagot_core::api::ApiResponse;
use fagot_core::catalog::Category;
use fagot_core::types::CategoryId;

use crate::db::{CategoryRepository, NewCategory, UpdateCategory};
use crate::error::Result;
use crate::routes::check_payload;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "slug is required"))]
    pub slug: String,
    #[validate(length(max = 2000, message = "description is too long"))]
    pub description: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// List every category, including inactive ones.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// Create a category.
#[instrument(skip(state, request), fields(slug = %request.slug))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>)> {
    check_payload(&request)?;

    let category = CategoryRepository::new(state.pool())
        .create(&NewCategory {
            name: request.name,
            slug: request.slug,
            description: request.description,
            position: request.position,
            is_active: request.is_active,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(category))))
}

/// Replace a category's fields.
#[instrument(skip(state, request), fields(slug = %request.slug))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    check_payload(&request)?;

    let category = CategoryRepository::new(state.pool())
        .update(
            id,
            &UpdateCategory {
                name: request.name,
                slug: request.slug,
                description: request.description,
                position: request.position,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(category)))
}

/// Delete a category. Answers 409 while products still reference it.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(Json(ApiResponse::ok_message("category deleted")))
}
