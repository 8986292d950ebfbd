//! Order lookup and payment receipt upload.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use tracing::instrument;

use fagot_core::api::ApiResponse;
use fagot_core::order::{OrderDetail, Receipt};
use fagot_core::upload::check_receipt;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::services::ObjectStore;
use crate::state::AppState;

/// Look up an order by its order number. The number acts as the customer's
/// access token, so there is no enumeration-friendly id route.
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<ApiResponse<OrderDetail>>> {
    let detail = OrderRepository::new(state.pool())
        .get_detail_by_number(&order_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number}")))?;

    Ok(Json(ApiResponse::ok(detail)))
}

/// Upload a proof-of-payment file for an order.
///
/// Stores the blob first, then attaches it in the database. If the attach
/// fails the stored object is deleted again so storage never accumulates
/// orphans the database does not know about.
#[instrument(skip(state, multipart))]
pub async fn upload_receipt(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Receipt>>)> {
    let repo = OrderRepository::new(state.pool());
    let detail = repo
        .get_detail_by_number(&order_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number}")))?;

    let (filename, content_type, bytes) = read_file_part(&mut multipart).await?;
    check_receipt(bytes.len(), &content_type)?;

    let key = ObjectStore::object_key("receipts", &filename);
    let stored = state.storage().put(&key, bytes, &content_type).await?;

    let receipt = Receipt {
        filename,
        url: stored.url,
        external_id: stored.external_id,
        uploaded_at: Utc::now(),
    };

    if let Err(e) = repo.attach_receipt(detail.order.id, &receipt).await {
        // Compensate: the blob must not outlive the failed attach.
        if let Err(delete_err) = state.storage().delete(&key).await {
            tracing::error!(
                key = %key,
                error = %delete_err,
                "failed to delete orphaned receipt object"
            );
        }
        return Err(e.into());
    }

    tracing::info!(order_number = %order_number, key = %key, "receipt uploaded");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(receipt))))
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
            .map_or_else(|| "receipt".to_owned(), ToOwned::to_owned);
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
