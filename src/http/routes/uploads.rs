use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::http::error::ApiError;
use crate::http::extract::CurrentCustomer;
use crate::http::state::AppState;

const UPLOAD_COMMENT: &str = "chargemaster";

/// Multipart upload: the `file` part goes to object storage, the public
/// URL is recorded against the customer.
pub async fn upload_file(
    State(state): State<AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut stored_url: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error reading multipart field: {e}");
        ApiError::bad_request("No file selected")
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| {
                error!("Error reading upload body: {e}");
                ApiError::bad_request("No file selected")
            })?
            .to_vec();

        let url = state
            .objects
            .put(&file_name, &content_type, bytes)
            .await
            .map_err(|e| ApiError::from_backend("Error uploading file", e))?;
        stored_url = Some(url);
        break;
    }

    let file_url = stored_url.ok_or_else(|| ApiError::bad_request("No file selected"))?;

    state
        .uploads
        .record(customer_id, &file_url, UPLOAD_COMMENT)
        .await
        .map_err(|e| ApiError::from_backend("Error uploading file", e))?;

    Ok(Json(json!({ "message": "File uploaded successfully" })).into_response())
}
