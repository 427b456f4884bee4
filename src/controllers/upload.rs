use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    config::UploadConfig,
    error::ApiError,
    middleware::AdminSession,
    services::{shopify_files::size_exceeded, UploadedFile},
    AppState,
};

// Запас на границы и заголовки multipart поверх самого файла
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes(limits: &UploadConfig) -> Router<Arc<AppState>> {
    Router::new().route(
        "/upload",
        post(upload_image).layer(DefaultBodyLimit::max(limits.max_bytes + MULTIPART_OVERHEAD)),
    )
}

fn multipart_error(e: MultipartError, limits: &UploadConfig) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return size_exceeded(limits).into();
    }
    tracing::debug!("Malformed multipart body: {}", e);
    ApiError::Validation("No file provided".to_string())
}

/// POST /api/upload - изображение в Shopify Files, в ответ `{url}`
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let mut multipart =
        multipart.map_err(|_| ApiError::Validation("No file provided".to_string()))?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, &state.upload))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, &state.upload))?;

        file = Some(UploadedFile {
            filename,
            content_type,
            bytes,
        });
        break;
    }

    let file = file.ok_or_else(|| ApiError::Validation("No file provided".to_string()))?;
    file.validate(&state.upload)?;

    let url = state.files.upload(&file).await?;
    Ok(Json(json!({ "url": url })))
}
