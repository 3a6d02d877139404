use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::storage::{content_type_for, is_allowed_image, object_name};
use crate::AppState;

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub image: String,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("Upload exceeds the request size limit".to_string())
    } else {
        ApiError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Accept a single image in the `image` multipart field and hand it to the image store
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let max_bytes = state.config.storage.max_image_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let declared_type = field.content_type().map(str::to_string);

        if !is_allowed_image(&file_name, declared_type.as_deref()) {
            return Err(ApiError::BadRequest("Images only (jpeg, jpg, png, webp)".to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(multipart_error)?;

        if data.is_empty() {
            break;
        }
        if data.len() > max_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "Image too large. Maximum size is {} bytes",
                max_bytes
            )));
        }

        let content_type = declared_type
            .as_deref()
            .unwrap_or_else(|| content_type_for(&file_name));
        let url = state
            .images
            .put(&object_name(&file_name), data, content_type)
            .await?;

        return Ok(Json(UploadResponse {
            message: "Image uploaded successfully".to_string(),
            image: url,
        }));
    }

    Err(ApiError::BadRequest("No image file provided".to_string()))
}
