use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_staff;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::upload::{UploadConfig, UploadService};
use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Failed to read upload: {}", e.body_text()))
    }
}

/// Upload an image or video for use in content.
/// POST /api/upload (multipart form: field "file")
#[utoipa::path(
    post,
    path = "/api/upload",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
        (status = 413, description = "File too large", body = AppError),
    ),
    tag = "upload"
)]
pub async fn upload_file(
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = field.bytes().await.map_err(multipart_error)?;

        let url = UploadService::save_file(&config, &data, &content_type).await?;
        tracing::info!(user_id = auth_user.user_id, %url, "File uploaded");

        return Ok(ApiResponse::with_message(UploadResponse { url }, "File uploaded"));
    }

    Err(AppError::Validation("No file provided".to_string()))
}
