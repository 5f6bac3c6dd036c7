use crate::error::AppResult;
use crate::middleware::auth::require_staff;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::admin::{AdminService, AdminStats};
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Dashboard counters", body = AdminStats),
        (status = 403, description = "ADMIN or EDITOR only", body = crate::error::AppError),
    ),
    tag = "admin"
)]
pub async fn get_stats(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;

    let service = AdminService::new(db);
    let stats = service.get_stats().await?;
    Ok(ApiResponse::ok(stats))
}
