use super::{not_blank, AppJson, AppQuery};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::UserResponse;
use crate::middleware::auth::require_role;
use crate::middleware::AuthUser;
use crate::models::{parse_enum, UserRole};
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::auth::AuthService;
use axum::{http::StatusCode, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Name is required"),
        length(max = 100, message = "Name must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// At least 8 characters
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// ADMIN, EDITOR or USER (default EDITOR)
    pub role: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/users",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("limit" = Option<u64>, Query, description = "Items per page (max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated users", body = PaginatedResponse<UserResponse>),
        (status = 403, description = "ADMIN only", body = AppError),
    ),
    tag = "users"
)]
pub async fn list_users(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppQuery(params): AppQuery<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    require_role(&auth_user, &[UserRole::Admin])?;

    let (page, limit) = params.resolve();
    let service = AuthService::new(db);
    let (users, total) = service.list_users(page, limit).await?;
    let items: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(items, total, page, limit)))
}

#[utoipa::path(
    post,
    path = "/api/users",
    security(("jwt_token" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error or duplicate email", body = AppError),
        (status = 403, description = "ADMIN only", body = AppError),
    ),
    tag = "users"
)]
pub async fn create_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    require_role(&auth_user, &[UserRole::Admin])?;
    payload.validate()?;

    let role = match payload.role.as_deref() {
        Some(raw) => parse_enum::<UserRole>(raw, "role")?,
        None => UserRole::Editor,
    };

    let service = AuthService::new(db);
    let user = service
        .create_user(&payload.name, &payload.email, &payload.password, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(UserResponse::from(user), "User created"),
    ))
}
