use super::AppJson;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{UserModel, UserRole};
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::utils::cookie::{build_auth_cookie, build_clear_cookie};
use crate::utils::jwt::token_expiry;
use anyhow::anyhow;
use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::NaiveDateTime;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Account password
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// ADMIN, EDITOR or USER
    pub role: UserRole,
    pub created_at: NaiveDateTime,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Session token, also set as the `auth-token` cookie
    pub token: String,
    pub user: UserResponse,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = AppError),
        (status = 401, description = "Invalid email or password", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let service = AuthService::new(db);
    let (user, token) = service.login(&payload.email, &payload.password).await?;

    let response = LoginResponse {
        token: token.clone(),
        user: UserResponse::from(user),
    };

    let mut http_response = ApiResponse::with_message(response, "Login successful").into_response();
    append_set_cookie(&mut http_response, &build_auth_cookie(&token, token_expiry()?))?;
    Ok(http_response)
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
    ),
    tag = "auth"
)]
pub async fn logout() -> AppResult<impl IntoResponse> {
    let mut response = ApiResponse::with_message((), "Logout successful").into_response();
    append_set_cookie(&mut response, &build_clear_cookie())?;
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let user = service.get_user_by_id(auth_user.user_id).await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

fn append_set_cookie(response: &mut Response, cookie_value: &str) -> AppResult<()> {
    let value = HeaderValue::from_str(cookie_value).map_err(|e| {
        AppError::Internal(anyhow!("Failed to build Set-Cookie header value: {}", e))
    })?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
