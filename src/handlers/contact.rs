use super::{non_empty, not_blank, AppJson, AppQuery};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin_to, require_staff};
use crate::middleware::AuthUser;
use crate::models::{parse_enum, ContactMessageModel, ContactStatus};
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::contact::ContactService;
use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use chrono::NaiveDateTime;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Name is required"),
        length(max = 100, message = "Name must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Subject is required"),
        length(max = 200, message = "Subject must be at most 200 characters")
    )]
    pub subject: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Message is required"),
        length(max = 5000, message = "Message must be at most 5000 characters")
    )]
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    /// UNREAD, READ or RESPONDED
    pub status: Option<String>,
}

/// Query string of the staff inbox listings.
#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl InboxQuery {
    pub fn pagination(&self) -> (u64, u64) {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
        .resolve()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactMessageResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ContactMessageModel> for ContactMessageResponse {
    fn from(m: ContactMessageModel) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            subject: m.subject,
            message: m.message,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message received", body = ContactMessageResponse),
        (status = 400, description = "Validation error", body = AppError),
    ),
    tag = "contact"
)]
pub async fn submit_contact(
    Extension(db): Extension<DatabaseConnection>,
    AppJson(payload): AppJson<ContactRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let service = ContactService::new(db);
    let message = service
        .submit(
            &payload.name,
            &payload.email,
            &payload.subject,
            &payload.message,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            ContactMessageResponse::from(message),
            "Thank you for your message. We'll be in touch soon.",
        ),
    ))
}

#[utoipa::path(
    get,
    path = "/api/contact",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("limit" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("status" = Option<String>, Query, description = "UNREAD, READ or RESPONDED"),
        ("search" = Option<String>, Query, description = "Text search"),
    ),
    responses(
        (status = 200, description = "Paginated messages", body = PaginatedResponse<ContactMessageResponse>),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
    ),
    tag = "contact"
)]
pub async fn list_contact_messages(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppQuery(params): AppQuery<InboxQuery>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;

    let (page, limit) = params.pagination();
    let status = params
        .status
        .as_deref()
        .map(|raw| parse_enum::<ContactStatus>(raw, "status"))
        .transpose()?;
    let search = non_empty(params.search);

    let service = ContactService::new(db);
    let (messages, total) = service
        .list(status, search.as_deref(), page, limit)
        .await?;
    let items: Vec<ContactMessageResponse> = messages
        .into_iter()
        .map(ContactMessageResponse::from)
        .collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(items, total, page, limit)))
}

#[utoipa::path(
    get,
    path = "/api/contact/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message found", body = ContactMessageResponse),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
        (status = 404, description = "Message not found", body = AppError),
    ),
    tag = "contact"
)]
pub async fn get_contact_message(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;

    let service = ContactService::new(db);
    let message = service.get(id).await?;
    Ok(ApiResponse::ok(ContactMessageResponse::from(message)))
}

#[utoipa::path(
    put,
    path = "/api/contact/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Message ID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Status updated", body = ContactMessageResponse),
        (status = 400, description = "Invalid status", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
        (status = 404, description = "Message not found", body = AppError),
    ),
    tag = "contact"
)]
pub async fn update_contact_message(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateContactRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;

    let status = match payload.status.as_deref() {
        Some(raw) => parse_enum::<ContactStatus>(raw, "status")?,
        None => return Err(AppError::Validation("Status is required".to_string())),
    };

    let service = ContactService::new(db);
    let message = service.set_status(id, status).await?;
    Ok(ApiResponse::with_message(
        ContactMessageResponse::from(message),
        "Message updated",
    ))
}

#[utoipa::path(
    delete,
    path = "/api/contact/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message deleted"),
        (status = 403, description = "ADMIN only", body = AppError),
        (status = 404, description = "Message not found", body = AppError),
    ),
    tag = "contact"
)]
pub async fn delete_contact_message(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin_to(&auth_user, "delete messages")?;

    let service = ContactService::new(db);
    service.delete(id).await?;
    Ok(ApiResponse::with_message((), "Message deleted"))
}
