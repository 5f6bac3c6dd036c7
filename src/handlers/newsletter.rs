use super::{non_empty, AppJson, AppQuery};
use crate::error::AppResult;
use crate::handlers::contact::InboxQuery;
use crate::middleware::auth::{require_admin_to, require_staff};
use crate::middleware::AuthUser;
use crate::models::{parse_enum, NewsletterSubscriberModel, SubscriberStatus};
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::newsletter::{NewsletterService, Subscription};
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
pub struct SubscribeRequest {
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UnsubscribeRequest {
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriberResponse {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
    pub status: SubscriberStatus,
    pub unsubscribed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl From<NewsletterSubscriberModel> for SubscriberResponse {
    fn from(s: NewsletterSubscriberModel) -> Self {
        Self {
            id: s.id,
            email: s.email,
            name: s.name,
            status: s.status,
            unsubscribed_at: s.unsubscribed_at,
            created_at: s.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/newsletter",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed", body = SubscriberResponse),
        (status = 200, description = "Subscription reactivated", body = SubscriberResponse),
        (status = 400, description = "Invalid or already subscribed email", body = crate::error::AppError),
    ),
    tag = "newsletter"
)]
pub async fn subscribe(
    Extension(db): Extension<DatabaseConnection>,
    AppJson(payload): AppJson<SubscribeRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let service = NewsletterService::new(db);
    let response = match service
        .subscribe(&payload.email, non_empty(payload.name))
        .await?
    {
        Subscription::Created(subscriber) => (
            StatusCode::CREATED,
            ApiResponse::with_message(
                SubscriberResponse::from(subscriber),
                "Successfully subscribed to the newsletter",
            ),
        ),
        Subscription::Reactivated(subscriber) => (
            StatusCode::OK,
            ApiResponse::with_message(
                SubscriberResponse::from(subscriber),
                "Welcome back! Your subscription has been reactivated",
            ),
        ),
    };
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/newsletter/unsubscribe",
    request_body = UnsubscribeRequest,
    responses(
        (status = 200, description = "Unsubscribed", body = SubscriberResponse),
        (status = 404, description = "Subscriber not found", body = crate::error::AppError),
    ),
    tag = "newsletter"
)]
pub async fn unsubscribe(
    Extension(db): Extension<DatabaseConnection>,
    AppJson(payload): AppJson<UnsubscribeRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let service = NewsletterService::new(db);
    let subscriber = service.unsubscribe(&payload.email).await?;
    Ok(ApiResponse::with_message(
        SubscriberResponse::from(subscriber),
        "You have been unsubscribed",
    ))
}

#[utoipa::path(
    get,
    path = "/api/newsletter",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("limit" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("status" = Option<String>, Query, description = "ACTIVE or UNSUBSCRIBED"),
        ("search" = Option<String>, Query, description = "Email or name search"),
    ),
    responses(
        (status = 200, description = "Paginated subscribers", body = PaginatedResponse<SubscriberResponse>),
        (status = 403, description = "ADMIN or EDITOR only", body = crate::error::AppError),
    ),
    tag = "newsletter"
)]
pub async fn list_subscribers(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppQuery(params): AppQuery<InboxQuery>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;

    let (page, limit) = params.pagination();
    let status = params
        .status
        .as_deref()
        .map(|raw| parse_enum::<SubscriberStatus>(raw, "status"))
        .transpose()?;
    let search = non_empty(params.search);

    let service = NewsletterService::new(db);
    let (subscribers, total) = service
        .list(status, search.as_deref(), page, limit)
        .await?;
    let items: Vec<SubscriberResponse> = subscribers
        .into_iter()
        .map(SubscriberResponse::from)
        .collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(items, total, page, limit)))
}

#[utoipa::path(
    delete,
    path = "/api/newsletter/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Subscriber ID")),
    responses(
        (status = 200, description = "Subscriber deleted"),
        (status = 403, description = "ADMIN only", body = crate::error::AppError),
        (status = 404, description = "Subscriber not found", body = crate::error::AppError),
    ),
    tag = "newsletter"
)]
pub async fn delete_subscriber(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin_to(&auth_user, "delete subscribers")?;

    let service = NewsletterService::new(db);
    service.delete(id).await?;
    Ok(ApiResponse::with_message((), "Subscriber deleted"))
}
