use super::{non_empty, not_blank, AppJson, AppQuery};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin_to, require_staff};
use crate::middleware::AuthUser;
use crate::models::TagModel;
use crate::response::ApiResponse;
use crate::services::tag::{TagChanges, TagService};
use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct TagResponse {
    /// Tag ID
    pub id: i32,
    /// Tag name
    pub name: String,
    /// URL slug
    pub slug: String,
    /// Number of news articles, events and resources carrying the tag
    pub usage_count: i32,
}

impl From<TagModel> for TagResponse {
    fn from(t: TagModel) -> Self {
        Self {
            id: t.id,
            name: t.name,
            slug: t.slug,
            usage_count: t.usage_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TagListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTagRequest {
    /// Tag name (1-50 characters)
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Name is required"),
        length(max = 50, message = "Name must be at most 50 characters")
    )]
    pub name: String,
    /// Derived from the name when omitted
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTagRequest {
    #[validate(
        custom(function = "not_blank", message = "Name cannot be empty"),
        length(max = 50, message = "Name must be at most 50 characters")
    )]
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/tags",
    params(("search" = Option<String>, Query, description = "Filter by name or slug")),
    responses(
        (status = 200, description = "All tags ordered by name", body = Vec<TagResponse>),
    ),
    tag = "tags"
)]
pub async fn list_tags(
    Extension(db): Extension<DatabaseConnection>,
    AppQuery(params): AppQuery<TagListQuery>,
) -> AppResult<impl IntoResponse> {
    let search = non_empty(params.search);
    let service = TagService::new(db);
    let tags = service.list(search.as_deref()).await?;
    let items: Vec<TagResponse> = tags.into_iter().map(TagResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/tags/{slug}",
    params(("slug" = String, Path, description = "Tag slug")),
    responses(
        (status = 200, description = "Tag found", body = TagResponse),
        (status = 404, description = "Tag not found", body = AppError),
    ),
    tag = "tags"
)]
pub async fn get_tag(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = TagService::new(db);
    let tag = service.get_by_slug(&slug).await?;
    Ok(ApiResponse::ok(TagResponse::from(tag)))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    security(("jwt_token" = [])),
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
    ),
    tag = "tags"
)]
pub async fn create_tag(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CreateTagRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;
    payload.validate()?;

    let slug = non_empty(payload.slug);
    let service = TagService::new(db);
    let tag = service.create(&payload.name, slug.as_deref()).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(TagResponse::from(tag), "Tag created"),
    ))
}

#[utoipa::path(
    put,
    path = "/api/tags/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Tag slug")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag updated", body = TagResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
        (status = 404, description = "Tag not found", body = AppError),
    ),
    tag = "tags"
)]
pub async fn update_tag(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<UpdateTagRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;
    payload.validate()?;

    let changes = TagChanges {
        name: payload.name,
        slug: non_empty(payload.slug),
    };
    let service = TagService::new(db);
    let tag = service.update(&slug, changes).await?;
    Ok(ApiResponse::with_message(TagResponse::from(tag), "Tag updated"))
}

#[utoipa::path(
    delete,
    path = "/api/tags/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Tag slug")),
    responses(
        (status = 200, description = "Tag deleted"),
        (status = 403, description = "ADMIN only", body = AppError),
        (status = 404, description = "Tag not found", body = AppError),
    ),
    tag = "tags"
)]
pub async fn delete_tag(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_admin_to(&auth_user, "delete tags")?;

    let service = TagService::new(db);
    service.delete(&slug).await?;
    Ok(ApiResponse::with_message((), "Tag deleted"))
}
