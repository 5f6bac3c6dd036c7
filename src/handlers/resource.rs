use super::{non_empty, not_blank, trimmed, AppJson, AppQuery};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin_to, require_staff};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::models::{parse_enum, ResourceCategory, ResourceType};
use crate::response::{ApiResponse, ContentListQuery, PaginatedResponse};
use crate::services::query::published_filter;
use crate::services::resource::{
    NewResource, ResourceChanges, ResourceDetails, ResourceFilter, ResourceService,
};
use crate::services::tag::TagSummary;
use crate::utils::sanitize_html;
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

fn published_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateResourceRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,
    pub slug: Option<String>,
    /// Resource description (HTML)
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,
    /// EDUCATION, HEALTH, LEGAL, FINANCIAL, COMMUNITY, ADVOCACY or OTHER
    pub category: Option<String>,
    /// PDF, VIDEO, AUDIO, LINK, DOCUMENT or TOOLKIT
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub file_url: Option<String>,
    /// Required for LINK resources
    pub url: Option<String>,
    /// New resources are public unless created as drafts
    #[serde(default = "published_by_default")]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tags: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateResourceRequest {
    #[validate(
        custom(function = "not_blank", message = "Title cannot be empty"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: Option<String>,
    pub slug: Option<String>,
    #[validate(custom(function = "not_blank", message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub file_url: Option<String>,
    pub url: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub tags: Option<Vec<i32>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResourceResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: ResourceCategory,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub file_url: Option<String>,
    pub url: Option<String>,
    pub downloads: i32,
    pub published: bool,
    pub featured: bool,
    pub created_by: Option<i32>,
    pub tags: Vec<TagSummary>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ResourceDetails> for ResourceResponse {
    fn from(details: ResourceDetails) -> Self {
        let r = details.resource;
        Self {
            id: r.id,
            title: r.title,
            slug: r.slug,
            description: r.description,
            category: r.category,
            resource_type: r.resource_type,
            file_url: r.file_url,
            url: r.url,
            downloads: r.downloads,
            published: r.published,
            featured: r.featured,
            created_by: r.created_by,
            tags: details.tags,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadResponse {
    /// Where the client should go next: the external URL or the stored file
    pub url: Option<String>,
    pub downloads: i32,
}

#[utoipa::path(
    get,
    path = "/api/resources",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("limit" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("category" = Option<String>, Query, description = "Category filter"),
        ("type" = Option<String>, Query, description = "Type filter"),
        ("featured" = Option<bool>, Query, description = "Featured filter"),
        ("published" = Option<bool>, Query, description = "Published filter (staff only)"),
        ("search" = Option<String>, Query, description = "Text search"),
        ("tag" = Option<String>, Query, description = "Tag slug"),
    ),
    responses(
        (status = 200, description = "Paginated resources", body = PaginatedResponse<ResourceResponse>),
        (status = 400, description = "Invalid filter", body = AppError),
    ),
    tag = "resources"
)]
pub async fn list_resources(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    AppQuery(params): AppQuery<ContentListQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, limit) = params.pagination();
    let filter = ResourceFilter {
        category: params
            .category
            .as_deref()
            .map(|raw| parse_enum::<ResourceCategory>(raw, "category"))
            .transpose()?,
        resource_type: params
            .kind
            .as_deref()
            .map(|raw| parse_enum::<ResourceType>(raw, "type"))
            .transpose()?,
        featured: params.featured,
        published: published_filter(viewer.is_staff(), params.published),
        search: params.search_text().map(str::to_string),
        tag: non_empty(params.tag.clone()),
    };

    let service = ResourceService::new(db);
    let (resources, total) = service.list(filter, page, limit).await?;
    let items: Vec<ResourceResponse> = resources.into_iter().map(ResourceResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(items, total, page, limit)))
}

#[utoipa::path(
    get,
    path = "/api/resources/{slug}",
    params(("slug" = String, Path, description = "Resource slug")),
    responses(
        (status = 200, description = "Resource found", body = ResourceResponse),
        (status = 404, description = "Resource not found", body = AppError),
    ),
    tag = "resources"
)]
pub async fn get_resource(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ResourceService::new(db);
    let resource = service.get_by_slug(&slug, viewer.is_staff()).await?;
    Ok(ApiResponse::ok(ResourceResponse::from(resource)))
}

#[utoipa::path(
    post,
    path = "/api/resources",
    security(("jwt_token" = [])),
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Resource created", body = ResourceResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
    ),
    tag = "resources"
)]
pub async fn create_resource(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CreateResourceRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;
    payload.validate()?;

    let category = match payload.category.as_deref() {
        Some(raw) => parse_enum::<ResourceCategory>(raw, "category")?,
        None => return Err(AppError::Validation("Category is required".to_string())),
    };
    let resource_type = match payload.resource_type.as_deref() {
        Some(raw) => parse_enum::<ResourceType>(raw, "type")?,
        None => return Err(AppError::Validation("Type is required".to_string())),
    };

    let input = NewResource {
        title: payload.title.trim().to_string(),
        slug: non_empty(payload.slug),
        description: sanitize_html(&payload.description),
        category,
        resource_type,
        file_url: non_empty(payload.file_url),
        url: non_empty(payload.url),
        published: payload.published,
        featured: payload.featured,
        tags: payload.tags,
    };

    let service = ResourceService::new(db);
    let resource = service.create(auth_user.user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(ResourceResponse::from(resource), "Resource created"),
    ))
}

#[utoipa::path(
    put,
    path = "/api/resources/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Resource slug")),
    request_body = UpdateResourceRequest,
    responses(
        (status = 200, description = "Resource updated", body = ResourceResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
        (status = 404, description = "Resource not found", body = AppError),
    ),
    tag = "resources"
)]
pub async fn update_resource(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<UpdateResourceRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;
    payload.validate()?;

    let changes = ResourceChanges {
        title: payload.title.map(|t| t.trim().to_string()),
        slug: non_empty(payload.slug),
        description: payload.description.as_deref().map(sanitize_html),
        category: payload
            .category
            .as_deref()
            .map(|raw| parse_enum::<ResourceCategory>(raw, "category"))
            .transpose()?,
        resource_type: payload
            .resource_type
            .as_deref()
            .map(|raw| parse_enum::<ResourceType>(raw, "type"))
            .transpose()?,
        file_url: trimmed(payload.file_url),
        url: trimmed(payload.url),
        published: payload.published,
        featured: payload.featured,
        tags: payload.tags,
    };

    let service = ResourceService::new(db);
    let resource = service.update(&slug, changes).await?;
    Ok(ApiResponse::with_message(
        ResourceResponse::from(resource),
        "Resource updated",
    ))
}

#[utoipa::path(
    delete,
    path = "/api/resources/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Resource slug")),
    responses(
        (status = 200, description = "Resource deleted"),
        (status = 403, description = "ADMIN only", body = AppError),
        (status = 404, description = "Resource not found", body = AppError),
    ),
    tag = "resources"
)]
pub async fn delete_resource(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_admin_to(&auth_user, "delete resources")?;

    let service = ResourceService::new(db);
    service.delete(&slug).await?;
    Ok(ApiResponse::with_message((), "Resource deleted"))
}

#[utoipa::path(
    post,
    path = "/api/resources/{slug}/download",
    params(("slug" = String, Path, description = "Resource slug")),
    responses(
        (status = 200, description = "Download counted", body = DownloadResponse),
        (status = 404, description = "Resource not found", body = AppError),
    ),
    tag = "resources"
)]
pub async fn download_resource(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ResourceService::new(db);
    let resource = service.record_download(&slug, viewer.is_staff()).await?;

    Ok(ApiResponse::ok(DownloadResponse {
        url: resource.url.or(resource.file_url),
        downloads: resource.downloads,
    }))
}
