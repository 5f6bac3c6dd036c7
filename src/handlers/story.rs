use super::{non_empty, not_blank, trimmed, AppJson, AppQuery};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin_to, require_staff};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::models::{parse_enum, StoryType};
use crate::response::{ApiResponse, ContentListQuery, PaginatedResponse};
use crate::services::query::published_filter;
use crate::services::story::{NewStory, StoryChanges, StoryFilter, StoryService, StoryWithAuthor};
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

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStoryRequest {
    /// Story title (1-200 characters)
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,
    /// URL slug, derived from the title when omitted
    pub slug: Option<String>,
    /// Short summary
    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,
    /// Story body (HTML)
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,
    /// VIDEO, AUDIO or TEXT
    #[serde(rename = "type")]
    pub story_type: Option<String>,
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
}

/// Every field is optional; omitted fields keep their stored values.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStoryRequest {
    #[validate(
        custom(function = "not_blank", message = "Title cannot be empty"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: Option<String>,
    pub slug: Option<String>,
    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,
    #[validate(custom(function = "not_blank", message = "Content cannot be empty"))]
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub story_type: Option<String>,
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoryResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    /// Sanitized HTML
    pub content: String,
    #[serde(rename = "type")]
    pub story_type: StoryType,
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub author_id: i32,
    pub author_name: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<StoryWithAuthor> for StoryResponse {
    fn from((story, author): StoryWithAuthor) -> Self {
        Self {
            id: story.id,
            title: story.title,
            slug: story.slug,
            excerpt: story.excerpt,
            content: story.content,
            story_type: story.story_type,
            media_url: story.media_url,
            thumbnail_url: story.thumbnail_url,
            author_id: story.author_id,
            author_name: author.map(|a| a.name),
            published: story.published,
            featured: story.featured,
            created_at: story.created_at,
            updated_at: story.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/stories",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("limit" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("type" = Option<String>, Query, description = "VIDEO, AUDIO or TEXT"),
        ("featured" = Option<bool>, Query, description = "Featured filter"),
        ("published" = Option<bool>, Query, description = "Published filter (staff only)"),
        ("search" = Option<String>, Query, description = "Text search"),
    ),
    responses(
        (status = 200, description = "Paginated stories", body = PaginatedResponse<StoryResponse>),
        (status = 400, description = "Invalid filter", body = AppError),
    ),
    tag = "stories"
)]
pub async fn list_stories(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    AppQuery(params): AppQuery<ContentListQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, limit) = params.pagination();
    let story_type = params
        .kind
        .as_deref()
        .map(|raw| parse_enum::<StoryType>(raw, "type"))
        .transpose()?;

    let filter = StoryFilter {
        story_type,
        featured: params.featured,
        published: published_filter(viewer.is_staff(), params.published),
        search: params.search_text().map(str::to_string),
    };

    let service = StoryService::new(db);
    let (stories, total) = service.list(filter, page, limit).await?;
    let items: Vec<StoryResponse> = stories.into_iter().map(StoryResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(items, total, page, limit)))
}

#[utoipa::path(
    get,
    path = "/api/stories/{slug}",
    params(("slug" = String, Path, description = "Story slug")),
    responses(
        (status = 200, description = "Story found", body = StoryResponse),
        (status = 404, description = "Story not found", body = AppError),
    ),
    tag = "stories"
)]
pub async fn get_story(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = StoryService::new(db);
    let story = service.get_by_slug(&slug, viewer.is_staff()).await?;
    Ok(ApiResponse::ok(StoryResponse::from(story)))
}

#[utoipa::path(
    post,
    path = "/api/stories",
    security(("jwt_token" = [])),
    request_body = CreateStoryRequest,
    responses(
        (status = 201, description = "Story created", body = StoryResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
    ),
    tag = "stories"
)]
pub async fn create_story(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CreateStoryRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;
    payload.validate()?;

    let story_type = match payload.story_type.as_deref() {
        Some(raw) => parse_enum::<StoryType>(raw, "type")?,
        None => return Err(AppError::Validation("Type is required".to_string())),
    };

    let input = NewStory {
        title: payload.title.trim().to_string(),
        slug: non_empty(payload.slug),
        excerpt: non_empty(payload.excerpt),
        content: sanitize_html(&payload.content),
        story_type,
        media_url: non_empty(payload.media_url),
        thumbnail_url: non_empty(payload.thumbnail_url),
        published: payload.published,
        featured: payload.featured,
    };

    let service = StoryService::new(db);
    let story = service.create(auth_user.user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(StoryResponse::from(story), "Story created"),
    ))
}

#[utoipa::path(
    put,
    path = "/api/stories/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Story slug")),
    request_body = UpdateStoryRequest,
    responses(
        (status = 200, description = "Story updated", body = StoryResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
        (status = 404, description = "Story not found", body = AppError),
    ),
    tag = "stories"
)]
pub async fn update_story(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<UpdateStoryRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;
    payload.validate()?;

    let changes = StoryChanges {
        title: payload.title.map(|t| t.trim().to_string()),
        slug: non_empty(payload.slug),
        excerpt: trimmed(payload.excerpt),
        content: payload.content.as_deref().map(sanitize_html),
        story_type: payload
            .story_type
            .as_deref()
            .map(|raw| parse_enum::<StoryType>(raw, "type"))
            .transpose()?,
        media_url: trimmed(payload.media_url),
        thumbnail_url: trimmed(payload.thumbnail_url),
        published: payload.published,
        featured: payload.featured,
    };

    let service = StoryService::new(db);
    let story = service.update(&slug, changes).await?;
    Ok(ApiResponse::with_message(StoryResponse::from(story), "Story updated"))
}

#[utoipa::path(
    delete,
    path = "/api/stories/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Story slug")),
    responses(
        (status = 200, description = "Story deleted"),
        (status = 403, description = "ADMIN only", body = AppError),
        (status = 404, description = "Story not found", body = AppError),
    ),
    tag = "stories"
)]
pub async fn delete_story(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_admin_to(&auth_user, "delete stories")?;

    let service = StoryService::new(db);
    service.delete(&slug).await?;
    Ok(ApiResponse::with_message((), "Story deleted"))
}
