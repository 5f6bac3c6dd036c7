use super::{non_empty, not_blank, trimmed, AppJson, AppQuery};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin_to, require_staff};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::response::{ApiResponse, ContentListQuery, PaginatedResponse};
use crate::services::news::{ArticleChanges, ArticleDetails, NewArticle, NewsFilter, NewsService};
use crate::services::query::published_filter;
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

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateArticleRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,
    pub slug: Option<String>,
    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,
    /// Article body (HTML)
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,
    /// Free-text category (1-50 characters)
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Category is required"),
        length(max = 50, message = "Category must be at most 50 characters")
    )]
    pub category: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
    /// Tag ids
    #[serde(default)]
    pub tags: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateArticleRequest {
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
    #[validate(
        custom(function = "not_blank", message = "Category cannot be empty"),
        length(max = 50, message = "Category must be at most 50 characters")
    )]
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    /// Replaces the article's tags when present
    pub tags: Option<Vec<i32>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
    pub author_id: i32,
    pub author_name: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub published_at: Option<NaiveDateTime>,
    pub tags: Vec<TagSummary>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ArticleDetails> for ArticleResponse {
    fn from(details: ArticleDetails) -> Self {
        let a = details.article;
        Self {
            id: a.id,
            title: a.title,
            slug: a.slug,
            excerpt: a.excerpt,
            content: a.content,
            category: a.category,
            image_url: a.image_url,
            author_id: a.author_id,
            author_name: details.author.map(|u| u.name),
            published: a.published,
            featured: a.featured,
            published_at: a.published_at,
            tags: details.tags,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/news",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("limit" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("category" = Option<String>, Query, description = "Category filter"),
        ("featured" = Option<bool>, Query, description = "Featured filter"),
        ("published" = Option<bool>, Query, description = "Published filter (staff only)"),
        ("search" = Option<String>, Query, description = "Text search"),
        ("tag" = Option<String>, Query, description = "Tag slug"),
    ),
    responses(
        (status = 200, description = "Paginated articles", body = PaginatedResponse<ArticleResponse>),
    ),
    tag = "news"
)]
pub async fn list_news(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    AppQuery(params): AppQuery<ContentListQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, limit) = params.pagination();
    let filter = NewsFilter {
        category: non_empty(params.category.clone()),
        featured: params.featured,
        published: published_filter(viewer.is_staff(), params.published),
        search: params.search_text().map(str::to_string),
        tag: non_empty(params.tag.clone()),
    };

    let service = NewsService::new(db);
    let (articles, total) = service.list(filter, page, limit).await?;
    let items: Vec<ArticleResponse> = articles.into_iter().map(ArticleResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(items, total, page, limit)))
}

#[utoipa::path(
    get,
    path = "/api/news/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article found", body = ArticleResponse),
        (status = 404, description = "Article not found", body = AppError),
    ),
    tag = "news"
)]
pub async fn get_article(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = NewsService::new(db);
    let article = service.get_by_slug(&slug, viewer.is_staff()).await?;
    Ok(ApiResponse::ok(ArticleResponse::from(article)))
}

#[utoipa::path(
    post,
    path = "/api/news",
    security(("jwt_token" = [])),
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
    ),
    tag = "news"
)]
pub async fn create_article(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CreateArticleRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;
    payload.validate()?;

    let input = NewArticle {
        title: payload.title.trim().to_string(),
        slug: non_empty(payload.slug),
        excerpt: non_empty(payload.excerpt),
        content: sanitize_html(&payload.content),
        category: payload.category.trim().to_string(),
        image_url: non_empty(payload.image_url),
        published: payload.published,
        featured: payload.featured,
        tags: payload.tags,
    };

    let service = NewsService::new(db);
    let article = service.create(auth_user.user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(ArticleResponse::from(article), "Article created"),
    ))
}

#[utoipa::path(
    put,
    path = "/api/news/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
        (status = 404, description = "Article not found", body = AppError),
    ),
    tag = "news"
)]
pub async fn update_article(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<UpdateArticleRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;
    payload.validate()?;

    let changes = ArticleChanges {
        title: payload.title.map(|t| t.trim().to_string()),
        slug: non_empty(payload.slug),
        excerpt: trimmed(payload.excerpt),
        content: payload.content.as_deref().map(sanitize_html),
        category: payload.category.map(|c| c.trim().to_string()),
        image_url: trimmed(payload.image_url),
        published: payload.published,
        featured: payload.featured,
        tags: payload.tags,
    };

    let service = NewsService::new(db);
    let article = service.update(&slug, changes).await?;
    Ok(ApiResponse::with_message(
        ArticleResponse::from(article),
        "Article updated",
    ))
}

#[utoipa::path(
    delete,
    path = "/api/news/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article deleted"),
        (status = 403, description = "ADMIN only", body = AppError),
        (status = 404, description = "Article not found", body = AppError),
    ),
    tag = "news"
)]
pub async fn delete_article(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_admin_to(&auth_user, "delete articles")?;

    let service = NewsService::new(db);
    service.delete(&slug).await?;
    Ok(ApiResponse::with_message((), "Article deleted"))
}
