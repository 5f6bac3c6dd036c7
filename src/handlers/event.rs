use super::{non_empty, not_blank, trimmed, AppJson, AppQuery};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin_to, require_staff};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::models::EventRsvpModel;
use crate::response::{ApiResponse, ContentListQuery, PaginatedResponse};
use crate::services::event::{EventChanges, EventDetails, EventFilter, EventService, NewEvent};
use crate::services::query::published_filter;
use crate::services::tag::TagSummary;
use crate::utils::sanitize_html;
use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn parse_event_date(raw: &str) -> AppResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::Validation("Invalid date. Use YYYY-MM-DD".to_string()))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,
    pub slug: Option<String>,
    /// Event description (HTML)
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,
    /// Event date, `YYYY-MM-DD`
    pub date: Option<String>,
    /// Free-form time, e.g. "6:00 PM"
    #[validate(length(max = 50, message = "Time must be at most 50 characters"))]
    pub time: Option<String>,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Location is required"),
        length(max = 255, message = "Location must be at most 255 characters")
    )]
    pub location: String,
    pub image_url: Option<String>,
    #[validate(range(min = 1, message = "Max attendees must be at least 1"))]
    pub max_attendees: Option<i32>,
    /// Defaults to the current user
    pub organizer_id: Option<i32>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tags: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEventRequest {
    #[validate(
        custom(function = "not_blank", message = "Title cannot be empty"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: Option<String>,
    pub slug: Option<String>,
    #[validate(custom(function = "not_blank", message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub date: Option<String>,
    #[validate(length(max = 50, message = "Time must be at most 50 characters"))]
    pub time: Option<String>,
    #[validate(
        custom(function = "not_blank", message = "Location cannot be empty"),
        length(max = 255, message = "Location must be at most 255 characters")
    )]
    pub location: Option<String>,
    pub image_url: Option<String>,
    /// 0 removes the attendee cap
    #[validate(range(min = 0, message = "Max attendees cannot be negative"))]
    pub max_attendees: Option<i32>,
    pub organizer_id: Option<i32>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub tags: Option<Vec<i32>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RsvpRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Name is required"),
        length(max = 100, message = "Name must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub location: String,
    pub image_url: Option<String>,
    pub max_attendees: Option<i32>,
    pub organizer_id: i32,
    pub organizer_name: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub rsvp_count: u64,
    pub tags: Vec<TagSummary>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<EventDetails> for EventResponse {
    fn from(details: EventDetails) -> Self {
        let e = details.event;
        Self {
            id: e.id,
            title: e.title,
            slug: e.slug,
            description: e.description,
            date: e.date,
            time: e.time,
            location: e.location,
            image_url: e.image_url,
            max_attendees: e.max_attendees,
            organizer_id: e.organizer_id,
            organizer_name: details.organizer.map(|u| u.name),
            published: e.published,
            featured: e.featured,
            rsvp_count: details.rsvp_count,
            tags: details.tags,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RsvpResponse {
    pub id: i32,
    pub event_id: i32,
    pub name: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl From<EventRsvpModel> for RsvpResponse {
    fn from(r: EventRsvpModel) -> Self {
        Self {
            id: r.id,
            event_id: r.event_id,
            name: r.name,
            email: r.email,
            created_at: r.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("limit" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("featured" = Option<bool>, Query, description = "Featured filter"),
        ("published" = Option<bool>, Query, description = "Published filter (staff only)"),
        ("upcoming" = Option<bool>, Query, description = "Only events from today on"),
        ("search" = Option<String>, Query, description = "Text search"),
        ("tag" = Option<String>, Query, description = "Tag slug"),
    ),
    responses(
        (status = 200, description = "Paginated events", body = PaginatedResponse<EventResponse>),
    ),
    tag = "events"
)]
pub async fn list_events(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    AppQuery(params): AppQuery<ContentListQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, limit) = params.pagination();
    let filter = EventFilter {
        featured: params.featured,
        published: published_filter(viewer.is_staff(), params.published),
        search: params.search_text().map(str::to_string),
        tag: non_empty(params.tag.clone()),
        from_date: params
            .upcoming
            .unwrap_or(false)
            .then(|| chrono::Utc::now().date_naive()),
    };

    let service = EventService::new(db);
    let (events, total) = service.list(filter, page, limit).await?;
    let items: Vec<EventResponse> = events.into_iter().map(EventResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(items, total, page, limit)))
}

#[utoipa::path(
    get,
    path = "/api/events/{slug}",
    params(("slug" = String, Path, description = "Event slug")),
    responses(
        (status = 200, description = "Event found", body = EventResponse),
        (status = 404, description = "Event not found", body = AppError),
    ),
    tag = "events"
)]
pub async fn get_event(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = EventService::new(db);
    let event = service.get_by_slug(&slug, viewer.is_staff()).await?;
    Ok(ApiResponse::ok(EventResponse::from(event)))
}

#[utoipa::path(
    post,
    path = "/api/events",
    security(("jwt_token" = [])),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
    ),
    tag = "events"
)]
pub async fn create_event(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CreateEventRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;
    payload.validate()?;

    let date = match payload.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_event_date(raw)?,
        _ => return Err(AppError::Validation("Date is required".to_string())),
    };

    let input = NewEvent {
        title: payload.title.trim().to_string(),
        slug: non_empty(payload.slug),
        description: sanitize_html(&payload.description),
        date,
        time: non_empty(payload.time),
        location: payload.location.trim().to_string(),
        image_url: non_empty(payload.image_url),
        max_attendees: payload.max_attendees,
        organizer_id: payload.organizer_id,
        published: payload.published,
        featured: payload.featured,
        tags: payload.tags,
    };

    let service = EventService::new(db);
    let event = service.create(auth_user.user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(EventResponse::from(event), "Event created"),
    ))
}

#[utoipa::path(
    put,
    path = "/api/events/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Event slug")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
        (status = 404, description = "Event not found", body = AppError),
    ),
    tag = "events"
)]
pub async fn update_event(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<UpdateEventRequest>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;
    payload.validate()?;

    let changes = EventChanges {
        title: payload.title.map(|t| t.trim().to_string()),
        slug: non_empty(payload.slug),
        description: payload.description.as_deref().map(sanitize_html),
        date: payload.date.as_deref().map(parse_event_date).transpose()?,
        time: trimmed(payload.time),
        location: payload.location.map(|l| l.trim().to_string()),
        image_url: trimmed(payload.image_url),
        max_attendees: payload
            .max_attendees
            .map(|max| if max > 0 { Some(max) } else { None }),
        organizer_id: payload.organizer_id,
        published: payload.published,
        featured: payload.featured,
        tags: payload.tags,
    };

    let service = EventService::new(db);
    let event = service.update(&slug, changes).await?;
    Ok(ApiResponse::with_message(EventResponse::from(event), "Event updated"))
}

#[utoipa::path(
    delete,
    path = "/api/events/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Event slug")),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 403, description = "ADMIN only", body = AppError),
        (status = 404, description = "Event not found", body = AppError),
    ),
    tag = "events"
)]
pub async fn delete_event(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_admin_to(&auth_user, "delete events")?;

    let service = EventService::new(db);
    service.delete(&slug).await?;
    Ok(ApiResponse::with_message((), "Event deleted"))
}

#[utoipa::path(
    post,
    path = "/api/events/{slug}/rsvp",
    params(("slug" = String, Path, description = "Event slug")),
    request_body = RsvpRequest,
    responses(
        (status = 201, description = "Registered", body = RsvpResponse),
        (status = 400, description = "Event full, duplicate or invalid input", body = AppError),
        (status = 404, description = "Event not found", body = AppError),
    ),
    tag = "events"
)]
pub async fn rsvp_event(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<RsvpRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let service = EventService::new(db);
    let rsvp = service.rsvp(&slug, &payload.name, &payload.email).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(RsvpResponse::from(rsvp), "You're registered"),
    ))
}

#[utoipa::path(
    get,
    path = "/api/events/{slug}/rsvps",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Event slug")),
    responses(
        (status = 200, description = "Registrations", body = Vec<RsvpResponse>),
        (status = 403, description = "ADMIN or EDITOR only", body = AppError),
        (status = 404, description = "Event not found", body = AppError),
    ),
    tag = "events"
)]
pub async fn list_rsvps(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_staff(&auth_user)?;

    let service = EventService::new(db);
    let rsvps = service.list_rsvps(&slug).await?;
    let items: Vec<RsvpResponse> = rsvps.into_iter().map(RsvpResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_dates_accept_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2026, 5, 14).unwrap();
        assert_eq!(parse_event_date("2026-05-14").unwrap(), expected);
        assert_eq!(parse_event_date("2026-05-14T18:00:00Z").unwrap(), expected);
        assert!(parse_event_date("14/05/2026").is_err());
    }
}
