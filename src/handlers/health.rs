use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" or "degraded"
    pub status: String,
    pub service: String,
    pub version: String,
    /// Whether the database answered a ping
    pub database: bool,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service status", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let database = match db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Database ping failed: {:?}", e);
            false
        }
    };

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}
