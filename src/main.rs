use axum::{extract::Extension, middleware::from_fn, routing::get, Router};
use sea_orm_migration::MigratorTrait;
use std::env;
use std::net::SocketAddr;
use stf_cms::services::bootstrap_admin::{ensure_bootstrap_admin, BootstrapOutcome};
use stf_cms::services::upload::UploadConfig;
use stf_cms::{config, handlers, middleware, migration, routes, utils};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        // Auth
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_current_user,
        // Users
        handlers::user::list_users,
        handlers::user::create_user,
        // Stories
        handlers::story::list_stories,
        handlers::story::get_story,
        handlers::story::create_story,
        handlers::story::update_story,
        handlers::story::delete_story,
        // News
        handlers::news::list_news,
        handlers::news::get_article,
        handlers::news::create_article,
        handlers::news::update_article,
        handlers::news::delete_article,
        // Events
        handlers::event::list_events,
        handlers::event::get_event,
        handlers::event::create_event,
        handlers::event::update_event,
        handlers::event::delete_event,
        handlers::event::rsvp_event,
        handlers::event::list_rsvps,
        // Resources
        handlers::resource::list_resources,
        handlers::resource::get_resource,
        handlers::resource::create_resource,
        handlers::resource::update_resource,
        handlers::resource::delete_resource,
        handlers::resource::download_resource,
        // Tags
        handlers::tag::list_tags,
        handlers::tag::get_tag,
        handlers::tag::create_tag,
        handlers::tag::update_tag,
        handlers::tag::delete_tag,
        // Contact
        handlers::contact::submit_contact,
        handlers::contact::list_contact_messages,
        handlers::contact::get_contact_message,
        handlers::contact::update_contact_message,
        handlers::contact::delete_contact_message,
        // Newsletter
        handlers::newsletter::subscribe,
        handlers::newsletter::unsubscribe,
        handlers::newsletter::list_subscribers,
        handlers::newsletter::delete_subscriber,
        // Upload
        handlers::upload::upload_file,
        // Admin
        handlers::admin::get_stats,
    ),
    components(
        schemas(
            stf_cms::response::ApiResponse<serde_json::Value>,
            stf_cms::response::PaginatedResponse<serde_json::Value>,
            stf_cms::response::PaginationQuery,
            stf_cms::response::ContentListQuery,
            stf_cms::error::AppError,
            handlers::health::HealthResponse,
            // Auth
            handlers::auth::LoginRequest,
            handlers::auth::LoginResponse,
            handlers::auth::UserResponse,
            handlers::user::CreateUserRequest,
            // Stories
            handlers::story::CreateStoryRequest,
            handlers::story::UpdateStoryRequest,
            handlers::story::StoryResponse,
            // News
            handlers::news::CreateArticleRequest,
            handlers::news::UpdateArticleRequest,
            handlers::news::ArticleResponse,
            // Events
            handlers::event::CreateEventRequest,
            handlers::event::UpdateEventRequest,
            handlers::event::EventResponse,
            handlers::event::RsvpRequest,
            handlers::event::RsvpResponse,
            // Resources
            handlers::resource::CreateResourceRequest,
            handlers::resource::UpdateResourceRequest,
            handlers::resource::ResourceResponse,
            handlers::resource::DownloadResponse,
            // Tags
            handlers::tag::TagResponse,
            handlers::tag::CreateTagRequest,
            handlers::tag::UpdateTagRequest,
            stf_cms::services::tag::TagSummary,
            // Contact
            handlers::contact::ContactRequest,
            handlers::contact::UpdateContactRequest,
            handlers::contact::ContactMessageResponse,
            // Newsletter
            handlers::newsletter::SubscribeRequest,
            handlers::newsletter::UnsubscribeRequest,
            handlers::newsletter::SubscriberResponse,
            // Upload
            handlers::upload::UploadResponse,
            // Admin
            stf_cms::services::admin::AdminStats,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service status"),
        (name = "auth", description = "Session login and logout"),
        (name = "users", description = "Dashboard accounts"),
        (name = "stories", description = "Impact stories"),
        (name = "news", description = "News articles"),
        (name = "events", description = "Events and RSVPs"),
        (name = "resources", description = "Downloadable resources and links"),
        (name = "tags", description = "Content tags"),
        (name = "contact", description = "Contact form and inbox"),
        (name = "newsletter", description = "Newsletter subscribers"),
        (name = "upload", description = "Media uploads"),
        (name = "admin", description = "Dashboard statistics"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let json_logs = config::parse_bool_env("LOG_JSON", false);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stf_cms=debug,tower_http=debug".into());
    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Validate configuration before doing anything else
    let (jwt_config, upload_config) = validate_config()?;

    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!("Starting CMS API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    match ensure_bootstrap_admin(&db).await? {
        BootstrapOutcome::Created => tracing::info!("Bootstrap admin account created"),
        BootstrapOutcome::Promoted => tracing::info!("Existing account promoted to ADMIN"),
        BootstrapOutcome::AdminExists => tracing::debug!("Admin account already present"),
        BootstrapOutcome::NotConfigured => {
            tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap")
        }
    }

    let app = create_app(&upload_config)
        .layer(Extension(db))
        .layer(Extension(upload_config));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<(config::jwt::JwtConfig, UploadConfig)> {
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // DATABASE_URL is checked here for an early error; the connection comes later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    let upload_config = UploadConfig::from_env();
    for dir in ["images", "videos"] {
        let path = upload_config.upload_dir.join(dir);
        std::fs::create_dir_all(&path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create upload directory '{}': {}",
                path.display(),
                e
            )
        })?;
    }

    Ok((jwt_config, upload_config))
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        // Explicit origins may send the auth cookie
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins).allow_credentials(true)
    }
}

fn create_app(upload_config: &UploadConfig) -> Router {
    Router::new()
        .route("/", get(handlers::health::health_check))
        .merge(routes::create_routes(upload_config))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(&upload_config.upload_dir))
        .layer(from_fn(middleware::security::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
