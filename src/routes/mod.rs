use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::{auth_middleware, optional_auth_middleware};
use crate::services::upload::UploadConfig;
use axum::{extract::DefaultBodyLimit, middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn create_routes(upload_config: &UploadConfig) -> Router {
    Router::new().nest("/api", api_routes(upload_config))
}

fn api_routes(upload_config: &UploadConfig) -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let public = public_read_routes(&rate_limit_config)
        .merge(submit_routes(&rate_limit_config))
        .route_layer(middleware::from_fn(optional_auth_middleware));
    let protected = protected_routes(&rate_limit_config, upload_config)
        .route_layer(middleware::from_fn(auth_middleware));

    public.merge(protected)
}

/// Anonymous reads. Staff sessions still see drafts here.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Stories
        .route("/stories", routing::get(handlers::story::list_stories))
        .route("/stories/{slug}", routing::get(handlers::story::get_story))
        // News
        .route("/news", routing::get(handlers::news::list_news))
        .route("/news/{slug}", routing::get(handlers::news::get_article))
        // Events
        .route("/events", routing::get(handlers::event::list_events))
        .route("/events/{slug}", routing::get(handlers::event::get_event))
        // Resources
        .route(
            "/resources",
            routing::get(handlers::resource::list_resources),
        )
        .route(
            "/resources/{slug}",
            routing::get(handlers::resource::get_resource),
        )
        // Tags
        .route("/tags", routing::get(handlers::tag::list_tags))
        .route("/tags/{slug}", routing::get(handlers::tag::get_tag));

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Login and the public forms.
fn submit_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Auth
        .route("/auth/login", routing::post(handlers::auth::login))
        .route("/auth/logout", routing::post(handlers::auth::logout))
        // Event sign-up
        .route(
            "/events/{slug}/rsvp",
            routing::post(handlers::event::rsvp_event),
        )
        .route(
            "/resources/{slug}/download",
            routing::post(handlers::resource::download_resource),
        )
        // Contact form
        .route(
            "/contact",
            routing::post(handlers::contact::submit_contact),
        )
        // Newsletter
        .route(
            "/newsletter",
            routing::post(handlers::newsletter::subscribe),
        )
        .route(
            "/newsletter/unsubscribe",
            routing::post(handlers::newsletter::unsubscribe),
        );

    with_optional_rate_limit(router, config.enabled, config.submit)
}

/// Dashboard routes. Role checks happen in the handlers.
fn protected_routes(config: &RateLimitConfig, upload_config: &UploadConfig) -> Router {
    let router = Router::new()
        // Auth
        .route("/auth/me", routing::get(handlers::auth::get_current_user))
        // Users (admin only)
        .route(
            "/users",
            routing::get(handlers::user::list_users).post(handlers::user::create_user),
        )
        // Stories
        .route("/stories", routing::post(handlers::story::create_story))
        .route(
            "/stories/{slug}",
            routing::put(handlers::story::update_story).delete(handlers::story::delete_story),
        )
        // News
        .route("/news", routing::post(handlers::news::create_article))
        .route(
            "/news/{slug}",
            routing::put(handlers::news::update_article).delete(handlers::news::delete_article),
        )
        // Events
        .route("/events", routing::post(handlers::event::create_event))
        .route(
            "/events/{slug}",
            routing::put(handlers::event::update_event).delete(handlers::event::delete_event),
        )
        .route(
            "/events/{slug}/rsvps",
            routing::get(handlers::event::list_rsvps),
        )
        // Resources
        .route(
            "/resources",
            routing::post(handlers::resource::create_resource),
        )
        .route(
            "/resources/{slug}",
            routing::put(handlers::resource::update_resource)
                .delete(handlers::resource::delete_resource),
        )
        // Tags
        .route("/tags", routing::post(handlers::tag::create_tag))
        .route(
            "/tags/{slug}",
            routing::put(handlers::tag::update_tag).delete(handlers::tag::delete_tag),
        )
        // Contact inbox
        .route(
            "/contact",
            routing::get(handlers::contact::list_contact_messages),
        )
        .route(
            "/contact/{id}",
            routing::get(handlers::contact::get_contact_message)
                .put(handlers::contact::update_contact_message)
                .delete(handlers::contact::delete_contact_message),
        )
        // Newsletter
        .route(
            "/newsletter",
            routing::get(handlers::newsletter::list_subscribers),
        )
        .route(
            "/newsletter/{id}",
            routing::delete(handlers::newsletter::delete_subscriber),
        )
        // Upload
        .route(
            "/upload",
            routing::post(handlers::upload::upload_file).layer(DefaultBodyLimit::max(
                upload_config.max_bytes + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        // Admin
        .route("/admin/stats", routing::get(handlers::admin::get_stats));

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let Some(governor_conf) = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
    else {
        tracing::warn!("Invalid rate limit rule {:?}, rate limiting disabled", rule);
        return router;
    };

    router.layer(GovernorLayer::new(governor_conf))
}
