#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Once,
};
use stf_cms::models::UserRole;
use stf_cms::services::auth::AuthService;
use stf_cms::services::upload::UploadConfig;

static INIT: Once = Once::new();
static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub const TEST_PASSWORD: &str = "test_password_123";

fn init_env() {
    INIT.call_once(|| {
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        std::env::set_var("BCRYPT_COST", "4");
        let config = stf_cms::config::jwt::JwtConfig::from_env().unwrap();
        let _ = stf_cms::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.addr, path)
    }
}

/// Full router over a fresh SQLite database in a temp directory.
pub async fn spawn_app() -> TestApp {
    init_env();

    let work_dir = std::env::temp_dir().join(format!("stf-cms-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&work_dir).expect("Failed to create test directory");
    let database_url = format!("sqlite://{}?mode=rwc", work_dir.join("test.db").display());

    // One connection keeps SQLite writes serialized
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt)
        .await
        .expect("Failed to connect to test database");

    stf_cms::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let upload_dir = work_dir.join("uploads");
    let upload_config = UploadConfig {
        upload_dir: upload_dir.clone(),
        max_bytes: 1024 * 1024,
        public_base_url: String::new(),
    };

    let app = axum::Router::new()
        .route(
            "/",
            axum::routing::get(stf_cms::handlers::health::health_check),
        )
        .merge(stf_cms::routes::create_routes(&upload_config))
        .layer(axum::middleware::from_fn(
            stf_cms::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(upload_config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
        upload_dir,
    }
}

/// Create an account with `role` and log it in. Returns (user_id, token).
pub async fn create_user(app: &TestApp, role: UserRole) -> (i32, String) {
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    let email = format!("user{}@test.org", counter);

    let user = AuthService::new(app.db.clone())
        .create_user(&format!("Test User {}", counter), &email, TEST_PASSWORD, role)
        .await
        .expect("Failed to create user");

    let token = login(app, &email, TEST_PASSWORD).await;
    (user.id, token)
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse login response");
    assert_eq!(status, 200, "login failed for {}: {}", email, body);

    body["data"]["token"]
        .as_str()
        .expect("Login response missing token")
        .to_string()
}

pub async fn admin(app: &TestApp) -> String {
    create_user(app, UserRole::Admin).await.1
}

pub async fn editor(app: &TestApp) -> String {
    create_user(app, UserRole::Editor).await.1
}

pub async fn visitor(app: &TestApp) -> String {
    create_user(app, UserRole::User).await.1
}

/// POST `body` to `path` as `token`, asserting 201. Returns `data`.
pub async fn create_as(app: &TestApp, token: &str, path: &str, body: Value) -> Value {
    let resp = app
        .client
        .post(app.url(path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Create request failed");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse create response");
    assert_eq!(status, 201, "create {} failed: {}", path, body);
    body["data"].clone()
}

/// Create a tag and return its id.
pub async fn create_tag(app: &TestApp, token: &str, name: &str) -> i64 {
    let data = create_as(app, token, "/tags", serde_json::json!({ "name": name })).await;
    data["id"].as_i64().expect("Tag response missing id")
}

/// GET `path`, optionally authenticated. Returns (status, body).
pub async fn get(app: &TestApp, path: &str, token: Option<&str>) -> (u16, Value) {
    let mut req = app.client.get(app.url(path));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let resp = req.send().await.expect("GET request failed");
    let status = resp.status().as_u16();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}
