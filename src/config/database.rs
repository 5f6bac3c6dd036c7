use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::env;
use std::time::Duration;

use super::parse_env_or;

pub async fn get_database() -> anyhow::Result<DatabaseConnection> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let max_connections: u32 = parse_env_or("DB_MAX_CONNECTIONS", 10);
    let min_connections: u32 = parse_env_or("DB_MIN_CONNECTIONS", 2);

    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true);

    Database::connect(opt)
        .await
        .context("Failed to connect to the database")
}
