//! Seeds demo content, or with `--check` only verifies the database answers.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use sea_orm_migration::MigratorTrait;
use std::process::ExitCode;
use stf_cms::models::{user, User, UserRole};
use stf_cms::services::bootstrap_admin::ensure_bootstrap_admin;
use stf_cms::services::seed::seed_demo_content;
use stf_cms::{config, migration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stf_cms=info,seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let check_only = std::env::args().skip(1).any(|arg| arg == "--check");

    let result = if check_only { check().await } else { seed().await };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn check() -> anyhow::Result<()> {
    let db = config::database::get_database().await?;
    db.ping().await?;
    println!("Database connection OK");
    Ok(())
}

async fn seed() -> anyhow::Result<()> {
    let db = config::database::get_database().await?;
    migration::Migrator::up(&db, None).await?;

    let outcome = ensure_bootstrap_admin(&db).await?;
    tracing::info!("Admin bootstrap: {:?}", outcome);

    let author_id = find_admin_id(&db).await?.ok_or_else(|| {
        anyhow::anyhow!("No ADMIN user found; set ADMIN_EMAIL and ADMIN_PASSWORD and rerun")
    })?;

    let summary = seed_demo_content(&db, author_id).await?;
    println!(
        "Seeding complete: {} created, {} skipped (already present)",
        summary.created, summary.skipped
    );
    Ok(())
}

async fn find_admin_id(db: &DatabaseConnection) -> anyhow::Result<Option<i32>> {
    let admin = User::find()
        .filter(user::Column::Role.eq(UserRole::Admin))
        .order_by_asc(user::Column::Id)
        .one(db)
        .await?;
    Ok(admin.map(|u| u.id))
}
