use crate::error::AppResult;
use crate::models::{user, User, UserRole};
use crate::utils::hash_password;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::env;

#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl BootstrapAdminConfig {
    /// Requires `ADMIN_EMAIL` and `ADMIN_PASSWORD`; `ADMIN_NAME` is optional.
    pub fn from_env() -> Option<Self> {
        let email = env::var("ADMIN_EMAIL")
            .ok()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())?;
        let password = env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty())?;
        let name = env::var("ADMIN_NAME")
            .ok()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Administrator".to_string());

        Some(Self {
            name,
            email,
            password,
        })
    }
}

/// What `ensure_bootstrap_admin` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AdminExists,
    Promoted,
    Created,
}

/// Make sure the site has an administrator:
/// - any existing ADMIN: nothing to do
/// - the configured email already has an account: promote it
/// - otherwise create a new ADMIN
pub async fn ensure_bootstrap_admin(db: &DatabaseConnection) -> AppResult<BootstrapOutcome> {
    let Some(cfg) = BootstrapAdminConfig::from_env() else {
        return Ok(BootstrapOutcome::NotConfigured);
    };

    let admin_exists = User::find()
        .filter(user::Column::Role.eq(UserRole::Admin))
        .one(db)
        .await?
        .is_some();
    if admin_exists {
        return Ok(BootstrapOutcome::AdminExists);
    }

    let existing = User::find()
        .filter(user::Column::Email.eq(cfg.email.as_str()))
        .one(db)
        .await?;

    let now = chrono::Utc::now().naive_utc();

    if let Some(existing) = existing {
        let mut active: user::ActiveModel = existing.into();
        active.role = Set(UserRole::Admin);
        active.updated_at = Set(now);
        let promoted = active.update(db).await?;
        tracing::info!(user_id = promoted.id, "Promoted configured user to ADMIN");
        return Ok(BootstrapOutcome::Promoted);
    }

    let password_hash = hash_password(&cfg.password)?;
    let created = user::ActiveModel {
        name: Set(cfg.name),
        email: Set(cfg.email),
        password_hash: Set(password_hash),
        role: Set(UserRole::Admin),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(user_id = created.id, "Created bootstrap ADMIN account");
    Ok(BootstrapOutcome::Created)
}
