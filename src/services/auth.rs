use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel, UserRole},
    utils::{generate_token, hash_password, verify_password},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Check credentials and issue a session token.
    /// Returns (user_model, token).
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(UserModel, String)> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::info!(user_id = user.id, "Rejected login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = generate_token(user.id, &user.email, user.role)?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok((user, token))
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<UserModel>> {
        Ok(User::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await?)
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> AppResult<UserModel> {
        const EMAIL_TAKEN: &str = "A user with this email already exists";

        if self.find_by_email(email).await?.is_some() {
            return Err(AppError::Validation(EMAIL_TAKEN.to_string()));
        }

        let password_hash = hash_password(password)?;
        let now = chrono::Utc::now().naive_utc();
        let new_user = user::ActiveModel {
            name: Set(name.trim().to_string()),
            email: Set(email.trim().to_lowercase()),
            password_hash: Set(password_hash),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let user = new_user
            .insert(&self.db)
            .await
            .map_err(|e| crate::services::query::map_unique_violation(e, EMAIL_TAKEN))?;
        tracing::info!(user_id = user.id, role = ?user.role, "User created");
        Ok(user)
    }

    pub async fn list_users(&self, page: u64, limit: u64) -> AppResult<(Vec<UserModel>, u64)> {
        let paginator = User::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .paginate(&self.db, limit);

        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((users, total))
    }
}
