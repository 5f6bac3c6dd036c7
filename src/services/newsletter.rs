use crate::error::{AppError, AppResult};
use crate::models::{
    newsletter_subscriber, NewsletterSubscriber, NewsletterSubscriberModel, SubscriberStatus,
};
use crate::services::query::search_condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

/// Result of a subscribe request.
#[derive(Debug)]
pub enum Subscription {
    Created(NewsletterSubscriberModel),
    Reactivated(NewsletterSubscriberModel),
}

pub struct NewsletterService {
    db: DatabaseConnection,
}

impl NewsletterService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<NewsletterSubscriberModel>> {
        Ok(NewsletterSubscriber::find()
            .filter(newsletter_subscriber::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    /// Subscribe `email`, reactivating a previous unsubscribe.
    pub async fn subscribe(&self, email: &str, name: Option<String>) -> AppResult<Subscription> {
        let email = email.trim().to_lowercase();
        let now = chrono::Utc::now().naive_utc();

        if let Some(existing) = self.find_by_email(&email).await? {
            if existing.status == SubscriberStatus::Active {
                return Err(AppError::Validation(
                    "This email is already subscribed".to_string(),
                ));
            }

            let mut active: newsletter_subscriber::ActiveModel = existing.into();
            active.status = Set(SubscriberStatus::Active);
            active.unsubscribed_at = Set(None);
            if name.is_some() {
                active.name = Set(name);
            }
            active.updated_at = Set(now);
            let subscriber = active.update(&self.db).await?;
            tracing::info!(subscriber_id = subscriber.id, "Newsletter subscription reactivated");
            return Ok(Subscription::Reactivated(subscriber));
        }

        let subscriber = newsletter_subscriber::ActiveModel {
            email: Set(email),
            name: Set(name),
            status: Set(SubscriberStatus::Active),
            unsubscribed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            crate::services::query::map_unique_violation(e, "This email is already subscribed")
        })?;

        tracing::info!(subscriber_id = subscriber.id, "Newsletter subscriber added");
        Ok(Subscription::Created(subscriber))
    }

    pub async fn unsubscribe(&self, email: &str) -> AppResult<NewsletterSubscriberModel> {
        let email = email.trim().to_lowercase();
        let existing = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found("Subscriber not found"))?;

        if existing.status == SubscriberStatus::Unsubscribed {
            return Ok(existing);
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: newsletter_subscriber::ActiveModel = existing.into();
        active.status = Set(SubscriberStatus::Unsubscribed);
        active.unsubscribed_at = Set(Some(now));
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    /// Newest first.
    pub async fn list(
        &self,
        status: Option<SubscriberStatus>,
        search: Option<&str>,
        page: u64,
        limit: u64,
    ) -> AppResult<(Vec<NewsletterSubscriberModel>, u64)> {
        let mut query = NewsletterSubscriber::find();
        if let Some(status) = status {
            query = query.filter(newsletter_subscriber::Column::Status.eq(status));
        }
        if let Some(term) = search {
            query = query.filter(search_condition(
                &[
                    newsletter_subscriber::Column::Email,
                    newsletter_subscriber::Column::Name,
                ],
                term,
            ));
        }

        let paginator = query
            .order_by_desc(newsletter_subscriber::Column::CreatedAt)
            .order_by_desc(newsletter_subscriber::Column::Id)
            .paginate(&self.db, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = NewsletterSubscriber::delete_by_id(id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Subscriber not found"));
        }
        Ok(())
    }
}
