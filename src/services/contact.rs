use crate::error::{AppError, AppResult};
use crate::models::{contact_message, ContactMessage, ContactMessageModel, ContactStatus};
use crate::services::query::search_condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

pub struct ContactService {
    db: DatabaseConnection,
}

impl ContactService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn submit(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) -> AppResult<ContactMessageModel> {
        let now = chrono::Utc::now().naive_utc();
        let saved = contact_message::ActiveModel {
            name: Set(name.trim().to_string()),
            email: Set(email.trim().to_lowercase()),
            subject: Set(subject.trim().to_string()),
            message: Set(message.trim().to_string()),
            status: Set(ContactStatus::Unread),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(message_id = saved.id, "Contact message received");
        Ok(saved)
    }

    /// Newest first.
    pub async fn list(
        &self,
        status: Option<ContactStatus>,
        search: Option<&str>,
        page: u64,
        limit: u64,
    ) -> AppResult<(Vec<ContactMessageModel>, u64)> {
        let mut query = ContactMessage::find();
        if let Some(status) = status {
            query = query.filter(contact_message::Column::Status.eq(status));
        }
        if let Some(term) = search {
            query = query.filter(search_condition(
                &[
                    contact_message::Column::Name,
                    contact_message::Column::Email,
                    contact_message::Column::Subject,
                    contact_message::Column::Message,
                ],
                term,
            ));
        }

        let paginator = query
            .order_by_desc(contact_message::Column::CreatedAt)
            .order_by_desc(contact_message::Column::Id)
            .paginate(&self.db, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    pub async fn get(&self, id: i32) -> AppResult<ContactMessageModel> {
        ContactMessage::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Message not found"))
    }

    pub async fn set_status(&self, id: i32, status: ContactStatus) -> AppResult<ContactMessageModel> {
        let existing = self.get(id).await?;
        let mut active: contact_message::ActiveModel = existing.into();
        active.status = Set(status);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let existing = self.get(id).await?;
        ContactMessage::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
