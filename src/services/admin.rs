use crate::{
    error::AppResult,
    models::{
        contact_message, newsletter_subscriber, ContactMessage, ContactStatus, Event, EventRsvp,
        NewsArticle, NewsletterSubscriber, Resource, Story, SubscriberStatus, Tag, User,
    },
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

pub struct AdminService {
    db: DatabaseConnection,
}

impl AdminService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_stats(&self) -> AppResult<AdminStats> {
        let stories = Story::find().count(&self.db).await?;
        let news_articles = NewsArticle::find().count(&self.db).await?;
        let events = Event::find().count(&self.db).await?;
        let resources = Resource::find().count(&self.db).await?;
        let tags = Tag::find().count(&self.db).await?;
        let users = User::find().count(&self.db).await?;
        let rsvps = EventRsvp::find().count(&self.db).await?;

        let unread_messages = ContactMessage::find()
            .filter(contact_message::Column::Status.eq(ContactStatus::Unread))
            .count(&self.db)
            .await?;

        let active_subscribers = NewsletterSubscriber::find()
            .filter(newsletter_subscriber::Column::Status.eq(SubscriberStatus::Active))
            .count(&self.db)
            .await?;

        Ok(AdminStats {
            stories,
            news_articles,
            events,
            resources,
            tags,
            users,
            rsvps,
            unread_messages,
            active_subscribers,
        })
    }
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct AdminStats {
    pub stories: u64,
    pub news_articles: u64,
    pub events: u64,
    pub resources: u64,
    pub tags: u64,
    pub users: u64,
    pub rsvps: u64,
    pub unread_messages: u64,
    pub active_subscribers: u64,
}
