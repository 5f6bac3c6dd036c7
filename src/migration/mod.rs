use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_stories_table;
mod m20240101_000003_create_news_articles_table;
mod m20240101_000004_create_events_table;
mod m20240101_000005_create_event_rsvps_table;
mod m20240101_000006_create_resources_table;
mod m20240101_000007_create_tags_tables;
mod m20240101_000008_create_contact_messages_table;
mod m20240101_000009_create_newsletter_subscribers_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_stories_table::Migration),
            Box::new(m20240101_000003_create_news_articles_table::Migration),
            Box::new(m20240101_000004_create_events_table::Migration),
            Box::new(m20240101_000005_create_event_rsvps_table::Migration),
            Box::new(m20240101_000006_create_resources_table::Migration),
            Box::new(m20240101_000007_create_tags_tables::Migration),
            Box::new(m20240101_000008_create_contact_messages_table::Migration),
            Box::new(m20240101_000009_create_newsletter_subscribers_table::Migration),
        ]
    }
}
