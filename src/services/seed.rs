//! Demo content for fresh installs. Records whose slug already exists are
//! left untouched, so seeding can run repeatedly.

use crate::error::AppResult;
use crate::models::{
    event, news_article, resource, story, tag, Event, NewsArticle, Resource, ResourceCategory,
    ResourceType, Story, StoryType, Tag,
};
use crate::services::event::{EventService, NewEvent};
use crate::services::news::{NewArticle, NewsService};
use crate::services::query::slug_exists;
use crate::services::resource::{NewResource, ResourceService};
use crate::services::story::{NewStory, StoryService};
use crate::services::tag::TagService;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: u32,
    pub skipped: u32,
}

impl SeedSummary {
    fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.skipped += 1;
        }
    }
}

const DEMO_TAGS: &[(&str, &str)] = &[
    ("Advocacy", "advocacy"),
    ("Community", "community"),
    ("Education", "education"),
    ("Youth", "youth"),
];

async fn find_tag_id(db: &DatabaseConnection, slug: &str) -> AppResult<Option<i32>> {
    Ok(Tag::find()
        .filter(tag::Column::Slug.eq(slug))
        .one(db)
        .await?
        .map(|t| t.id))
}

pub async fn seed_demo_content(db: &DatabaseConnection, author_id: i32) -> AppResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    let tags = TagService::new(db.clone());
    for (name, slug) in DEMO_TAGS {
        let exists = slug_exists::<Tag, _>(db, tag::Column::Slug, slug).await?;
        if !exists {
            tags.create(name, Some(slug)).await?;
        }
        summary.record(!exists);
    }
    let advocacy = find_tag_id(db, "advocacy").await?;
    let community = find_tag_id(db, "community").await?;
    let education = find_tag_id(db, "education").await?;
    let youth = find_tag_id(db, "youth").await?;

    let news = NewsService::new(db.clone());
    let articles = [
        NewArticle {
            title: "Community Center Opens Its Doors".to_string(),
            slug: Some("community-center-opens".to_string()),
            excerpt: Some("A new space for workshops, mentoring and support.".to_string()),
            content: "<p>Our new community center is now open to families across the city.</p>"
                .to_string(),
            category: "Announcements".to_string(),
            image_url: None,
            published: true,
            featured: true,
            tags: [community, youth].into_iter().flatten().collect(),
        },
        NewArticle {
            title: "Know Your Rights Workshop Series".to_string(),
            slug: Some("know-your-rights-workshops".to_string()),
            excerpt: Some("Free monthly sessions with volunteer attorneys.".to_string()),
            content: "<p>Join volunteer attorneys for practical sessions on tenant and \
                      employment rights.</p>"
                .to_string(),
            category: "Programs".to_string(),
            image_url: None,
            published: true,
            featured: false,
            tags: [advocacy, education].into_iter().flatten().collect(),
        },
    ];
    for article in articles {
        let slug = article.slug.clone().unwrap_or_default();
        let exists = slug_exists::<NewsArticle, _>(db, news_article::Column::Slug, &slug).await?;
        if !exists {
            news.create(author_id, article).await?;
        }
        summary.record(!exists);
    }

    let resources = ResourceService::new(db.clone());
    let demo_resources = [
        NewResource {
            title: "Tenant Rights Guide".to_string(),
            slug: Some("tenant-rights-guide".to_string()),
            description: "<p>A plain-language guide to renting safely.</p>".to_string(),
            category: ResourceCategory::Legal,
            resource_type: ResourceType::Pdf,
            file_url: Some("/uploads/documents/tenant-rights-guide.pdf".to_string()),
            url: None,
            published: true,
            featured: true,
            tags: [advocacy].into_iter().flatten().collect(),
        },
        NewResource {
            title: "Scholarship Directory".to_string(),
            slug: Some("scholarship-directory".to_string()),
            description: "<p>Scholarships open to first-generation students.</p>".to_string(),
            category: ResourceCategory::Education,
            resource_type: ResourceType::Link,
            file_url: None,
            url: Some("https://studentaid.gov/".to_string()),
            published: true,
            featured: false,
            tags: [education, youth].into_iter().flatten().collect(),
        },
    ];
    for item in demo_resources {
        let slug = item.slug.clone().unwrap_or_default();
        let exists = slug_exists::<Resource, _>(db, resource::Column::Slug, &slug).await?;
        if !exists {
            resources.create(author_id, item).await?;
        }
        summary.record(!exists);
    }

    let story_slug = "finding-my-voice";
    let exists = slug_exists::<Story, _>(db, story::Column::Slug, story_slug).await?;
    if !exists {
        StoryService::new(db.clone())
            .create(
                author_id,
                NewStory {
                    title: "Finding My Voice".to_string(),
                    slug: Some(story_slug.to_string()),
                    excerpt: Some("How mentoring changed one student's path.".to_string()),
                    content: "<p>When I joined the mentoring program I barely spoke in class.</p>"
                        .to_string(),
                    story_type: StoryType::Text,
                    media_url: None,
                    thumbnail_url: None,
                    published: true,
                    featured: true,
                },
            )
            .await?;
    }
    summary.record(!exists);

    let event_slug = "spring-resource-fair";
    let exists = slug_exists::<Event, _>(db, event::Column::Slug, event_slug).await?;
    if !exists {
        let date = chrono::Utc::now().date_naive() + chrono::Duration::days(30);
        EventService::new(db.clone())
            .create(
                author_id,
                NewEvent {
                    title: "Spring Resource Fair".to_string(),
                    slug: Some(event_slug.to_string()),
                    description: "<p>Meet local organizations offering free services.</p>"
                        .to_string(),
                    date,
                    time: Some("10:00 AM - 2:00 PM".to_string()),
                    location: "Community Center, Main Hall".to_string(),
                    image_url: None,
                    max_attendees: Some(200),
                    organizer_id: None,
                    published: true,
                    featured: true,
                    tags: [community].into_iter().flatten().collect(),
                },
            )
            .await?;
    }
    summary.record(!exists);

    tracing::info!(
        created = summary.created,
        skipped = summary.skipped,
        "Demo content seeded"
    );
    Ok(summary)
}
