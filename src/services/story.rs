use crate::error::{AppError, AppResult};
use crate::models::{story, Story, StoryModel, StoryType, User, UserModel};
use crate::services::query::{
    check_slug, map_unique_violation, resolve_slug, search_condition, slug_exists,
};
use crate::utils::patch::{set_if_some, set_nullable_text};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

const SLUG_TAKEN: &str = "A story with this slug already exists";

#[derive(Debug, Default)]
pub struct StoryFilter {
    pub story_type: Option<StoryType>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug)]
pub struct NewStory {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub story_type: StoryType,
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published: bool,
    pub featured: bool,
}

#[derive(Debug, Default)]
pub struct StoryChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub story_type: Option<StoryType>,
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

pub type StoryWithAuthor = (StoryModel, Option<UserModel>);

pub struct StoryService {
    db: DatabaseConnection,
}

impl StoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest first.
    pub async fn list(
        &self,
        filter: StoryFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<(Vec<StoryWithAuthor>, u64)> {
        let mut query = Story::find();
        if let Some(kind) = filter.story_type {
            query = query.filter(story::Column::StoryType.eq(kind));
        }
        if let Some(featured) = filter.featured {
            query = query.filter(story::Column::Featured.eq(featured));
        }
        if let Some(published) = filter.published {
            query = query.filter(story::Column::Published.eq(published));
        }
        if let Some(term) = filter.search.as_deref() {
            query = query.filter(search_condition(
                &[
                    story::Column::Title,
                    story::Column::Excerpt,
                    story::Column::Content,
                ],
                term,
            ));
        }

        let paginator = query
            .order_by_desc(story::Column::CreatedAt)
            .order_by_desc(story::Column::Id)
            .find_also_related(User)
            .paginate(&self.db, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    /// Drafts are only visible when `include_unpublished` is set.
    pub async fn get_by_slug(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> AppResult<StoryWithAuthor> {
        let found = Story::find()
            .filter(story::Column::Slug.eq(slug))
            .find_also_related(User)
            .one(&self.db)
            .await?;

        match found {
            Some((story, author)) if story.published || include_unpublished => Ok((story, author)),
            _ => Err(AppError::not_found("Story not found")),
        }
    }

    pub async fn create(&self, author_id: i32, input: NewStory) -> AppResult<StoryWithAuthor> {
        let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
        if slug_exists::<Story, _>(&self.db, story::Column::Slug, &slug).await? {
            return Err(AppError::Validation(SLUG_TAKEN.to_string()));
        }

        let now = chrono::Utc::now().naive_utc();
        let new_story = story::ActiveModel {
            title: Set(input.title),
            slug: Set(slug.clone()),
            excerpt: Set(input.excerpt),
            content: Set(input.content),
            story_type: Set(input.story_type),
            media_url: Set(input.media_url),
            thumbnail_url: Set(input.thumbnail_url),
            author_id: Set(author_id),
            published: Set(input.published),
            featured: Set(input.featured),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        new_story
            .insert(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, SLUG_TAKEN))?;

        tracing::info!(story = %slug, author_id, "Story created");
        self.get_by_slug(&slug, true).await
    }

    pub async fn update(&self, slug: &str, changes: StoryChanges) -> AppResult<StoryWithAuthor> {
        let (existing, _) = self.get_by_slug(slug, true).await?;

        if let Some(new_slug) = changes.slug.as_deref() {
            check_slug(new_slug)?;
            if new_slug != existing.slug
                && slug_exists::<Story, _>(&self.db, story::Column::Slug, new_slug).await?
            {
                return Err(AppError::Validation(SLUG_TAKEN.to_string()));
            }
        }

        let mut active: story::ActiveModel = existing.into();
        set_if_some(&mut active.title, changes.title);
        set_if_some(&mut active.slug, changes.slug);
        set_nullable_text(&mut active.excerpt, changes.excerpt);
        set_if_some(&mut active.content, changes.content);
        set_if_some(&mut active.story_type, changes.story_type);
        set_nullable_text(&mut active.media_url, changes.media_url);
        set_nullable_text(&mut active.thumbnail_url, changes.thumbnail_url);
        set_if_some(&mut active.published, changes.published);
        set_if_some(&mut active.featured, changes.featured);
        active.updated_at = Set(chrono::Utc::now().naive_utc());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, SLUG_TAKEN))?;

        self.get_by_slug(&updated.slug, true).await
    }

    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        let (existing, _) = self.get_by_slug(slug, true).await?;
        Story::delete_by_id(existing.id).exec(&self.db).await?;
        tracing::info!(story = %existing.slug, "Story deleted");
        Ok(())
    }
}
