use crate::error::{AppError, AppResult};
use crate::models::{news_article, NewsArticle, NewsArticleModel, TaggedEntity, User, UserModel};
use crate::services::query::{
    check_slug, map_unique_violation, resolve_slug, search_condition, slug_exists,
};
use crate::services::tag::{
    entity_ids_with_tag, remove_entity_tags, set_entity_tags, tags_for_entities,
    validate_tag_ids, TagSummary,
};
use crate::utils::patch::{set_if_some, set_nullable_text};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

const SLUG_TAKEN: &str = "An article with this slug already exists";

#[derive(Debug, Default)]
pub struct NewsFilter {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub search: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug)]
pub struct NewArticle {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub tags: Vec<i32>,
}

#[derive(Debug, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub tags: Option<Vec<i32>>,
}

/// An article with its author and tags resolved.
#[derive(Debug)]
pub struct ArticleDetails {
    pub article: NewsArticleModel,
    pub author: Option<UserModel>,
    pub tags: Vec<TagSummary>,
}

pub struct NewsService {
    db: DatabaseConnection,
}

impl NewsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest first.
    pub async fn list(
        &self,
        filter: NewsFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<(Vec<ArticleDetails>, u64)> {
        let mut query = NewsArticle::find();
        if let Some(category) = filter.category {
            query = query.filter(news_article::Column::Category.eq(category));
        }
        if let Some(featured) = filter.featured {
            query = query.filter(news_article::Column::Featured.eq(featured));
        }
        if let Some(published) = filter.published {
            query = query.filter(news_article::Column::Published.eq(published));
        }
        if let Some(term) = filter.search.as_deref() {
            query = query.filter(search_condition(
                &[
                    news_article::Column::Title,
                    news_article::Column::Excerpt,
                    news_article::Column::Content,
                ],
                term,
            ));
        }
        if let Some(tag) = filter.tag.as_deref() {
            let ids = entity_ids_with_tag(&self.db, TaggedEntity::News, tag).await?;
            query = query.filter(news_article::Column::Id.is_in(ids));
        }

        let paginator = query
            .order_by_desc(news_article::Column::CreatedAt)
            .order_by_desc(news_article::Column::Id)
            .find_also_related(User)
            .paginate(&self.db, limit);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        let ids: Vec<i32> = rows.iter().map(|(a, _)| a.id).collect();
        let mut tags = tags_for_entities(&self.db, TaggedEntity::News, &ids).await?;
        let items = rows
            .into_iter()
            .map(|(article, author)| ArticleDetails {
                tags: tags.remove(&article.id).unwrap_or_default(),
                article,
                author,
            })
            .collect();

        Ok((items, total))
    }

    pub async fn get_by_slug(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> AppResult<ArticleDetails> {
        let found = NewsArticle::find()
            .filter(news_article::Column::Slug.eq(slug))
            .find_also_related(User)
            .one(&self.db)
            .await?;

        let (article, author) = match found {
            Some((article, author)) if article.published || include_unpublished => {
                (article, author)
            }
            _ => return Err(AppError::not_found("Article not found")),
        };

        let tags = tags_for_entities(&self.db, TaggedEntity::News, &[article.id])
            .await?
            .remove(&article.id)
            .unwrap_or_default();

        Ok(ArticleDetails {
            article,
            author,
            tags,
        })
    }

    pub async fn create(&self, author_id: i32, input: NewArticle) -> AppResult<ArticleDetails> {
        let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
        if slug_exists::<NewsArticle, _>(&self.db, news_article::Column::Slug, &slug).await? {
            return Err(AppError::Validation(SLUG_TAKEN.to_string()));
        }

        let txn = self.db.begin().await?;
        let tag_ids = validate_tag_ids(&txn, &input.tags).await?;

        let now = chrono::Utc::now().naive_utc();
        let new_article = news_article::ActiveModel {
            title: Set(input.title),
            slug: Set(slug.clone()),
            excerpt: Set(input.excerpt),
            content: Set(input.content),
            category: Set(input.category),
            image_url: Set(input.image_url),
            author_id: Set(author_id),
            published: Set(input.published),
            featured: Set(input.featured),
            published_at: Set(input.published.then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let article = new_article
            .insert(&txn)
            .await
            .map_err(|e| map_unique_violation(e, SLUG_TAKEN))?;

        set_entity_tags(&txn, TaggedEntity::News, article.id, &tag_ids).await?;
        txn.commit().await?;

        tracing::info!(article = %slug, author_id, "News article created");
        self.get_by_slug(&slug, true).await
    }

    pub async fn update(&self, slug: &str, changes: ArticleChanges) -> AppResult<ArticleDetails> {
        let existing = self.get_by_slug(slug, true).await?.article;

        if let Some(new_slug) = changes.slug.as_deref() {
            check_slug(new_slug)?;
            if new_slug != existing.slug
                && slug_exists::<NewsArticle, _>(&self.db, news_article::Column::Slug, new_slug)
                    .await?
            {
                return Err(AppError::Validation(SLUG_TAKEN.to_string()));
            }
        }

        let txn = self.db.begin().await?;
        let tag_ids = match changes.tags.as_deref() {
            Some(ids) => Some(validate_tag_ids(&txn, ids).await?),
            None => None,
        };

        let now = chrono::Utc::now().naive_utc();
        let first_publish = changes.published == Some(true) && existing.published_at.is_none();
        let article_id = existing.id;

        let mut active: news_article::ActiveModel = existing.into();
        set_if_some(&mut active.title, changes.title);
        set_if_some(&mut active.slug, changes.slug);
        set_nullable_text(&mut active.excerpt, changes.excerpt);
        set_if_some(&mut active.content, changes.content);
        set_if_some(&mut active.category, changes.category);
        set_nullable_text(&mut active.image_url, changes.image_url);
        set_if_some(&mut active.published, changes.published);
        set_if_some(&mut active.featured, changes.featured);
        if first_publish {
            active.published_at = Set(Some(now));
        }
        active.updated_at = Set(now);

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| map_unique_violation(e, SLUG_TAKEN))?;

        if let Some(tag_ids) = tag_ids {
            set_entity_tags(&txn, TaggedEntity::News, article_id, &tag_ids).await?;
        }
        txn.commit().await?;

        self.get_by_slug(&updated.slug, true).await
    }

    /// Removes the article and its tag links.
    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        let existing = self.get_by_slug(slug, true).await?.article;

        let txn = self.db.begin().await?;
        remove_entity_tags(&txn, TaggedEntity::News, existing.id).await?;
        NewsArticle::delete_by_id(existing.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(article = %existing.slug, "News article deleted");
        Ok(())
    }
}
