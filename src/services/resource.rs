use crate::error::{AppError, AppResult};
use crate::models::{
    resource, Resource, ResourceCategory, ResourceModel, ResourceType, TaggedEntity,
};
use crate::services::query::{
    check_slug, map_unique_violation, resolve_slug, search_condition, slug_exists,
};
use crate::services::tag::{
    entity_ids_with_tag, remove_entity_tags, set_entity_tags, tags_for_entities,
    validate_tag_ids, TagSummary,
};
use crate::utils::patch::{set_if_some, set_nullable_text};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

const SLUG_TAKEN: &str = "A resource with this slug already exists";

#[derive(Debug, Default)]
pub struct ResourceFilter {
    pub category: Option<ResourceCategory>,
    pub resource_type: Option<ResourceType>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub search: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug)]
pub struct NewResource {
    pub title: String,
    pub slug: Option<String>,
    pub description: String,
    pub category: ResourceCategory,
    pub resource_type: ResourceType,
    pub file_url: Option<String>,
    pub url: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub tags: Vec<i32>,
}

#[derive(Debug, Default)]
pub struct ResourceChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category: Option<ResourceCategory>,
    pub resource_type: Option<ResourceType>,
    pub file_url: Option<String>,
    pub url: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub tags: Option<Vec<i32>>,
}

#[derive(Debug)]
pub struct ResourceDetails {
    pub resource: ResourceModel,
    pub tags: Vec<TagSummary>,
}

/// Link resources point somewhere else and must carry that address.
fn check_link_url(resource_type: ResourceType, url: Option<&str>) -> AppResult<()> {
    if resource_type == ResourceType::Link && url.map_or(true, |u| u.trim().is_empty()) {
        return Err(AppError::Validation(
            "URL is required for LINK resources".to_string(),
        ));
    }
    Ok(())
}

pub struct ResourceService {
    db: DatabaseConnection,
}

impl ResourceService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest first.
    pub async fn list(
        &self,
        filter: ResourceFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<(Vec<ResourceDetails>, u64)> {
        let mut query = Resource::find();
        if let Some(category) = filter.category {
            query = query.filter(resource::Column::Category.eq(category));
        }
        if let Some(kind) = filter.resource_type {
            query = query.filter(resource::Column::ResourceType.eq(kind));
        }
        if let Some(featured) = filter.featured {
            query = query.filter(resource::Column::Featured.eq(featured));
        }
        if let Some(published) = filter.published {
            query = query.filter(resource::Column::Published.eq(published));
        }
        if let Some(term) = filter.search.as_deref() {
            query = query.filter(search_condition(
                &[resource::Column::Title, resource::Column::Description],
                term,
            ));
        }
        if let Some(tag) = filter.tag.as_deref() {
            let ids = entity_ids_with_tag(&self.db, TaggedEntity::Resource, tag).await?;
            query = query.filter(resource::Column::Id.is_in(ids));
        }

        let paginator = query
            .order_by_desc(resource::Column::CreatedAt)
            .order_by_desc(resource::Column::Id)
            .paginate(&self.db, limit);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut tags = tags_for_entities(&self.db, TaggedEntity::Resource, &ids).await?;
        let items = rows
            .into_iter()
            .map(|resource| ResourceDetails {
                tags: tags.remove(&resource.id).unwrap_or_default(),
                resource,
            })
            .collect();

        Ok((items, total))
    }

    pub async fn get_by_slug(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> AppResult<ResourceDetails> {
        let resource = self.find_visible(slug, include_unpublished).await?;
        let tags = tags_for_entities(&self.db, TaggedEntity::Resource, &[resource.id])
            .await?
            .remove(&resource.id)
            .unwrap_or_default();
        Ok(ResourceDetails { resource, tags })
    }

    async fn find_visible(&self, slug: &str, include_unpublished: bool) -> AppResult<ResourceModel> {
        match Resource::find()
            .filter(resource::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
        {
            Some(r) if r.published || include_unpublished => Ok(r),
            _ => Err(AppError::not_found("Resource not found")),
        }
    }

    pub async fn create(&self, created_by: i32, input: NewResource) -> AppResult<ResourceDetails> {
        check_link_url(input.resource_type, input.url.as_deref())?;
        let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
        if slug_exists::<Resource, _>(&self.db, resource::Column::Slug, &slug).await? {
            return Err(AppError::Validation(SLUG_TAKEN.to_string()));
        }

        let txn = self.db.begin().await?;
        let tag_ids = validate_tag_ids(&txn, &input.tags).await?;

        let now = chrono::Utc::now().naive_utc();
        let new_resource = resource::ActiveModel {
            title: Set(input.title),
            slug: Set(slug.clone()),
            description: Set(input.description),
            category: Set(input.category),
            resource_type: Set(input.resource_type),
            file_url: Set(input.file_url),
            url: Set(input.url),
            downloads: Set(0),
            published: Set(input.published),
            featured: Set(input.featured),
            created_by: Set(Some(created_by)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let resource = new_resource
            .insert(&txn)
            .await
            .map_err(|e| map_unique_violation(e, SLUG_TAKEN))?;

        set_entity_tags(&txn, TaggedEntity::Resource, resource.id, &tag_ids).await?;
        txn.commit().await?;

        tracing::info!(resource = %slug, created_by, "Resource created");
        self.get_by_slug(&slug, true).await
    }

    pub async fn update(&self, slug: &str, changes: ResourceChanges) -> AppResult<ResourceDetails> {
        let existing = self.find_visible(slug, true).await?;

        if let Some(new_slug) = changes.slug.as_deref() {
            check_slug(new_slug)?;
            if new_slug != existing.slug
                && slug_exists::<Resource, _>(&self.db, resource::Column::Slug, new_slug).await?
            {
                return Err(AppError::Validation(SLUG_TAKEN.to_string()));
            }
        }

        let merged_type = changes.resource_type.unwrap_or(existing.resource_type);
        let merged_url = match changes.url.as_deref() {
            Some(url) => Some(url),
            None => existing.url.as_deref(),
        };
        check_link_url(merged_type, merged_url)?;

        let txn = self.db.begin().await?;
        let tag_ids = match changes.tags.as_deref() {
            Some(ids) => Some(validate_tag_ids(&txn, ids).await?),
            None => None,
        };

        let resource_id = existing.id;
        let mut active: resource::ActiveModel = existing.into();
        set_if_some(&mut active.title, changes.title);
        set_if_some(&mut active.slug, changes.slug);
        set_if_some(&mut active.description, changes.description);
        set_if_some(&mut active.category, changes.category);
        set_if_some(&mut active.resource_type, changes.resource_type);
        set_nullable_text(&mut active.file_url, changes.file_url);
        set_nullable_text(&mut active.url, changes.url);
        set_if_some(&mut active.published, changes.published);
        set_if_some(&mut active.featured, changes.featured);
        active.updated_at = Set(chrono::Utc::now().naive_utc());

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| map_unique_violation(e, SLUG_TAKEN))?;

        if let Some(tag_ids) = tag_ids {
            set_entity_tags(&txn, TaggedEntity::Resource, resource_id, &tag_ids).await?;
        }
        txn.commit().await?;

        self.get_by_slug(&updated.slug, true).await
    }

    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        let existing = self.find_visible(slug, true).await?;

        let txn = self.db.begin().await?;
        remove_entity_tags(&txn, TaggedEntity::Resource, existing.id).await?;
        Resource::delete_by_id(existing.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(resource = %existing.slug, "Resource deleted");
        Ok(())
    }

    /// Count one download and return the refreshed row. The counter is
    /// incremented in SQL so concurrent downloads are never lost.
    pub async fn record_download(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> AppResult<ResourceModel> {
        let existing = self.find_visible(slug, include_unpublished).await?;

        Resource::update_many()
            .col_expr(
                resource::Column::Downloads,
                Expr::col(resource::Column::Downloads).add(1),
            )
            .filter(resource::Column::Id.eq(existing.id))
            .exec(&self.db)
            .await?;

        Resource::find_by_id(existing.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Resource not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_resources_need_a_url() {
        assert!(check_link_url(ResourceType::Link, None).is_err());
        assert!(check_link_url(ResourceType::Link, Some(" ")).is_err());
        assert!(check_link_url(ResourceType::Link, Some("https://example.org")).is_ok());
        assert!(check_link_url(ResourceType::Pdf, None).is_ok());
    }
}
