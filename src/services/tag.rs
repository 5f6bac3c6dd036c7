use crate::error::{AppError, AppResult};
use crate::models::{tag, tag_link, Tag, TagLink, TagModel, TaggedEntity};
use crate::services::query::{map_unique_violation, resolve_slug, search_condition, slug_exists};
use crate::utils::patch::set_if_some;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::{BTreeSet, HashMap};

const SLUG_TAKEN: &str = "A tag with this slug already exists";

/// Compact tag shape embedded in news, event and resource responses.
#[derive(Debug, Clone, PartialEq, serde::Serialize, utoipa::ToSchema)]
pub struct TagSummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<TagModel> for TagSummary {
    fn from(t: TagModel) -> Self {
        Self {
            id: t.id,
            name: t.name,
            slug: t.slug,
        }
    }
}

#[derive(Debug, Default)]
pub struct TagChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
}

pub struct TagService {
    db: DatabaseConnection,
}

impl TagService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All tags ordered by name, optionally filtered by name or slug.
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<TagModel>> {
        let mut query = Tag::find();
        if let Some(term) = search {
            query = query.filter(search_condition(
                &[tag::Column::Name, tag::Column::Slug],
                term,
            ));
        }
        let tags = query.order_by_asc(tag::Column::Name).all(&self.db).await?;
        Ok(tags)
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<TagModel> {
        Tag::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Tag not found"))
    }

    pub async fn create(&self, name: &str, slug: Option<&str>) -> AppResult<TagModel> {
        let name = name.trim();
        let slug = resolve_slug(slug, name)?;
        if slug_exists::<Tag, _>(&self.db, tag::Column::Slug, &slug).await? {
            return Err(AppError::Validation(SLUG_TAKEN.to_string()));
        }

        let now = chrono::Utc::now().naive_utc();
        let new_tag = tag::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug),
            usage_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        new_tag
            .insert(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, SLUG_TAKEN))
    }

    pub async fn update(&self, slug: &str, changes: TagChanges) -> AppResult<TagModel> {
        let existing = self.get_by_slug(slug).await?;

        if let Some(new_slug) = changes.slug.as_deref() {
            crate::services::query::check_slug(new_slug)?;
            if new_slug != existing.slug
                && slug_exists::<Tag, _>(&self.db, tag::Column::Slug, new_slug).await?
            {
                return Err(AppError::Validation(SLUG_TAKEN.to_string()));
            }
        }

        let mut active: tag::ActiveModel = existing.into();
        set_if_some(&mut active.name, changes.name.map(|n| n.trim().to_string()));
        set_if_some(&mut active.slug, changes.slug);
        active.updated_at = Set(chrono::Utc::now().naive_utc());

        active
            .update(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, SLUG_TAKEN))
    }

    /// Removes the tag together with every link to it.
    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        let existing = self.get_by_slug(slug).await?;

        let txn = self.db.begin().await?;
        TagLink::delete_many()
            .filter(tag_link::Column::TagId.eq(existing.id))
            .exec(&txn)
            .await?;
        Tag::delete_by_id(existing.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(tag = %existing.slug, "Tag deleted");
        Ok(())
    }
}

/// Fails with 400 when any id does not reference a tag. Returns the ids
/// deduplicated.
pub async fn validate_tag_ids<C>(conn: &C, ids: &[i32]) -> AppResult<Vec<i32>>
where
    C: ConnectionTrait,
{
    let unique: Vec<i32> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    if unique.is_empty() {
        return Ok(unique);
    }

    let found: BTreeSet<i32> = Tag::find()
        .filter(tag::Column::Id.is_in(unique.clone()))
        .all(conn)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    if let Some(missing) = unique.iter().find(|id| !found.contains(id)) {
        return Err(AppError::Validation(format!("Tag {} does not exist", missing)));
    }
    Ok(unique)
}

/// Replace the tags attached to one entity and refresh usage counts of
/// every tag that gained or lost a link.
pub async fn set_entity_tags<C>(
    conn: &C,
    entity: TaggedEntity,
    entity_id: i32,
    tag_ids: &[i32],
) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let previous = unlink_entity(conn, entity, entity_id).await?;

    if !tag_ids.is_empty() {
        let links = tag_ids.iter().map(|&tag_id| tag_link::ActiveModel {
            tag_id: Set(tag_id),
            entity_type: Set(entity),
            entity_id: Set(entity_id),
            ..Default::default()
        });
        TagLink::insert_many(links).exec(conn).await?;
    }

    let mut affected: BTreeSet<i32> = previous.into_iter().collect();
    affected.extend(tag_ids.iter().copied());
    refresh_usage_counts(conn, &affected).await
}

/// Drop every link of a deleted entity.
pub async fn remove_entity_tags<C>(conn: &C, entity: TaggedEntity, entity_id: i32) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let previous = unlink_entity(conn, entity, entity_id).await?;
    refresh_usage_counts(conn, &previous.into_iter().collect()).await
}

async fn unlink_entity<C>(conn: &C, entity: TaggedEntity, entity_id: i32) -> AppResult<Vec<i32>>
where
    C: ConnectionTrait,
{
    let previous: Vec<i32> = TagLink::find()
        .filter(tag_link::Column::EntityType.eq(entity))
        .filter(tag_link::Column::EntityId.eq(entity_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|l| l.tag_id)
        .collect();

    if !previous.is_empty() {
        TagLink::delete_many()
            .filter(tag_link::Column::EntityType.eq(entity))
            .filter(tag_link::Column::EntityId.eq(entity_id))
            .exec(conn)
            .await?;
    }
    Ok(previous)
}

/// Link count as stored in `tags.usage_count`.
fn usage_count_value(tag_id: i32, count: u64) -> AppResult<i32> {
    i32::try_from(count).map_err(|_| {
        AppError::Internal(anyhow::anyhow!(
            "Usage count {} of tag {} does not fit the column",
            count,
            tag_id
        ))
    })
}

async fn refresh_usage_counts<C>(conn: &C, tag_ids: &BTreeSet<i32>) -> AppResult<()>
where
    C: ConnectionTrait,
{
    for &tag_id in tag_ids {
        let count = TagLink::find()
            .filter(tag_link::Column::TagId.eq(tag_id))
            .count(conn)
            .await?;
        let usage_count = usage_count_value(tag_id, count)?;
        Tag::update_many()
            .col_expr(tag::Column::UsageCount, Expr::value(usage_count))
            .filter(tag::Column::Id.eq(tag_id))
            .exec(conn)
            .await?;
    }
    Ok(())
}

/// Tags of many entities of one kind, keyed by entity id and ordered by name.
pub async fn tags_for_entities<C>(
    conn: &C,
    entity: TaggedEntity,
    entity_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<TagSummary>>>
where
    C: ConnectionTrait,
{
    let mut map: HashMap<i32, Vec<TagSummary>> = HashMap::new();
    if entity_ids.is_empty() {
        return Ok(map);
    }

    let links = TagLink::find()
        .filter(tag_link::Column::EntityType.eq(entity))
        .filter(tag_link::Column::EntityId.is_in(entity_ids.to_vec()))
        .find_also_related(Tag)
        .order_by_asc(tag::Column::Name)
        .all(conn)
        .await?;

    for (link, tag) in links {
        if let Some(tag) = tag {
            map.entry(link.entity_id)
                .or_default()
                .push(TagSummary::from(tag));
        }
    }
    Ok(map)
}

/// Ids of the entities of one kind carrying the tag with `slug`. An unknown
/// slug matches nothing.
pub async fn entity_ids_with_tag<C>(conn: &C, entity: TaggedEntity, slug: &str) -> AppResult<Vec<i32>>
where
    C: ConnectionTrait,
{
    let Some(tag) = Tag::find()
        .filter(tag::Column::Slug.eq(slug))
        .one(conn)
        .await?
    else {
        return Ok(Vec::new());
    };

    let ids = TagLink::find()
        .filter(tag_link::Column::TagId.eq(tag.id))
        .filter(tag_link::Column::EntityType.eq(entity))
        .all(conn)
        .await?
        .into_iter()
        .map(|l| l.entity_id)
        .collect();
    Ok(ids)
}
