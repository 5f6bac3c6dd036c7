use crate::error::{AppError, AppResult};
use crate::models::{
    event, event_rsvp, Event, EventModel, EventRsvp, EventRsvpModel, TaggedEntity, User,
    UserModel,
};
use crate::services::query::{
    check_slug, map_unique_violation, resolve_slug, search_condition, slug_exists,
};
use crate::services::tag::{
    entity_ids_with_tag, remove_entity_tags, set_entity_tags, tags_for_entities,
    validate_tag_ids, TagSummary,
};
use crate::utils::patch::{set_if_some, set_nullable_text};
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

const SLUG_TAKEN: &str = "An event with this slug already exists";

#[derive(Debug, Default)]
pub struct EventFilter {
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub search: Option<String>,
    pub tag: Option<String>,
    /// Only events on or after this date.
    pub from_date: Option<NaiveDate>,
}

#[derive(Debug)]
pub struct NewEvent {
    pub title: String,
    pub slug: Option<String>,
    pub description: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub location: String,
    pub image_url: Option<String>,
    pub max_attendees: Option<i32>,
    pub organizer_id: Option<i32>,
    pub published: bool,
    pub featured: bool,
    pub tags: Vec<i32>,
}

#[derive(Debug, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    /// `Some(None)` removes the attendee cap.
    pub max_attendees: Option<Option<i32>>,
    pub organizer_id: Option<i32>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub tags: Option<Vec<i32>>,
}

#[derive(Debug)]
pub struct EventDetails {
    pub event: EventModel,
    pub organizer: Option<UserModel>,
    pub tags: Vec<TagSummary>,
    pub rsvp_count: u64,
}

#[derive(Debug, FromQueryResult)]
struct RsvpCount {
    event_id: i32,
    count: i64,
}

pub struct EventService {
    db: DatabaseConnection,
}

impl EventService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Soonest first.
    pub async fn list(
        &self,
        filter: EventFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<(Vec<EventDetails>, u64)> {
        let mut query = Event::find();
        if let Some(featured) = filter.featured {
            query = query.filter(event::Column::Featured.eq(featured));
        }
        if let Some(published) = filter.published {
            query = query.filter(event::Column::Published.eq(published));
        }
        if let Some(from) = filter.from_date {
            query = query.filter(event::Column::Date.gte(from));
        }
        if let Some(term) = filter.search.as_deref() {
            query = query.filter(search_condition(
                &[
                    event::Column::Title,
                    event::Column::Description,
                    event::Column::Location,
                ],
                term,
            ));
        }
        if let Some(tag) = filter.tag.as_deref() {
            let ids = entity_ids_with_tag(&self.db, TaggedEntity::Event, tag).await?;
            query = query.filter(event::Column::Id.is_in(ids));
        }

        let paginator = query
            .order_by_asc(event::Column::Date)
            .order_by_asc(event::Column::Id)
            .find_also_related(User)
            .paginate(&self.db, limit);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        let ids: Vec<i32> = rows.iter().map(|(e, _)| e.id).collect();
        let mut tags = tags_for_entities(&self.db, TaggedEntity::Event, &ids).await?;
        let counts = rsvp_counts(&self.db, &ids).await?;

        let items = rows
            .into_iter()
            .map(|(event, organizer)| EventDetails {
                tags: tags.remove(&event.id).unwrap_or_default(),
                rsvp_count: counts.get(&event.id).copied().unwrap_or(0),
                event,
                organizer,
            })
            .collect();

        Ok((items, total))
    }

    pub async fn get_by_slug(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> AppResult<EventDetails> {
        let found = Event::find()
            .filter(event::Column::Slug.eq(slug))
            .find_also_related(User)
            .one(&self.db)
            .await?;

        let (event, organizer) = match found {
            Some((event, organizer)) if event.published || include_unpublished => {
                (event, organizer)
            }
            _ => return Err(AppError::not_found("Event not found")),
        };

        let tags = tags_for_entities(&self.db, TaggedEntity::Event, &[event.id])
            .await?
            .remove(&event.id)
            .unwrap_or_default();
        let rsvp_count = rsvp_counts(&self.db, &[event.id])
            .await?
            .get(&event.id)
            .copied()
            .unwrap_or(0);

        Ok(EventDetails {
            event,
            organizer,
            tags,
            rsvp_count,
        })
    }

    /// The organizer defaults to `current_user_id`.
    pub async fn create(&self, current_user_id: i32, input: NewEvent) -> AppResult<EventDetails> {
        let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
        if slug_exists::<Event, _>(&self.db, event::Column::Slug, &slug).await? {
            return Err(AppError::Validation(SLUG_TAKEN.to_string()));
        }

        let txn = self.db.begin().await?;
        let organizer_id = match input.organizer_id {
            Some(id) => ensure_user_exists(&txn, id).await?,
            None => current_user_id,
        };
        let tag_ids = validate_tag_ids(&txn, &input.tags).await?;

        let now = chrono::Utc::now().naive_utc();
        let new_event = event::ActiveModel {
            title: Set(input.title),
            slug: Set(slug.clone()),
            description: Set(input.description),
            date: Set(input.date),
            time: Set(input.time),
            location: Set(input.location),
            image_url: Set(input.image_url),
            max_attendees: Set(input.max_attendees),
            organizer_id: Set(organizer_id),
            published: Set(input.published),
            featured: Set(input.featured),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let event = new_event
            .insert(&txn)
            .await
            .map_err(|e| map_unique_violation(e, SLUG_TAKEN))?;

        set_entity_tags(&txn, TaggedEntity::Event, event.id, &tag_ids).await?;
        txn.commit().await?;

        tracing::info!(event = %slug, organizer_id, "Event created");
        self.get_by_slug(&slug, true).await
    }

    pub async fn update(&self, slug: &str, changes: EventChanges) -> AppResult<EventDetails> {
        let existing = self.get_by_slug(slug, true).await?.event;

        if let Some(new_slug) = changes.slug.as_deref() {
            check_slug(new_slug)?;
            if new_slug != existing.slug
                && slug_exists::<Event, _>(&self.db, event::Column::Slug, new_slug).await?
            {
                return Err(AppError::Validation(SLUG_TAKEN.to_string()));
            }
        }

        let txn = self.db.begin().await?;
        if let Some(id) = changes.organizer_id {
            ensure_user_exists(&txn, id).await?;
        }
        let tag_ids = match changes.tags.as_deref() {
            Some(ids) => Some(validate_tag_ids(&txn, ids).await?),
            None => None,
        };

        let event_id = existing.id;
        let mut active: event::ActiveModel = existing.into();
        set_if_some(&mut active.title, changes.title);
        set_if_some(&mut active.slug, changes.slug);
        set_if_some(&mut active.description, changes.description);
        set_if_some(&mut active.date, changes.date);
        set_nullable_text(&mut active.time, changes.time);
        set_if_some(&mut active.location, changes.location);
        set_nullable_text(&mut active.image_url, changes.image_url);
        set_if_some(&mut active.max_attendees, changes.max_attendees);
        set_if_some(&mut active.organizer_id, changes.organizer_id);
        set_if_some(&mut active.published, changes.published);
        set_if_some(&mut active.featured, changes.featured);
        active.updated_at = Set(chrono::Utc::now().naive_utc());

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| map_unique_violation(e, SLUG_TAKEN))?;

        if let Some(tag_ids) = tag_ids {
            set_entity_tags(&txn, TaggedEntity::Event, event_id, &tag_ids).await?;
        }
        txn.commit().await?;

        self.get_by_slug(&updated.slug, true).await
    }

    /// Removes the event with its RSVPs and tag links.
    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        let existing = self.get_by_slug(slug, true).await?.event;

        let txn = self.db.begin().await?;
        EventRsvp::delete_many()
            .filter(event_rsvp::Column::EventId.eq(existing.id))
            .exec(&txn)
            .await?;
        remove_entity_tags(&txn, TaggedEntity::Event, existing.id).await?;
        Event::delete_by_id(existing.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(event = %existing.slug, "Event deleted");
        Ok(())
    }

    /// Register a visitor for a published event. Emails are compared
    /// case-insensitively.
    pub async fn rsvp(&self, slug: &str, name: &str, email: &str) -> AppResult<EventRsvpModel> {
        let email = email.trim().to_lowercase();

        let txn = self.db.begin().await?;
        let event = Event::find()
            .filter(event::Column::Slug.eq(slug))
            .filter(event::Column::Published.eq(true))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;

        let already_registered = EventRsvp::find()
            .filter(event_rsvp::Column::EventId.eq(event.id))
            .filter(event_rsvp::Column::Email.eq(email.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if already_registered {
            return Err(AppError::Validation(
                "You have already registered for this event".to_string(),
            ));
        }

        if let Some(max) = event.max_attendees {
            let registered = EventRsvp::find()
                .filter(event_rsvp::Column::EventId.eq(event.id))
                .count(&txn)
                .await?;
            if registered >= max.max(0) as u64 {
                return Err(AppError::Validation("This event is full".to_string()));
            }
        }

        let rsvp = event_rsvp::ActiveModel {
            event_id: Set(event.id),
            name: Set(name.trim().to_string()),
            email: Set(email),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            map_unique_violation(e, "You have already registered for this event")
        })?;
        txn.commit().await?;

        tracing::info!(event = %event.slug, "RSVP recorded");
        Ok(rsvp)
    }

    /// Registrations of an event, drafts included, oldest first.
    pub async fn list_rsvps(&self, slug: &str) -> AppResult<Vec<EventRsvpModel>> {
        let event = self.get_by_slug(slug, true).await?.event;
        let rsvps = EventRsvp::find()
            .filter(event_rsvp::Column::EventId.eq(event.id))
            .order_by_asc(event_rsvp::Column::CreatedAt)
            .order_by_asc(event_rsvp::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rsvps)
    }
}

async fn ensure_user_exists<C>(conn: &C, user_id: i32) -> AppResult<i32>
where
    C: ConnectionTrait,
{
    match User::find_by_id(user_id).one(conn).await? {
        Some(user) => Ok(user.id),
        None => Err(AppError::Validation(format!(
            "Organizer {} does not exist",
            user_id
        ))),
    }
}

async fn rsvp_counts<C>(conn: &C, event_ids: &[i32]) -> AppResult<HashMap<i32, u64>>
where
    C: ConnectionTrait,
{
    if event_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = EventRsvp::find()
        .select_only()
        .column(event_rsvp::Column::EventId)
        .column_as(Expr::col(event_rsvp::Column::Id).count(), "count")
        .filter(event_rsvp::Column::EventId.is_in(event_ids.to_vec()))
        .group_by(event_rsvp::Column::EventId)
        .into_model::<RsvpCount>()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.event_id, r.count.max(0) as u64))
        .collect())
}
