pub mod contact_message;
pub mod event;
pub mod event_rsvp;
pub mod news_article;
pub mod newsletter_subscriber;
pub mod resource;
pub mod story;
pub mod tag;
pub mod tag_link;
pub mod user;

pub use contact_message::{ContactStatus, Entity as ContactMessage, Model as ContactMessageModel};
pub use event::{Entity as Event, Model as EventModel};
pub use event_rsvp::{Entity as EventRsvp, Model as EventRsvpModel};
pub use news_article::{Entity as NewsArticle, Model as NewsArticleModel};
pub use newsletter_subscriber::{
    Entity as NewsletterSubscriber, Model as NewsletterSubscriberModel, SubscriberStatus,
};
pub use resource::{Entity as Resource, Model as ResourceModel, ResourceCategory, ResourceType};
pub use story::{Entity as Story, Model as StoryModel, StoryType};
pub use tag::{Entity as Tag, Model as TagModel};
pub use tag_link::{Entity as TagLink, TaggedEntity};
pub use user::{Entity as User, Model as UserModel, UserRole};

use crate::error::{AppError, AppResult};
use sea_orm::{ActiveEnum, Iterable};

/// Parse a wire value (case-insensitive) into one of the string-backed enums.
/// Unknown values produce a 400 listing the accepted ones.
pub fn parse_enum<E>(raw: &str, field: &str) -> AppResult<E>
where
    E: ActiveEnum<Value = String> + Iterable,
{
    E::try_from_value(&raw.trim().to_ascii_uppercase()).map_err(|_| {
        let allowed: Vec<String> = E::iter().map(|v| v.to_value()).collect();
        AppError::Validation(format!(
            "Invalid {}. Must be one of: {}",
            field,
            allowed.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_enum_is_case_insensitive() {
        let kind: StoryType = parse_enum(" video ", "type").unwrap();
        assert_eq!(kind, StoryType::Video);
        let cat: ResourceCategory = parse_enum("Education", "category").unwrap();
        assert_eq!(cat, ResourceCategory::Education);
    }

    #[test]
    fn parse_enum_lists_allowed_values() {
        let err = parse_enum::<StoryType>("podcast", "type").unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "Invalid type. Must be one of: VIDEO, AUDIO, TEXT")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn staff_roles() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Editor.is_staff());
        assert!(!UserRole::User.is_staff());
    }
}
