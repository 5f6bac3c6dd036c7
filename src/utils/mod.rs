pub mod cookie;
pub mod html;
pub mod jwt;
pub mod password;
pub mod patch;
pub mod slug;

pub use html::sanitize_html;
pub use jwt::{generate_token, verify_token};
pub use password::{hash_password, verify_password};
pub use slug::{is_valid_slug, slugify};
