pub mod admin;
pub mod auth;
pub mod bootstrap_admin;
pub mod contact;
pub mod event;
pub mod news;
pub mod newsletter;
pub mod query;
pub mod resource;
pub mod seed;
pub mod story;
pub mod tag;
pub mod upload;
