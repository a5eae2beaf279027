//! Application services layer scaffolding.

pub mod analytics;
pub mod catalog;
pub mod engagement;
pub mod error;
pub mod jobs;
pub mod mailer;
pub mod notifications;
pub mod orders;
pub mod repos;
pub mod sessions;
