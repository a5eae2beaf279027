pub mod analytics;
pub mod courses;
pub mod engagement;
pub mod notifications;
pub mod orders;
