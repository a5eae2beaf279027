mod purge_notifications;

pub use purge_notifications::{
    PurgeNotificationsContext, PurgeNotificationsJob, process_purge_notifications_job,
    purge_notifications_schedule,
};
