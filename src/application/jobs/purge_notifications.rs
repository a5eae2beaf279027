//! Cron job deleting read notifications that have aged out.

use std::sync::Arc;

use apalis::prelude::*;
use apalis_cron::Schedule;
use std::str::FromStr;

use crate::application::notifications::NotificationService;

/// Marker struct for the cron-triggered purge job.
/// Must implement `From<chrono::DateTime<chrono::Utc>>` for apalis-cron compatibility.
#[derive(Default, Debug, Clone)]
pub struct PurgeNotificationsJob;

impl From<chrono::DateTime<chrono::Utc>> for PurgeNotificationsJob {
    fn from(_: chrono::DateTime<chrono::Utc>) -> Self {
        Self
    }
}

/// Context for the purge job worker.
#[derive(Clone)]
pub struct PurgeNotificationsContext {
    pub notifications: Arc<NotificationService>,
}

/// Process the purge job: delete read notifications past the retention
/// window.
pub async fn process_purge_notifications_job(
    _job: PurgeNotificationsJob,
    ctx: Data<PurgeNotificationsContext>,
) -> Result<(), apalis::prelude::Error> {
    match ctx.notifications.purge_read().await {
        Ok(count) if count > 0 => {
            tracing::info!(purged_count = count, "Purged read notifications");
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to purge read notifications");
        }
        _ => {}
    }
    Ok(())
}

/// Create the cron schedule for notification cleanup.
/// Runs daily at midnight UTC: "0 0 0 * * *"
pub fn purge_notifications_schedule() -> Schedule {
    Schedule::from_str("0 0 0 * * *").expect("Invalid cron expression for purge_notifications")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_parses_correctly() {
        let schedule = purge_notifications_schedule();
        // Should have upcoming times
        let upcoming: Vec<_> = schedule.upcoming(chrono::Utc).take(3).collect();
        assert_eq!(upcoming.len(), 3);
    }
}
