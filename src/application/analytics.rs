//! Trailing 28-day creation counts for the admin dashboard.

use std::sync::Arc;

use time::{
    Date, Duration, OffsetDateTime, format_description::FormatItem, macros::format_description,
};

use aula_api_types::{AnalyticsSeries, MonthBucket};

use crate::application::error::AppError;
use crate::application::repos::{CoursesRepo, OrdersRepo, UsersRepo};

const WINDOW_COUNT: usize = 12;
const WINDOW_DAYS: i64 = 28;

const WINDOW_LABEL_FORMAT: &[FormatItem<'static>] =
    format_description!("[day padding:none] [month repr:short] [year]");

/// One half-open counting window `[start, end)`, labeled by its end day.
#[derive(Debug, Clone, PartialEq)]
struct AnalyticsWindow {
    start: OffsetDateTime,
    end: OffsetDateTime,
    label: String,
}

/// Twelve consecutive 28-day windows, oldest first, the last one ending
/// tomorrow (exclusive).
fn trailing_windows(today: Date) -> Result<Vec<AnalyticsWindow>, AppError> {
    let tomorrow = today
        .next_day()
        .ok_or_else(|| AppError::unexpected("calendar overflow computing analytics windows"))?;
    let mut windows = Vec::with_capacity(WINDOW_COUNT);
    for offset in (0..WINDOW_COUNT as i64).rev() {
        let end_day = tomorrow - Duration::days(offset * WINDOW_DAYS);
        let start_day = end_day - Duration::days(WINDOW_DAYS);
        let label = end_day
            .format(WINDOW_LABEL_FORMAT)
            .map_err(|err| AppError::unexpected(format!("window label format: {err}")))?;
        windows.push(AnalyticsWindow {
            start: start_day.midnight().assume_utc(),
            end: end_day.midnight().assume_utc(),
            label,
        });
    }
    Ok(windows)
}

#[derive(Debug, Clone, Copy)]
enum Subject {
    Users,
    Courses,
    Orders,
}

#[derive(Clone)]
pub struct AnalyticsService {
    users: Arc<dyn UsersRepo>,
    courses: Arc<dyn CoursesRepo>,
    orders: Arc<dyn OrdersRepo>,
}

impl AnalyticsService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        courses: Arc<dyn CoursesRepo>,
        orders: Arc<dyn OrdersRepo>,
    ) -> Self {
        Self {
            users,
            courses,
            orders,
        }
    }

    pub async fn users_series(&self) -> Result<AnalyticsSeries, AppError> {
        self.series(Subject::Users).await
    }

    pub async fn courses_series(&self) -> Result<AnalyticsSeries, AppError> {
        self.series(Subject::Courses).await
    }

    pub async fn orders_series(&self) -> Result<AnalyticsSeries, AppError> {
        self.series(Subject::Orders).await
    }

    async fn series(&self, subject: Subject) -> Result<AnalyticsSeries, AppError> {
        let mut buckets = Vec::with_capacity(WINDOW_COUNT);
        for window in trailing_windows(OffsetDateTime::now_utc().date())? {
            let count = match subject {
                Subject::Users => {
                    self.users
                        .count_users_created_between(window.start, window.end)
                        .await?
                }
                Subject::Courses => {
                    self.courses
                        .count_courses_created_between(window.start, window.end)
                        .await?
                }
                Subject::Orders => {
                    self.orders
                        .count_orders_created_between(window.start, window.end)
                        .await?
                }
            };
            buckets.push(MonthBucket {
                month: window.label,
                count,
            });
        }
        Ok(AnalyticsSeries {
            last_12_months: buckets,
        })
    }
}
