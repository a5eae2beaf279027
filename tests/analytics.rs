//! Dashboard series assembled from creation timestamps in the repositories.

mod common;

use std::sync::Arc;

use time::macros::format_description;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use aula::application::analytics::AnalyticsService;
use aula::application::repos::{CoursesRepo, OrdersRepo, UsersRepo};
use aula::domain::entities::OrderRecord;
use aula::domain::types::UserRole;

use common::{MemoryCoursesRepo, MemoryOrdersRepo, MemoryUsersRepo};

fn service() -> (
    AnalyticsService,
    Arc<MemoryUsersRepo>,
    Arc<MemoryCoursesRepo>,
    Arc<MemoryOrdersRepo>,
) {
    let users = Arc::new(MemoryUsersRepo::default());
    let courses = Arc::new(MemoryCoursesRepo::default());
    let orders = Arc::new(MemoryOrdersRepo::default());
    let users_repo: Arc<dyn UsersRepo> = users.clone();
    let courses_repo: Arc<dyn CoursesRepo> = courses.clone();
    let orders_repo: Arc<dyn OrdersRepo> = orders.clone();
    (
        AnalyticsService::new(users_repo, courses_repo, orders_repo),
        users,
        courses,
        orders,
    )
}

async fn seed_user_created_at(users: &MemoryUsersRepo, created_at: OffsetDateTime) {
    let mut user = common::user_record(
        "Ada Lovelace",
        "ada@example.test",
        UserRole::Member,
        Vec::new(),
    );
    user.created_at = created_at;
    users.insert(user).await;
}

#[tokio::test]
async fn counts_land_in_their_windows() {
    let (analytics, users, _courses, _orders) = service();
    let now = OffsetDateTime::now_utc();

    seed_user_created_at(&users, now).await;
    seed_user_created_at(&users, now - Duration::days(30)).await;
    seed_user_created_at(&users, now - Duration::days(400)).await;

    let series = analytics.users_series().await.expect("series");
    let buckets = &series.last_12_months;
    assert_eq!(buckets.len(), 12);

    // today lands in the newest window, thirty days ago in the one before
    assert_eq!(buckets[11].count, 1);
    assert_eq!(buckets[10].count, 1);

    // the 400-day-old signup is outside the twelve windows entirely
    let total: i64 = buckets.iter().map(|bucket| bucket.count).sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn each_subject_counts_its_own_records() {
    let (analytics, users, courses, orders) = service();
    let now = OffsetDateTime::now_utc();

    seed_user_created_at(&users, now).await;
    courses
        .create_course(&common::course_document("Systems Programming"))
        .await
        .expect("seed course");
    orders
        .insert(OrderRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            payment: None,
            created_at: now,
        })
        .await;

    for series in [
        analytics.users_series().await.expect("users series"),
        analytics.courses_series().await.expect("courses series"),
        analytics.orders_series().await.expect("orders series"),
    ] {
        assert_eq!(series.last_12_months.len(), 12);
        assert_eq!(series.last_12_months[11].count, 1);
        let total: i64 = series.last_12_months.iter().map(|bucket| bucket.count).sum();
        assert_eq!(total, 1);
    }
}

#[tokio::test]
async fn buckets_are_labeled_by_window_end() {
    let (analytics, _users, _courses, _orders) = service();

    let series = analytics.users_series().await.expect("series");
    let buckets = &series.last_12_months;

    let tomorrow = OffsetDateTime::now_utc()
        .date()
        .next_day()
        .expect("calendar");
    let expected = tomorrow
        .format(format_description!(
            "[day padding:none] [month repr:short] [year]"
        ))
        .expect("label format");
    assert_eq!(buckets[11].month, expected);

    // every window carries its own label
    let mut labels: Vec<&str> = buckets.iter().map(|bucket| bucket.month.as_str()).collect();
    labels.dedup();
    assert_eq!(labels.len(), 12);
}
