//! Catalog reads against the payload cache: staleness, eviction, and the
//! public projection shape.

mod common;

use std::sync::Arc;

use time::macros::datetime;
use uuid::Uuid;

use aula::application::catalog::{CatalogService, UpsertCourseCommand};
use aula::application::repos::CoursesRepo;
use aula::cache::{CacheConfig, CourseCache};

use common::MemoryCoursesRepo;

fn service_with(config: CacheConfig) -> (CatalogService, Arc<MemoryCoursesRepo>, Arc<CourseCache>) {
    let courses = Arc::new(MemoryCoursesRepo::default());
    let cache = Arc::new(CourseCache::new(&config));
    let courses_repo: Arc<dyn CoursesRepo> = courses.clone();
    (
        CatalogService::new(courses_repo, cache.clone()),
        courses,
        cache,
    )
}

fn service() -> (CatalogService, Arc<MemoryCoursesRepo>, Arc<CourseCache>) {
    service_with(CacheConfig::default())
}

fn rename_command(name: &str) -> UpsertCourseCommand {
    UpsertCourseCommand {
        name: name.to_string(),
        description: "Pointers and pain".to_string(),
        price: 49.0,
        thumbnail: None,
        contents: Vec::new(),
    }
}

#[tokio::test]
async fn single_course_payload_survives_edits_until_evicted() {
    let (catalog, _courses, cache) = service();
    let created = catalog
        .create_course(rename_command("Systems Programming"))
        .await
        .expect("create should succeed");
    let id = created.id;

    let first = catalog.single_course(id).await.expect("read should hit");
    assert_eq!(first["name"], "Systems Programming");

    catalog
        .edit_course(id, rename_command("Renamed"))
        .await
        .expect("edit should succeed");

    // the cached payload still serves the old name
    let stale = catalog.single_course(id).await.expect("read should hit");
    assert_eq!(stale["name"], "Systems Programming");

    cache.evict_course(id);
    let fresh = catalog.single_course(id).await.expect("read should hit");
    assert_eq!(fresh["name"], "Renamed");
}

#[tokio::test]
async fn catalog_listing_is_pinned_after_the_first_read() {
    let (catalog, courses, _cache) = service();
    courses
        .create_course(&common::course_document("Systems Programming"))
        .await
        .expect("seed should succeed");

    let first = catalog.all_courses().await.expect("list should succeed");
    assert_eq!(first.as_array().map(Vec::len), Some(1));

    courses
        .create_course(&common::course_document("Databases"))
        .await
        .expect("seed should succeed");

    // the new course is invisible until the catalog payload goes away
    let second = catalog.all_courses().await.expect("list should succeed");
    assert_eq!(second.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn deleting_a_course_evicts_its_payload_but_not_the_catalog() {
    let (catalog, _courses, _cache) = service();
    let created = catalog
        .create_course(rename_command("Systems Programming"))
        .await
        .expect("create should succeed");

    // prime both payloads
    catalog
        .single_course(created.id)
        .await
        .expect("read should hit");
    let listed = catalog.all_courses().await.expect("list should succeed");
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    catalog
        .delete_course(created.id)
        .await
        .expect("delete should succeed");

    // without the eviction this read would still serve the cached payload
    let err = catalog.single_course(created.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Course not found");

    let listed = catalog.all_courses().await.expect("list should succeed");
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn disabled_cache_reads_through_every_time() {
    let (catalog, _courses, _cache) = service_with(CacheConfig {
        enabled: false,
        ..CacheConfig::default()
    });
    let created = catalog
        .create_course(rename_command("Systems Programming"))
        .await
        .expect("create should succeed");

    let first = catalog
        .single_course(created.id)
        .await
        .expect("read should hit");
    assert_eq!(first["name"], "Systems Programming");

    catalog
        .edit_course(created.id, rename_command("Renamed"))
        .await
        .expect("edit should succeed");

    let fresh = catalog
        .single_course(created.id)
        .await
        .expect("read should hit");
    assert_eq!(fresh["name"], "Renamed");
}

#[tokio::test]
async fn zero_ttl_payloads_expire_on_the_next_read() {
    let (catalog, _courses, _cache) = service_with(CacheConfig {
        course_ttl_seconds: 0,
        ..CacheConfig::default()
    });
    let created = catalog
        .create_course(rename_command("Systems Programming"))
        .await
        .expect("create should succeed");

    catalog
        .single_course(created.id)
        .await
        .expect("read should hit");
    catalog
        .edit_course(created.id, rename_command("Renamed"))
        .await
        .expect("edit should succeed");

    let fresh = catalog
        .single_course(created.id)
        .await
        .expect("read should hit");
    assert_eq!(fresh["name"], "Renamed");
}

#[test]
fn preview_projection_snapshot() {
    let mut course = common::course_document("Systems Programming");
    course.id = Uuid::from_u128(0xaa);
    course.course_data[0].id = Uuid::from_u128(0xbb);
    course.created_at = datetime!(2026-01-10 09:00 UTC);
    course.updated_at = datetime!(2026-01-10 09:00 UTC);

    let payload =
        serde_json::to_string_pretty(&course.preview()).expect("preview should serialize");
    insta::assert_snapshot!(payload, @r###"
    {
      "id": "00000000-0000-0000-0000-0000000000aa",
      "name": "Systems Programming",
      "description": "Pointers and pain",
      "price": 49.0,
      "thumbnail": null,
      "ratings": 0.0,
      "course_data": [
        {
          "id": "00000000-0000-0000-0000-0000000000bb",
          "title": "Lesson 1",
          "description": "Intro",
          "video_length_minutes": 12
        }
      ],
      "reviews": [],
      "created_at": "2026-01-10T09:00:00Z",
      "updated_at": "2026-01-10T09:00:00Z"
    }
    "###);
}
