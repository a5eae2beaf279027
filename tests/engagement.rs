//! Q&A and review flows exercised directly against the service layer.

mod common;

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use aula::application::engagement::{
    AddAnswerCommand, AddQuestionCommand, AddReviewCommand, AddReviewReplyCommand,
    EngagementService,
};
use aula::application::error::AppError;
use aula::application::mailer::Mailer;
use aula::application::repos::{CoursesRepo, NotificationsRepo};
use aula::domain::courses::{Question, Review, UserRef};
use aula::domain::error::DomainError;
use aula::domain::types::UserRole;

use common::{MemoryCoursesRepo, MemoryNotificationsRepo, RecordingMailer};

struct Harness {
    service: EngagementService,
    courses: Arc<MemoryCoursesRepo>,
    notifications: Arc<MemoryNotificationsRepo>,
    mailer: Arc<RecordingMailer>,
}

fn harness() -> Harness {
    let courses = Arc::new(MemoryCoursesRepo::default());
    let notifications = Arc::new(MemoryNotificationsRepo::default());
    let mailer = Arc::new(RecordingMailer::default());

    let courses_repo: Arc<dyn CoursesRepo> = courses.clone();
    let notifications_repo: Arc<dyn NotificationsRepo> = notifications.clone();
    let mailer_port: Arc<dyn Mailer> = mailer.clone();

    Harness {
        service: EngagementService::new(courses_repo, notifications_repo, mailer_port),
        courses,
        notifications,
        mailer,
    }
}

#[tokio::test]
async fn question_lands_in_the_lecture_and_notifies_the_asker() {
    let h = harness();
    let course = common::course_document("Systems Programming");
    h.courses.create_course(&course).await.unwrap();
    let asker = common::user_record(
        "Ada Lovelace",
        "ada@example.test",
        UserRole::Member,
        vec![course.id],
    );
    let principal = common::principal_for(&asker);

    let updated = h
        .service
        .add_question(
            &principal,
            AddQuestionCommand {
                course_id: course.id,
                content_id: course.course_data[0].id.to_string(),
                question: "Why does this segfault?".to_string(),
            },
        )
        .await
        .expect("question should be accepted");

    let questions = &updated.course_data[0].questions;
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question, "Why does this segfault?");
    assert_eq!(questions[0].author.id, asker.id);

    // recipient is the acting user, not a course owner
    let notifications = h.notifications.all().await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].user_id, asker.id);
    assert_eq!(notifications[0].title, "New Question Received");
    assert_eq!(
        notifications[0].message,
        "You have a new question in Lesson 1"
    );
}

#[tokio::test]
async fn questions_require_enrollment() {
    let h = harness();
    let course = common::course_document("Systems Programming");
    h.courses.create_course(&course).await.unwrap();
    let outsider = common::user_record(
        "Linus Torvalds",
        "linus@example.test",
        UserRole::Member,
        Vec::new(),
    );

    let err = h
        .service
        .add_question(
            &common::principal_for(&outsider),
            AddQuestionCommand {
                course_id: course.id,
                content_id: course.course_data[0].id.to_string(),
                question: "Can I peek?".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Domain(DomainError::Unauthorized { .. })
    ));
    assert_eq!(
        err.to_string(),
        "You are not authorized to access this course"
    );

    let stored = h.courses.find_course(course.id).await.unwrap().unwrap();
    assert!(stored.course_data[0].questions.is_empty());
    assert!(h.notifications.all().await.is_empty());
}

#[tokio::test]
async fn questions_reject_malformed_content_ids() {
    let h = harness();
    let course = common::course_document("Systems Programming");
    h.courses.create_course(&course).await.unwrap();
    let asker = common::user_record(
        "Ada Lovelace",
        "ada@example.test",
        UserRole::Member,
        vec![course.id],
    );

    let err = h
        .service
        .add_question(
            &common::principal_for(&asker),
            AddQuestionCommand {
                course_id: course.id,
                content_id: "lesson-one".to_string(),
                question: "Hm?".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Domain(DomainError::Validation { .. })
    ));
    assert_eq!(err.to_string(), "Invalid content id");
}

#[tokio::test]
async fn questions_reject_content_ids_from_other_courses() {
    let h = harness();
    let course = common::course_document("Systems Programming");
    let other = common::course_document("Databases");
    h.courses.create_course(&course).await.unwrap();
    h.courses.create_course(&other).await.unwrap();
    let asker = common::user_record(
        "Ada Lovelace",
        "ada@example.test",
        UserRole::Member,
        vec![course.id],
    );

    let err = h
        .service
        .add_question(
            &common::principal_for(&asker),
            AddQuestionCommand {
                course_id: course.id,
                content_id: other.course_data[0].id.to_string(),
                question: "Wrong door?".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Course content not found");
}

#[tokio::test]
async fn answering_someone_elses_question_notifies_the_actor() {
    let h = harness();
    let mut course = common::course_document("Systems Programming");
    let asker = common::user_record(
        "Ada Lovelace",
        "ada@example.test",
        UserRole::Member,
        vec![course.id],
    );
    course.course_data[0].questions.push(Question::new(
        UserRef {
            id: asker.id,
            name: asker.name.clone(),
        },
        "Why does this segfault?",
        OffsetDateTime::now_utc(),
    ));
    let question_id = course.course_data[0].questions[0].id;
    h.courses.create_course(&course).await.unwrap();

    let answerer = common::user_record(
        "Grace Hopper",
        "grace@example.test",
        UserRole::Member,
        vec![course.id],
    );

    let updated = h
        .service
        .add_answer(
            &common::principal_for(&answerer),
            AddAnswerCommand {
                course_id: course.id,
                content_id: course.course_data[0].id.to_string(),
                question_id,
                answer: "You freed it twice.".to_string(),
            },
        )
        .await
        .expect("answer should be accepted");

    let replies = &updated.course_data[0].questions[0].replies;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].author.id, answerer.id);

    let notifications = h.notifications.all().await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].user_id, answerer.id);
    assert_eq!(notifications[0].title, "New Question Reply Received");
    assert!(h.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn answering_your_own_question_sends_mail_instead() {
    let h = harness();
    let mut course = common::course_document("Systems Programming");
    let asker = common::user_record(
        "Ada Lovelace",
        "ada@example.test",
        UserRole::Member,
        vec![course.id],
    );
    course.course_data[0].questions.push(Question::new(
        UserRef {
            id: asker.id,
            name: asker.name.clone(),
        },
        "Why does this segfault?",
        OffsetDateTime::now_utc(),
    ));
    let question_id = course.course_data[0].questions[0].id;
    h.courses.create_course(&course).await.unwrap();

    h.service
        .add_answer(
            &common::principal_for(&asker),
            AddAnswerCommand {
                course_id: course.id,
                content_id: course.course_data[0].id.to_string(),
                question_id,
                answer: "Solved it myself.".to_string(),
            },
        )
        .await
        .expect("answer should be accepted");

    let sent = h.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.test");
    assert_eq!(sent[0].subject, "Question reply");
    assert!(sent[0].html.contains("Lesson 1"));
    assert!(h.notifications.all().await.is_empty());
}

#[tokio::test]
async fn answers_skip_the_enrollment_gate() {
    let h = harness();
    let mut course = common::course_document("Systems Programming");
    let asker = common::user_record(
        "Ada Lovelace",
        "ada@example.test",
        UserRole::Member,
        vec![course.id],
    );
    course.course_data[0].questions.push(Question::new(
        UserRef {
            id: asker.id,
            name: asker.name.clone(),
        },
        "Anyone?",
        OffsetDateTime::now_utc(),
    ));
    let question_id = course.course_data[0].questions[0].id;
    h.courses.create_course(&course).await.unwrap();

    let outsider = common::user_record(
        "Linus Torvalds",
        "linus@example.test",
        UserRole::Member,
        Vec::new(),
    );

    let updated = h
        .service
        .add_answer(
            &common::principal_for(&outsider),
            AddAnswerCommand {
                course_id: course.id,
                content_id: course.course_data[0].id.to_string(),
                question_id,
                answer: "Drive-by answer.".to_string(),
            },
        )
        .await
        .expect("answers are open to any session");

    assert_eq!(updated.course_data[0].questions[0].replies.len(), 1);
}

#[tokio::test]
async fn reviews_update_the_rating_mean_without_persisting_a_notification() {
    let h = harness();
    let course = common::course_document("Systems Programming");
    h.courses.create_course(&course).await.unwrap();
    let ada = common::user_record(
        "Ada Lovelace",
        "ada@example.test",
        UserRole::Member,
        vec![course.id],
    );
    let grace = common::user_record(
        "Grace Hopper",
        "grace@example.test",
        UserRole::Member,
        vec![course.id],
    );

    h.service
        .add_review(
            &common::principal_for(&ada),
            AddReviewCommand {
                course_id: course.id,
                review: "Solid".to_string(),
                rating: 5.0,
            },
        )
        .await
        .expect("review should be accepted");
    let updated = h
        .service
        .add_review(
            &common::principal_for(&grace),
            AddReviewCommand {
                course_id: course.id,
                review: "Okay".to_string(),
                rating: 2.0,
            },
        )
        .await
        .expect("review should be accepted");

    assert_eq!(updated.reviews.len(), 2);
    assert!((updated.ratings - 3.5).abs() < 1e-9);

    // the review notification is drafted and dropped
    assert!(h.notifications.all().await.is_empty());
    assert!(h.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn reviews_require_enrollment() {
    let h = harness();
    let course = common::course_document("Systems Programming");
    h.courses.create_course(&course).await.unwrap();
    // the admin role does not bypass the enrollment gate
    let outsider = common::user_record(
        "Linus Torvalds",
        "linus@example.test",
        UserRole::Admin,
        Vec::new(),
    );

    let err = h
        .service
        .add_review(
            &common::principal_for(&outsider),
            AddReviewCommand {
                course_id: course.id,
                review: "One star".to_string(),
                rating: 1.0,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Domain(DomainError::Unauthorized { .. })
    ));
}

#[tokio::test]
async fn review_replies_append_without_side_effects() {
    let h = harness();
    let mut course = common::course_document("Systems Programming");
    let ada = common::user_record(
        "Ada Lovelace",
        "ada@example.test",
        UserRole::Member,
        vec![course.id],
    );
    course.reviews.push(Review::new(
        UserRef {
            id: ada.id,
            name: ada.name.clone(),
        },
        "Solid",
        5.0,
        OffsetDateTime::now_utc(),
    ));
    let review_id = course.reviews[0].id;
    h.courses.create_course(&course).await.unwrap();

    let admin = common::user_record(
        "Grace Hopper",
        "grace@example.test",
        UserRole::Admin,
        Vec::new(),
    );

    let updated = h
        .service
        .add_review_reply(
            &common::principal_for(&admin),
            AddReviewReplyCommand {
                course_id: course.id,
                review_id,
                comment: "Thanks for the feedback.".to_string(),
            },
        )
        .await
        .expect("reply should be accepted");

    assert_eq!(updated.reviews[0].replies.len(), 1);
    assert_eq!(updated.reviews[0].replies[0].comment, "Thanks for the feedback.");
    assert!(h.notifications.all().await.is_empty());
    assert!(h.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn review_replies_reject_unknown_reviews() {
    let h = harness();
    let course = common::course_document("Systems Programming");
    h.courses.create_course(&course).await.unwrap();
    let admin = common::user_record(
        "Grace Hopper",
        "grace@example.test",
        UserRole::Admin,
        Vec::new(),
    );

    let err = h
        .service
        .add_review_reply(
            &common::principal_for(&admin),
            AddReviewReplyCommand {
                course_id: course.id,
                review_id: Uuid::new_v4(),
                comment: "Into the void.".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Review not found");
}
