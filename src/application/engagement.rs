//! Per-lecture Q&A and course reviews, with their notification and mail
//! side effects.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::mailer::{MailMessage, Mailer, QuestionReplyMail, render_mail};
use crate::application::repos::{CoursesRepo, NewNotificationParams, NotificationsRepo};
use crate::application::sessions::Principal;
use crate::domain::courses::{
    CourseDocument, Question, Reply, Review, ReviewReply, parse_content_id,
};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub struct AddQuestionCommand {
    pub course_id: Uuid,
    pub content_id: String,
    pub question: String,
}

#[derive(Debug, Clone)]
pub struct AddAnswerCommand {
    pub course_id: Uuid,
    pub content_id: String,
    pub question_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct AddReviewCommand {
    pub course_id: Uuid,
    pub review: String,
    pub rating: f64,
}

#[derive(Debug, Clone)]
pub struct AddReviewReplyCommand {
    pub course_id: Uuid,
    pub review_id: Uuid,
    pub comment: String,
}

#[derive(Clone)]
pub struct EngagementService {
    courses: Arc<dyn CoursesRepo>,
    notifications: Arc<dyn NotificationsRepo>,
    mailer: Arc<dyn Mailer>,
}

impl EngagementService {
    pub fn new(
        courses: Arc<dyn CoursesRepo>,
        notifications: Arc<dyn NotificationsRepo>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            courses,
            notifications,
            mailer,
        }
    }

    /// Appends a question to a lecture, then notifies the acting user about
    /// their own question (the notification recipient matches the observed
    /// production behavior).
    pub async fn add_question(
        &self,
        principal: &Principal,
        command: AddQuestionCommand,
    ) -> Result<CourseDocument, AppError> {
        let content_id = parse_content_id(&command.content_id)?;
        let mut course = self.fetch_course(command.course_id).await?;
        let content = course.content_mut(content_id)?;
        principal.require_enrollment(command.course_id)?;

        let question = Question::new(
            principal.user_ref(),
            command.question,
            OffsetDateTime::now_utc(),
        );
        content.questions.push(question);
        let content_title = content.title.clone();

        self.courses.save_course(&course).await?;
        self.notifications
            .create_notification(NewNotificationParams {
                user_id: principal.user_id,
                title: "New Question Received".to_owned(),
                message: format!("You have a new question in {content_title}"),
            })
            .await?;
        Ok(course)
    }

    /// Appends a reply to a question. When someone else's question is
    /// answered the acting user is notified (same recipient quirk as
    /// [`Self::add_question`]); when the author answers their own question
    /// the question-reply mail goes out to them synchronously.
    pub async fn add_answer(
        &self,
        principal: &Principal,
        command: AddAnswerCommand,
    ) -> Result<CourseDocument, AppError> {
        let content_id = parse_content_id(&command.content_id)?;
        let mut course = self.fetch_course(command.course_id).await?;
        let content_title = course.content_mut(content_id)?.title.clone();

        let question = course.question_mut(content_id, command.question_id)?;
        let author = question.author.clone();
        question.replies.push(Reply::new(
            principal.user_ref(),
            command.answer,
            OffsetDateTime::now_utc(),
        ));

        self.courses.save_course(&course).await?;

        if principal.user_id != author.id {
            self.notifications
                .create_notification(NewNotificationParams {
                    user_id: principal.user_id,
                    title: "New Question Reply Received".to_owned(),
                    message: format!("You have a new question reply in {content_title}"),
                })
                .await?;
        } else {
            let mail = QuestionReplyMail {
                name: &author.name,
                title: &content_title,
            };
            let html = render_mail(&mail, "question_reply")?;
            self.mailer
                .send(MailMessage {
                    to: principal.email.clone(),
                    subject: "Question reply".to_owned(),
                    html,
                })
                .await?;
        }
        Ok(course)
    }

    /// Appends a review and refreshes the course rating mean. The review
    /// notification is composed and then dropped; nothing is persisted or
    /// dispatched for it.
    pub async fn add_review(
        &self,
        principal: &Principal,
        command: AddReviewCommand,
    ) -> Result<CourseDocument, AppError> {
        let mut course = self.fetch_course(command.course_id).await?;
        principal.require_enrollment(command.course_id)?;

        let review = Review::new(
            principal.user_ref(),
            command.review,
            command.rating,
            OffsetDateTime::now_utc(),
        );
        course.reviews.push(review);
        course.recompute_ratings();

        self.courses.save_course(&course).await?;

        let draft_message = format!("{} has given a review in {}", principal.name, course.name);
        debug!(
            course_id = %course.id,
            title = "New Review Received",
            message = %draft_message,
            "review notification drafted but not dispatched"
        );
        Ok(course)
    }

    /// Appends a reply to a review. No side effect.
    pub async fn add_review_reply(
        &self,
        principal: &Principal,
        command: AddReviewReplyCommand,
    ) -> Result<CourseDocument, AppError> {
        let mut course = self.fetch_course(command.course_id).await?;
        let review = course.review_mut(command.review_id)?;
        review.replies.push(ReviewReply::new(
            principal.user_ref(),
            command.comment,
            OffsetDateTime::now_utc(),
        ));

        self.courses.save_course(&course).await?;
        Ok(course)
    }

    async fn fetch_course(&self, id: Uuid) -> Result<CourseDocument, AppError> {
        self.courses
            .find_course(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Course").into())
    }
}
