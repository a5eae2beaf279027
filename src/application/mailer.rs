//! Outbound mail port and the templates rendered into it.

use askama::{Error as AskamaError, Template};
use async_trait::async_trait;
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description};

/// Human-readable date stamped into order confirmation mail.
pub const ORDER_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to render mail template `{template}`")]
    Render {
        template: &'static str,
        #[source]
        source: AskamaError,
    },
    #[error("mail relay rejected the message: {0}")]
    Relay(String),
    #[error("mail transport error: {0}")]
    Transport(String),
}

impl MailError {
    pub fn from_transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// A fully rendered message ready for the relay.
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

#[derive(Template)]
#[template(path = "mail/question_reply.html")]
pub struct QuestionReplyMail<'a> {
    pub name: &'a str,
    pub title: &'a str,
}

#[derive(Template)]
#[template(path = "mail/order_confirmation.html")]
pub struct OrderConfirmationMail<'a> {
    pub order_ref: &'a str,
    pub course_name: &'a str,
    pub price: f64,
    pub ordered_on: &'a str,
}

pub fn render_mail<T: Template>(template: &T, name: &'static str) -> Result<String, MailError> {
    template.render().map_err(|err| MailError::Render {
        template: name,
        source: err,
    })
}
