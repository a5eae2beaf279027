use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use aula_api_types::MessageBody;

use crate::{
    application::mailer::MailError, application::repos::RepoError, domain::error::DomainError,
    infra::error::InfraError,
};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Mail(#[from] MailError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(DomainError::NotFound { .. }) | AppError::Repo(RepoError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            AppError::Domain(DomainError::Validation { .. })
            | AppError::Repo(RepoError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            AppError::Domain(DomainError::Unauthorized { .. }) => StatusCode::UNAUTHORIZED,
            AppError::Repo(RepoError::Timeout) | AppError::Infra(InfraError::Database { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Domain(DomainError::Invariant { .. })
            | AppError::Repo(_)
            | AppError::Mail(_)
            | AppError::Infra(_)
            | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message surfaced in the response envelope. Domain errors carry
    /// caller-facing text; everything else collapses to a fixed phrase and
    /// keeps its detail in the [`ErrorReport`].
    fn presentation_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::Invariant { .. }) => {
                "Unexpected error occurred".to_owned()
            }
            AppError::Domain(err) => err.to_string(),
            AppError::Repo(RepoError::NotFound) => "Resource not found".to_owned(),
            AppError::Repo(RepoError::InvalidInput { .. }) => {
                "Request could not be processed".to_owned()
            }
            AppError::Repo(RepoError::Timeout) | AppError::Infra(InfraError::Database { .. }) => {
                "Service temporarily unavailable".to_owned()
            }
            AppError::Repo(_) => "Unexpected error occurred".to_owned(),
            AppError::Mail(_) => "Failed to send mail".to_owned(),
            AppError::Infra(InfraError::Configuration { .. }) => "Service misconfigured".to_owned(),
            AppError::Infra(InfraError::Telemetry(_)) => {
                "Logging subsystem could not start".to_owned()
            }
            AppError::Infra(InfraError::Io(_)) => "I/O failure during request".to_owned(),
            AppError::Unexpected(_) => "Unexpected error occurred".to_owned(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.presentation_message();
        let report = ErrorReport::from_error("application::error::AppError", status, &self);
        let mut response = (status, Json(MessageBody::error(message))).into_response();
        report.attach(&mut response);
        response
    }
}
