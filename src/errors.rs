use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::constants::quiz_rules::MAX_ATTEMPTS;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, AppError::DatabaseError(_) | AppError::InternalError(_))
    }

    /// Message safe to hand back to a client.
    fn public_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Failures of the quiz session engine. Matched exhaustively at the HTTP boundary.
#[derive(Debug, Clone, Error)]
pub enum QuizError {
    #[error(
        "Maximum {} attempts reached for this topic. Score 50% or higher to unlock unlimited attempts.",
        MAX_ATTEMPTS
    )]
    MaxAttemptsReached,

    #[error("Not enough questions available for topic '{0}'")]
    InsufficientQuestions(String),

    #[error("Topic '{0}' not found")]
    TopicNotFound(String),

    #[error("Quiz session '{0}' not found or already completed")]
    SessionNotFound(String),

    #[error("Question '{0}' not found in this quiz session")]
    QuestionNotFound(String),

    #[error("Question '{question_id}' was already answered in session '{session_id}'")]
    DuplicateAnswer {
        session_id: String,
        question_id: String,
    },

    #[error(transparent)]
    Storage(#[from] AppError),
}

impl QuizError {
    pub fn error_code(&self) -> &'static str {
        match self {
            QuizError::MaxAttemptsReached => "MAX_ATTEMPTS_REACHED",
            QuizError::InsufficientQuestions(_) => "INSUFFICIENT_QUESTIONS",
            QuizError::TopicNotFound(_) => "TOPIC_NOT_FOUND",
            QuizError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            QuizError::QuestionNotFound(_) => "QUESTION_NOT_FOUND",
            QuizError::DuplicateAnswer { .. } => "DUPLICATE_ANSWER",
            QuizError::Storage(err) => err.error_code(),
        }
    }
}

pub type QuizResult<T> = Result<T, QuizError>;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl ErrorResponse {
    fn new(code: &'static str, message: String) -> Self {
        Self {
            success: false,
            error: ErrorBody { code, message },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_internal() {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code())
            .json(ErrorResponse::new(self.error_code(), self.public_message()))
    }
}

impl ResponseError for QuizError {
    fn status_code(&self) -> StatusCode {
        match self {
            QuizError::MaxAttemptsReached => StatusCode::FORBIDDEN,
            QuizError::InsufficientQuestions(_) => StatusCode::BAD_REQUEST,
            QuizError::TopicNotFound(_) => StatusCode::NOT_FOUND,
            QuizError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            QuizError::QuestionNotFound(_) => StatusCode::NOT_FOUND,
            QuizError::DuplicateAnswer { .. } => StatusCode::CONFLICT,
            QuizError::Storage(err) => err.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            QuizError::Storage(err) => err.error_response(),
            _ => HttpResponse::build(self.status_code())
                .json(ErrorResponse::new(self.error_code(), self.to_string())),
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::AlreadyExists("test".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::ValidationError("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_messages() {
        let err = AppError::NotFound("user".into());
        assert_eq!(err.to_string(), "Not found: user");
    }

    #[test]
    fn test_quiz_error_status_codes() {
        assert_eq!(
            QuizError::MaxAttemptsReached.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            QuizError::InsufficientQuestions("t".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            QuizError::SessionNotFound("s".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            QuizError::DuplicateAnswer {
                session_id: "s".into(),
                question_id: "q".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_storage_error_keeps_inner_status_and_code() {
        let err = QuizError::from(AppError::DatabaseError("boom".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::DatabaseError("connection string leaked".into());
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::NotFound("session".into());
        assert_eq!(err.public_message(), "Not found: session");
    }

    #[test]
    fn test_max_attempts_message_names_the_limit() {
        assert!(QuizError::MaxAttemptsReached.to_string().contains("3 attempts"));
    }
}
