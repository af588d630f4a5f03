//! Puzzle Error Types
//!
//! This module provides puzzle-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use crate::domain::content::ContentError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::conversions::is_transient_sqlstate;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::client::IdentityError;
use thiserror::Error;

/// Puzzle-specific result type alias
pub type PuzzleResult<T> = Result<T, PuzzleError>;

/// Puzzle-specific error variants
///
/// Gameplay rejections (already completed, out of attempts) are not errors;
/// they travel as `AttemptRecord::Rejected`.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("Puzzle not found")]
    PuzzleNotFound,

    /// Authored content failed schema validation
    #[error("{0}")]
    InvalidContent(#[from] ContentError),

    /// Well-formed but unacceptable metadata (title, XP, time limit)
    #[error("{0}")]
    InvalidMetadata(String),

    /// Malformed submission (e.g. non-positive duration)
    #[error("{0}")]
    InvalidSubmission(String),

    #[error("Player identity required: {0}")]
    Unauthenticated(#[from] IdentityError),

    /// Submissions against a retired puzzle
    #[error("Puzzle is not active")]
    PuzzleInactive,

    /// A grid puzzle without a stored solution while rule-based
    /// verification is disabled
    #[error("Puzzle has no stored solution")]
    SolutionMissing,

    /// A stored record no longer decodes into a valid domain value
    #[error("Corrupt puzzle record: {0}")]
    CorruptRecord(String),

    /// The unit of work lost a race and ran out of retries
    #[error("Concurrent update, please retry")]
    Transient,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PuzzleError {
    /// Whether running the same unit of work again may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            PuzzleError::Transient => true,
            PuzzleError::Database(sqlx::Error::PoolTimedOut) => true,
            PuzzleError::Database(sqlx::Error::Database(db)) => db
                .code()
                .is_some_and(|code| is_transient_sqlstate(code.as_ref())),
            _ => false,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PuzzleError::PuzzleNotFound => StatusCode::NOT_FOUND,
            PuzzleError::InvalidContent(_) | PuzzleError::InvalidSubmission(_) => {
                StatusCode::BAD_REQUEST
            }
            PuzzleError::InvalidMetadata(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PuzzleError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            PuzzleError::PuzzleInactive => StatusCode::GONE,
            PuzzleError::Transient => StatusCode::SERVICE_UNAVAILABLE,
            PuzzleError::Database(_) if self.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            PuzzleError::SolutionMissing
            | PuzzleError::CorruptRecord(_)
            | PuzzleError::Database(_)
            | PuzzleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PuzzleError::PuzzleNotFound => ErrorKind::NotFound,
            PuzzleError::InvalidContent(_) | PuzzleError::InvalidSubmission(_) => {
                ErrorKind::BadRequest
            }
            PuzzleError::InvalidMetadata(_) => ErrorKind::UnprocessableEntity,
            PuzzleError::Unauthenticated(_) => ErrorKind::Unauthorized,
            PuzzleError::PuzzleInactive => ErrorKind::Gone,
            PuzzleError::Transient => ErrorKind::ServiceUnavailable,
            PuzzleError::Database(_) if self.is_transient() => ErrorKind::ServiceUnavailable,
            PuzzleError::SolutionMissing
            | PuzzleError::CorruptRecord(_)
            | PuzzleError::Database(_)
            | PuzzleError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            PuzzleError::PuzzleNotFound => "puzzle_not_found",
            PuzzleError::InvalidContent(_) => "invalid_content",
            PuzzleError::InvalidMetadata(_) => "invalid_metadata",
            PuzzleError::InvalidSubmission(_) => "invalid_submission",
            PuzzleError::Unauthenticated(_) => "unauthenticated",
            PuzzleError::PuzzleInactive => "puzzle_inactive",
            PuzzleError::SolutionMissing => "solution_missing",
            PuzzleError::CorruptRecord(_) => "corrupt_record",
            PuzzleError::Transient => "transient",
            PuzzleError::Database(_) if self.is_transient() => "transient",
            PuzzleError::Database(_) => "database",
            PuzzleError::Internal(_) => "internal",
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            PuzzleError::Database(e) if self.is_transient() => {
                tracing::warn!(error = %e, "Puzzle store transient failure");
            }
            PuzzleError::Database(e) => {
                tracing::error!(error = %e, "Puzzle database error");
            }
            PuzzleError::SolutionMissing | PuzzleError::CorruptRecord(_) => {
                tracing::error!(error = %self, "Puzzle integrity error");
            }
            PuzzleError::Internal(msg) => {
                tracing::error!(message = %msg, "Puzzle internal error");
            }
            PuzzleError::Transient => {
                tracing::warn!("Puzzle submission gave up after retries");
            }
            PuzzleError::PuzzleInactive | PuzzleError::Unauthenticated(_) => {
                tracing::warn!(error = %self, "Puzzle request refused");
            }
            _ => {
                tracing::debug!(error = %self, "Puzzle client error");
            }
        }
    }
}

impl From<PuzzleError> for AppError {
    fn from(err: PuzzleError) -> Self {
        let kind = err.kind();
        let code = err.code();
        let message = err.to_string();
        AppError::new(kind, message).with_code(code)
    }
}

impl IntoResponse for PuzzleError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
