//! Error conversions - From implementations for common error types
//!
//! Provides automatic conversion from common error types to [`AppError`].

use super::app_error::AppError;
use crate::id::IdParseError;

impl From<IdParseError> for AppError {
    fn from(err: IdParseError) -> Self {
        AppError::bad_request("Malformed identifier").with_source(err)
    }
}

// ============================================================================
// serde_json conversions
// ============================================================================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() {
            AppError::bad_request(format!("JSON parse error: {}", err)).with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

/// SQLSTATEs that mean "the transaction lost a race, run it again"
#[cfg(feature = "sqlx")]
pub fn is_transient_sqlstate(code: &str) -> bool {
    // 40001 serialization_failure, 40P01 deadlock_detected
    matches!(code, "40001" | "40P01")
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found").with_source(err),
            sqlx::Error::PoolTimedOut => {
                AppError::service_unavailable("Database connection pool exhausted").with_source(err)
            }
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let app_err = match db_err.code() {
                    Some(code) if is_transient_sqlstate(code.as_ref()) => {
                        AppError::service_unavailable("Concurrent update, please retry")
                    }
                    Some(code) => match code.as_ref() {
                        "23505" => AppError::conflict("Duplicate key value"),
                        "23503" => AppError::conflict("Foreign key violation"),
                        "23502" | "23514" => AppError::bad_request("Constraint violation"),
                        "53000" | "53100" | "53200" | "53300" | "57P01" | "57P02" | "57P03" => {
                            AppError::service_unavailable("Database unavailable")
                        }
                        _ => AppError::internal("Database error"),
                    },
                    None => AppError::internal("Database error"),
                };
                app_err.with_source(err)
            }
            sqlx::Error::Io(_) => {
                AppError::service_unavailable("Database connection error").with_source(err)
            }
            _ => AppError::internal("Database error").with_source(err),
        }
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details; server errors never leak their message
        let detail = if self.is_server_error() {
            self.kind().as_str()
        } else {
            self.message()
        };

        let mut body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": detail,
        });
        if let Some(code) = self.code() {
            body["code"] = serde_json::Value::from(code);
        }

        (status, Json(body)).into_response()
    }
}
