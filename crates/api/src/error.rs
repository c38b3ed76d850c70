use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use casebox_core::error::CoreError;
use serde_json::{json, Value};

use crate::engine::OpenCaseError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for generic domain errors, [`OpenCaseError`] for the
/// opening flow, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `casebox_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed or refused case opening.
    #[error(transparent)]
    OpenCase(#[from] OpenCaseError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A request body or query string that could not be parsed.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, code, message, and optional structured details of an error body.
type ErrorParts = (StatusCode, &'static str, String, Option<Value>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details): ErrorParts = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => {
                let (status, code, message) = match core {
                    CoreError::NotFound { entity, id } => (
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        format!("{entity} with id {id} not found"),
                    ),
                    CoreError::Validation(msg) => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                    }
                    CoreError::Unauthorized(msg) => {
                        (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                    }
                };
                (status, code, message, None)
            }

            // --- Opening errors ---
            AppError::OpenCase(err) => classify_open_case_error(err),

            // --- Database errors ---
            AppError::Database(err) => {
                let (status, code, message) = classify_sqlx_error(err);
                (status, code, message, None)
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map an opening error to its HTTP representation.
///
/// Caller-correctable refusals keep their message; configuration and
/// persistence faults are logged and sanitized.
fn classify_open_case_error(err: &OpenCaseError) -> ErrorParts {
    match err {
        OpenCaseError::CaseNotFound { .. } => (
            StatusCode::NOT_FOUND,
            "CASE_NOT_FOUND",
            err.to_string(),
            None,
        ),
        OpenCaseError::UserNotFound { .. } => (
            StatusCode::NOT_FOUND,
            "USER_NOT_FOUND",
            err.to_string(),
            None,
        ),
        OpenCaseError::CaseInactive { .. } => (
            StatusCode::CONFLICT,
            "CASE_INACTIVE",
            err.to_string(),
            None,
        ),
        OpenCaseError::CaseExpired { .. } => (
            StatusCode::CONFLICT,
            "CASE_EXPIRED",
            err.to_string(),
            None,
        ),
        OpenCaseError::InsufficientFunds(funds) => (
            StatusCode::PAYMENT_REQUIRED,
            "INSUFFICIENT_FUNDS",
            err.to_string(),
            Some(json!({
                "balance": funds.balance,
                "required": funds.required,
            })),
        ),
        OpenCaseError::NoPrizesConfigured { .. } | OpenCaseError::InvalidTotalCost { .. } => {
            tracing::error!(error = %err, "Case is misconfigured");
            let (status, code, message) = internal();
            (status, code, message, None)
        }
        OpenCaseError::Persistence(db_err) => {
            tracing::error!(error = %db_err, "Case opening could not be persisted");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "RETRYABLE_ERROR",
                "The case could not be opened, please retry".to_string(),
                None,
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
