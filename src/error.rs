//! API-boundary error type and its HTTP mapping.
//!
//! Internal components use their own `thiserror` enums (cache, rate limiter,
//! codec, key generation); everything user-visible funnels into [`AppError`]
//! at the API layer.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    details: Value,
}

/// User-visible failures, one variant per terminal HTTP outcome.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String },
    Conflict { message: String, details: Value },
    /// Link exists but is deactivated or expired.
    Gone { message: String },
    /// Caller's network identity is banned.
    Forbidden,
    /// Password-protected link; `password_required` distinguishes
    /// "not supplied" from "wrong".
    Unauthorized { password_required: bool },
    /// Admission control rejected the request.
    RateLimited,
    /// Key generation cannot mint a code right now; retry later.
    Unavailable { message: String },
    Internal { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn gone(message: impl Into<String>) -> Self {
        Self::Gone {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, "validation_error", message, details)
            }
            AppError::NotFound { message } => {
                (StatusCode::NOT_FOUND, "not_found", message, Value::Null)
            }
            AppError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            AppError::Gone { message } => (StatusCode::GONE, "gone", message, Value::Null),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Access denied".to_string(),
                Value::Null,
            ),
            AppError::Unauthorized { password_required } => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                if password_required {
                    "Password required".to_string()
                } else {
                    "Incorrect password".to_string()
                },
                json!({ "password_required": password_required }),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests, slow down".to_string(),
                Value::Null,
            ),
            AppError::Unavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                message,
                Value::Null,
            ),
            AppError::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                Value::Null,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Maps sqlx errors to the API error type, surfacing unique violations as
/// conflicts and hiding everything else behind a generic internal error.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": db.constraint() }),
        );
    }

    tracing::error!("database error: {}", e);
    AppError::internal("Database error")
}
