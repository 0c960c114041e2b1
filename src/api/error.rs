//! HTTP rendering of [`Error`].
//!
//! Every error becomes a JSON body `{ "error": ..., "code": ... }`. Internal
//! failures are logged and replaced by a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::errors::Error;

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl Error {
    /// Status, machine-readable code and client-facing message.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Validation { message } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
            }
            Self::InvalidAmount { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_AMOUNT", self.to_string())
            }
            Self::MenuParse { message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MENU_PARSE_ERROR",
                message.clone(),
            ),
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            Self::Conflict { .. } => (
                StatusCode::CONFLICT,
                "CONFLICT",
                "Duplicate value violates a unique constraint".to_string(),
            ),
            Self::AccessDenied => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::Json(_) => {
                tracing::error!(error = %self, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();
        let body = json!({
            "error": message,
            "code": code,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn test_status_codes() {
        let cases = [
            (Error::validation("bad"), StatusCode::BAD_REQUEST),
            (Error::not_found("Event", 7), StatusCode::NOT_FOUND),
            (
                Error::Conflict {
                    message: "UNIQUE constraint failed: payments.event_id".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (Error::AccessDenied, StatusCode::UNAUTHORIZED),
            (
                Error::MenuParse {
                    message: "no menu".to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                Error::Database(DbErr::Custom("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_internal_message_is_sanitized() {
        let (_, code, message) = Error::Database(DbErr::Custom("secret".to_string())).classify();
        assert_eq!(code, "INTERNAL_ERROR");
        assert_eq!(message, INTERNAL_MESSAGE);
    }
}
