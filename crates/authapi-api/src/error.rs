//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use authapi_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable message.
    pub error: String,
}

/// Handler error wrapper; carries an `AppError` across the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::validation(rejection.body_text()))
    }
}

/// Status code for an error kind.
///
/// Named precondition failures are client errors; token problems are 401
/// and a permission mismatch is 403. Collaborator failures are 500.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ExistingLogin
        | ErrorKind::UnexistingLogin
        | ErrorKind::IncorrectPassword
        | ErrorKind::TypeNotAllowed
        | ErrorKind::ExistingFile
        | ErrorKind::UnexistingFile
        | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::TokenNotProvided | ErrorKind::InvalidToken | ErrorKind::ExpiredToken => {
            StatusCode::UNAUTHORIZED
        }
        ErrorKind::NoPermission => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Cancelled => StatusCode::REQUEST_TIMEOUT,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Database
        | ErrorKind::Storage
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Status code for an error, logging server-side failures.
pub(crate) fn log_status(err: &AppError) -> StatusCode {
    let status = status_for(err.kind);
    if status.is_server_error() {
        tracing::error!(kind = %err.kind, error = %err.message, "Request failed");
    } else {
        tracing::debug!(kind = %err.kind, error = %err.message, "Request rejected");
    }
    status
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = log_status(&self.0);
        let body = ApiErrorResponse {
            error: self.0.message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_errors_are_client_errors() {
        assert_eq!(status_for(ErrorKind::ExistingLogin), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::UnexistingFile), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::ExpiredToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::NoPermission), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_collaborator_failures_are_server_errors() {
        assert_eq!(
            status_for(ErrorKind::Database),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_for(ErrorKind::Timeout), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_response_carries_message() {
        let response = ApiError::from(AppError::incorrect_password()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
