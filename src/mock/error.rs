//! Mock backend errors with HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::AccountStatus;

/// Error body in the services' shape: `{error, message}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_status: Option<AccountStatus>,
    pub status_code: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Account not activated")]
    NotActivated(AccountStatus),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Injected failure (HTTP {0})")]
    Forced(u16),
    #[error("Failed to bind mock backend: {0}")]
    Bind(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let (status, error, message, account_status) = match &self {
            MockError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Authentication required".to_string(),
                None,
            ),
            MockError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Invalid email or password".to_string(),
                None,
            ),
            MockError::Forbidden(detail) => (StatusCode::FORBIDDEN, "Forbidden", detail.clone(), None),
            MockError::NotActivated(status) => (
                StatusCode::FORBIDDEN,
                "Account not activated",
                "Account not activated".to_string(),
                Some(*status),
            ),
            MockError::NotFound(detail) => (StatusCode::NOT_FOUND, "Not Found", detail.clone(), None),
            MockError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "Bad Request", detail.clone(), None),
            MockError::Conflict(detail) => (StatusCode::CONFLICT, "Conflict", detail.clone(), None),
            MockError::Forced(code) => (
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "Injected",
                format!("Injected failure (HTTP {code})"),
                None,
            ),
            MockError::Bind(e) => {
                tracing::error!(error = %e, "Mock backend bind error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            MockError::Internal(detail) => {
                tracing::error!(detail = %detail, "Mock backend internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error,
            message,
            account_status,
            status_code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: MockError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_activated_carries_account_status() {
        let (status, body) = body_json(MockError::NotActivated(AccountStatus::Pending)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Account not activated");
        assert_eq!(body["accountStatus"], "PENDING");
        assert_eq!(body["statusCode"], 403);
    }

    #[tokio::test]
    async fn bad_request_exposes_message() {
        let (status, body) = body_json(MockError::BadRequest("Subject is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Subject is required");
        assert!(body.get("accountStatus").is_none());
    }

    #[tokio::test]
    async fn internal_details_are_hidden() {
        let (_, body) = body_json(MockError::Internal("lock poisoned".into())).await;
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn forced_status_is_used() {
        let (status, _) = body_json(MockError::Forced(503)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
