use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::DomainError;

/// HTTP view of a [`DomainError`]: status code plus a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            DomainError::Internal(_) | DomainError::ExternalService(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> &str {
        match &self.0 {
            DomainError::Validation(msg)
            | DomainError::NotFound(msg)
            | DomainError::Timeout(msg)
            | DomainError::TooLarge(msg)
            | DomainError::Internal(msg)
            | DomainError::ExternalService(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
