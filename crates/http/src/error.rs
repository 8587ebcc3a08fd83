//! HTTP error types and implementations

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bazaar_core::{Denial, StoreError, access::DenialKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Missing, invalid or expired credential
    #[error("Unauthenticated: {reason}")]
    Unauthenticated { reason: String, retryable: bool },

    /// Credential valid but the grant is missing or insufficient
    #[error("{0}")]
    Forbidden(String),

    /// Missing or malformed input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Permission store failure
    #[error("Permission store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl HttpError {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated {
            reason: reason.into(),
            retryable: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::InternalServerError(_) => "internal_server_error",
        }
    }

    fn retryable(&self) -> Option<bool> {
        match self {
            Self::Unauthenticated { retryable, .. } => Some(*retryable),
            Self::StoreUnavailable(_) => Some(true),
            _ => None,
        }
    }
}

impl From<Denial> for HttpError {
    fn from(denial: Denial) -> Self {
        match denial.kind {
            DenialKind::Unauthenticated { retryable } => Self::Unauthenticated {
                reason: denial.reason,
                retryable,
            },
            DenialKind::MissingRole => Self::unauthenticated(denial.reason),
            DenialKind::Forbidden => Self::Forbidden(denial.reason),
            DenialKind::StoreUnavailable => Self::StoreUnavailable(denial.reason),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
            retryable: self.retryable(),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type alias using HttpError
pub type Result<T> = std::result::Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::access::Action;

    #[test]
    fn test_denial_mapping() {
        assert_eq!(
            HttpError::from(Denial::no_grant()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            HttpError::from(Denial::action_denied(Action::Delete)).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            HttpError::from(Denial::unauthenticated("Missing authorization header")).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HttpError::from(Denial::missing_role()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HttpError::from(Denial::store_unavailable("down")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_timeout_keeps_retry_hint() {
        let err = HttpError::from(Denial::verifier_timeout());
        assert_eq!(err.retryable(), Some(true));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_unauthorized_response_sets_challenge() {
        let response = HttpError::unauthenticated("Invalid token").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_forbidden_message_is_reason() {
        let err = HttpError::from(Denial::no_grant());
        assert_eq!(err.to_string(), "Forbidden: no grant configured");
    }
}
