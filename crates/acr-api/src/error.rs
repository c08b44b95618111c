//! # API error types
//!
//! [`AppError`] maps domain errors onto HTTP status codes and structured
//! JSON bodies. Internal and upstream error details are logged but never
//! returned to clients.
//!
//! The mapping that matters most here: a store outage is 503
//! SERVICE_UNAVAILABLE, never 404 — a verifier must not be able to read
//! "our database is down" as "this certificate is fake".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use acr_registry::{GraduationError, IssueError, RevokeError, StoreError, VerifyError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. `NOT_FOUND`, `VALIDATION_ERROR`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Application-level error type implementing [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failure (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal error (500). Message logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),

    /// The anchor gateway errored or is unreachable (502).
    #[error("anchor gateway error: {0}")]
    Upstream(String),

    /// The store is unavailable (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal diagnostics to clients.
        let message = match &self {
            Self::Internal(_) => "an internal error occurred".to_string(),
            Self::Upstream(_) => "the anchor gateway returned an error".to_string(),
            Self::ServiceUnavailable(_) => "the registry store is unavailable".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Upstream(_) => tracing::error!(error = %self, "anchor gateway error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "store unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { .. } => Self::Conflict(err.to_string()),
            StoreError::MissingRecord { .. } => Self::NotFound(err.to_string()),
            StoreError::Unavailable { .. } => Self::ServiceUnavailable(err.to_string()),
        }
    }
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        match &err {
            IssueError::InstitutionNotFound(_) => Self::NotFound(err.to_string()),
            IssueError::IssuerNotAuthorized { .. } => Self::Forbidden(err.to_string()),
            IssueError::DuplicateIdentifier { .. } => Self::Conflict(err.to_string()),
            IssueError::ValidationFailed(_) => Self::Validation(err.to_string()),
            IssueError::Graduation(_) => Self::Conflict(err.to_string()),
            IssueError::Store(e) => match e {
                StoreError::Unavailable { .. } => Self::ServiceUnavailable(err.to_string()),
                StoreError::MissingRecord { .. } => Self::NotFound(err.to_string()),
                StoreError::Duplicate { .. } => Self::Conflict(err.to_string()),
            },
        }
    }
}

impl From<RevokeError> for AppError {
    fn from(err: RevokeError) -> Self {
        match &err {
            RevokeError::CredentialNotFound(_) => Self::NotFound(err.to_string()),
            RevokeError::NotAuthorized { .. } => Self::Forbidden(err.to_string()),
            RevokeError::AlreadyRevoked(_) => Self::Conflict(err.to_string()),
            RevokeError::Store(_) => Self::ServiceUnavailable(err.to_string()),
        }
    }
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Store(_) => Self::ServiceUnavailable(err.to_string()),
        }
    }
}

impl From<GraduationError> for AppError {
    fn from(err: GraduationError) -> Self {
        match &err {
            GraduationError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
            GraduationError::InvalidCgpa { .. } => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            let (status, _) = err.status_and_code();
            assert_eq!(status, expected);
        }
    }

    #[tokio::test]
    async fn internal_details_do_not_leak() {
        let (status, body) =
            response_parts(AppError::Internal("pg connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.message.contains("pg connection"));
    }

    #[tokio::test]
    async fn store_outage_is_503_not_404() {
        let err: AppError = VerifyError::Store(StoreError::Unavailable {
            reason: "connection pool exhausted".into(),
        })
        .into();
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error.code, "SERVICE_UNAVAILABLE");
        assert!(!body.error.message.contains("pool"));
    }

    #[tokio::test]
    async fn issue_errors_map_to_distinct_statuses() {
        let not_found: AppError =
            IssueError::InstitutionNotFound(acr_core::InstitutionId::new()).into();
        assert_eq!(not_found.status_and_code().0, StatusCode::NOT_FOUND);

        let forbidden: AppError = IssueError::IssuerNotAuthorized {
            reason: "no capability".into(),
        }
        .into();
        assert_eq!(forbidden.status_and_code().0, StatusCode::FORBIDDEN);

        let conflict: AppError = IssueError::DuplicateIdentifier {
            reason: "exhausted".into(),
        }
        .into();
        assert_eq!(conflict.status_and_code().0, StatusCode::CONFLICT);

        let validation: AppError = IssueError::ValidationFailed("empty name".into()).into();
        assert_eq!(
            validation.status_and_code().0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn already_revoked_is_conflict() {
        let err: AppError = RevokeError::AlreadyRevoked(acr_core::CredentialId::new()).into();
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error.code, "CONFLICT");
        assert!(body.error.message.contains("already revoked"));
    }
}
