//! # Bearer-token authentication middleware
//!
//! Institution-facing routes (issue, revoke, graduation, receipts) sit
//! behind a static bearer token; the public verification routes and the
//! health probes are mounted outside this middleware.
//!
//! Issuer-level authorization — which officer may issue or revoke for
//! which institution — is a domain concern and happens in the registry
//! services against the issuer record, not here.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;

/// Token configuration injected as an Axum extension.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` disables the check.
    pub token: Option<String>,
}

/// Reject requests without the expected `Authorization: Bearer` token.
pub async fn auth_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let config = request
        .extensions()
        .get::<AuthConfig>()
        .cloned()
        .unwrap_or(AuthConfig { token: None });

    if let Some(expected) = &config.token {
        let presented = request
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match presented {
            Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => {}
            Some(_) => return Err(AppError::Unauthorized("invalid token".into())),
            None => return Err(AppError::Unauthorized("missing bearer token".into())),
        }
    }

    Ok(next.run(request).await)
}

/// Compare tokens without an early exit on the first mismatching byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secrets"));
        assert!(constant_time_eq(b"", b""));
    }
}
