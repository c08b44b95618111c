//! # acr-api — Axum API Service for the Academic Credential Registry
//!
//! ## API Surface
//!
//! | Prefix                       | Module                  | Auth |
//! |------------------------------|-------------------------|------|
//! | `POST /v1/credentials`       | [`routes::credentials`] | yes  |
//! | `GET  /v1/credentials/{id}`  | [`routes::credentials`] | yes  |
//! | `POST /v1/credentials/{id}/revoke` | [`routes::credentials`] | yes |
//! | `GET  /v1/verify/*`          | [`routes::verify`]      | no   |
//! | `/v1/graduation-requests/*`  | [`routes::graduation`]  | yes  |
//! | `GET  /v1/anchors/{ref}`     | [`routes::anchors`]     | yes  |
//! | `/openapi.json`              | [`openapi`]             | no   |
//! | `/health/*`, `/metrics`      | here                    | no   |
//!
//! ## Middleware stack (outermost → innermost)
//!
//! TraceLayer → metrics → auth (authenticated subtree only) → handler.
//! Body size is capped at 2 MiB.

pub mod auth;
pub mod bootstrap;
pub mod db;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;

pub use error::AppError;
pub use state::{ApiConfig, AppState};

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();

    // Institution-facing routes sit behind the bearer token.
    let authenticated = Router::new()
        .merge(routes::credentials::router())
        .merge(routes::graduation::router())
        .merge(routes::anchors::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(Extension(auth_config));

    // Public verification and the API document.
    let public = Router::new()
        .merge(routes::verify::router())
        .merge(openapi::router());

    let metrics_for_endpoint = metrics.clone();

    Router::new()
        .merge(authenticated)
        .merge(public)
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(Extension(metrics))
        .layer(TraceLayer::new_for_http())
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .route(
            "/metrics",
            get(move || async move { metrics_for_endpoint.render() }),
        )
        .with_state(state)
}

/// Liveness probe — the process is up.
async fn health_live() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Readiness probe — the store answers.
async fn health_ready(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    // A store round-trip on a key that cannot exist; failure means the
    // backing store is not answering.
    state
        .store
        .credential(acr_core::CredentialId::new())
        .await
        .map_err(|e| AppError::ServiceUnavailable(e.to_string()))?;
    Ok(Json(serde_json::json!({"status": "ready"})))
}
