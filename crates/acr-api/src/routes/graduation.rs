//! # Graduation handoff routes
//!
//! - `POST /v1/graduation-requests` — upstream pipeline hands over a
//!   computed result
//! - `GET  /v1/graduation-requests/{id}` — fetch a request
//! - `POST /v1/graduation-requests/{id}/approve` — registrar approval
//! - `POST /v1/graduation-requests/{id}/reject` — registrar rejection
//! - `POST /v1/graduation-requests/{id}/certify` — issue the credential
//!   and link it
//!
//! CGPA and class of degree arrive precomputed; the registry validates
//! shape and range but never recomputes them.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use acr_core::{EnrollmentId, GraduationRequestId};
use acr_registry::{Credential, GraduationRequest};

use crate::error::AppError;
use crate::routes::credentials::IssueRequestBody;
use crate::routes::extract_json;
use crate::state::AppState;

/// Upstream handoff body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GraduationHandoffBody {
    pub enrollment_id: Uuid,
    pub total_credits: u32,
    /// Fixed-point CGPA with two decimals, e.g. `"3.42"`.
    pub cgpa: String,
    pub class_of_degree: String,
}

/// Build the graduation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/graduation-requests", post(create_request))
        .route("/v1/graduation-requests/:id", get(get_request))
        .route("/v1/graduation-requests/:id/approve", post(approve_request))
        .route("/v1/graduation-requests/:id/reject", post(reject_request))
        .route("/v1/graduation-requests/:id/certify", post(certify_request))
}

/// POST /v1/graduation-requests — receive the upstream handoff.
#[utoipa::path(
    post,
    path = "/v1/graduation-requests",
    request_body = GraduationHandoffBody,
    responses(
        (status = 201, description = "Request recorded"),
        (status = 409, description = "A request already exists for this enrollment", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "graduation"
)]
pub(crate) async fn create_request(
    State(state): State<AppState>,
    body: Result<Json<GraduationHandoffBody>, JsonRejection>,
) -> Result<(StatusCode, Json<GraduationRequest>), AppError> {
    let body = extract_json(body)?;

    let request = GraduationRequest::new(
        EnrollmentId(body.enrollment_id),
        body.total_credits,
        body.cgpa,
        body.class_of_degree,
    )?;

    state.store.insert_graduation_request(&request).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /v1/graduation-requests/{id} — fetch a request.
#[utoipa::path(
    get,
    path = "/v1/graduation-requests/{id}",
    params(("id" = Uuid, Path, description = "Graduation request id")),
    responses(
        (status = 200, description = "Request found"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "graduation"
)]
pub(crate) async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GraduationRequest>, AppError> {
    let request = load(&state, id).await?;
    Ok(Json(request))
}

/// POST /v1/graduation-requests/{id}/approve — approve a pending request.
#[utoipa::path(
    post,
    path = "/v1/graduation-requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Graduation request id")),
    responses(
        (status = 200, description = "Request approved"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Not pending", body = crate::error::ErrorBody),
    ),
    tag = "graduation"
)]
pub(crate) async fn approve_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GraduationRequest>, AppError> {
    let mut request = load(&state, id).await?;
    request.approve()?;
    state.store.update_graduation_request(&request).await?;
    Ok(Json(request))
}

/// POST /v1/graduation-requests/{id}/reject — reject a pending request.
#[utoipa::path(
    post,
    path = "/v1/graduation-requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Graduation request id")),
    responses(
        (status = 200, description = "Request rejected"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Not pending", body = crate::error::ErrorBody),
    ),
    tag = "graduation"
)]
pub(crate) async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GraduationRequest>, AppError> {
    let mut request = load(&state, id).await?;
    request.reject()?;
    state.store.update_graduation_request(&request).await?;
    Ok(Json(request))
}

/// POST /v1/graduation-requests/{id}/certify — issue the credential for
/// an approved request.
#[utoipa::path(
    post,
    path = "/v1/graduation-requests/{id}/certify",
    params(("id" = Uuid, Path, description = "Graduation request id")),
    request_body = IssueRequestBody,
    responses(
        (status = 201, description = "Credential issued and linked"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Request not approved", body = crate::error::ErrorBody),
    ),
    tag = "graduation"
)]
pub(crate) async fn certify_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<IssueRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Credential>), AppError> {
    let issue_request = extract_json(body)?.into_domain()?;
    let credential = state
        .issuance
        .issue_for_graduation(GraduationRequestId(id), issue_request)
        .await?;
    Ok((StatusCode::CREATED, Json(credential)))
}

pub(crate) async fn load(state: &AppState, id: Uuid) -> Result<GraduationRequest, AppError> {
    state
        .store
        .graduation_request(GraduationRequestId(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("graduation request {id} not found")))
}
