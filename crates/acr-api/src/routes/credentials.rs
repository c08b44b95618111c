//! # Credential routes
//!
//! - `POST /v1/credentials` — issue a credential
//! - `GET  /v1/credentials/{id}` — fetch a credential record
//! - `POST /v1/credentials/{id}/revoke` — revoke a credential
//!
//! All three require the bearer token; issuer-level capability checks
//! happen in the domain services.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use acr_core::{CredentialId, InstitutionId, IssuerId};
use acr_registry::{Credential, IssueRequest, ProgramType};

use crate::error::AppError;
use crate::routes::extract_json;
use crate::state::AppState;

/// Issue request body.
///
/// `program_type` is the uppercase wire name (`BACHELORS`, `MASTERS`, …);
/// `cgpa` is a fixed-point string with two decimals.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueRequestBody {
    pub institution_id: Uuid,
    pub issuer_id: Uuid,
    pub student_name: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub national_id: Option<String>,
    pub program_name: String,
    pub program_type: String,
    #[serde(default)]
    pub class_of_degree: Option<String>,
    #[serde(default)]
    pub cgpa: Option<String>,
    pub graduation_date: NaiveDate,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl IssueRequestBody {
    pub(crate) fn into_domain(self) -> Result<IssueRequest, AppError> {
        let program_type = ProgramType::parse(&self.program_type).ok_or_else(|| {
            AppError::Validation(format!("unknown program_type {:?}", self.program_type))
        })?;
        Ok(IssueRequest {
            institution_id: InstitutionId(self.institution_id),
            issuer_id: IssuerId(self.issuer_id),
            student_name: self.student_name,
            student_id: self.student_id,
            date_of_birth: self.date_of_birth,
            national_id: self.national_id,
            program_name: self.program_name,
            program_type,
            class_of_degree: self.class_of_degree,
            cgpa: self.cgpa,
            graduation_date: self.graduation_date,
            start_date: self.start_date,
            end_date: self.end_date,
            metadata: self.metadata.unwrap_or_else(|| serde_json::json!({})),
        })
    }
}

/// Revocation request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RevokeRequestBody {
    pub revoker_id: Uuid,
    pub reason: String,
}

/// Build the credentials router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/credentials", post(issue_credential))
        .route("/v1/credentials/:id", get(get_credential))
        .route("/v1/credentials/:id/revoke", post(revoke_credential))
}

/// POST /v1/credentials — issue a credential.
#[utoipa::path(
    post,
    path = "/v1/credentials",
    request_body = IssueRequestBody,
    responses(
        (status = 201, description = "Credential issued; anchoring runs in the background"),
        (status = 403, description = "Issuer not authorized", body = crate::error::ErrorBody),
        (status = 404, description = "Institution not found", body = crate::error::ErrorBody),
        (status = 409, description = "Identifier uniqueness exhausted", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn issue_credential(
    State(state): State<AppState>,
    body: Result<Json<IssueRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Credential>), AppError> {
    let request = extract_json(body)?.into_domain()?;
    let credential = state.issuance.issue(request).await?;
    Ok((StatusCode::CREATED, Json(credential)))
}

/// GET /v1/credentials/{id} — fetch a credential record.
#[utoipa::path(
    get,
    path = "/v1/credentials/{id}",
    params(("id" = Uuid, Path, description = "Credential id")),
    responses(
        (status = 200, description = "Credential found"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn get_credential(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Credential>, AppError> {
    let credential = state
        .store
        .credential(CredentialId(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("credential {id} not found")))?;
    Ok(Json(credential))
}

/// POST /v1/credentials/{id}/revoke — revoke a credential.
#[utoipa::path(
    post,
    path = "/v1/credentials/{id}/revoke",
    params(("id" = Uuid, Path, description = "Credential id")),
    request_body = RevokeRequestBody,
    responses(
        (status = 200, description = "Credential revoked"),
        (status = 403, description = "Revoker not authorized", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Already revoked", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn revoke_credential(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<RevokeRequestBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = extract_json(body)?;
    if request.reason.trim().is_empty() {
        return Err(AppError::Validation("reason must not be empty".into()));
    }

    state
        .revocation
        .revoke(CredentialId(id), IssuerId(request.revoker_id), request.reason.trim())
        .await?;

    Ok(Json(serde_json::json!({
        "credential_id": id,
        "status": "REVOKED",
    })))
}
