//! # OpenAPI document
//!
//! Generated from the handler `utoipa::path` annotations and served at
//! `/openapi.json` (public — it describes the verification contract third
//! parties integrate against).

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// The API document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Academic Credential Registry",
        description = "Credential issuance, ledger anchoring, public verification, and revocation.",
    ),
    paths(
        crate::routes::credentials::issue_credential,
        crate::routes::credentials::get_credential,
        crate::routes::credentials::revoke_credential,
        crate::routes::verify::verify_by_code,
        crate::routes::verify::verify_by_number,
        crate::routes::graduation::create_request,
        crate::routes::graduation::get_request,
        crate::routes::graduation::approve_request,
        crate::routes::graduation::reject_request,
        crate::routes::graduation::certify_request,
        crate::routes::anchors::fetch_receipt,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::credentials::IssueRequestBody,
        crate::routes::credentials::RevokeRequestBody,
        crate::routes::verify::VerifyResponse,
        crate::routes::graduation::GraduationHandoffBody,
    )),
    tags(
        (name = "credentials", description = "Issuance and revocation"),
        (name = "verify", description = "Public verification"),
        (name = "graduation", description = "Graduation pipeline handoff"),
        (name = "anchors", description = "Ledger anchor receipts"),
    )
)]
pub struct ApiDoc;

/// Serve the document.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
