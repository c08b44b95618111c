//! # Anchor receipt routes
//!
//! - `GET /v1/anchors/{reference}` — fetch the ledger transaction details
//!   for a stored anchor reference.
//!
//! A read-only passthrough for auditing UIs; it never mutates credential
//! state. Verification does not come through here — its ledger flag is
//! answered from the locally recorded anchor status.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use acr_core::LedgerReference;
use acr_ledger::{LedgerError, TransactionDetails};

use crate::error::AppError;
use crate::state::AppState;

/// Build the anchors router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/anchors/:reference", get(fetch_receipt))
}

/// GET /v1/anchors/{reference} — fetch a transaction receipt.
#[utoipa::path(
    get,
    path = "/v1/anchors/{reference}",
    params(("reference" = String, Path, description = "Ledger transaction reference")),
    responses(
        (status = 200, description = "Transaction details"),
        (status = 404, description = "No such transaction", body = crate::error::ErrorBody),
        (status = 502, description = "Anchor gateway error", body = crate::error::ErrorBody),
        (status = 503, description = "No anchor gateway configured", body = crate::error::ErrorBody),
    ),
    tag = "anchors"
)]
pub(crate) async fn fetch_receipt(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<TransactionDetails>, AppError> {
    let client = state.anchor.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("no anchor gateway configured".into())
    })?;

    let details = client
        .fetch_receipt(&LedgerReference(reference))
        .await
        .map_err(|e| match e {
            LedgerError::NotFound { reference } => {
                AppError::NotFound(format!("no ledger transaction for {reference}"))
            }
            other => AppError::Upstream(other.to_string()),
        })?;

    Ok(Json(details))
}
