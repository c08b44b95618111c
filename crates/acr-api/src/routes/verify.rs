//! # Public verification routes
//!
//! - `GET /v1/verify/code/{code}` — verify by verification code
//! - `GET /v1/verify/number/{number}` — verify by certificate number
//!
//! Mounted outside the auth middleware: anyone holding a certificate must
//! be able to check it. The response always carries an explicit `status`;
//! a store outage becomes a 503 with `status = "ERROR"`, so "system down"
//! can never read as "credential invalid".

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use acr_registry::{CallerInfo, CredentialView, Lookup, VerificationReport};

use crate::state::AppState;

/// Public verification response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    /// Whether the credential is currently valid.
    pub valid: bool,
    /// `VALID | INVALID | REVOKED | NOT_FOUND` (or `ERROR` on the 503 path).
    pub status: String,
    /// The public credential view, on the VALID and REVOKED branches.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub credential: Option<CredentialView>,
    /// Whether the content digest is confirmed on the ledger.
    pub ledger_verified: bool,
    /// The anchoring transaction reference, when confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_reference: Option<String>,
    /// Human-readable summary.
    pub message: String,
}

impl VerifyResponse {
    fn from_report(report: VerificationReport) -> Self {
        match report {
            VerificationReport::Valid {
                credential,
                ledger_verified,
                ledger_reference,
            } => Self {
                valid: true,
                status: "VALID".into(),
                message: format!(
                    "credential {} is valid",
                    credential.certificate_no
                ),
                credential: Some(credential),
                ledger_verified,
                ledger_reference: ledger_reference.map(|r| r.as_str().to_string()),
            },
            VerificationReport::Invalid { message } => Self {
                valid: false,
                status: "INVALID".into(),
                credential: None,
                ledger_verified: false,
                ledger_reference: None,
                message,
            },
            VerificationReport::Revoked {
                credential,
                reason,
                revoked_at,
            } => {
                let mut message = format!("credential {} was revoked", credential.certificate_no);
                if let Some(reason) = &reason {
                    message.push_str(&format!(": {reason}"));
                }
                if let Some(at) = revoked_at {
                    message.push_str(&format!(" on {at}"));
                }
                Self {
                    valid: false,
                    status: "REVOKED".into(),
                    credential: Some(credential),
                    ledger_verified: false,
                    ledger_reference: None,
                    message,
                }
            }
            VerificationReport::NotFound => Self {
                valid: false,
                status: "NOT_FOUND".into(),
                credential: None,
                ledger_verified: false,
                ledger_reference: None,
                message: "no credential matches the supplied identifier".into(),
            },
        }
    }
}

/// Build the public verification router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/verify/code/:code", get(verify_by_code))
        .route("/v1/verify/number/:number", get(verify_by_number))
}

/// GET /v1/verify/code/{code} — verify by verification code.
#[utoipa::path(
    get,
    path = "/v1/verify/code/{code}",
    params(("code" = String, Path, description = "9-character verification code")),
    responses(
        (status = 200, description = "Verification result", body = VerifyResponse),
        (status = 503, description = "Registry unavailable", body = VerifyResponse),
    ),
    tag = "verify"
)]
pub(crate) async fn verify_by_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> (StatusCode, Json<VerifyResponse>) {
    let result = state
        .verification
        .verify(Lookup::Code(code), caller_info(&headers))
        .await;
    respond(result)
}

/// GET /v1/verify/number/{number} — verify by certificate number.
#[utoipa::path(
    get,
    path = "/v1/verify/number/{number}",
    params(("number" = String, Path, description = "Certificate number, e.g. USL-2024-00001")),
    responses(
        (status = 200, description = "Verification result", body = VerifyResponse),
        (status = 503, description = "Registry unavailable", body = VerifyResponse),
    ),
    tag = "verify"
)]
pub(crate) async fn verify_by_number(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(number): Path<String>,
) -> (StatusCode, Json<VerifyResponse>) {
    let result = state
        .verification
        .verify(Lookup::Number(number), caller_info(&headers))
        .await;
    respond(result)
}

/// Turn the service result into the response envelope.
///
/// Infrastructure failure gets a 503 with `status = "ERROR"` in the same
/// envelope — explicitly distinct from NOT_FOUND, so an outage can never
/// be read as "this certificate is fake".
fn respond(
    result: Result<VerificationReport, acr_registry::VerifyError>,
) -> (StatusCode, Json<VerifyResponse>) {
    match result {
        Ok(report) => (StatusCode::OK, Json(VerifyResponse::from_report(report))),
        Err(e) => {
            tracing::warn!(error = %e, "verification infrastructure failure");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(VerifyResponse {
                    valid: false,
                    status: "ERROR".into(),
                    credential: None,
                    ledger_verified: false,
                    ledger_reference: None,
                    message: "the verification service is temporarily unavailable".into(),
                }),
            )
        }
    }
}

/// Assemble caller metadata for the audit trail from request headers.
fn caller_info(headers: &HeaderMap) -> CallerInfo {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };
    CallerInfo {
        // First hop of X-Forwarded-For when present.
        ip: header("x-forwarded-for")
            .map(|v| v.split(',').next().unwrap_or("").trim().to_string())
            .filter(|s| !s.is_empty()),
        user_agent: header("user-agent"),
        organization: header("x-verifier-organization"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn caller_info_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        headers.insert("user-agent", HeaderValue::from_static("verifier-bot/1.0"));
        let info = caller_info(&headers);
        assert_eq!(info.ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(info.user_agent.as_deref(), Some("verifier-bot/1.0"));
        assert!(info.organization.is_none());
    }

    #[test]
    fn not_found_response_shape() {
        let resp = VerifyResponse::from_report(VerificationReport::NotFound);
        assert!(!resp.valid);
        assert_eq!(resp.status, "NOT_FOUND");
        assert!(resp.credential.is_none());
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("credential").is_none());
        assert!(json.get("ledger_reference").is_none());
    }

    #[test]
    fn revoked_response_carries_reason_in_message() {
        use acr_core::Timestamp;
        use acr_registry::ProgramType;
        use chrono::NaiveDate;

        let view = CredentialView {
            certificate_no: "USL-2024-00001".into(),
            verification_code: "ABCDEFGHJ".into(),
            student_name: "A. Bangura".into(),
            program_name: "BSc CS".into(),
            program_type: ProgramType::Bachelors,
            class_of_degree: None,
            cgpa: None,
            graduation_date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            institution_code: "USL".into(),
            data_hash: "ab".repeat(32),
            issued_at: Timestamp::parse("2024-07-15T12:00:00Z").unwrap(),
        };
        let resp = VerifyResponse::from_report(VerificationReport::Revoked {
            credential: view,
            reason: Some("duplicate record".into()),
            revoked_at: Some(Timestamp::parse("2024-08-01T09:00:00Z").unwrap()),
        });
        assert_eq!(resp.status, "REVOKED");
        assert!(resp.message.contains("duplicate record"));
        assert!(resp.message.contains("2024-08-01"));
    }
}
