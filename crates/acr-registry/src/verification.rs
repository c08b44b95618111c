//! # Verification service
//!
//! Resolves a lookup — verification code or certificate number — to a
//! closed [`VerificationReport`], and appends one audit record per call.
//!
//! ## The report is a closed union
//!
//! Callers must handle every branch; there is no stringly-typed status to
//! mistype. Payload rides only on the branches where it means something:
//! `Valid` carries the public credential view, `Revoked` carries the view
//! plus reason and date, `Invalid` and `NotFound` carry nothing a caller
//! could misuse.
//!
//! ## Reads are cheap on purpose
//!
//! Ledger confirmation is reported from the locally recorded anchor
//! status — no live ledger read happens on this path. Auditing UIs that
//! want the on-ledger receipt go through the anchor client directly.
//!
//! ## "Not found" is an answer, "store down" is not
//!
//! A store failure surfaces as [`VerifyError::Store`], never as a
//! `NotFound` report, so a verifier cannot mistake an outage for a
//! fraudulent certificate.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use acr_core::{
    CertificateNumber, LedgerReference, Timestamp, VerificationCode,
};

use crate::audit::{CallerInfo, LookupMethod, VerificationAttempt, VerificationOutcome};
use crate::credential::{Credential, CredentialStatus, ProgramType};
use crate::store::{CredentialStore, StoreError};

/// Errors from verification.
///
/// Business outcomes (not found, revoked, suspended) are report branches,
/// not errors; only infrastructure failure lands here.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The store failed before or during the lookup, or the audit append
    /// failed. The caller must treat this as "system unavailable", not as
    /// any statement about the credential.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A verification lookup, as received from the caller.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// By verification code (raw user input; normalized here).
    Code(String),
    /// By certificate number (raw user input; normalized here).
    Number(String),
}

impl Lookup {
    fn method(&self) -> LookupMethod {
        match self {
            Self::Code(_) => LookupMethod::ByCode,
            Self::Number(_) => LookupMethod::ByNumber,
        }
    }

    fn raw(&self) -> &str {
        match self {
            Self::Code(s) | Self::Number(s) => s,
        }
    }
}

/// The public view of a credential, as exposed to verifiers.
///
/// Internal identifiers and issuer details stay out; what remains is what
/// a certificate shows plus the integrity digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialView {
    pub certificate_no: String,
    pub verification_code: String,
    pub student_name: String,
    pub program_name: String,
    pub program_type: ProgramType,
    pub class_of_degree: Option<String>,
    pub cgpa: Option<String>,
    pub graduation_date: NaiveDate,
    pub institution_code: String,
    pub data_hash: String,
    pub issued_at: Timestamp,
}

impl CredentialView {
    fn of(c: &Credential) -> Self {
        Self {
            certificate_no: c.certificate_no.as_str().to_string(),
            verification_code: c.verification_code.as_str().to_string(),
            student_name: c.payload.student_name.clone(),
            program_name: c.payload.program_name.clone(),
            program_type: c.payload.program_type,
            class_of_degree: c.payload.class_of_degree.clone(),
            cgpa: c.payload.cgpa.clone(),
            graduation_date: c.payload.graduation_date,
            institution_code: c.payload.institution_code.clone(),
            data_hash: c.data_hash.to_hex(),
            issued_at: c.created_at,
        }
    }
}

/// The outcome of a verification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationReport {
    /// The credential exists and is active.
    Valid {
        credential: CredentialView,
        /// Whether the content digest is confirmed on the ledger.
        ledger_verified: bool,
        /// The anchoring transaction reference, when confirmed.
        ledger_reference: Option<LedgerReference>,
    },
    /// The credential exists but is suspended pending review.
    Invalid {
        /// Human-readable explanation.
        message: String,
    },
    /// The credential was revoked.
    Revoked {
        credential: CredentialView,
        reason: Option<String>,
        revoked_at: Option<Timestamp>,
    },
    /// No credential matches the lookup.
    NotFound,
}

impl VerificationReport {
    /// Whether this report attests a currently valid credential.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    fn outcome(&self) -> VerificationOutcome {
        match self {
            Self::Valid { .. } => VerificationOutcome::Valid,
            Self::Invalid { .. } => VerificationOutcome::Invalid,
            Self::Revoked { .. } => VerificationOutcome::Revoked,
            Self::NotFound => VerificationOutcome::NotFound,
        }
    }
}

/// The verification service.
#[derive(Clone)]
pub struct VerificationService {
    store: Arc<dyn CredentialStore>,
}

impl VerificationService {
    /// Build the service.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Verify a credential by code or number.
    ///
    /// Exactly one audit record is appended per call, whatever the
    /// outcome — NOT_FOUND lookups included, because probing for valid
    /// codes is precisely what abuse monitoring wants to see.
    pub async fn verify(
        &self,
        lookup: Lookup,
        caller: CallerInfo,
    ) -> Result<VerificationReport, VerifyError> {
        let method = lookup.method();
        let normalized = lookup.raw().trim().to_uppercase();

        let found = self.resolve(&lookup, &normalized).await?;

        let report = match &found {
            None => VerificationReport::NotFound,
            Some(c) => match c.status {
                CredentialStatus::Active => VerificationReport::Valid {
                    credential: CredentialView::of(c),
                    ledger_verified: c.ledger_verified(),
                    ledger_reference: c.ledger_reference.clone(),
                },
                CredentialStatus::Suspended => VerificationReport::Invalid {
                    message: "credential is suspended pending institutional review".into(),
                },
                CredentialStatus::Revoked => VerificationReport::Revoked {
                    credential: CredentialView::of(c),
                    reason: c.revoked_reason.clone(),
                    revoked_at: c.revoked_at,
                },
            },
        };

        let attempt = VerificationAttempt::record(
            found.as_ref().map(|c| c.id),
            method,
            normalized,
            report.outcome(),
            caller,
        );
        self.store.append_attempt(&attempt).await?;

        Ok(report)
    }

    /// Resolve the lookup to a credential, if any.
    ///
    /// A lookup value that does not even parse as a code or number is
    /// resolved to `None` — it cannot match anything, and the attempt is
    /// still worth logging.
    async fn resolve(
        &self,
        lookup: &Lookup,
        normalized: &str,
    ) -> Result<Option<Credential>, StoreError> {
        match lookup {
            Lookup::Code(_) => match VerificationCode::parse(normalized) {
                Ok(code) => self.store.credential_by_code(&code).await,
                Err(_) => Ok(None),
            },
            Lookup::Number(_) => match CertificateNumber::parse(normalized) {
                Ok(number) => self.store.credential_by_number(&number).await,
                Err(_) => Ok(None),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuance::tests::{fixture, request};
    use crate::issuance::IssuanceService;
    use crate::memory::MemoryStore;
    use acr_core::IssuerId;

    async fn issued() -> (Arc<MemoryStore>, Credential, IssuerId) {
        let f = fixture().await;
        let service = IssuanceService::new(f.store.clone(), None);
        let c = service.issue(request(&f)).await.unwrap();
        (f.store, c, f.issuer.id)
    }

    #[tokio::test]
    async fn fresh_credential_verifies_valid_by_code() {
        let (store, c, _) = issued().await;
        let service = VerificationService::new(store.clone());

        let report = service
            .verify(
                Lookup::Code(c.verification_code.as_str().to_string()),
                CallerInfo::default(),
            )
            .await
            .unwrap();

        match &report {
            VerificationReport::Valid {
                credential,
                ledger_verified,
                ..
            } => {
                assert_eq!(credential.student_name, "A. Bangura");
                assert_eq!(credential.program_name, "BSc CS");
                assert_eq!(credential.certificate_no, "USL-2024-00001");
                // No anchor client was configured; the credential is
                // valid regardless.
                assert!(!ledger_verified);
            }
            other => panic!("expected Valid, got {other:?}"),
        }
        assert!(report.is_valid());

        // Exactly one audit record, linked to the credential.
        let attempts = store.attempts_for_credential(c.id).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].outcome, VerificationOutcome::Valid);
        assert_eq!(attempts[0].method, LookupMethod::ByCode);
    }

    #[tokio::test]
    async fn lookup_is_case_and_whitespace_insensitive() {
        let (store, c, _) = issued().await;
        let service = VerificationService::new(store);

        let sloppy = format!("  {}  ", c.verification_code.as_str().to_lowercase());
        let report = service
            .verify(Lookup::Code(sloppy), CallerInfo::default())
            .await
            .unwrap();
        assert!(report.is_valid());
    }

    #[tokio::test]
    async fn verify_by_number() {
        let (store, c, _) = issued().await;
        let service = VerificationService::new(store);

        let report = service
            .verify(
                Lookup::Number(c.certificate_no.as_str().to_string()),
                CallerInfo::default(),
            )
            .await
            .unwrap();
        assert!(report.is_valid());
    }

    #[tokio::test]
    async fn never_issued_code_is_not_found_and_audited() {
        let (store, _, _) = issued().await;
        let service = VerificationService::new(store.clone());

        let report = service
            .verify(Lookup::Code("ZZZZZZZZZ".into()), CallerInfo::default())
            .await
            .unwrap();
        assert!(matches!(report, VerificationReport::NotFound));

        let attempts = store.all_attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].outcome, VerificationOutcome::NotFound);
        assert!(attempts[0].credential_id.is_none());
        assert_eq!(attempts[0].lookup_value, "ZZZZZZZZZ");
    }

    #[tokio::test]
    async fn malformed_code_is_not_found_not_an_error() {
        let (store, _, _) = issued().await;
        let service = VerificationService::new(store.clone());

        let report = service
            .verify(Lookup::Code("###".into()), CallerInfo::default())
            .await
            .unwrap();
        assert!(matches!(report, VerificationReport::NotFound));
        assert_eq!(store.all_attempts().len(), 1);
    }

    #[tokio::test]
    async fn suspended_reports_invalid() {
        let (store, c, _) = issued().await;

        let mut suspended = store.credential(c.id).await.unwrap().unwrap();
        suspended.suspend("records audit").unwrap();
        store.update_status(&suspended).await.unwrap();

        let service = VerificationService::new(store.clone());
        let report = service
            .verify(
                Lookup::Code(c.verification_code.as_str().to_string()),
                CallerInfo::default(),
            )
            .await
            .unwrap();

        match report {
            VerificationReport::Invalid { message } => {
                assert!(message.contains("review"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
        let attempts = store.attempts_for_credential(c.id).await.unwrap();
        assert_eq!(attempts[0].outcome, VerificationOutcome::Invalid);
    }

    #[tokio::test]
    async fn revoked_reports_reason_and_date() {
        let (store, c, issuer) = issued().await;

        let mut revoked = store.credential(c.id).await.unwrap().unwrap();
        revoked.revoke(issuer, "duplicate record").unwrap();
        store.update_status(&revoked).await.unwrap();

        let service = VerificationService::new(store.clone());
        let report = service
            .verify(
                Lookup::Code(c.verification_code.as_str().to_string()),
                CallerInfo::default(),
            )
            .await
            .unwrap();

        match report {
            VerificationReport::Revoked {
                reason, revoked_at, ..
            } => {
                assert_eq!(reason.as_deref(), Some("duplicate record"));
                assert!(revoked_at.is_some());
            }
            other => panic!("expected Revoked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn caller_metadata_lands_in_the_audit_trail() {
        let (store, c, _) = issued().await;
        let service = VerificationService::new(store.clone());

        service
            .verify(
                Lookup::Code(c.verification_code.as_str().to_string()),
                CallerInfo {
                    ip: Some("203.0.113.9".into()),
                    user_agent: Some("verifier-bot/1.0".into()),
                    organization: Some("Employer Ltd".into()),
                },
            )
            .await
            .unwrap();

        let attempts = store.attempts_for_credential(c.id).await.unwrap();
        assert_eq!(attempts[0].caller.ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(
            attempts[0].caller.organization.as_deref(),
            Some("Employer Ltd")
        );
    }

    #[tokio::test]
    async fn every_call_appends_exactly_one_attempt() {
        let (store, c, _) = issued().await;
        let service = VerificationService::new(store.clone());

        for _ in 0..3 {
            service
                .verify(
                    Lookup::Code(c.verification_code.as_str().to_string()),
                    CallerInfo::default(),
                )
                .await
                .unwrap();
        }
        service
            .verify(Lookup::Code("ZZZZZZZZZ".into()), CallerInfo::default())
            .await
            .unwrap();

        assert_eq!(store.all_attempts().len(), 4);
    }

    #[tokio::test]
    async fn report_serializes_with_status_tag() {
        let (store, c, _) = issued().await;
        let service = VerificationService::new(store);

        let report = service
            .verify(
                Lookup::Code(c.verification_code.as_str().to_string()),
                CallerInfo::default(),
            )
            .await
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "VALID");
        assert_eq!(json["ledger_verified"], false);

        let not_found = serde_json::to_value(VerificationReport::NotFound).unwrap();
        assert_eq!(not_found["status"], "NOT_FOUND");
    }
}
