//! # Issuance service
//!
//! Orchestrates the creation of a credential: validation, authorization,
//! identifier assignment, digest computation, persistence, and the
//! hand-off to ledger anchoring.
//!
//! ## Anchoring is not a correctness gate
//!
//! The anchoring submission runs on a detached task spawned after the
//! credential is persisted. `issue()` returns as soon as the record is
//! durable — a slow or dead ledger gateway cannot delay or fail issuance.
//! The task writes exactly one terminal status back (`Confirmed` with the
//! transaction reference, or `Failed`), bounded by a deadline, and its
//! failure is logged rather than propagated. A credential whose anchor
//! failed is still fully valid and verifiable; the `Failed` status is an
//! operator signal, not a defect in the credential.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use acr_core::{CredentialId, InstitutionId, IssuerId};
use acr_ledger::{AnchorClient, AnchorSubmission, LedgerError};

use crate::codes::{self, CodeError};
use crate::credential::{AnchorStatus, Credential, CredentialPayload, ProgramType};
use crate::graduation::{parse_cgpa_hundredths, GraduationError, GraduationStatus};
use crate::store::{CredentialStore, StoreError};

/// Overall deadline for one anchoring attempt, including the gateway's
/// own confirmation wait.
const ANCHOR_DEADLINE: Duration = Duration::from_secs(45);

/// Errors from credential issuance.
#[derive(Error, Debug)]
pub enum IssueError {
    /// The named institution does not exist.
    #[error("institution {0} not found")]
    InstitutionNotFound(InstitutionId),

    /// The issuer may not issue for this institution (unknown issuer,
    /// wrong institution, missing capability, or inactive institution).
    #[error("issuer not authorized: {reason}")]
    IssuerNotAuthorized {
        /// Why authorization failed.
        reason: String,
    },

    /// Identifier uniqueness retries were exhausted. Distinct from
    /// validation so callers know a retry of the same request may succeed.
    #[error("could not assign a unique identifier: {reason}")]
    DuplicateIdentifier {
        /// Which identifier and why.
        reason: String,
    },

    /// The request payload is structurally invalid.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The graduation request is not in a certifiable state.
    #[error(transparent)]
    Graduation(#[from] GraduationError),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A request to issue a credential.
///
/// Institution identity arrives as the id only; the short code used in the
/// certificate number and the hashed payload is read from the institution
/// record, not trusted from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
    pub institution_id: InstitutionId,
    pub issuer_id: IssuerId,
    pub student_name: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub national_id: Option<String>,
    pub program_name: String,
    pub program_type: ProgramType,
    #[serde(default)]
    pub class_of_degree: Option<String>,
    #[serde(default)]
    pub cgpa: Option<String>,
    pub graduation_date: NaiveDate,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_metadata")]
    pub metadata: serde_json::Value,
}

fn default_metadata() -> serde_json::Value {
    serde_json::json!({})
}

/// The issuance service.
///
/// Cheap to clone; holds only `Arc`s. The anchor client is optional — a
/// registry without a configured gateway issues credentials that simply
/// stay `Pending`.
#[derive(Clone)]
pub struct IssuanceService {
    store: Arc<dyn CredentialStore>,
    anchor: Option<Arc<dyn AnchorClient>>,
}

impl IssuanceService {
    /// Build the service.
    pub fn new(store: Arc<dyn CredentialStore>, anchor: Option<Arc<dyn AnchorClient>>) -> Self {
        Self { store, anchor }
    }

    /// Issue a credential.
    ///
    /// On success the credential is persisted with `status = ACTIVE` and
    /// `anchor_status = PENDING`, and an anchoring task has been spawned.
    /// The returned record reflects the state at persistence time; the
    /// anchor outcome lands in the store later.
    pub async fn issue(&self, request: IssueRequest) -> Result<Credential, IssueError> {
        validate(&request)?;

        let institution = self
            .store
            .institution(request.institution_id)
            .await?
            .ok_or(IssueError::InstitutionNotFound(request.institution_id))?;
        if !institution.active {
            return Err(IssueError::IssuerNotAuthorized {
                reason: format!("institution {} is not active", institution.code),
            });
        }

        let issuer = self
            .store
            .issuer(request.issuer_id)
            .await?
            .ok_or_else(|| IssueError::IssuerNotAuthorized {
                reason: format!("unknown issuer {}", request.issuer_id),
            })?;
        if !issuer.may_issue_for(institution.id) {
            return Err(IssueError::IssuerNotAuthorized {
                reason: format!(
                    "issuer {} lacks the issue capability for institution {}",
                    issuer.id, institution.code
                ),
            });
        }

        let year = request.graduation_date.year();
        let year = u16::try_from(year)
            .map_err(|_| IssueError::ValidationFailed(format!("graduation year {year} out of range")))?;

        let certificate_no = codes::assign_certificate_number(
            self.store.as_ref(),
            institution.id,
            &institution.code,
            year,
        )
        .await?;

        let verification_code = codes::generate_verification_code(self.store.as_ref())
            .await
            .map_err(|e| match e {
                CodeError::Exhausted { attempts } => IssueError::DuplicateIdentifier {
                    reason: format!("verification code draws exhausted after {attempts} attempts"),
                },
                CodeError::Store(e) => IssueError::Store(e),
            })?;

        let payload = CredentialPayload {
            student_name: request.student_name,
            student_id: request.student_id,
            date_of_birth: request.date_of_birth,
            national_id: request.national_id,
            program_name: request.program_name,
            program_type: request.program_type,
            class_of_degree: request.class_of_degree,
            cgpa: request.cgpa,
            graduation_date: request.graduation_date,
            start_date: request.start_date,
            end_date: request.end_date,
            metadata: request.metadata,
            institution_code: institution.code.clone(),
            institution_id: institution.id,
        };

        let credential = Credential::issue(
            CredentialId::new(),
            certificate_no,
            verification_code,
            payload,
            issuer.id,
        )
        .map_err(|e| IssueError::ValidationFailed(e.to_string()))?;

        self.store
            .insert_credential(&credential)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate { constraint } => IssueError::DuplicateIdentifier {
                    reason: format!("insert hit unique constraint {constraint}"),
                },
                other => IssueError::Store(other),
            })?;

        tracing::info!(
            credential_id = %credential.id,
            certificate_no = %credential.certificate_no,
            institution = %institution.code,
            "credential issued"
        );

        self.spawn_anchor_task(&credential);

        Ok(credential)
    }

    /// Issue the credential for an approved graduation request and mark
    /// the request certified, linking the two.
    pub async fn issue_for_graduation(
        &self,
        request_id: acr_core::GraduationRequestId,
        request: IssueRequest,
    ) -> Result<Credential, IssueError> {
        let mut graduation = self
            .store
            .graduation_request(request_id)
            .await?
            .ok_or_else(|| IssueError::Store(StoreError::MissingRecord {
                what: format!("graduation request {request_id}"),
            }))?;

        if graduation.status != GraduationStatus::Approved {
            return Err(GraduationError::InvalidTransition {
                from: graduation.status,
                to: GraduationStatus::Certified,
            }
            .into());
        }

        let credential = self.issue(request).await?;

        graduation.certify(credential.id)?;
        self.store.update_graduation_request(&graduation).await?;

        Ok(credential)
    }

    /// Spawn the detached anchoring task for a freshly issued credential.
    ///
    /// Without a configured anchor client this is a no-op and the
    /// credential stays `Pending`.
    fn spawn_anchor_task(&self, credential: &Credential) {
        let Some(client) = self.anchor.clone() else {
            tracing::debug!(
                credential_id = %credential.id,
                "no anchor gateway configured, credential stays PENDING"
            );
            return;
        };

        let store = self.store.clone();
        let id = credential.id;
        let submission = AnchorSubmission {
            digest: credential.data_hash,
            certificate_no: credential.certificate_no.as_str().to_string(),
            institution_code: credential.payload.institution_code.clone(),
        };

        tokio::spawn(async move {
            anchor_and_record(store, client, id, submission).await;
        });
    }
}

/// Run one anchoring attempt and record its terminal outcome.
///
/// This is the entire anchoring contract: bounded by [`ANCHOR_DEADLINE`],
/// one store write on completion, errors logged and swallowed. The store
/// guards against a late write racing a previous resolution.
async fn anchor_and_record(
    store: Arc<dyn CredentialStore>,
    client: Arc<dyn AnchorClient>,
    id: CredentialId,
    submission: AnchorSubmission,
) {
    let result = tokio::time::timeout(ANCHOR_DEADLINE, client.submit_anchor(&submission)).await;

    let (outcome, reference) = match result {
        Ok(Ok(receipt)) => {
            tracing::info!(
                credential_id = %id,
                signature = %receipt.signature,
                slot = receipt.slot,
                "anchor confirmed"
            );
            (
                AnchorStatus::Confirmed,
                Some(acr_core::LedgerReference(receipt.signature)),
            )
        }
        Ok(Err(e)) => {
            log_anchor_failure(id, &e);
            (AnchorStatus::Failed, None)
        }
        Err(_elapsed) => {
            tracing::warn!(
                credential_id = %id,
                deadline_secs = ANCHOR_DEADLINE.as_secs(),
                "anchor attempt exceeded deadline"
            );
            (AnchorStatus::Failed, None)
        }
    };

    match store.resolve_anchor(id, outcome, reference).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(
                credential_id = %id,
                "anchor outcome discarded: a terminal status was already recorded"
            );
        }
        Err(e) => {
            tracing::error!(
                credential_id = %id,
                error = %e,
                "failed to record anchor outcome"
            );
        }
    }
}

fn log_anchor_failure(id: CredentialId, e: &LedgerError) {
    match e {
        LedgerError::Timeout { .. } | LedgerError::Unavailable { .. } => {
            tracing::warn!(credential_id = %id, error = %e, "anchor submission failed");
        }
        other => {
            tracing::error!(credential_id = %id, error = %other, "anchor submission rejected");
        }
    }
}

/// Structural validation of an issue request.
fn validate(request: &IssueRequest) -> Result<(), IssueError> {
    let fail = |msg: String| Err(IssueError::ValidationFailed(msg));

    if request.student_name.trim().is_empty() {
        return fail("student_name must not be empty".into());
    }
    if request.student_name.len() > 255 {
        return fail("student_name must not exceed 255 characters".into());
    }
    if request.program_name.trim().is_empty() {
        return fail("program_name must not be empty".into());
    }
    if request.program_name.len() > 255 {
        return fail("program_name must not exceed 255 characters".into());
    }
    if let Some(cgpa) = &request.cgpa {
        parse_cgpa_hundredths(cgpa).map_err(|e| IssueError::ValidationFailed(e.to_string()))?;
    }
    if !request.metadata.is_object() {
        return fail("metadata must be a JSON object".into());
    }
    if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
        if end < start {
            return fail("end_date precedes start_date".into());
        }
    }
    let year = request.graduation_date.year();
    if !(1950..=2100).contains(&year) {
        return fail(format!("graduation year {year} out of range"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::credential::CredentialStatus;
    use crate::institution::{Institution, Issuer};
    use crate::memory::MemoryStore;
    use acr_ledger::{MockAnchorClient, MockFailure};

    pub(crate) struct Fixture {
        pub store: Arc<MemoryStore>,
        pub institution: Institution,
        pub issuer: Issuer,
    }

    pub(crate) async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let institution = Institution {
            id: InstitutionId::new(),
            code: "USL".into(),
            name: "University of Sierra Leone".into(),
            active: true,
        };
        let issuer = Issuer {
            id: IssuerId::new(),
            institution_id: institution.id,
            display_name: "Registrar".into(),
            can_issue: true,
            can_revoke: true,
        };
        store.put_institution(institution.clone()).await.unwrap();
        store.put_issuer(issuer.clone()).await.unwrap();
        Fixture {
            store,
            institution,
            issuer,
        }
    }

    pub(crate) fn request(f: &Fixture) -> IssueRequest {
        IssueRequest {
            institution_id: f.institution.id,
            issuer_id: f.issuer.id,
            student_name: "A. Bangura".into(),
            student_id: None,
            date_of_birth: None,
            national_id: None,
            program_name: "BSc CS".into(),
            program_type: ProgramType::Bachelors,
            class_of_degree: None,
            cgpa: Some("3.42".into()),
            graduation_date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            start_date: None,
            end_date: None,
            metadata: serde_json::json!({}),
        }
    }

    /// Poll the store until the anchor status leaves `Pending`.
    pub(crate) async fn wait_for_anchor(
        store: &MemoryStore,
        id: CredentialId,
    ) -> Credential {
        for _ in 0..100 {
            let c = store.credential(id).await.unwrap().unwrap();
            if c.anchor_status.is_terminal() {
                return c;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("anchor task did not resolve in time");
    }

    #[tokio::test]
    async fn first_issuance_of_the_year_is_sequence_one() {
        let f = fixture().await;
        let service = IssuanceService::new(f.store.clone(), None);

        let c = service.issue(request(&f)).await.unwrap();
        assert_eq!(c.certificate_no.as_str(), "USL-2024-00001");
        assert_eq!(c.verification_code.as_str().len(), 9);
        assert_eq!(c.status, CredentialStatus::Active);
        assert_eq!(c.anchor_status, AnchorStatus::Pending);

        let second = service.issue(request(&f)).await.unwrap();
        assert_eq!(second.certificate_no.as_str(), "USL-2024-00002");
    }

    #[tokio::test]
    async fn anchoring_confirms_in_the_background() {
        let f = fixture().await;
        let mock = Arc::new(MockAnchorClient::new());
        let service = IssuanceService::new(f.store.clone(), Some(mock.clone()));

        let c = service.issue(request(&f)).await.unwrap();
        // The caller sees PENDING; the task resolves it afterwards.
        assert_eq!(c.anchor_status, AnchorStatus::Pending);

        let resolved = wait_for_anchor(&f.store, c.id).await;
        assert_eq!(resolved.anchor_status, AnchorStatus::Confirmed);
        assert!(resolved.ledger_reference.is_some());
        assert_eq!(mock.submissions().len(), 1);
        assert_eq!(mock.submissions()[0].digest, c.data_hash);
    }

    #[tokio::test]
    async fn anchor_failure_does_not_fail_issuance() {
        let f = fixture().await;
        let mock = Arc::new(MockAnchorClient::failing(MockFailure::Unavailable));
        let service = IssuanceService::new(f.store.clone(), Some(mock));

        let c = service.issue(request(&f)).await.unwrap();
        let resolved = wait_for_anchor(&f.store, c.id).await;
        assert_eq!(resolved.anchor_status, AnchorStatus::Failed);
        assert!(resolved.ledger_reference.is_none());
        // The credential itself is untouched.
        assert_eq!(resolved.status, CredentialStatus::Active);
    }

    #[tokio::test]
    async fn unknown_institution_is_rejected() {
        let f = fixture().await;
        let service = IssuanceService::new(f.store.clone(), None);

        let mut req = request(&f);
        req.institution_id = InstitutionId::new();
        assert!(matches!(
            service.issue(req).await.unwrap_err(),
            IssueError::InstitutionNotFound(_)
        ));
    }

    #[tokio::test]
    async fn inactive_institution_is_rejected() {
        let f = fixture().await;
        let mut inactive = f.institution.clone();
        inactive.active = false;
        f.store.put_institution(inactive).await.unwrap();

        let service = IssuanceService::new(f.store.clone(), None);
        assert!(matches!(
            service.issue(request(&f)).await.unwrap_err(),
            IssueError::IssuerNotAuthorized { .. }
        ));
    }

    #[tokio::test]
    async fn issuer_without_capability_is_rejected() {
        let f = fixture().await;
        let mut clerk = f.issuer.clone();
        clerk.id = IssuerId::new();
        clerk.can_issue = false;
        f.store.put_issuer(clerk.clone()).await.unwrap();

        let service = IssuanceService::new(f.store.clone(), None);
        let mut req = request(&f);
        req.issuer_id = clerk.id;
        assert!(matches!(
            service.issue(req).await.unwrap_err(),
            IssueError::IssuerNotAuthorized { .. }
        ));
    }

    #[tokio::test]
    async fn issuer_of_another_institution_is_rejected() {
        let f = fixture().await;
        let other = Institution {
            id: InstitutionId::new(),
            code: "NJU".into(),
            name: "Njala University".into(),
            active: true,
        };
        let outsider = Issuer {
            id: IssuerId::new(),
            institution_id: other.id,
            display_name: "Registrar".into(),
            can_issue: true,
            can_revoke: true,
        };
        f.store.put_institution(other).await.unwrap();
        f.store.put_issuer(outsider.clone()).await.unwrap();

        let service = IssuanceService::new(f.store.clone(), None);
        let mut req = request(&f);
        req.issuer_id = outsider.id;
        assert!(matches!(
            service.issue(req).await.unwrap_err(),
            IssueError::IssuerNotAuthorized { .. }
        ));
    }

    #[tokio::test]
    async fn validation_rejects_bad_requests() {
        let f = fixture().await;
        let service = IssuanceService::new(f.store.clone(), None);

        let mut blank_name = request(&f);
        blank_name.student_name = "  ".into();
        assert!(matches!(
            service.issue(blank_name).await.unwrap_err(),
            IssueError::ValidationFailed(_)
        ));

        let mut bad_cgpa = request(&f);
        bad_cgpa.cgpa = Some("5.50".into());
        assert!(matches!(
            service.issue(bad_cgpa).await.unwrap_err(),
            IssueError::ValidationFailed(_)
        ));

        let mut bad_dates = request(&f);
        bad_dates.start_date = NaiveDate::from_ymd_opt(2023, 9, 1);
        bad_dates.end_date = NaiveDate::from_ymd_opt(2020, 6, 1);
        assert!(matches!(
            service.issue(bad_dates).await.unwrap_err(),
            IssueError::ValidationFailed(_)
        ));

        let mut bad_metadata = request(&f);
        bad_metadata.metadata = serde_json::json!("free text");
        assert!(matches!(
            service.issue(bad_metadata).await.unwrap_err(),
            IssueError::ValidationFailed(_)
        ));

        // Nothing was persisted along the way.
        assert_eq!(f.store.credential_count(), 0);
    }

    #[tokio::test]
    async fn float_metadata_is_rejected_before_persist() {
        let f = fixture().await;
        let service = IssuanceService::new(f.store.clone(), None);

        let mut req = request(&f);
        req.metadata = serde_json::json!({"gpa_raw": 3.42});
        assert!(matches!(
            service.issue(req).await.unwrap_err(),
            IssueError::ValidationFailed(_)
        ));
        assert_eq!(f.store.credential_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_issuance_yields_distinct_identifiers() {
        use std::collections::HashSet;

        let f = fixture().await;
        let service = IssuanceService::new(f.store.clone(), None);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let service = service.clone();
            let req = request(&f);
            handles.push(tokio::spawn(async move { service.issue(req).await.unwrap() }));
        }

        let mut numbers = HashSet::new();
        let mut codes = HashSet::new();
        for h in handles {
            let c = h.await.unwrap();
            assert!(numbers.insert(c.certificate_no.as_str().to_string()));
            assert!(codes.insert(c.verification_code.as_str().to_string()));
        }
        assert_eq!(numbers.len(), 32);
        // Sequences are gapless 1..=32.
        for seq in 1..=32 {
            assert!(numbers.contains(&format!("USL-2024-{seq:05}")));
        }
    }

    #[tokio::test]
    async fn graduation_certification_links_the_credential() {
        use crate::graduation::GraduationRequest;
        use acr_core::EnrollmentId;

        let f = fixture().await;
        let service = IssuanceService::new(f.store.clone(), None);

        let mut graduation = GraduationRequest::new(
            EnrollmentId::new(),
            132,
            "3.42".into(),
            "Second Class Upper".into(),
        )
        .unwrap();
        f.store.insert_graduation_request(&graduation).await.unwrap();
        graduation.approve().unwrap();
        f.store.update_graduation_request(&graduation).await.unwrap();

        let c = service
            .issue_for_graduation(graduation.id, request(&f))
            .await
            .unwrap();

        let stored = f
            .store
            .graduation_request(graduation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, GraduationStatus::Certified);
        assert_eq!(stored.credential_id, Some(c.id));
    }

    #[tokio::test]
    async fn certification_requires_an_approved_request() {
        use crate::graduation::GraduationRequest;
        use acr_core::EnrollmentId;

        let f = fixture().await;
        let service = IssuanceService::new(f.store.clone(), None);

        let graduation = GraduationRequest::new(
            EnrollmentId::new(),
            132,
            "3.42".into(),
            "Second Class Upper".into(),
        )
        .unwrap();
        f.store.insert_graduation_request(&graduation).await.unwrap();

        // Still PENDING — certification must be rejected and no
        // credential issued.
        let err = service
            .issue_for_graduation(graduation.id, request(&f))
            .await
            .unwrap_err();
        assert!(matches!(err, IssueError::Graduation(_)));
        assert_eq!(f.store.credential_count(), 0);
    }
}
