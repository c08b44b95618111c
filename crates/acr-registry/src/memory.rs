//! # In-memory store
//!
//! [`MemoryStore`] implements [`CredentialStore`] over `DashMap`s. It is
//! the system of record for tests and single-node deployments; the API
//! crate layers optional Postgres write-through on top of it.
//!
//! Uniqueness of the public identifiers is enforced through dedicated
//! index maps using the `DashMap` entry API, so a concurrent duplicate
//! insert loses at the entry lock rather than slipping past a
//! check-then-insert window. Sequence numbers use the same entry-level
//! exclusivity for an atomic fetch-and-increment.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use async_trait::async_trait;

use acr_core::{
    CertificateNumber, CredentialId, EnrollmentId, GraduationRequestId, InstitutionId, IssuerId,
    LedgerReference, VerificationCode,
};

use crate::audit::VerificationAttempt;
use crate::credential::{AnchorStatus, Credential};
use crate::graduation::GraduationRequest;
use crate::institution::{Institution, Issuer};
use crate::store::{CredentialStore, StoreError};

/// An in-memory [`CredentialStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    institutions: DashMap<Uuid, Institution>,
    issuers: DashMap<Uuid, Issuer>,
    credentials: DashMap<Uuid, Credential>,
    by_code: DashMap<String, CredentialId>,
    by_number: DashMap<String, CredentialId>,
    sequences: DashMap<(Uuid, u16), u64>,
    attempts: Mutex<Vec<VerificationAttempt>>,
    graduation_requests: DashMap<Uuid, GraduationRequest>,
    by_enrollment: DashMap<Uuid, GraduationRequestId>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of credentials held (test helper).
    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    /// Snapshot of the full audit log, oldest first (test helper).
    pub fn all_attempts(&self) -> Vec<VerificationAttempt> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn put_institution(&self, institution: Institution) -> Result<(), StoreError> {
        self.institutions.insert(*institution.id.as_uuid(), institution);
        Ok(())
    }

    async fn institution(&self, id: InstitutionId) -> Result<Option<Institution>, StoreError> {
        Ok(self.institutions.get(id.as_uuid()).map(|r| r.clone()))
    }

    async fn put_issuer(&self, issuer: Issuer) -> Result<(), StoreError> {
        self.issuers.insert(*issuer.id.as_uuid(), issuer);
        Ok(())
    }

    async fn issuer(&self, id: IssuerId) -> Result<Option<Issuer>, StoreError> {
        Ok(self.issuers.get(id.as_uuid()).map(|r| r.clone()))
    }

    async fn next_certificate_sequence(
        &self,
        institution: InstitutionId,
        year: u16,
    ) -> Result<u64, StoreError> {
        let mut entry = self
            .sequences
            .entry((*institution.as_uuid(), year))
            .or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    async fn verification_code_exists(
        &self,
        code: &VerificationCode,
    ) -> Result<bool, StoreError> {
        Ok(self.by_code.contains_key(code.as_str()))
    }

    async fn insert_credential(&self, credential: &Credential) -> Result<(), StoreError> {
        // Claim the code index first; on a number collision, release it
        // again so the record is not half-indexed.
        match self.by_code.entry(credential.verification_code.as_str().to_string()) {
            Entry::Occupied(_) => {
                return Err(StoreError::Duplicate {
                    constraint: "credentials.verification_code".into(),
                })
            }
            Entry::Vacant(e) => {
                e.insert(credential.id);
            }
        }
        match self.by_number.entry(credential.certificate_no.as_str().to_string()) {
            Entry::Occupied(_) => {
                self.by_code.remove(credential.verification_code.as_str());
                return Err(StoreError::Duplicate {
                    constraint: "credentials.certificate_no".into(),
                });
            }
            Entry::Vacant(e) => {
                e.insert(credential.id);
            }
        }
        self.credentials.insert(*credential.id.as_uuid(), credential.clone());
        Ok(())
    }

    async fn credential(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        Ok(self.credentials.get(id.as_uuid()).map(|r| r.clone()))
    }

    async fn credential_by_code(
        &self,
        code: &VerificationCode,
    ) -> Result<Option<Credential>, StoreError> {
        let Some(id) = self.by_code.get(code.as_str()).map(|r| *r) else {
            return Ok(None);
        };
        self.credential(id).await
    }

    async fn credential_by_number(
        &self,
        number: &CertificateNumber,
    ) -> Result<Option<Credential>, StoreError> {
        let Some(id) = self.by_number.get(number.as_str()).map(|r| *r) else {
            return Ok(None);
        };
        self.credential(id).await
    }

    async fn update_status(&self, credential: &Credential) -> Result<(), StoreError> {
        let Some(mut entry) = self.credentials.get_mut(credential.id.as_uuid()) else {
            return Err(StoreError::MissingRecord {
                what: format!("credential {}", credential.id),
            });
        };
        // Lifecycle fields only — the anchor fields belong to
        // resolve_anchor() and must survive this write.
        entry.status = credential.status;
        entry.revoked_at = credential.revoked_at;
        entry.revoked_reason = credential.revoked_reason.clone();
        entry.revoked_by = credential.revoked_by;
        entry.transitions = credential.transitions.clone();
        Ok(())
    }

    async fn resolve_anchor(
        &self,
        id: CredentialId,
        outcome: AnchorStatus,
        reference: Option<LedgerReference>,
    ) -> Result<bool, StoreError> {
        let Some(mut entry) = self.credentials.get_mut(id.as_uuid()) else {
            return Err(StoreError::MissingRecord {
                what: format!("credential {id}"),
            });
        };
        match entry.resolve_anchor(outcome, reference) {
            Ok(()) => Ok(true),
            // Already terminal — the first resolution wins.
            Err(_) => Ok(false),
        }
    }

    async fn append_attempt(&self, attempt: &VerificationAttempt) -> Result<(), StoreError> {
        self.attempts.lock().push(attempt.clone());
        Ok(())
    }

    async fn attempts_for_credential(
        &self,
        id: CredentialId,
    ) -> Result<Vec<VerificationAttempt>, StoreError> {
        Ok(self
            .attempts
            .lock()
            .iter()
            .filter(|a| a.credential_id == Some(id))
            .cloned()
            .collect())
    }

    async fn insert_graduation_request(
        &self,
        request: &GraduationRequest,
    ) -> Result<(), StoreError> {
        match self.by_enrollment.entry(*request.enrollment_id.as_uuid()) {
            Entry::Occupied(_) => {
                return Err(StoreError::Duplicate {
                    constraint: "graduation_requests.enrollment_id".into(),
                })
            }
            Entry::Vacant(e) => {
                e.insert(request.id);
            }
        }
        self.graduation_requests
            .insert(*request.id.as_uuid(), request.clone());
        Ok(())
    }

    async fn graduation_request(
        &self,
        id: GraduationRequestId,
    ) -> Result<Option<GraduationRequest>, StoreError> {
        Ok(self.graduation_requests.get(id.as_uuid()).map(|r| r.clone()))
    }

    async fn graduation_request_by_enrollment(
        &self,
        enrollment: EnrollmentId,
    ) -> Result<Option<GraduationRequest>, StoreError> {
        let Some(id) = self.by_enrollment.get(enrollment.as_uuid()).map(|r| *r) else {
            return Ok(None);
        };
        self.graduation_request(id).await
    }

    async fn update_graduation_request(
        &self,
        request: &GraduationRequest,
    ) -> Result<(), StoreError> {
        match self.graduation_requests.entry(*request.id.as_uuid()) {
            Entry::Occupied(mut e) => {
                e.insert(request.clone());
                Ok(())
            }
            Entry::Vacant(_) => Err(StoreError::MissingRecord {
                what: format!("graduation request {}", request.id),
            }),
        }
    }
}
