//! # Store abstraction
//!
//! The registry's durable state lives behind [`CredentialStore`]. The
//! trait models a transactional record store with unique-constraint
//! support — which is all the domain layer relies on. The in-memory
//! implementation ([`crate::MemoryStore`]) backs tests and single-node
//! deployments; the API crate adds Postgres write-through on top.
//!
//! Two operations carry the registry's concurrency load and are required
//! to be atomic:
//!
//! - [`CredentialStore::next_certificate_sequence`] — a fetch-and-increment
//!   per (institution, year). Deriving the sequence from a count query and
//!   writing the result back is racy under concurrent issuance and must
//!   not be how an implementation behaves.
//! - [`CredentialStore::insert_credential`] — uniqueness of the
//!   verification code and certificate number is enforced at insert time
//!   ([`StoreError::Duplicate`]), not by a prior existence check alone.

use async_trait::async_trait;
use thiserror::Error;

use acr_core::{
    CertificateNumber, CredentialId, EnrollmentId, GraduationRequestId, InstitutionId, IssuerId,
    LedgerReference, VerificationCode,
};

use crate::audit::VerificationAttempt;
use crate::credential::{AnchorStatus, Credential};
use crate::graduation::GraduationRequest;
use crate::institution::{Institution, Issuer};

/// Errors surfaced by store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint was violated.
    #[error("unique constraint violated: {constraint}")]
    Duplicate {
        /// Which constraint, e.g. `credentials.verification_code`.
        constraint: String,
    },

    /// The record to update does not exist.
    #[error("no such record: {what}")]
    MissingRecord {
        /// Description of the missing record.
        what: String,
    },

    /// The store is unreachable or failed internally.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Backend diagnostic.
        reason: String,
    },
}

/// A transactional record store for the registry's durable state.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    // ── Authorization context ────────────────────────────────────────

    /// Insert or replace an institution record.
    async fn put_institution(&self, institution: Institution) -> Result<(), StoreError>;

    /// Fetch an institution by id.
    async fn institution(&self, id: InstitutionId) -> Result<Option<Institution>, StoreError>;

    /// Insert or replace an issuer record.
    async fn put_issuer(&self, issuer: Issuer) -> Result<(), StoreError>;

    /// Fetch an issuer by id.
    async fn issuer(&self, id: IssuerId) -> Result<Option<Issuer>, StoreError>;

    // ── Identifier assignment ────────────────────────────────────────

    /// Atomically claim the next certificate sequence number for an
    /// institution and graduation year. The first call for a pair
    /// returns 1.
    async fn next_certificate_sequence(
        &self,
        institution: InstitutionId,
        year: u16,
    ) -> Result<u64, StoreError>;

    /// Whether a verification code is already taken.
    async fn verification_code_exists(
        &self,
        code: &VerificationCode,
    ) -> Result<bool, StoreError>;

    // ── Credentials ──────────────────────────────────────────────────

    /// Insert a new credential, enforcing uniqueness of both public
    /// identifiers.
    async fn insert_credential(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Fetch a credential by internal id.
    async fn credential(&self, id: CredentialId) -> Result<Option<Credential>, StoreError>;

    /// Fetch a credential by verification code.
    async fn credential_by_code(
        &self,
        code: &VerificationCode,
    ) -> Result<Option<Credential>, StoreError>;

    /// Fetch a credential by certificate number.
    async fn credential_by_number(
        &self,
        number: &CertificateNumber,
    ) -> Result<Option<Credential>, StoreError>;

    /// Write back a credential's lifecycle state: `status`, the
    /// revocation fields, and the transition log.
    ///
    /// Deliberately narrow — the anchor fields are owned by
    /// [`CredentialStore::resolve_anchor`], so a status write racing the
    /// anchoring task's write-back cannot clobber it (each touches its
    /// own columns).
    async fn update_status(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Record the terminal outcome of anchoring for a credential.
    ///
    /// Applies the write only when the stored anchor status is still
    /// `Pending`; returns `false` (without writing) when a terminal status
    /// is already recorded, so a stray late or duplicate resolution can
    /// never overwrite the first one.
    async fn resolve_anchor(
        &self,
        id: CredentialId,
        outcome: AnchorStatus,
        reference: Option<LedgerReference>,
    ) -> Result<bool, StoreError>;

    // ── Audit trail ──────────────────────────────────────────────────

    /// Append a verification attempt. The log is insert-only.
    async fn append_attempt(&self, attempt: &VerificationAttempt) -> Result<(), StoreError>;

    /// All attempts that resolved to a given credential, oldest first.
    async fn attempts_for_credential(
        &self,
        id: CredentialId,
    ) -> Result<Vec<VerificationAttempt>, StoreError>;

    // ── Graduation requests ──────────────────────────────────────────

    /// Insert a graduation request, enforcing at most one per enrollment.
    async fn insert_graduation_request(
        &self,
        request: &GraduationRequest,
    ) -> Result<(), StoreError>;

    /// Fetch a graduation request by id.
    async fn graduation_request(
        &self,
        id: GraduationRequestId,
    ) -> Result<Option<GraduationRequest>, StoreError>;

    /// Fetch the graduation request for an enrollment, if one exists.
    async fn graduation_request_by_enrollment(
        &self,
        enrollment: EnrollmentId,
    ) -> Result<Option<GraduationRequest>, StoreError>;

    /// Replace an existing graduation request (review transitions).
    async fn update_graduation_request(
        &self,
        request: &GraduationRequest,
    ) -> Result<(), StoreError>;
}
