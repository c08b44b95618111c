//! # Credential entity and lifecycle state machine
//!
//! Models an issued academic credential: its semantic payload, its content
//! digest, its ledger-anchoring state, and its lifecycle status.
//!
//! ## States
//!
//! ```text
//! Active ──▶ Suspended ──▶ Active (reinstatement)
//!    │            │
//!    ▼            ▼
//!       Revoked (terminal)
//! ```
//!
//! Anchoring runs on its own, smaller machine:
//!
//! ```text
//! Pending ──▶ Confirmed (terminal)
//!    │
//!    ▼
//!  Failed (terminal)
//! ```
//!
//! Both machines are one-way where it matters: `Revoked` has no exit, and
//! an anchor status never re-enters `Pending`. Transitions are validated
//! here, in the entity, so no caller can construct an illegal history. Each
//! applied transition appends a [`StatusTransitionRecord`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use acr_core::{
    CanonicalBytes, CanonicalizationError, CertificateNumber, CredentialDigest, CredentialId,
    InstitutionId, IssuerId, LedgerReference, Timestamp, VerificationCode,
};

/// The academic award level a credential attests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgramType {
    Certificate,
    Diploma,
    Associate,
    Bachelors,
    Masters,
    Doctorate,
    Professional,
}

impl ProgramType {
    /// Uppercase wire name, e.g. `BACHELORS`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certificate => "CERTIFICATE",
            Self::Diploma => "DIPLOMA",
            Self::Associate => "ASSOCIATE",
            Self::Bachelors => "BACHELORS",
            Self::Masters => "MASTERS",
            Self::Doctorate => "DOCTORATE",
            Self::Professional => "PROFESSIONAL",
        }
    }

    /// Parse the uppercase wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CERTIFICATE" => Some(Self::Certificate),
            "DIPLOMA" => Some(Self::Diploma),
            "ASSOCIATE" => Some(Self::Associate),
            "BACHELORS" => Some(Self::Bachelors),
            "MASTERS" => Some(Self::Masters),
            "DOCTORATE" => Some(Self::Doctorate),
            "PROFESSIONAL" => Some(Self::Professional),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProgramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStatus {
    /// Valid and verifiable.
    Active,
    /// Temporarily under review; verification reports it invalid pending
    /// resolution.
    Suspended,
    /// Permanently invalidated (terminal).
    Revoked,
}

impl CredentialStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Revoked => "REVOKED",
        };
        f.write_str(s)
    }
}

/// Ledger anchoring status of a credential's content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorStatus {
    /// Submission has not completed yet.
    Pending,
    /// The digest is confirmed on the ledger (terminal).
    Confirmed,
    /// Submission failed; left for operator follow-up (terminal).
    Failed,
}

impl AnchorStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for AnchorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Errors from credential status transitions.
#[derive(Error, Debug)]
pub enum StatusError {
    /// The requested transition is not valid from the current status.
    #[error("invalid credential transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: CredentialStatus,
        /// Attempted target status.
        to: CredentialStatus,
    },

    /// The credential is already revoked.
    #[error("credential {id} is already revoked")]
    AlreadyRevoked {
        /// The credential identifier.
        id: CredentialId,
    },

    /// The anchor status is already terminal.
    #[error("anchor status for credential {id} is already {current}, refusing {attempted}")]
    AnchorAlreadyResolved {
        /// The credential identifier.
        id: CredentialId,
        /// The terminal status already recorded.
        current: AnchorStatus,
        /// The status that was attempted.
        attempted: AnchorStatus,
    },
}

/// Record of one applied status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransitionRecord {
    /// Status before the transition.
    pub from: CredentialStatus,
    /// Status after the transition.
    pub to: CredentialStatus,
    /// When the transition was applied.
    pub at: Timestamp,
    /// Reason supplied by the actor.
    pub reason: String,
}

/// The semantic content of a credential — exactly the fields covered by
/// `data_hash`, nothing else.
///
/// Identifiers, timestamps, and lifecycle bookkeeping are deliberately
/// absent: they may be assigned or mutated after the hash is fixed.
/// Institution identity is included so identical transcripts issued by two
/// institutions never collide on the same digest.
///
/// `cgpa` is a fixed-point string with two decimals (`"3.85"`); canonical
/// serialization rejects floats, so a numeric CGPA cannot slip in and fork
/// the hash through float formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialPayload {
    pub student_name: String,
    pub student_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub national_id: Option<String>,
    pub program_name: String,
    pub program_type: ProgramType,
    pub class_of_degree: Option<String>,
    pub cgpa: Option<String>,
    pub graduation_date: NaiveDate,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Free-form institution-supplied metadata (honors, thesis title, …).
    pub metadata: serde_json::Value,
    /// Issuing institution short code, e.g. `USL`.
    pub institution_code: String,
    /// Issuing institution identifier.
    pub institution_id: InstitutionId,
}

impl CredentialPayload {
    /// Canonicalize the payload for digest computation.
    ///
    /// Absent optional fields serialize as explicit `null`s so the payload
    /// shape — and therefore the byte sequence — is stable across records.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// Compute the content digest anchored for this payload.
    pub fn digest(&self) -> Result<CredentialDigest, CanonicalizationError> {
        Ok(CredentialDigest::compute(&self.canonical_bytes()?))
    }
}

/// An issued academic credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Internal identifier.
    pub id: CredentialId,
    /// Human-readable certificate number (immutable).
    pub certificate_no: CertificateNumber,
    /// Public verification code (immutable).
    pub verification_code: VerificationCode,
    /// The hashed semantic content.
    pub payload: CredentialPayload,
    /// Content digest, computed once at issuance (immutable).
    pub data_hash: CredentialDigest,
    /// Lifecycle status.
    pub status: CredentialStatus,
    /// Ledger anchoring status.
    pub anchor_status: AnchorStatus,
    /// Ledger transaction reference, present once anchoring confirms.
    pub ledger_reference: Option<LedgerReference>,
    /// Issuing officer.
    pub issued_by: IssuerId,
    /// When the credential was issued.
    pub created_at: Timestamp,
    /// Set when revoked.
    pub revoked_at: Option<Timestamp>,
    /// Set when revoked.
    pub revoked_reason: Option<String>,
    /// Set when revoked.
    pub revoked_by: Option<IssuerId>,
    /// Ordered log of applied status transitions.
    pub transitions: Vec<StatusTransitionRecord>,
}

impl Credential {
    /// Assemble a freshly issued credential: `Active`, anchor `Pending`,
    /// digest computed from the payload.
    pub fn issue(
        id: CredentialId,
        certificate_no: CertificateNumber,
        verification_code: VerificationCode,
        payload: CredentialPayload,
        issued_by: IssuerId,
    ) -> Result<Self, CanonicalizationError> {
        let data_hash = payload.digest()?;
        Ok(Self {
            id,
            certificate_no,
            verification_code,
            payload,
            data_hash,
            status: CredentialStatus::Active,
            anchor_status: AnchorStatus::Pending,
            ledger_reference: None,
            issued_by,
            created_at: Timestamp::now(),
            revoked_at: None,
            revoked_reason: None,
            revoked_by: None,
            transitions: Vec::new(),
        })
    }

    /// The issuing institution.
    pub fn institution_id(&self) -> InstitutionId {
        self.payload.institution_id
    }

    /// Suspend an active credential (ACTIVE → SUSPENDED).
    pub fn suspend(&mut self, reason: &str) -> Result<(), StatusError> {
        self.transition(CredentialStatus::Active, CredentialStatus::Suspended, reason)
    }

    /// Reinstate a suspended credential (SUSPENDED → ACTIVE).
    pub fn reinstate(&mut self, reason: &str) -> Result<(), StatusError> {
        self.transition(CredentialStatus::Suspended, CredentialStatus::Active, reason)
    }

    /// Revoke the credential (ACTIVE | SUSPENDED → REVOKED, terminal).
    ///
    /// Revoking an already-revoked credential is rejected, not absorbed —
    /// the caller is telling us something we know to be false about the
    /// current state, and that deserves an error.
    pub fn revoke(
        &mut self,
        revoked_by: IssuerId,
        reason: &str,
    ) -> Result<(), StatusError> {
        if self.status == CredentialStatus::Revoked {
            return Err(StatusError::AlreadyRevoked { id: self.id });
        }
        let from = self.status;
        let at = Timestamp::now();
        self.transitions.push(StatusTransitionRecord {
            from,
            to: CredentialStatus::Revoked,
            at,
            reason: reason.to_string(),
        });
        self.status = CredentialStatus::Revoked;
        self.revoked_at = Some(at);
        self.revoked_reason = Some(reason.to_string());
        self.revoked_by = Some(revoked_by);
        Ok(())
    }

    /// Record the terminal outcome of the anchoring task.
    ///
    /// Exactly one terminal write is permitted: `Pending → Confirmed` or
    /// `Pending → Failed`. A second resolution — e.g. a retry path added
    /// later double-anchoring with a different reference — is rejected.
    pub fn resolve_anchor(
        &mut self,
        outcome: AnchorStatus,
        reference: Option<LedgerReference>,
    ) -> Result<(), StatusError> {
        if self.anchor_status.is_terminal() {
            return Err(StatusError::AnchorAlreadyResolved {
                id: self.id,
                current: self.anchor_status,
                attempted: outcome,
            });
        }
        debug_assert!(outcome.is_terminal(), "anchor resolution must be terminal");
        self.anchor_status = outcome;
        if outcome == AnchorStatus::Confirmed {
            self.ledger_reference = reference;
        }
        Ok(())
    }

    /// Whether the content digest is confirmed on the ledger.
    pub fn ledger_verified(&self) -> bool {
        self.anchor_status == AnchorStatus::Confirmed
    }

    fn transition(
        &mut self,
        expect: CredentialStatus,
        to: CredentialStatus,
        reason: &str,
    ) -> Result<(), StatusError> {
        if self.status == CredentialStatus::Revoked {
            return Err(StatusError::AlreadyRevoked { id: self.id });
        }
        if self.status != expect {
            return Err(StatusError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.transitions.push(StatusTransitionRecord {
            from: self.status,
            to,
            at: Timestamp::now(),
            reason: reason.to_string(),
        });
        self.status = to;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::{credential, payload};
    use super::*;

    #[test]
    fn issue_starts_active_and_pending() {
        let c = credential();
        assert_eq!(c.status, CredentialStatus::Active);
        assert_eq!(c.anchor_status, AnchorStatus::Pending);
        assert!(c.ledger_reference.is_none());
        assert!(c.transitions.is_empty());
        assert!(!c.ledger_verified());
    }

    #[test]
    fn data_hash_matches_payload_digest() {
        let c = credential();
        assert_eq!(c.data_hash, c.payload.digest().unwrap());
    }

    #[test]
    fn payload_digest_ignores_bookkeeping() {
        // Two credentials with identical payloads but different identifiers
        // and issuers hash identically — the digest covers content only.
        let institution_id = InstitutionId::new();
        let a = Credential::issue(
            CredentialId::new(),
            CertificateNumber::from_parts("USL", 2024, 1),
            VerificationCode::parse("ABCDEFGHJ").unwrap(),
            payload(institution_id),
            IssuerId::new(),
        )
        .unwrap();
        let b = Credential::issue(
            CredentialId::new(),
            CertificateNumber::from_parts("USL", 2024, 2),
            VerificationCode::parse("BCDEFGHJK").unwrap(),
            payload(institution_id),
            IssuerId::new(),
        )
        .unwrap();
        assert_eq!(a.data_hash, b.data_hash);
    }

    #[test]
    fn same_payload_different_institution_hashes_differently() {
        let a = payload(InstitutionId::new());
        let b = payload(InstitutionId::new());
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
    }

    #[test]
    fn float_cgpa_cannot_reach_the_digest() {
        let mut p = payload(InstitutionId::new());
        p.metadata = serde_json::json!({"gpa_raw": 3.42});
        assert!(p.digest().is_err());
    }

    #[test]
    fn suspend_then_reinstate() {
        let mut c = credential();
        c.suspend("records under review").unwrap();
        assert_eq!(c.status, CredentialStatus::Suspended);
        c.reinstate("review cleared").unwrap();
        assert_eq!(c.status, CredentialStatus::Active);
        assert_eq!(c.transitions.len(), 2);
        assert_eq!(c.transitions[0].to, CredentialStatus::Suspended);
        assert_eq!(c.transitions[1].to, CredentialStatus::Active);
    }

    #[test]
    fn suspend_twice_is_invalid() {
        let mut c = credential();
        c.suspend("review").unwrap();
        let err = c.suspend("again").unwrap_err();
        assert!(matches!(err, StatusError::InvalidTransition { .. }));
    }

    #[test]
    fn reinstate_active_is_invalid() {
        let mut c = credential();
        assert!(c.reinstate("nothing to reinstate").is_err());
    }

    #[test]
    fn revoke_from_active() {
        let mut c = credential();
        let revoker = IssuerId::new();
        c.revoke(revoker, "duplicate record").unwrap();
        assert_eq!(c.status, CredentialStatus::Revoked);
        assert_eq!(c.revoked_reason.as_deref(), Some("duplicate record"));
        assert_eq!(c.revoked_by, Some(revoker));
        assert!(c.revoked_at.is_some());
    }

    #[test]
    fn revoke_from_suspended() {
        let mut c = credential();
        c.suspend("review").unwrap();
        c.revoke(IssuerId::new(), "review upheld").unwrap();
        assert_eq!(c.status, CredentialStatus::Revoked);
    }

    #[test]
    fn revoked_is_terminal() {
        let mut c = credential();
        c.revoke(IssuerId::new(), "duplicate record").unwrap();

        assert!(matches!(
            c.revoke(IssuerId::new(), "again").unwrap_err(),
            StatusError::AlreadyRevoked { .. }
        ));
        assert!(c.suspend("no").is_err());
        assert!(c.reinstate("no").is_err());
    }

    #[test]
    fn revocation_does_not_touch_anchor_state() {
        let mut c = credential();
        c.resolve_anchor(
            AnchorStatus::Confirmed,
            Some(LedgerReference("5GqSig".into())),
        )
        .unwrap();
        c.revoke(IssuerId::new(), "duplicate record").unwrap();
        assert_eq!(c.anchor_status, AnchorStatus::Confirmed);
        assert!(c.ledger_reference.is_some());
    }

    #[test]
    fn anchor_confirm_stores_reference() {
        let mut c = credential();
        c.resolve_anchor(
            AnchorStatus::Confirmed,
            Some(LedgerReference("5GqSig".into())),
        )
        .unwrap();
        assert_eq!(c.anchor_status, AnchorStatus::Confirmed);
        assert_eq!(c.ledger_reference.as_ref().unwrap().as_str(), "5GqSig");
        assert!(c.ledger_verified());
    }

    #[test]
    fn anchor_failure_keeps_no_reference() {
        let mut c = credential();
        c.resolve_anchor(AnchorStatus::Failed, None).unwrap();
        assert_eq!(c.anchor_status, AnchorStatus::Failed);
        assert!(c.ledger_reference.is_none());
        assert!(!c.ledger_verified());
    }

    #[test]
    fn anchor_cannot_resolve_twice() {
        let mut c = credential();
        c.resolve_anchor(
            AnchorStatus::Confirmed,
            Some(LedgerReference("first".into())),
        )
        .unwrap();

        let err = c
            .resolve_anchor(
                AnchorStatus::Confirmed,
                Some(LedgerReference("second".into())),
            )
            .unwrap_err();
        assert!(matches!(err, StatusError::AnchorAlreadyResolved { .. }));
        // The first reference survives.
        assert_eq!(c.ledger_reference.as_ref().unwrap().as_str(), "first");
    }

    #[test]
    fn program_type_wire_names_roundtrip() {
        for pt in [
            ProgramType::Certificate,
            ProgramType::Diploma,
            ProgramType::Associate,
            ProgramType::Bachelors,
            ProgramType::Masters,
            ProgramType::Doctorate,
            ProgramType::Professional,
        ] {
            assert_eq!(ProgramType::parse(pt.as_str()), Some(pt));
        }
        assert_eq!(ProgramType::parse("PHD"), None);
    }

    #[test]
    fn serde_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&CredentialStatus::Active).unwrap(),
            "\"ACTIVE\""
        );
        assert_eq!(
            serde_json::to_string(&AnchorStatus::Pending).unwrap(),
            "\"PENDING\""
        );
    }

    #[test]
    fn credential_serde_roundtrip() {
        let c = credential();
        let json = serde_json::to_string(&c).unwrap();
        let back: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, c.id);
        assert_eq!(back.status, c.status);
        assert_eq!(back.data_hash, c.data_hash);
    }
}
