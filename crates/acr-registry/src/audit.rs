//! # Verification audit trail
//!
//! Every verification call — successful, failed, or aimed at a code that
//! was never issued — appends one [`VerificationAttempt`]. The log is
//! append-only: attempts are never mutated or deleted, which is what makes
//! it usable for abuse monitoring and forensic review.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use acr_core::{CredentialId, Timestamp};

/// How the caller looked the credential up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LookupMethod {
    /// By the 9-character verification code.
    ByCode,
    /// By the institution-scoped certificate number.
    ByNumber,
}

impl std::fmt::Display for LookupMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ByCode => "BY_CODE",
            Self::ByNumber => "BY_NUMBER",
        };
        f.write_str(s)
    }
}

/// The resolved outcome of a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationOutcome {
    /// The credential exists and is active.
    Valid,
    /// The credential exists but is not currently valid (suspended).
    Invalid,
    /// The credential was revoked.
    Revoked,
    /// No credential matches the lookup (malformed lookups land here too —
    /// a value outside the code format certainly matches nothing).
    NotFound,
}

impl std::fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
            Self::Revoked => "REVOKED",
            Self::NotFound => "NOT_FOUND",
        };
        f.write_str(s)
    }
}

/// Who asked. All fields optional — public verification requires nothing
/// from the caller, but what the transport layer can see is kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallerInfo {
    /// Remote address as reported by the transport.
    pub ip: Option<String>,
    /// User agent string.
    pub user_agent: Option<String>,
    /// Self-declared verifying organization, if supplied.
    pub organization: Option<String>,
}

/// One verification attempt, as appended to the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationAttempt {
    /// Attempt identifier.
    pub id: Uuid,
    /// The credential that was resolved, if any. `None` for NOT_FOUND —
    /// those attempts are logged too.
    pub credential_id: Option<CredentialId>,
    /// How the lookup was keyed.
    pub method: LookupMethod,
    /// The normalized lookup value as received.
    pub lookup_value: String,
    /// The resolved outcome.
    pub outcome: VerificationOutcome,
    /// Caller metadata.
    pub caller: CallerInfo,
    /// When the attempt happened.
    pub checked_at: Timestamp,
}

impl VerificationAttempt {
    /// Build an attempt record stamped with the current time.
    pub fn record(
        credential_id: Option<CredentialId>,
        method: LookupMethod,
        lookup_value: impl Into<String>,
        outcome: VerificationOutcome,
        caller: CallerInfo,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            credential_id,
            method,
            lookup_value: lookup_value.into(),
            outcome,
            caller,
            checked_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_attempts_carry_no_credential() {
        let a = VerificationAttempt::record(
            None,
            LookupMethod::ByCode,
            "ABCDEFGHJ",
            VerificationOutcome::NotFound,
            CallerInfo::default(),
        );
        assert!(a.credential_id.is_none());
        assert_eq!(a.outcome, VerificationOutcome::NotFound);
    }

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_string(&VerificationOutcome::NotFound).unwrap(),
            "\"NOT_FOUND\""
        );
        assert_eq!(
            serde_json::to_string(&LookupMethod::ByCode).unwrap(),
            "\"BY_CODE\""
        );
    }

    #[test]
    fn attempts_get_distinct_ids() {
        let mk = || {
            VerificationAttempt::record(
                None,
                LookupMethod::ByNumber,
                "USL-2024-00001",
                VerificationOutcome::NotFound,
                CallerInfo::default(),
            )
        };
        assert_ne!(mk().id, mk().id);
    }
}
