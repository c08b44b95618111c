//! # Domain identifier newtypes
//!
//! Newtype wrappers for the registry's identifiers. The UUID-backed ids are
//! internal keys; [`CertificateNumber`] and [`VerificationCode`] are the
//! human-facing identifiers printed on certificates, and carry their format
//! rules with them so malformed values are rejected at the boundary instead
//! of deep inside a service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Unique identifier for an issued credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialId(pub Uuid);

/// Unique identifier for an institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstitutionId(pub Uuid);

/// Unique identifier for an issuing officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssuerId(pub Uuid);

/// Unique identifier for a student enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrollmentId(pub Uuid);

/// Unique identifier for a graduation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraduationRequestId(pub Uuid);

macro_rules! uuid_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

uuid_id!(CredentialId, "credential");
uuid_id!(InstitutionId, "institution");
uuid_id!(IssuerId, "issuer");
uuid_id!(EnrollmentId, "enrollment");
uuid_id!(GraduationRequestId, "gradreq");

/// A human-readable certificate number: `{CODE}-{YEAR}-{SEQ:05}`.
///
/// `CODE` is the institution's registered short code (2–8 uppercase
/// alphanumerics), `YEAR` the graduation year, `SEQ` the per-institution
/// per-year sequence starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertificateNumber(String);

impl CertificateNumber {
    /// Build a certificate number from its parts.
    pub fn from_parts(institution_code: &str, year: u16, sequence: u64) -> Self {
        Self(format!("{institution_code}-{year}-{sequence:05}"))
    }

    /// Parse and validate a certificate number string.
    ///
    /// Normalizes by trimming whitespace and uppercasing the code segment.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        let mut parts = s.splitn(3, '-');
        let code = parts.next().unwrap_or_default();
        let year = parts.next().unwrap_or_default();
        let seq = parts.next().unwrap_or_default();

        if !(2..=8).contains(&code.len())
            || !code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(CoreError::InvalidValue(format!(
                "certificate number has invalid institution code segment: {s:?}"
            )));
        }
        if year.len() != 4 || year.parse::<u16>().is_err() {
            return Err(CoreError::InvalidValue(format!(
                "certificate number has invalid year segment: {s:?}"
            )));
        }
        if seq.len() < 5 || seq.parse::<u64>().is_err() {
            return Err(CoreError::InvalidValue(format!(
                "certificate number has invalid sequence segment: {s:?}"
            )));
        }
        Ok(Self(format!("{}-{year}-{seq}", code.to_uppercase())))
    }

    /// The certificate number string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CertificateNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 9-character public verification code.
///
/// Drawn from a 32-symbol alphabet with the visually ambiguous characters
/// removed (`0`/`O` and `1`/`I` are absent), so a code read aloud over the
/// phone or typed from a printed certificate is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// The 32-symbol code alphabet. Keyspace is 32^9 ≈ 3.5 × 10^13.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    /// Required code length.
    pub const LENGTH: usize = 9;

    /// Parse and normalize a verification code: trims whitespace,
    /// uppercases, and checks length and alphabet membership.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let normalized = s.trim().to_uppercase();
        if normalized.len() != Self::LENGTH {
            return Err(CoreError::InvalidValue(format!(
                "verification code must be {} characters, got {}",
                Self::LENGTH,
                normalized.len()
            )));
        }
        if !normalized.bytes().all(|b| Self::ALPHABET.contains(&b)) {
            return Err(CoreError::InvalidValue(format!(
                "verification code contains characters outside the code alphabet: {normalized:?}"
            )));
        }
        Ok(Self(normalized))
    }

    /// Wrap a string already known to satisfy the code rules.
    ///
    /// Used by the generator, which draws directly from [`Self::ALPHABET`].
    pub fn from_generated(s: String) -> Self {
        debug_assert_eq!(s.len(), Self::LENGTH);
        Self(s)
    }

    /// The code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque reference to a ledger transaction (signature or hash).
///
/// The registry treats this as a passthrough identifier for explorer links
/// and receipt lookups; its internal structure is the ledger's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerReference(pub String);

impl LedgerReference {
    /// The reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LedgerReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
