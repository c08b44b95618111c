//! # Credential content digest
//!
//! [`CredentialDigest`] is the 256-bit integrity hash computed over a
//! credential's canonical payload. It is computed exactly once at issuance,
//! stored with the record, and anchored on the external ledger; it is never
//! recomputed when the record is later read.
//!
//! The only way to compute one is [`CredentialDigest::compute()`], which
//! takes [`CanonicalBytes`] — a digest over non-canonical bytes cannot be
//! expressed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;

/// A SHA-256 digest over a credential's canonical payload.
///
/// Serialized and displayed as 64 lowercase hex characters; this is the
/// exact string anchored on the ledger and shown on printed certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialDigest([u8; 32]);

impl CredentialDigest {
    /// Compute the digest of a canonical payload.
    pub fn compute(payload: &CanonicalBytes) -> Self {
        let hash = Sha256::digest(payload.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    /// Parse a digest from 64 lowercase (or uppercase) hex characters.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(CoreError::InvalidValue(format!(
                "digest must be 64 hex characters, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hi = hex_nibble(chunk[0])?;
            let lo = hex_nibble(chunk[1])?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }

    /// The raw 32 digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

fn hex_nibble(c: u8) -> Result<u8, CoreError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        other => Err(CoreError::InvalidValue(format!(
            "invalid hex character: {:?}",
            other as char
        ))),
    }
}

impl std::fmt::Display for CredentialDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for CredentialDigest {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).map_err(|e| e.to_string())
    }
}

impl From<CredentialDigest> for String {
    fn from(d: CredentialDigest) -> Self {
        d.to_hex()
    }
}
