//! # Core error types
//!
//! Errors shared across the registry workspace. Module-specific error
//! enums (issuance, verification, ledger) live next to their modules;
//! this file holds only what the foundational types need.

use thiserror::Error;

/// Top-level error for acr-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization of a payload failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A value failed structural validation (bad format, out of range).
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Error during canonical serialization.
///
/// Payload values that cannot be serialized deterministically are rejected
/// rather than coerced. The registry stores grade-point averages as
/// fixed-point strings for exactly this reason.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical payloads; numeric
    /// scores must be carried as strings or integers.
    #[error("float values are not permitted in canonical payloads; use a string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
