//! # acr-core — Foundational Types for the Academic Credential Registry
//!
//! Everything in the registry that must be byte-for-byte reproducible flows
//! through this crate: canonical serialization of credential payloads,
//! content digest computation, UTC-only timestamps, and the identifier
//! newtypes shared by every other crate in the workspace.
//!
//! ## Crate Policy
//!
//! - No I/O, no async, no global state. Pure types and pure functions.
//! - The only path to a [`CredentialDigest`] is through [`CanonicalBytes`],
//!   so a digest can never be computed over non-canonical bytes.
//! - Sits at the bottom of the dependency DAG — depends on nothing internal.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::CredentialDigest;
pub use error::{CanonicalizationError, CoreError};
pub use identity::{
    CertificateNumber, CredentialId, EnrollmentId, GraduationRequestId, InstitutionId, IssuerId,
    LedgerReference, VerificationCode,
};
pub use temporal::Timestamp;
