//! # acr-registry — Credential Domain Layer
//!
//! The registry's domain layer: the [`Credential`] entity and its lifecycle
//! state machine, the identifier generator, the append-only verification
//! audit trail, the graduation handoff, and the three request-scoped
//! services — issuance, verification, revocation.
//!
//! ## Architecture
//!
//! Services hold an `Arc<dyn CredentialStore>` and an
//! `Arc<dyn AnchorClient>`; all durable state lives behind the store trait,
//! so the services themselves carry no cross-request mutable state. The
//! single long-latency operation — ledger anchoring — runs on a detached
//! task spawned by issuance and writes exactly one terminal status back.
//!
//! ## Crate Policy
//!
//! - No HTTP types here; the API crate maps domain errors onto responses.
//! - Every status transition is validated by the entity, not by callers.

pub mod audit;
pub mod codes;
pub mod credential;
pub mod graduation;
pub mod institution;
pub mod issuance;
pub mod memory;
pub mod revocation;
pub mod store;
pub mod verification;

pub use audit::{CallerInfo, LookupMethod, VerificationAttempt, VerificationOutcome};
pub use credential::{
    AnchorStatus, Credential, CredentialPayload, CredentialStatus, ProgramType, StatusError,
};
pub use graduation::{ClassificationTable, GraduationError, GraduationRequest, GraduationStatus};
pub use institution::{Institution, Issuer};
pub use issuance::{IssuanceService, IssueError, IssueRequest};
pub use memory::MemoryStore;
pub use revocation::{RevocationService, RevokeError};
pub use store::{CredentialStore, StoreError};
pub use verification::{
    CredentialView, Lookup, VerificationReport, VerificationService, VerifyError,
};
