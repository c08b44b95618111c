//! # acr-ledger — Anchor Gateway Client
//!
//! The registry anchors every credential's content digest on an external
//! distributed ledger. It does not speak the ledger's wire protocol itself;
//! an anchor gateway exposes two HTTP operations — submit a digest, fetch a
//! transaction receipt — and this crate wraps them behind the
//! [`AnchorClient`] trait.
//!
//! The ledger is a tamper-evident timestamping service here, nothing more:
//! the transaction reference it returns is an opaque string the registry
//! stores and passes through to explorer links.
//!
//! ## Failure posture
//!
//! Submission failures are terminal for the attempt. The client performs no
//! automatic retries — a failed anchor is recorded on the credential as
//! `Failed` and left for an operator to re-drive, so partial failure stays
//! visible instead of being papered over by background retry loops.

pub mod client;
pub mod config;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;

pub use client::{AnchorClient, AnchorReceipt, AnchorSubmission, HttpAnchorClient, TransactionDetails};
pub use config::AnchorGatewayConfig;
pub use error::LedgerError;
#[cfg(feature = "mock")]
pub use mock::{MockAnchorClient, MockFailure};
