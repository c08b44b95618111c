//! # Ledger error taxonomy
//!
//! Callers need to distinguish "the gateway said no" from "the gateway is
//! down" from "that transaction does not exist": the first is terminal for
//! the anchor attempt, the second is an operator problem, and the third is
//! a first-class answer for receipt lookups.

use thiserror::Error;

/// Errors from anchor gateway operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The gateway rejected the request (4xx) — malformed digest, bad
    /// credentials, duplicate submission.
    #[error("anchor gateway rejected the request: {reason}")]
    Rejected {
        /// HTTP status plus response body excerpt.
        reason: String,
    },

    /// The gateway or the ledger behind it is unavailable (5xx, connect
    /// failure).
    #[error("anchor gateway unavailable: {reason}")]
    Unavailable {
        /// Transport or upstream diagnostic.
        reason: String,
    },

    /// The request exceeded the configured deadline.
    #[error("anchor gateway request timed out after {elapsed_ms}ms")]
    Timeout {
        /// Configured per-request timeout, in milliseconds.
        elapsed_ms: u64,
    },

    /// The gateway answered but the body did not parse.
    #[error("anchor gateway returned an unparseable response: {reason}")]
    InvalidResponse {
        /// Decode diagnostic.
        reason: String,
    },

    /// No transaction exists for the requested reference.
    #[error("no ledger transaction found for reference {reference}")]
    NotFound {
        /// The reference that was looked up.
        reference: String,
    },

    /// The client itself is misconfigured (bad base URL, bad token chars).
    #[error("anchor client misconfigured: {reason}")]
    NotConfigured {
        /// What is wrong with the configuration.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let e = LedgerError::Timeout { elapsed_ms: 30_000 };
        assert!(e.to_string().contains("30000ms"));

        let e = LedgerError::NotFound {
            reference: "5Gq7".into(),
        };
        assert!(e.to_string().contains("5Gq7"));
    }
}
