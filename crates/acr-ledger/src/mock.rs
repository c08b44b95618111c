//! # In-memory anchor client
//!
//! [`MockAnchorClient`] records submissions and serves receipts from
//! memory. Tests use it to exercise both sides of the anchoring contract:
//! the happy path, and the path where the ledger is down and issuance must
//! still succeed.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use acr_core::LedgerReference;

use crate::client::{AnchorClient, AnchorReceipt, AnchorSubmission, TransactionDetails};
use crate::error::LedgerError;

/// Failure mode the mock simulates on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Submissions succeed.
    None,
    /// Submissions fail as if the gateway were down.
    Unavailable,
    /// Submissions fail as if the gateway rejected the transaction.
    Rejected,
    /// Submissions fail as if the deadline elapsed.
    Timeout,
}

/// An in-memory [`AnchorClient`].
#[derive(Debug)]
pub struct MockAnchorClient {
    failure: Mutex<MockFailure>,
    submitted: Mutex<Vec<AnchorSubmission>>,
    receipts: Mutex<HashMap<String, TransactionDetails>>,
    next_slot: Mutex<u64>,
}

impl MockAnchorClient {
    /// A mock that confirms every submission.
    pub fn new() -> Self {
        Self {
            failure: Mutex::new(MockFailure::None),
            submitted: Mutex::new(Vec::new()),
            receipts: Mutex::new(HashMap::new()),
            next_slot: Mutex::new(1000),
        }
    }

    /// A mock that fails every submission in the given mode.
    pub fn failing(mode: MockFailure) -> Self {
        let mock = Self::new();
        *mock.failure.lock() = mode;
        mock
    }

    /// Change the failure mode mid-test.
    pub fn set_failure(&self, mode: MockFailure) {
        *self.failure.lock() = mode;
    }

    /// Every submission the mock has accepted, in order.
    pub fn submissions(&self) -> Vec<AnchorSubmission> {
        self.submitted.lock().clone()
    }
}

impl Default for MockAnchorClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnchorClient for MockAnchorClient {
    async fn submit_anchor(
        &self,
        submission: &AnchorSubmission,
    ) -> Result<AnchorReceipt, LedgerError> {
        match *self.failure.lock() {
            MockFailure::None => {}
            MockFailure::Unavailable => {
                return Err(LedgerError::Unavailable {
                    reason: "mock gateway down".into(),
                })
            }
            MockFailure::Rejected => {
                return Err(LedgerError::Rejected {
                    reason: "mock rejection".into(),
                })
            }
            MockFailure::Timeout => return Err(LedgerError::Timeout { elapsed_ms: 30_000 }),
        }

        let slot = {
            let mut s = self.next_slot.lock();
            *s += 1;
            *s
        };
        // Deterministic per-submission signature, derived from the digest.
        let signature = format!("mock-{}-{}", &submission.digest.to_hex()[..16], slot);

        self.submitted.lock().push(submission.clone());
        self.receipts.lock().insert(
            signature.clone(),
            TransactionDetails {
                signature: signature.clone(),
                digest: submission.digest.to_hex(),
                slot,
                block_time: Some(chrono::Utc::now()),
                memo: serde_json::json!({
                    "certificate_no": submission.certificate_no,
                    "institution_code": submission.institution_code,
                }),
            },
        );

        Ok(AnchorReceipt { signature, slot })
    }

    async fn fetch_receipt(
        &self,
        reference: &LedgerReference,
    ) -> Result<TransactionDetails, LedgerError> {
        self.receipts
            .lock()
            .get(reference.as_str())
            .cloned()
            .ok_or_else(|| LedgerError::NotFound {
                reference: reference.as_str().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acr_core::CredentialDigest;

    fn submission() -> AnchorSubmission {
        AnchorSubmission {
            digest: CredentialDigest::parse(&"cd".repeat(32)).unwrap(),
            certificate_no: "USL-2024-00001".into(),
            institution_code: "USL".into(),
        }
    }

    #[tokio::test]
    async fn submit_then_fetch_roundtrip() {
        let mock = MockAnchorClient::new();
        let receipt = mock.submit_anchor(&submission()).await.unwrap();

        let details = mock
            .fetch_receipt(&LedgerReference(receipt.signature.clone()))
            .await
            .unwrap();
        assert_eq!(details.signature, receipt.signature);
        assert_eq!(details.digest, "cd".repeat(32));
        assert_eq!(mock.submissions().len(), 1);
    }

    #[tokio::test]
    async fn failing_mock_records_nothing() {
        let mock = MockAnchorClient::failing(MockFailure::Unavailable);
        assert!(mock.submit_anchor(&submission()).await.is_err());
        assert!(mock.submissions().is_empty());
    }

    #[tokio::test]
    async fn unknown_reference_is_not_found() {
        let mock = MockAnchorClient::new();
        let err = mock
            .fetch_receipt(&LedgerReference("nope".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }
}
