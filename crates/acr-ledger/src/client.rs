//! # Anchor gateway HTTP client
//!
//! [`HttpAnchorClient`] wraps a `reqwest::Client` with the gateway base
//! URL, bearer authentication, and request/response mapping. It is
//! `Send + Sync` and designed to be shared via `Arc` across async tasks.
//!
//! Gateway surface:
//!
//! - `POST {base}/v1/anchors` — submit a digest plus identifying metadata;
//!   the gateway builds and confirms the ledger transaction and returns
//!   its signature.
//! - `GET {base}/v1/anchors/{signature}` — read-only receipt lookup for
//!   auditing UIs. Never mutates anything on either side.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use acr_core::{CredentialDigest, LedgerReference};

use crate::config::AnchorGatewayConfig;
use crate::error::LedgerError;

/// What the registry sends alongside the digest.
///
/// The metadata identifies the credential to a human reading the ledger
/// entry; the digest alone carries the integrity guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorSubmission {
    /// The credential's content digest, lowercase hex.
    pub digest: CredentialDigest,
    /// Human-readable certificate number, e.g. `USL-2024-00001`.
    pub certificate_no: String,
    /// The issuing institution's short code.
    pub institution_code: String,
}

/// The gateway's answer to a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorReceipt {
    /// Ledger transaction signature — the opaque reference stored on the
    /// credential.
    pub signature: String,
    /// Ledger slot/height the transaction landed in.
    pub slot: u64,
}

/// Full transaction details for auditing lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    /// Transaction signature.
    pub signature: String,
    /// The anchored digest, lowercase hex.
    pub digest: String,
    /// Ledger slot/height.
    pub slot: u64,
    /// Block time reported by the ledger, if available.
    pub block_time: Option<DateTime<Utc>>,
    /// The identifying metadata that was anchored with the digest.
    pub memo: serde_json::Value,
}

/// Anchor gateway operations.
///
/// The trait seam exists so the issuance path can run against
/// [`crate::MockAnchorClient`] in tests and local development.
#[async_trait]
pub trait AnchorClient: Send + Sync {
    /// Submit a digest for anchoring and await ledger confirmation.
    async fn submit_anchor(
        &self,
        submission: &AnchorSubmission,
    ) -> Result<AnchorReceipt, LedgerError>;

    /// Fetch the transaction details for a previously returned reference.
    ///
    /// Read-only; an unknown reference is [`LedgerError::NotFound`].
    async fn fetch_receipt(
        &self,
        reference: &LedgerReference,
    ) -> Result<TransactionDetails, LedgerError>;
}

/// HTTP implementation of [`AnchorClient`].
#[derive(Debug)]
pub struct HttpAnchorClient {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpAnchorClient {
    /// Build a client from configuration.
    pub fn new(config: AnchorGatewayConfig) -> Result<Self, LedgerError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if !config.api_token.is_empty() {
            let value =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.api_token))
                    .map_err(|_| LedgerError::NotConfigured {
                        reason: "API token contains invalid header characters".into(),
                    })?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| LedgerError::NotConfigured {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        // Reject a base URL that will not produce valid request URLs now,
        // not on the first anchor attempt.
        url::Url::parse(&config.base_url).map_err(|e| LedgerError::NotConfigured {
            reason: format!("invalid gateway base URL {:?}: {e}", config.base_url),
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_secs * 1000,
        })
    }

    /// Send a request, mapping transport failures onto [`LedgerError`].
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<reqwest::Response, LedgerError> {
        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LedgerError::Timeout {
                    elapsed_ms: self.timeout_ms,
                }
            } else {
                LedgerError::Unavailable {
                    reason: format!("{operation}: {e}"),
                }
            }
        })?;

        if resp.status().is_server_error() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Unavailable {
                reason: format!("{operation}: HTTP {status}: {body}"),
            });
        }

        Ok(resp)
    }
}

#[async_trait]
impl AnchorClient for HttpAnchorClient {
    async fn submit_anchor(
        &self,
        submission: &AnchorSubmission,
    ) -> Result<AnchorReceipt, LedgerError> {
        let url = format!("{}/v1/anchors", self.base_url);

        let resp = self
            .send(self.client.post(&url).json(submission), "submit_anchor")
            .await?;

        if resp.status().is_client_error() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Rejected {
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let receipt: AnchorReceipt =
            resp.json().await.map_err(|e| LedgerError::InvalidResponse {
                reason: format!("submit_anchor response: {e}"),
            })?;

        tracing::info!(
            signature = %receipt.signature,
            slot = receipt.slot,
            certificate_no = %submission.certificate_no,
            "digest anchored on ledger"
        );

        Ok(receipt)
    }

    async fn fetch_receipt(
        &self,
        reference: &LedgerReference,
    ) -> Result<TransactionDetails, LedgerError> {
        let url = format!("{}/v1/anchors/{}", self.base_url, reference.as_str());

        let resp = self.send(self.client.get(&url), "fetch_receipt").await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound {
                reference: reference.as_str().to_string(),
            });
        }
        if resp.status().is_client_error() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Rejected {
                reason: format!("HTTP {status}: {body}"),
            });
        }

        resp.json().await.map_err(|e| LedgerError::InvalidResponse {
            reason: format!("fetch_receipt response: {e}"),
        })
    }
}
