//! # Revocation service
//!
//! Applies the one-way ACTIVE/SUSPENDED → REVOKED transition. There is no
//! unrevoke: if a revocation turns out to be wrong, the remedy is a new
//! credential, not a resurrected one.
//!
//! Revocation is a local-authority fact. The ledger anchor is deliberately
//! left untouched — the anchored digest remains a true historical record
//! that the credential existed and was anchored at issuance time, while
//! current validity is always answered from the live local record.

use std::sync::Arc;

use thiserror::Error;

use acr_core::{CredentialId, IssuerId};

use crate::credential::StatusError;
use crate::store::{CredentialStore, StoreError};

/// Errors from revocation.
#[derive(Error, Debug)]
pub enum RevokeError {
    /// The credential does not exist.
    #[error("credential {0} not found")]
    CredentialNotFound(CredentialId),

    /// The revoker may not revoke this credential (unknown revoker, wrong
    /// institution, or missing capability).
    #[error("revoker not authorized: {reason}")]
    NotAuthorized {
        /// Why authorization failed.
        reason: String,
    },

    /// The credential is already revoked. Rejected rather than absorbed —
    /// a second revocation with a different reason would otherwise vanish
    /// silently.
    #[error("credential {0} is already revoked")]
    AlreadyRevoked(CredentialId),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The revocation service.
#[derive(Clone)]
pub struct RevocationService {
    store: Arc<dyn CredentialStore>,
}

impl RevocationService {
    /// Build the service.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Revoke a credential.
    pub async fn revoke(
        &self,
        credential_id: CredentialId,
        revoker_id: IssuerId,
        reason: &str,
    ) -> Result<(), RevokeError> {
        let revoker = self
            .store
            .issuer(revoker_id)
            .await?
            .ok_or_else(|| RevokeError::NotAuthorized {
                reason: format!("unknown revoker {revoker_id}"),
            })?;

        let mut credential = self
            .store
            .credential(credential_id)
            .await?
            .ok_or(RevokeError::CredentialNotFound(credential_id))?;

        if !revoker.may_revoke_for(credential.institution_id()) {
            return Err(RevokeError::NotAuthorized {
                reason: format!(
                    "revoker {} lacks the revoke capability for institution {}",
                    revoker.id,
                    credential.payload.institution_code
                ),
            });
        }

        credential.revoke(revoker_id, reason).map_err(|e| match e {
            StatusError::AlreadyRevoked { id } => RevokeError::AlreadyRevoked(id),
            other => RevokeError::NotAuthorized {
                reason: other.to_string(),
            },
        })?;

        self.store.update_status(&credential).await?;

        tracing::info!(
            credential_id = %credential_id,
            revoked_by = %revoker_id,
            reason,
            "credential revoked"
        );

        Ok(())
    }
}
