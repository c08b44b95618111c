//! # Identifier generation
//!
//! Two generators, two strategies:
//!
//! - **Certificate numbers** are sequential per institution and graduation
//!   year. The sequence comes from the store's atomic fetch-and-increment —
//!   never from counting existing rows, which double-assigns under
//!   concurrent issuance.
//! - **Verification codes** are random draws from the 32-symbol code
//!   alphabet, checked for global uniqueness against the store. The draw
//!   loop is bounded: at 32^9 keyspace a collision is already vanishingly
//!   rare, so repeated collisions mean something is wrong (store
//!   unreachable, keyspace exhaustion) and the loop fails loudly instead
//!   of spinning forever.

use rand::Rng;
use thiserror::Error;

use acr_core::{CertificateNumber, InstitutionId, VerificationCode};

use crate::store::{CredentialStore, StoreError};

/// Bound on verification-code draw attempts before giving up.
pub const MAX_CODE_ATTEMPTS: u32 = 8;

/// Errors from identifier generation.
#[derive(Error, Debug)]
pub enum CodeError {
    /// Every draw collided with an existing code.
    #[error("verification code generation exhausted after {attempts} attempts")]
    Exhausted {
        /// How many draws were made.
        attempts: u32,
    },

    /// The store could not answer the uniqueness check.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Claim the next certificate number for an institution and year.
pub async fn assign_certificate_number(
    store: &dyn CredentialStore,
    institution: InstitutionId,
    institution_code: &str,
    year: u16,
) -> Result<CertificateNumber, StoreError> {
    let sequence = store.next_certificate_sequence(institution, year).await?;
    Ok(CertificateNumber::from_parts(institution_code, year, sequence))
}

/// Draw a globally unique verification code.
pub async fn generate_verification_code(
    store: &dyn CredentialStore,
) -> Result<VerificationCode, CodeError> {
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let candidate = draw_code();
        if !store.verification_code_exists(&candidate).await? {
            return Ok(candidate);
        }
        tracing::warn!(
            attempt,
            max_attempts = MAX_CODE_ATTEMPTS,
            "verification code collision, redrawing"
        );
    }
    Err(CodeError::Exhausted {
        attempts: MAX_CODE_ATTEMPTS,
    })
}

/// One random 9-character draw from the code alphabet.
fn draw_code() -> VerificationCode {
    let mut rng = rand::thread_rng();
    let code: String = (0..VerificationCode::LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..VerificationCode::ALPHABET.len());
            VerificationCode::ALPHABET[idx] as char
        })
        .collect();
    VerificationCode::from_generated(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn drawn_codes_satisfy_the_code_rules() {
        for _ in 0..200 {
            let code = draw_code();
            // Reparsing applies the full validation.
            assert!(VerificationCode::parse(code.as_str()).is_ok());
        }
    }

    #[tokio::test]
    async fn generates_against_an_empty_store() {
        let store = MemoryStore::new();
        let code = generate_verification_code(&store).await.unwrap();
        assert_eq!(code.as_str().len(), VerificationCode::LENGTH);
    }

    #[tokio::test]
    async fn certificate_numbers_increment_per_year() {
        let store = MemoryStore::new();
        let institution = InstitutionId::new();

        let first = assign_certificate_number(&store, institution, "USL", 2024)
            .await
            .unwrap();
        let second = assign_certificate_number(&store, institution, "USL", 2024)
            .await
            .unwrap();
        let other_year = assign_certificate_number(&store, institution, "USL", 2025)
            .await
            .unwrap();

        assert_eq!(first.as_str(), "USL-2024-00001");
        assert_eq!(second.as_str(), "USL-2024-00002");
        assert_eq!(other_year.as_str(), "USL-2025-00001");
    }

    #[tokio::test]
    async fn bounded_retries_fail_loudly_when_every_draw_collides() {
        /// A store whose uniqueness check always reports a collision.
        /// Only the method the generator touches is implemented.
        struct AlwaysTaken;

        #[async_trait::async_trait]
        impl CredentialStore for AlwaysTaken {
            async fn verification_code_exists(
                &self,
                _code: &VerificationCode,
            ) -> Result<bool, StoreError> {
                Ok(true)
            }

            async fn put_institution(
                &self,
                _: crate::institution::Institution,
            ) -> Result<(), StoreError> {
                unimplemented!()
            }
            async fn institution(
                &self,
                _: InstitutionId,
            ) -> Result<Option<crate::institution::Institution>, StoreError> {
                unimplemented!()
            }
            async fn put_issuer(&self, _: crate::institution::Issuer) -> Result<(), StoreError> {
                unimplemented!()
            }
            async fn issuer(
                &self,
                _: acr_core::IssuerId,
            ) -> Result<Option<crate::institution::Issuer>, StoreError> {
                unimplemented!()
            }
            async fn next_certificate_sequence(
                &self,
                _: InstitutionId,
                _: u16,
            ) -> Result<u64, StoreError> {
                unimplemented!()
            }
            async fn insert_credential(
                &self,
                _: &crate::credential::Credential,
            ) -> Result<(), StoreError> {
                unimplemented!()
            }
            async fn credential(
                &self,
                _: acr_core::CredentialId,
            ) -> Result<Option<crate::credential::Credential>, StoreError> {
                unimplemented!()
            }
            async fn credential_by_code(
                &self,
                _: &VerificationCode,
            ) -> Result<Option<crate::credential::Credential>, StoreError> {
                unimplemented!()
            }
            async fn credential_by_number(
                &self,
                _: &CertificateNumber,
            ) -> Result<Option<crate::credential::Credential>, StoreError> {
                unimplemented!()
            }
            async fn update_status(
                &self,
                _: &crate::credential::Credential,
            ) -> Result<(), StoreError> {
                unimplemented!()
            }
            async fn resolve_anchor(
                &self,
                _: acr_core::CredentialId,
                _: crate::credential::AnchorStatus,
                _: Option<acr_core::LedgerReference>,
            ) -> Result<bool, StoreError> {
                unimplemented!()
            }
            async fn append_attempt(
                &self,
                _: &crate::audit::VerificationAttempt,
            ) -> Result<(), StoreError> {
                unimplemented!()
            }
            async fn attempts_for_credential(
                &self,
                _: acr_core::CredentialId,
            ) -> Result<Vec<crate::audit::VerificationAttempt>, StoreError> {
                unimplemented!()
            }
            async fn insert_graduation_request(
                &self,
                _: &crate::graduation::GraduationRequest,
            ) -> Result<(), StoreError> {
                unimplemented!()
            }
            async fn graduation_request(
                &self,
                _: acr_core::GraduationRequestId,
            ) -> Result<Option<crate::graduation::GraduationRequest>, StoreError> {
                unimplemented!()
            }
            async fn graduation_request_by_enrollment(
                &self,
                _: acr_core::EnrollmentId,
            ) -> Result<Option<crate::graduation::GraduationRequest>, StoreError> {
                unimplemented!()
            }
            async fn update_graduation_request(
                &self,
                _: &crate::graduation::GraduationRequest,
            ) -> Result<(), StoreError> {
                unimplemented!()
            }
        }

        let err = generate_verification_code(&AlwaysTaken).await.unwrap_err();
        assert!(matches!(
            err,
            CodeError::Exhausted {
                attempts: MAX_CODE_ATTEMPTS
            }
        ));
    }
}
