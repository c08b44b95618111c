//! # Database persistence layer
//!
//! Optional Postgres write-through for the registry. The in-memory store
//! answers all reads; when `DATABASE_URL` is set, every mutation is also
//! written to Postgres and the memory tier is warm-loaded from it at
//! startup. When unset, the API runs memory-only — fine for development
//! and tests, with the obvious caveat that state dies with the process.
//!
//! ## Failure policy
//!
//! - Credential and graduation writes: a write-through failure is
//!   surfaced to the caller. The in-memory record would silently outlive
//!   a restart otherwise, which reads as data loss at the worst moment.
//! - Audit appends: a write-through failure is logged but not surfaced —
//!   the memory copy holds the record, and failing a public verification
//!   over a lagging audit mirror would invert the priorities.
//! - Sequence claims: Postgres is the source of truth when present (a
//!   single upsert-returning statement), so concurrent API replicas
//!   sharing one database cannot double-assign.

pub mod attempts;
pub mod credentials;
pub mod graduation;
pub mod sequences;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use acr_core::{
    CertificateNumber, CredentialId, EnrollmentId, GraduationRequestId, InstitutionId, IssuerId,
    LedgerReference, VerificationCode,
};
use acr_registry::{
    AnchorStatus, Credential, CredentialStore, GraduationRequest, Institution, Issuer,
    MemoryStore, StoreError, VerificationAttempt,
};

/// Initialize the connection pool and run migrations.
///
/// Returns `None` when `DATABASE_URL` is unset (memory-only mode).
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running memory-only. State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations applied");

    Ok(Some(pool))
}

/// Warm-load the memory tier from Postgres at startup.
pub async fn load_into_memory(pool: &PgPool, memory: &MemoryStore) -> Result<(), StoreError> {
    let creds = credentials::load_all(pool).await.map_err(to_store_error)?;
    let count = creds.len();
    for credential in creds {
        // Records came from the unique-indexed table; a duplicate here
        // means the memory tier already had it.
        if let Err(e) = memory.insert_credential(&credential).await {
            tracing::warn!(credential_id = %credential.id, error = %e, "skipping row during warm load");
        }
    }

    let requests = graduation::load_all(pool).await.map_err(to_store_error)?;
    let request_count = requests.len();
    for request in requests {
        if let Err(e) = memory.insert_graduation_request(&request).await {
            tracing::warn!(request_id = %request.id, error = %e, "skipping row during warm load");
        }
    }

    tracing::info!(
        credentials = count,
        graduation_requests = request_count,
        "memory tier warm-loaded from PostgreSQL"
    );
    Ok(())
}

/// Map a sqlx error onto the store error taxonomy.
///
/// Unique-constraint violations keep their constraint name so issuance
/// can distinguish identifier exhaustion from an outage.
pub(crate) fn to_store_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::Duplicate {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            };
        }
    }
    StoreError::Unavailable {
        reason: e.to_string(),
    }
}

/// A [`CredentialStore`] that layers Postgres write-through over the
/// in-memory store.
pub struct WriteThroughStore {
    memory: Arc<MemoryStore>,
    pool: PgPool,
}

impl WriteThroughStore {
    /// Wrap the memory tier with a Postgres mirror.
    pub fn new(memory: Arc<MemoryStore>, pool: PgPool) -> Self {
        Self { memory, pool }
    }
}

#[async_trait]
impl CredentialStore for WriteThroughStore {
    async fn put_institution(&self, institution: Institution) -> Result<(), StoreError> {
        self.memory.put_institution(institution).await
    }

    async fn institution(&self, id: InstitutionId) -> Result<Option<Institution>, StoreError> {
        self.memory.institution(id).await
    }

    async fn put_issuer(&self, issuer: Issuer) -> Result<(), StoreError> {
        self.memory.put_issuer(issuer).await
    }

    async fn issuer(&self, id: IssuerId) -> Result<Option<Issuer>, StoreError> {
        self.memory.issuer(id).await
    }

    async fn next_certificate_sequence(
        &self,
        institution: InstitutionId,
        year: u16,
    ) -> Result<u64, StoreError> {
        // Postgres is the arbiter: one upsert-returning statement, safe
        // across concurrent requests and across API replicas.
        sequences::next(&self.pool, institution, year)
            .await
            .map_err(to_store_error)
    }

    async fn verification_code_exists(
        &self,
        code: &VerificationCode,
    ) -> Result<bool, StoreError> {
        self.memory.verification_code_exists(code).await
    }

    async fn insert_credential(&self, credential: &Credential) -> Result<(), StoreError> {
        self.memory.insert_credential(credential).await?;
        if let Err(e) = credentials::insert(&self.pool, credential).await {
            tracing::error!(
                credential_id = %credential.id,
                error = %e,
                "credential write-through failed"
            );
            return Err(to_store_error(e));
        }
        Ok(())
    }

    async fn credential(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        self.memory.credential(id).await
    }

    async fn credential_by_code(
        &self,
        code: &VerificationCode,
    ) -> Result<Option<Credential>, StoreError> {
        self.memory.credential_by_code(code).await
    }

    async fn credential_by_number(
        &self,
        number: &CertificateNumber,
    ) -> Result<Option<Credential>, StoreError> {
        self.memory.credential_by_number(number).await
    }

    async fn update_status(&self, credential: &Credential) -> Result<(), StoreError> {
        self.memory.update_status(credential).await?;
        let written = credentials::update_status(&self.pool, credential)
            .await
            .map_err(to_store_error)?;
        if !written {
            return Err(StoreError::MissingRecord {
                what: format!("credential {} (database row)", credential.id),
            });
        }
        Ok(())
    }

    async fn resolve_anchor(
        &self,
        id: CredentialId,
        outcome: AnchorStatus,
        reference: Option<LedgerReference>,
    ) -> Result<bool, StoreError> {
        let applied = self
            .memory
            .resolve_anchor(id, outcome, reference.clone())
            .await?;
        if applied {
            credentials::resolve_anchor(&self.pool, id, outcome, reference)
                .await
                .map_err(to_store_error)?;
        }
        Ok(applied)
    }

    async fn append_attempt(&self, attempt: &VerificationAttempt) -> Result<(), StoreError> {
        self.memory.append_attempt(attempt).await?;
        if let Err(e) = attempts::insert(&self.pool, attempt).await {
            // The memory copy holds; do not fail the verification.
            tracing::error!(attempt_id = %attempt.id, error = %e, "audit write-through failed");
        }
        Ok(())
    }

    async fn attempts_for_credential(
        &self,
        id: CredentialId,
    ) -> Result<Vec<VerificationAttempt>, StoreError> {
        self.memory.attempts_for_credential(id).await
    }

    async fn insert_graduation_request(
        &self,
        request: &GraduationRequest,
    ) -> Result<(), StoreError> {
        self.memory.insert_graduation_request(request).await?;
        graduation::insert(&self.pool, request)
            .await
            .map_err(to_store_error)
    }

    async fn graduation_request(
        &self,
        id: GraduationRequestId,
    ) -> Result<Option<GraduationRequest>, StoreError> {
        self.memory.graduation_request(id).await
    }

    async fn graduation_request_by_enrollment(
        &self,
        enrollment: EnrollmentId,
    ) -> Result<Option<GraduationRequest>, StoreError> {
        self.memory.graduation_request_by_enrollment(enrollment).await
    }

    async fn update_graduation_request(
        &self,
        request: &GraduationRequest,
    ) -> Result<(), StoreError> {
        self.memory.update_graduation_request(request).await?;
        let written = graduation::update(&self.pool, request)
            .await
            .map_err(to_store_error)?;
        if !written {
            return Err(StoreError::MissingRecord {
                what: format!("graduation request {} (database row)", request.id),
            });
        }
        Ok(())
    }
}
