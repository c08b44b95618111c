//! Credential persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `credentials` table.
//! Identifier uniqueness is enforced by unique indexes on
//! `certificate_no` and `verification_code`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use acr_core::{
    CertificateNumber, CredentialDigest, CredentialId, IssuerId, LedgerReference, Timestamp,
    VerificationCode,
};
use acr_registry::{AnchorStatus, Credential, CredentialStatus};

/// Insert a new credential row.
pub async fn insert(pool: &PgPool, credential: &Credential) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO credentials (id, certificate_no, verification_code, payload, data_hash,
         status, anchor_status, ledger_reference, issued_by, created_at,
         revoked_at, revoked_reason, revoked_by, transitions)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
    )
    .bind(credential.id.as_uuid())
    .bind(credential.certificate_no.as_str())
    .bind(credential.verification_code.as_str())
    .bind(serde_json::to_value(&credential.payload).unwrap_or_default())
    .bind(credential.data_hash.to_hex())
    .bind(credential.status.to_string())
    .bind(credential.anchor_status.to_string())
    .bind(credential.ledger_reference.as_ref().map(|r| r.as_str()))
    .bind(credential.issued_by.as_uuid())
    .bind(credential.created_at.as_datetime())
    .bind(credential.revoked_at.map(|t| *t.as_datetime()))
    .bind(credential.revoked_reason.as_deref())
    .bind(credential.revoked_by.map(|id| *id.as_uuid()))
    .bind(serde_json::to_value(&credential.transitions).unwrap_or_default())
    .execute(pool)
    .await?;

    Ok(())
}

/// Write back lifecycle state: status, revocation fields, transition log.
/// Anchor columns are owned by [`resolve_anchor`] and untouched here.
pub async fn update_status(pool: &PgPool, credential: &Credential) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE credentials SET status = $1, revoked_at = $2, revoked_reason = $3,
         revoked_by = $4, transitions = $5 WHERE id = $6",
    )
    .bind(credential.status.to_string())
    .bind(credential.revoked_at.map(|t| *t.as_datetime()))
    .bind(credential.revoked_reason.as_deref())
    .bind(credential.revoked_by.map(|id| *id.as_uuid()))
    .bind(serde_json::to_value(&credential.transitions).unwrap_or_default())
    .bind(credential.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Record the terminal anchor outcome.
///
/// The `WHERE anchor_status = 'PENDING'` guard makes the first resolution
/// the only resolution, mirroring the in-memory rule.
pub async fn resolve_anchor(
    pool: &PgPool,
    id: CredentialId,
    outcome: AnchorStatus,
    reference: Option<LedgerReference>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE credentials SET anchor_status = $1, ledger_reference = $2
         WHERE id = $3 AND anchor_status = 'PENDING'",
    )
    .bind(outcome.to_string())
    .bind(reference.as_ref().map(|r| r.as_str()))
    .bind(id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all credentials, oldest first (startup warm load).
pub async fn load_all(pool: &PgPool) -> Result<Vec<Credential>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CredentialRow>(
        "SELECT id, certificate_no, verification_code, payload, data_hash,
         status, anchor_status, ledger_reference, issued_by, created_at,
         revoked_at, revoked_reason, revoked_by, transitions
         FROM credentials ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match row.into_record() {
            Some(record) => records.push(record),
            None => {
                tracing::error!("skipping credential row that failed to decode during load_all");
            }
        }
    }
    Ok(records)
}

fn parse_status(s: &str) -> CredentialStatus {
    match s {
        "ACTIVE" => CredentialStatus::Active,
        "SUSPENDED" => CredentialStatus::Suspended,
        "REVOKED" => CredentialStatus::Revoked,
        other => {
            tracing::warn!(status = other, "unknown credential status in database, defaulting to SUSPENDED");
            CredentialStatus::Suspended
        }
    }
}

fn parse_anchor_status(s: &str) -> AnchorStatus {
    match s {
        "PENDING" => AnchorStatus::Pending,
        "CONFIRMED" => AnchorStatus::Confirmed,
        "FAILED" => AnchorStatus::Failed,
        other => {
            tracing::warn!(status = other, "unknown anchor status in database, defaulting to FAILED");
            AnchorStatus::Failed
        }
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    certificate_no: String,
    verification_code: String,
    payload: serde_json::Value,
    data_hash: String,
    status: String,
    anchor_status: String,
    ledger_reference: Option<String>,
    issued_by: Uuid,
    created_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    revoked_reason: Option<String>,
    revoked_by: Option<Uuid>,
    transitions: serde_json::Value,
}

impl CredentialRow {
    fn into_record(self) -> Option<Credential> {
        let certificate_no = CertificateNumber::parse(&self.certificate_no)
            .map_err(|e| tracing::warn!(id = %self.id, error = %e, "bad certificate_no in row"))
            .ok()?;
        let verification_code = VerificationCode::parse(&self.verification_code)
            .map_err(|e| tracing::warn!(id = %self.id, error = %e, "bad verification_code in row"))
            .ok()?;
        let payload = serde_json::from_value(self.payload)
            .map_err(|e| tracing::warn!(id = %self.id, error = %e, "bad payload in row"))
            .ok()?;
        let data_hash = CredentialDigest::parse(&self.data_hash)
            .map_err(|e| tracing::warn!(id = %self.id, error = %e, "bad data_hash in row"))
            .ok()?;
        let transitions = serde_json::from_value(self.transitions).unwrap_or_default();

        Some(Credential {
            id: CredentialId(self.id),
            certificate_no,
            verification_code,
            payload,
            data_hash,
            status: parse_status(&self.status),
            anchor_status: parse_anchor_status(&self.anchor_status),
            ledger_reference: self.ledger_reference.map(LedgerReference),
            issued_by: IssuerId(self.issued_by),
            created_at: Timestamp::from_utc(self.created_at),
            revoked_at: self.revoked_at.map(Timestamp::from_utc),
            revoked_reason: self.revoked_reason,
            revoked_by: self.revoked_by.map(IssuerId),
            transitions,
        })
    }
}
