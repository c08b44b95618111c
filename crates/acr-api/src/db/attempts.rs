//! Verification attempt persistence.
//!
//! Insert-only — the audit trail has no update or delete path, and the
//! table carries no updatable columns worth one.

use sqlx::PgPool;

use acr_registry::VerificationAttempt;

/// Append one verification attempt row.
pub async fn insert(pool: &PgPool, attempt: &VerificationAttempt) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO verification_attempts
         (id, credential_id, method, lookup_value, outcome, caller_ip,
          caller_user_agent, caller_organization, checked_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(attempt.id)
    .bind(attempt.credential_id.map(|id| *id.as_uuid()))
    .bind(attempt.method.to_string())
    .bind(&attempt.lookup_value)
    .bind(attempt.outcome.to_string())
    .bind(attempt.caller.ip.as_deref())
    .bind(attempt.caller.user_agent.as_deref())
    .bind(attempt.caller.organization.as_deref())
    .bind(attempt.checked_at.as_datetime())
    .execute(pool)
    .await?;

    Ok(())
}
