//! Per-institution-per-year certificate sequence counters.
//!
//! One statement, atomic under any isolation level: insert the first
//! value or bump the existing one, returning the claimed number. No
//! count-then-write anywhere.

use sqlx::PgPool;

use acr_core::InstitutionId;

/// Claim the next sequence number for `(institution, year)`.
pub async fn next(
    pool: &PgPool,
    institution: InstitutionId,
    year: u16,
) -> Result<u64, sqlx::Error> {
    let (seq,): (i64,) = sqlx::query_as(
        "INSERT INTO institution_sequences (institution_id, year, last_seq)
         VALUES ($1, $2, 1)
         ON CONFLICT (institution_id, year)
         DO UPDATE SET last_seq = institution_sequences.last_seq + 1
         RETURNING last_seq",
    )
    .bind(institution.as_uuid())
    .bind(i32::from(year))
    .fetch_one(pool)
    .await?;

    Ok(seq as u64)
}
