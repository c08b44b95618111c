//! Graduation request persistence.
//!
//! The unique index on `enrollment_id` is the durable form of the
//! one-request-per-enrollment rule.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use acr_core::{CredentialId, EnrollmentId, GraduationRequestId, Timestamp};
use acr_registry::{GraduationRequest, GraduationStatus};

/// Insert a new graduation request row.
pub async fn insert(pool: &PgPool, request: &GraduationRequest) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO graduation_requests
         (id, enrollment_id, total_credits, cgpa, class_of_degree, status,
          credential_id, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(request.id.as_uuid())
    .bind(request.enrollment_id.as_uuid())
    .bind(request.total_credits as i32)
    .bind(&request.cgpa)
    .bind(&request.class_of_degree)
    .bind(request.status.to_string())
    .bind(request.credential_id.map(|id| *id.as_uuid()))
    .bind(request.created_at.as_datetime())
    .execute(pool)
    .await?;

    Ok(())
}

/// Write back review status and the credential link.
pub async fn update(pool: &PgPool, request: &GraduationRequest) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE graduation_requests SET status = $1, credential_id = $2 WHERE id = $3",
    )
    .bind(request.status.to_string())
    .bind(request.credential_id.map(|id| *id.as_uuid()))
    .bind(request.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all graduation requests (startup warm load).
pub async fn load_all(pool: &PgPool) -> Result<Vec<GraduationRequest>, sqlx::Error> {
    let rows = sqlx::query_as::<_, GraduationRow>(
        "SELECT id, enrollment_id, total_credits, cgpa, class_of_degree, status,
         credential_id, created_at
         FROM graduation_requests ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(GraduationRow::into_record).collect())
}

fn parse_status(s: &str) -> GraduationStatus {
    match s {
        "PENDING" => GraduationStatus::Pending,
        "APPROVED" => GraduationStatus::Approved,
        "REJECTED" => GraduationStatus::Rejected,
        "CERTIFIED" => GraduationStatus::Certified,
        other => {
            tracing::warn!(status = other, "unknown graduation status in database, defaulting to PENDING");
            GraduationStatus::Pending
        }
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct GraduationRow {
    id: Uuid,
    enrollment_id: Uuid,
    total_credits: i32,
    cgpa: String,
    class_of_degree: String,
    status: String,
    credential_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl GraduationRow {
    fn into_record(self) -> GraduationRequest {
        GraduationRequest {
            id: GraduationRequestId(self.id),
            enrollment_id: EnrollmentId(self.enrollment_id),
            total_credits: self.total_credits.max(0) as u32,
            cgpa: self.cgpa,
            class_of_degree: self.class_of_degree,
            status: parse_status(&self.status),
            credential_id: self.credential_id.map(CredentialId),
            created_at: Timestamp::from_utc(self.created_at),
        }
    }
}
