//! # Graduation request handoff
//!
//! The academic-records pipeline computes total credits, CGPA, and class of
//! degree upstream, then hands the result over as a [`GraduationRequest`].
//! The registry treats those numbers as opaque facts — it validates shape
//! and range and never recomputes them from raw results.
//!
//! ## States
//!
//! ```text
//! Pending ──▶ Approved ──▶ Certified (terminal, links the credential)
//!    │
//!    ▼
//! Rejected (terminal)
//! ```
//!
//! At most one request may exist per enrollment; the store enforces the
//! unique constraint and creation of a second request is rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use acr_core::{CredentialId, EnrollmentId, GraduationRequestId, Timestamp};

/// Review status of a graduation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GraduationStatus {
    /// Awaiting registrar review.
    Pending,
    /// Approved; a credential may be issued.
    Approved,
    /// Rejected (terminal).
    Rejected,
    /// A credential has been issued for this request (terminal).
    Certified,
}

impl GraduationStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Certified)
    }
}

impl std::fmt::Display for GraduationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Certified => "CERTIFIED",
        };
        f.write_str(s)
    }
}

/// Errors from graduation request handling.
#[derive(Error, Debug)]
pub enum GraduationError {
    /// The requested transition is not valid from the current status.
    #[error("invalid graduation request transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: GraduationStatus,
        /// Attempted target status.
        to: GraduationStatus,
    },

    /// The CGPA string is not a fixed-point number with two decimals in
    /// the accepted range.
    #[error("invalid CGPA {value:?}: {reason}")]
    InvalidCgpa {
        /// The offending value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// A graduation request handed over by the academic-records pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraduationRequest {
    /// Request identifier.
    pub id: GraduationRequestId,
    /// The enrollment this request belongs to (unique per request).
    pub enrollment_id: EnrollmentId,
    /// Total credits earned, computed upstream.
    pub total_credits: u32,
    /// CGPA as a fixed-point string with two decimals, e.g. `"3.42"`.
    pub cgpa: String,
    /// Class of degree as computed upstream.
    pub class_of_degree: String,
    /// Review status.
    pub status: GraduationStatus,
    /// Linked credential, set on certification.
    pub credential_id: Option<CredentialId>,
    /// When the request was handed over.
    pub created_at: Timestamp,
}

impl GraduationRequest {
    /// Build a pending request from the upstream handoff.
    pub fn new(
        enrollment_id: EnrollmentId,
        total_credits: u32,
        cgpa: String,
        class_of_degree: String,
    ) -> Result<Self, GraduationError> {
        parse_cgpa_hundredths(&cgpa)?;
        Ok(Self {
            id: GraduationRequestId::new(),
            enrollment_id,
            total_credits,
            cgpa,
            class_of_degree,
            status: GraduationStatus::Pending,
            credential_id: None,
            created_at: Timestamp::now(),
        })
    }

    /// Approve a pending request.
    pub fn approve(&mut self) -> Result<(), GraduationError> {
        self.require(GraduationStatus::Pending, GraduationStatus::Approved)?;
        self.status = GraduationStatus::Approved;
        Ok(())
    }

    /// Reject a pending request (terminal).
    pub fn reject(&mut self) -> Result<(), GraduationError> {
        self.require(GraduationStatus::Pending, GraduationStatus::Rejected)?;
        self.status = GraduationStatus::Rejected;
        Ok(())
    }

    /// Mark an approved request certified, linking the issued credential
    /// (terminal).
    pub fn certify(&mut self, credential_id: CredentialId) -> Result<(), GraduationError> {
        self.require(GraduationStatus::Approved, GraduationStatus::Certified)?;
        self.status = GraduationStatus::Certified;
        self.credential_id = Some(credential_id);
        Ok(())
    }

    fn require(
        &self,
        expect: GraduationStatus,
        to: GraduationStatus,
    ) -> Result<(), GraduationError> {
        if self.status != expect {
            return Err(GraduationError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }
}

/// Degree classification thresholds, in CGPA hundredths.
///
/// The scale is institution-configurable; the defaults match the common
/// 5-point scale. Rows are checked top-down, first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationTable {
    /// `(minimum CGPA in hundredths, class name)`, sorted descending.
    pub bands: Vec<(u32, String)>,
    /// Name used when no band matches.
    pub fail_name: String,
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self {
            bands: vec![
                (360, "First Class".into()),
                (300, "Second Class Upper".into()),
                (240, "Second Class Lower".into()),
                (200, "Third Class".into()),
                (100, "Pass".into()),
            ],
            fail_name: "Fail".into(),
        }
    }
}

impl ClassificationTable {
    /// Classify a fixed-point CGPA string against the table.
    pub fn classify(&self, cgpa: &str) -> Result<&str, GraduationError> {
        let hundredths = parse_cgpa_hundredths(cgpa)?;
        for (min, name) in &self.bands {
            if hundredths >= *min {
                return Ok(name);
            }
        }
        Ok(&self.fail_name)
    }
}

/// Parse a CGPA string like `"3.42"` into integer hundredths.
///
/// Fixed-point end to end: the value is never held as a float, so `3.60`
/// compares exactly against a `360` threshold.
pub fn parse_cgpa_hundredths(s: &str) -> Result<u32, GraduationError> {
    let err = |reason: &str| GraduationError::InvalidCgpa {
        value: s.to_string(),
        reason: reason.to_string(),
    };

    let (whole, frac) = s.split_once('.').ok_or_else(|| err("expected D.DD form"))?;
    if frac.len() != 2 {
        return Err(err("expected exactly two decimals"));
    }
    let whole: u32 = whole.parse().map_err(|_| err("integer part not numeric"))?;
    let frac: u32 = frac.parse().map_err(|_| err("decimal part not numeric"))?;
    let hundredths = whole * 100 + frac;
    if hundredths > 500 {
        return Err(err("CGPA exceeds the 5.00 scale maximum"));
    }
    Ok(hundredths)
}
