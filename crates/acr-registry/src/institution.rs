//! # Institution and issuer records
//!
//! The registry consumes these as authorization context: an institution
//! must exist and be active before anything is issued in its name, and an
//! issuing officer carries explicit capabilities instead of an implicit
//! role. Their wider lifecycle (onboarding, staff management) belongs to
//! the institution administration system, not here.

use serde::{Deserialize, Serialize};

use acr_core::{InstitutionId, IssuerId};

/// An accredited institution that issues credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    /// Institution identifier.
    pub id: InstitutionId,
    /// Registered short code used in certificate numbers, e.g. `USL`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Inactive institutions cannot issue.
    pub active: bool,
}

/// An officer authorized to act for an institution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issuer {
    /// Issuer identifier.
    pub id: IssuerId,
    /// The institution this officer belongs to.
    pub institution_id: InstitutionId,
    /// Display name for audit trails.
    pub display_name: String,
    /// May issue new credentials.
    pub can_issue: bool,
    /// May revoke issued credentials.
    pub can_revoke: bool,
}

impl Issuer {
    /// Whether this officer may issue for the given institution.
    pub fn may_issue_for(&self, institution: InstitutionId) -> bool {
        self.can_issue && self.institution_id == institution
    }

    /// Whether this officer may revoke credentials of the given institution.
    pub fn may_revoke_for(&self, institution: InstitutionId) -> bool {
        self.can_revoke && self.institution_id == institution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_are_institution_scoped() {
        let home = InstitutionId::new();
        let other = InstitutionId::new();
        let issuer = Issuer {
            id: IssuerId::new(),
            institution_id: home,
            display_name: "Registrar".into(),
            can_issue: true,
            can_revoke: false,
        };
        assert!(issuer.may_issue_for(home));
        assert!(!issuer.may_issue_for(other));
        assert!(!issuer.may_revoke_for(home));
    }
}
