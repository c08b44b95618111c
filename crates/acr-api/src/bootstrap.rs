//! # Authorization context bootstrap
//!
//! Institutions and issuing officers are managed by the institution
//! administration system, not this registry. Deployments hand the
//! registry its authorization context as a seed file
//! (`ACR_SEED_FILE`, JSON), loaded into the store at startup:
//!
//! ```json
//! {
//!   "institutions": [
//!     {
//!       "id": "6f2f…", "code": "USL", "name": "University of Sierra Leone",
//!       "active": true,
//!       "issuers": [
//!         {"id": "9c1d…", "display_name": "Registrar",
//!          "can_issue": true, "can_revoke": true}
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

use acr_core::{InstitutionId, IssuerId};
use acr_registry::{CredentialStore, Institution, Issuer, StoreError};

#[derive(Debug, Deserialize)]
struct SeedFile {
    institutions: Vec<SeedInstitution>,
}

#[derive(Debug, Deserialize)]
struct SeedInstitution {
    id: Uuid,
    code: String,
    name: String,
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    issuers: Vec<SeedIssuer>,
}

#[derive(Debug, Deserialize)]
struct SeedIssuer {
    id: Uuid,
    display_name: String,
    #[serde(default)]
    can_issue: bool,
    #[serde(default)]
    can_revoke: bool,
}

fn default_active() -> bool {
    true
}

/// Load the seed file into the store. Existing records with the same ids
/// are replaced, so the file can be re-applied on every start.
pub async fn load_seed(
    path: &Path,
    store: &dyn CredentialStore,
) -> Result<(), anyhow::Error> {
    let raw = std::fs::read_to_string(path)?;
    let seed: SeedFile = serde_json::from_str(&raw)?;

    let mut institutions = 0usize;
    let mut issuers = 0usize;
    for entry in seed.institutions {
        let institution_id = InstitutionId(entry.id);
        store
            .put_institution(Institution {
                id: institution_id,
                code: entry.code.clone(),
                name: entry.name,
                active: entry.active,
            })
            .await
            .map_err(seed_error)?;
        institutions += 1;

        for officer in entry.issuers {
            store
                .put_issuer(Issuer {
                    id: IssuerId(officer.id),
                    institution_id,
                    display_name: officer.display_name,
                    can_issue: officer.can_issue,
                    can_revoke: officer.can_revoke,
                })
                .await
                .map_err(seed_error)?;
            issuers += 1;
        }
    }

    tracing::info!(institutions, issuers, "authorization context seeded");
    Ok(())
}

fn seed_error(e: StoreError) -> anyhow::Error {
    anyhow::anyhow!("seed load failed: {e}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use acr_registry::MemoryStore;
    use std::io::Write;

    #[tokio::test]
    async fn seeds_institutions_and_issuers() {
        let institution_id = Uuid::new_v4();
        let issuer_id = Uuid::new_v4();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"institutions": [{{
                "id": "{institution_id}", "code": "USL",
                "name": "University of Sierra Leone",
                "issuers": [{{"id": "{issuer_id}", "display_name": "Registrar",
                              "can_issue": true, "can_revoke": true}}]
            }}]}}"#
        )
        .unwrap();

        let store = MemoryStore::new();
        load_seed(file.path(), &store).await.unwrap();

        let institution = store
            .institution(InstitutionId(institution_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(institution.code, "USL");
        assert!(institution.active);

        let issuer = store.issuer(IssuerId(issuer_id)).await.unwrap().unwrap();
        assert!(issuer.can_issue);
        assert_eq!(issuer.institution_id, InstitutionId(institution_id));
    }

    #[tokio::test]
    async fn malformed_seed_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let store = MemoryStore::new();
        assert!(load_seed(file.path(), &store).await.is_err());
    }
}
