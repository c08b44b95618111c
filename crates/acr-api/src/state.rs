//! # Application state
//!
//! Shared state for the Axum application: the store stack, the three
//! domain services, the anchor client, and configuration.

use std::sync::Arc;

use acr_ledger::AnchorClient;
use acr_registry::{
    CredentialStore, IssuanceService, MemoryStore, RevocationService, VerificationService,
};

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bearer token required on authenticated routes. `None` disables
    /// auth — acceptable only behind a trusted gateway.
    pub auth_token: Option<String>,
    /// Listen address for the server binary.
    pub bind_addr: String,
}

impl ApiConfig {
    /// Read configuration from `ACR_AUTH_TOKEN` and `ACR_BIND_ADDR`.
    pub fn from_env() -> Self {
        Self {
            auth_token: std::env::var("ACR_AUTH_TOKEN").ok().filter(|t| !t.is_empty()),
            bind_addr: std::env::var("ACR_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The store the services run against (write-through when Postgres is
    /// configured, plain memory otherwise).
    pub store: Arc<dyn CredentialStore>,
    /// The in-memory tier, for operations the trait does not cover
    /// (startup warm-load, admin snapshots).
    pub memory: Arc<MemoryStore>,
    /// Issuance orchestration.
    pub issuance: IssuanceService,
    /// Verification + audit trail.
    pub verification: VerificationService,
    /// Revocation.
    pub revocation: RevocationService,
    /// Anchor gateway client, when configured.
    pub anchor: Option<Arc<dyn AnchorClient>>,
    /// Runtime configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Assemble the state from its parts, wiring the services to the
    /// given store.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        memory: Arc<MemoryStore>,
        anchor: Option<Arc<dyn AnchorClient>>,
        config: ApiConfig,
    ) -> Self {
        Self {
            issuance: IssuanceService::new(store.clone(), anchor.clone()),
            verification: VerificationService::new(store.clone()),
            revocation: RevocationService::new(store.clone()),
            store,
            memory,
            anchor,
            config,
        }
    }

    /// Memory-only state for tests and local development.
    pub fn in_memory(config: ApiConfig) -> Self {
        let memory = Arc::new(MemoryStore::new());
        Self::new(memory.clone(), memory, None, config)
    }
}
