//! Registry API server entry point.
//!
//! Wires configuration from the environment: `DATABASE_URL` (optional
//! Postgres write-through), `ACR_ANCHOR_URL`/`ACR_ANCHOR_TOKEN` (optional
//! anchor gateway), `ACR_AUTH_TOKEN`, `ACR_BIND_ADDR`.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use acr_api::{app, bootstrap, db, ApiConfig, AppState};
use acr_ledger::{AnchorClient, AnchorGatewayConfig, HttpAnchorClient};
use acr_registry::{CredentialStore, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env();
    if config.auth_token.is_none() {
        tracing::warn!("ACR_AUTH_TOKEN not set — authenticated routes are open");
    }

    let memory = Arc::new(MemoryStore::new());

    let store: Arc<dyn CredentialStore> = match db::init_pool().await? {
        Some(pool) => {
            db::load_into_memory(&pool, &memory)
                .await
                .map_err(|e| anyhow::anyhow!("warm load failed: {e}"))?;
            Arc::new(db::WriteThroughStore::new(memory.clone(), pool))
        }
        None => memory.clone(),
    };

    let anchor: Option<Arc<dyn AnchorClient>> = match AnchorGatewayConfig::from_env() {
        Some(gateway_config) => {
            let client = HttpAnchorClient::new(gateway_config)
                .map_err(|e| anyhow::anyhow!("anchor client: {e}"))?;
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("ACR_ANCHOR_URL not set — credentials will not be anchored");
            None
        }
    };

    if let Ok(seed_path) = std::env::var("ACR_SEED_FILE") {
        bootstrap::load_seed(std::path::Path::new(&seed_path), store.as_ref()).await?;
    } else {
        tracing::warn!("ACR_SEED_FILE not set — no institutions or issuers loaded");
    }

    let state = AppState::new(store, memory, anchor, config.clone());
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "registry API listening");
    axum::serve(listener, router).await?;

    Ok(())
}
