//! # Anchor gateway configuration

/// Configuration for the anchor gateway HTTP client.
#[derive(Debug, Clone)]
pub struct AnchorGatewayConfig {
    /// Base URL of the gateway, e.g. `https://anchor.example.org/api`.
    pub base_url: String,
    /// Bearer token for gateway authentication.
    pub api_token: String,
    /// Per-request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl AnchorGatewayConfig {
    /// Create a configuration with the default timeout.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            timeout_secs: 30,
        }
    }

    /// Read the configuration from `ACR_ANCHOR_URL`, `ACR_ANCHOR_TOKEN`,
    /// and optional `ACR_ANCHOR_TIMEOUT_SECS`.
    ///
    /// Returns `None` when the URL is unset — the registry then runs
    /// without anchoring, and every credential stays `Pending`.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("ACR_ANCHOR_URL").ok()?;
        let api_token = std::env::var("ACR_ANCHOR_TOKEN").unwrap_or_default();
        let timeout_secs = std::env::var("ACR_ANCHOR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        Some(Self {
            base_url,
            api_token,
            timeout_secs,
        })
    }
}
