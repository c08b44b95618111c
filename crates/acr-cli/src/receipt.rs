//! `acr receipt` — fetch the ledger transaction behind an anchor
//! reference, straight from the anchor gateway.

use clap::Args;

use acr_core::LedgerReference;
use acr_ledger::{AnchorClient, AnchorGatewayConfig, HttpAnchorClient, LedgerError};

/// Arguments for `acr receipt`.
#[derive(Args, Debug)]
pub struct ReceiptArgs {
    /// The ledger transaction reference stored on the credential.
    pub reference: String,

    /// Anchor gateway base URL.
    #[arg(long, env = "ACR_ANCHOR_URL")]
    pub gateway_url: String,

    /// Anchor gateway bearer token.
    #[arg(long, env = "ACR_ANCHOR_TOKEN", default_value = "")]
    pub gateway_token: String,
}

/// Run `acr receipt`.
pub fn run_receipt(args: &ReceiptArgs) -> anyhow::Result<u8> {
    let client = HttpAnchorClient::new(AnchorGatewayConfig::new(
        args.gateway_url.clone(),
        args.gateway_token.clone(),
    ))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match runtime.block_on(client.fetch_receipt(&LedgerReference(args.reference.clone()))) {
        Ok(details) => {
            println!("{}", serde_json::to_string_pretty(&details)?);
            Ok(0)
        }
        Err(LedgerError::NotFound { reference }) => {
            eprintln!("no transaction found for {reference}");
            Ok(2)
        }
        Err(e) => Err(e.into()),
    }
}
