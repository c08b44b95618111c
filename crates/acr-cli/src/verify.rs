//! `acr verify` — check a credential against a running registry API.
//!
//! Exit codes: `0` VALID, `2` any negative outcome (INVALID, REVOKED,
//! NOT_FOUND), `1` transport or server failure — so shell pipelines can
//! distinguish "checked and bad" from "could not check".

use clap::Args;

/// Arguments for `acr verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Base URL of the registry API, e.g. `https://registry.example.org`.
    #[arg(long, env = "ACR_API_URL")]
    pub api_url: String,

    /// Verification code to check.
    #[arg(long, conflicts_with = "number")]
    pub code: Option<String>,

    /// Certificate number to check.
    #[arg(long, conflicts_with = "code")]
    pub number: Option<String>,
}

/// Run `acr verify`.
pub fn run_verify(args: &VerifyArgs) -> anyhow::Result<u8> {
    let base = args.api_url.trim_end_matches('/');
    let url = match (&args.code, &args.number) {
        (Some(code), None) => format!("{base}/v1/verify/code/{code}"),
        (None, Some(number)) => format!("{base}/v1/verify/number/{number}"),
        _ => anyhow::bail!("supply exactly one of --code or --number"),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let body: serde_json::Value = runtime.block_on(async {
        let response = reqwest::Client::new()
            .get(&url)
            .header("user-agent", concat!("acr-cli/", env!("CARGO_PKG_VERSION")))
            .send()
            .await?;
        if response.status().is_server_error() {
            anyhow::bail!("registry unavailable: HTTP {}", response.status());
        }
        Ok(response.json().await?)
    })?;

    println!("{}", serde_json::to_string_pretty(&body)?);

    let status = body["status"].as_str().unwrap_or("ERROR");
    Ok(if status == "VALID" { 0 } else { 2 })
}
