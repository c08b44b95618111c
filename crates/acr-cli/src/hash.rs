//! `acr hash` — canonicalize a JSON payload file and print its digest.
//!
//! Lets an institution recompute a certificate's content digest offline
//! and compare it against the anchored value.

use std::path::PathBuf;

use clap::Args;

use acr_core::{CanonicalBytes, CredentialDigest};

/// Arguments for `acr hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Path to a JSON payload file.
    pub payload: PathBuf,

    /// Also print the canonical byte sequence.
    #[arg(long)]
    pub show_canonical: bool,
}

/// Run `acr hash`.
pub fn run_hash(args: &HashArgs) -> anyhow::Result<u8> {
    let raw = std::fs::read_to_string(&args.payload)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    let canonical = CanonicalBytes::from_value(value)?;
    let digest = CredentialDigest::compute(&canonical);

    if args.show_canonical {
        println!("{}", String::from_utf8_lossy(canonical.as_bytes()));
    }
    println!("{digest}");

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hashes_a_payload_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"studentName": "A. Bangura", "program": "BSc CS"}}"#).unwrap();

        let args = HashArgs {
            payload: file.path().to_path_buf(),
            show_canonical: false,
        };
        assert_eq!(run_hash(&args).unwrap(), 0);
    }

    #[test]
    fn rejects_float_payloads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cgpa": 3.42}}"#).unwrap();

        let args = HashArgs {
            payload: file.path().to_path_buf(),
            show_canonical: false,
        };
        assert!(run_hash(&args).is_err());
    }

    #[test]
    fn rejects_missing_file() {
        let args = HashArgs {
            payload: PathBuf::from("/nonexistent/payload.json"),
            show_canonical: false,
        };
        assert!(run_hash(&args).is_err());
    }
}
