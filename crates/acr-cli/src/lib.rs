//! # acr-cli — Operator CLI for the Academic Credential Registry
//!
//! Subcommand handlers live here; `main.rs` only parses arguments and
//! dispatches. Each handler returns the process exit code so scripted
//! callers can branch on outcomes (`0` ok, `1` operational error, `2`
//! negative verification result).

pub mod code;
pub mod hash;
pub mod receipt;
pub mod verify;
