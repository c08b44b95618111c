//! `acr code` — verification code utilities.
//!
//! `check` validates and normalizes a code the way the registry will;
//! `sample` prints random well-formed codes for fixtures and demos (they
//! carry no uniqueness guarantee — only the registry store can give one).

use clap::{Args, Subcommand};
use rand::Rng;

use acr_core::VerificationCode;

/// Arguments for `acr code`.
#[derive(Args, Debug)]
pub struct CodeArgs {
    #[command(subcommand)]
    pub command: CodeCommand,
}

/// Code subcommands.
#[derive(Subcommand, Debug)]
pub enum CodeCommand {
    /// Validate and normalize a verification code.
    Check {
        /// The code to check.
        value: String,
    },
    /// Print random well-formed codes (fixtures only; not reserved).
    Sample {
        /// How many codes to print.
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
}

/// Run `acr code`.
pub fn run_code(args: &CodeArgs) -> anyhow::Result<u8> {
    match &args.command {
        CodeCommand::Check { value } => match VerificationCode::parse(value) {
            Ok(code) => {
                println!("{code}");
                Ok(0)
            }
            Err(e) => {
                eprintln!("invalid: {e}");
                Ok(2)
            }
        },
        CodeCommand::Sample { count } => {
            let mut rng = rand::thread_rng();
            for _ in 0..*count {
                let code: String = (0..VerificationCode::LENGTH)
                    .map(|_| {
                        let idx = rng.gen_range(0..VerificationCode::ALPHABET.len());
                        VerificationCode::ALPHABET[idx] as char
                    })
                    .collect();
                println!("{code}");
            }
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_accepts_normalizable_codes() {
        let args = CodeArgs {
            command: CodeCommand::Check {
                value: " abcdefghj ".into(),
            },
        };
        assert_eq!(run_code(&args).unwrap(), 0);
    }

    #[test]
    fn check_flags_bad_codes_via_exit_code() {
        let args = CodeArgs {
            command: CodeCommand::Check {
                value: "O0O0O0O0O".into(),
            },
        };
        assert_eq!(run_code(&args).unwrap(), 2);
    }

    #[test]
    fn sample_emits_requested_count() {
        let args = CodeArgs {
            command: CodeCommand::Sample { count: 5 },
        };
        assert_eq!(run_code(&args).unwrap(), 0);
    }
}
