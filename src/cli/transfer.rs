//! Transfer CLI commands
//!
//! `encrypt` and `decrypt` are test helpers that work on plaintext;
//! `submit` is the production path that only ever sees envelopes.

use clap::Subcommand;

use crate::display::format_decrypted_transfer;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{EncryptedTransferCommand, PlainTransferRequest};
use crate::services::TransferService;

use super::read_input;

/// Transfer subcommands
#[derive(Subcommand)]
pub enum TransferCommands {
    /// Encrypt a plaintext transfer request into a command (testing only)
    Encrypt {
        /// Request JSON file, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Execute an encrypted transfer command
    Submit {
        /// Command JSON file, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Decrypt a transfer command for inspection (testing only)
    Decrypt {
        /// Command JSON file, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Handle a transfer command
pub fn handle_transfer_command(service: &TransferService<'_>, cmd: TransferCommands) -> LedgerResult<()> {
    match cmd {
        TransferCommands::Encrypt { input } => {
            eprintln!("WARNING: 'transfer encrypt' handles plaintext and is not for production use.");

            let request: PlainTransferRequest = parse_json(&read_input(&input)?, "transfer request")?;
            let command = service.encrypt_transfer_command(&request)?;
            println!("{}", serde_json::to_string_pretty(&command)?);
        }
        TransferCommands::Submit { input } => {
            let command: EncryptedTransferCommand = parse_json(&read_input(&input)?, "transfer command")?;
            service.transfer(&command)?;
            println!("Transfer recorded.");
        }
        TransferCommands::Decrypt { input, json } => {
            eprintln!("WARNING: 'transfer decrypt' prints plaintext and is not for production use.");

            let command: EncryptedTransferCommand = parse_json(&read_input(&input)?, "transfer command")?;
            let transfer = service.decrypt_transfer_command(&command)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&transfer)?);
            } else {
                print!("{}", format_decrypted_transfer(&transfer));
            }
        }
    }

    Ok(())
}

fn parse_json<T: serde::de::DeserializeOwned>(contents: &str, what: &str) -> LedgerResult<T> {
    serde_json::from_str(contents)
        .map_err(|e| LedgerError::Validation(format!("Invalid {} JSON: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_reports_validation() {
        let err = parse_json::<EncryptedTransferCommand>("{\"transactionId\": 1}", "transfer command")
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("transfer command"));
    }

    #[test]
    fn test_parse_plain_request() {
        let request: PlainTransferRequest = parse_json(
            r#"{"transactionId":"TX-1","sourceAccount":"A","targetAccount":"B","inDebt":"100.00","have":"100.00","time":"2025-01-15T10:30:00"}"#,
            "transfer request",
        )
        .unwrap();
        assert_eq!(request.in_debt.cents(), 10000);
    }
}
