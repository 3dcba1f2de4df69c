//! Field CLI commands
//!
//! Encrypt or decrypt a single value with the envelope cipher.

use clap::Subcommand;

use crate::crypto::EnvelopeCipher;
use crate::error::LedgerResult;

/// Single-field subcommands
#[derive(Subcommand)]
pub enum FieldCommands {
    /// Encrypt a value into an envelope
    Encrypt {
        /// Plaintext value
        value: String,
    },
    /// Decrypt an envelope back into its value
    Decrypt {
        /// Envelope string (ciphertext::iv::wrapped-key)
        envelope: String,
    },
}

/// Handle a field command
pub fn handle_field_command(cipher: &EnvelopeCipher, cmd: FieldCommands) -> LedgerResult<()> {
    match cmd {
        FieldCommands::Encrypt { value } => {
            println!("{}", cipher.encrypt(&value)?);
        }
        FieldCommands::Decrypt { envelope } => {
            println!("{}", cipher.decrypt(envelope.trim())?);
        }
    }

    Ok(())
}
