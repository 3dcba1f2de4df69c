//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod field;
pub mod keystore;
pub mod ledger;
pub mod transfer;

pub use field::{handle_field_command, FieldCommands};
pub use keystore::{handle_keystore_command, load_key_provider, KeystoreCommands};
pub use ledger::{handle_ledger_command, LedgerCommands};
pub use transfer::{handle_transfer_command, TransferCommands};

use std::io::Read;
use std::sync::Arc;

use crate::config::{paths::LedgerPaths, settings::Settings};
use crate::crypto::EnvelopeCipher;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::Storage;

/// Everything a keyed command needs: the cipher and the loaded ledger
pub struct LedgerContext {
    pub cipher: EnvelopeCipher,
    pub storage: Storage,
}

impl LedgerContext {
    /// Load the keypair and the ledger
    ///
    /// Keystore problems are fatal here; no command runs without a valid key.
    pub fn open(paths: &LedgerPaths, settings: &Settings) -> LedgerResult<Self> {
        let keys = load_key_provider(paths, settings)?;
        let cipher = EnvelopeCipher::new(Arc::new(keys));

        let storage = Storage::new(paths.clone(), Arc::new(cipher.clone()))?;
        storage.load_all()?;

        Ok(Self { cipher, storage })
    }
}

/// Read command input from a file, or from stdin when the path is `-`
pub(crate) fn read_input(path: &str) -> LedgerResult<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| LedgerError::Io(format!("Failed to read stdin: {}", e)))?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Io(format!("Failed to read '{}': {}", path, e)))
    }
}
