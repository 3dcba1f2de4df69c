//! Storage layer for envelope-ledger
//!
//! JSON file storage with atomic writes and the encrypted-column hook used
//! for at-rest fields.

pub mod column;
pub mod file_io;
pub mod ledger;

pub use column::{ColumnCipher, EncryptedColumn};
pub use file_io::{read_json, write_json_atomic};
pub use ledger::{LedgerRepository, LedgerTransaction, StoredLedgerEntry};

use std::sync::Arc;

use crate::config::paths::LedgerPaths;
use crate::error::LedgerError;

/// Main storage coordinator
pub struct Storage {
    paths: LedgerPaths,
    pub ledger: LedgerRepository,
}

impl Storage {
    /// Create a new Storage instance whose at-rest columns use `cipher`
    pub fn new(paths: LedgerPaths, cipher: Arc<dyn ColumnCipher>) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            ledger: LedgerRepository::new(paths.ledger_file(), EncryptedColumn::new(cipher)),
            paths,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), LedgerError> {
        self.ledger.load()
    }
}
