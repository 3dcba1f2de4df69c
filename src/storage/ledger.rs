//! Ledger repository for JSON storage
//!
//! Append-only store of ledger entries in `ledger.json`. Account numbers are
//! stored as envelopes via [`EncryptedColumn`]; amounts and times are stored
//! in their canonical text forms.
//!
//! Writes go through a [`LedgerTransaction`]: rows are staged (and their
//! account column sealed) on insert, then written together with one atomic
//! file replacement on commit. A transaction dropped without commit, or a
//! failed commit, leaves both the file and the in-memory rows untouched.
//!
//! Commit holds an exclusive lock on `ledger.json.lock` and appends to the
//! rows currently on disk, so rows committed by other processes survive.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::models::timestamp;
use crate::models::{LedgerEntry, LedgerEntryId, Money};

use super::column::EncryptedColumn;
use super::file_io::{read_json, write_json_atomic, FileLock};

/// A ledger row as written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLedgerEntry {
    pub id: LedgerEntryId,
    pub transaction_id: String,
    /// Account number envelope
    pub account: String,
    pub in_debt: Money,
    pub have: Money,
    #[serde(with = "timestamp::canonical")]
    pub transaction_time: NaiveDateTime,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
struct LedgerData {
    entries: Vec<StoredLedgerEntry>,
}

#[derive(Serialize)]
struct LedgerDataRef<'a> {
    entries: &'a [StoredLedgerEntry],
}

#[derive(Debug, Default)]
struct LedgerState {
    rows: Vec<StoredLedgerEntry>,
    /// Index: transaction_id -> row positions
    by_transaction: HashMap<String, Vec<usize>>,
}

impl LedgerState {
    fn append(&mut self, row: StoredLedgerEntry) {
        self.by_transaction
            .entry(row.transaction_id.clone())
            .or_default()
            .push(self.rows.len());
        self.rows.push(row);
    }
}

/// Repository for ledger persistence
pub struct LedgerRepository {
    path: PathBuf,
    column: EncryptedColumn,
    state: RwLock<LedgerState>,
}

impl LedgerRepository {
    pub fn new(path: PathBuf, column: EncryptedColumn) -> Self {
        Self {
            path,
            column,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Load rows from disk and build indexes
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: LedgerData = read_json(&self.path)?;

        let mut state = self.state.write().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        *state = LedgerState::default();
        for row in file_data.entries {
            state.append(row);
        }

        debug!(rows = state.rows.len(), "Ledger loaded");
        Ok(())
    }

    /// Start a unit of work
    pub fn begin(&self) -> LedgerTransaction<'_> {
        LedgerTransaction {
            repo: self,
            staged: Vec::new(),
            committed: false,
        }
    }

    /// Number of committed rows
    pub fn count(&self) -> LedgerResult<usize> {
        let state = self.state.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(state.rows.len())
    }

    /// All rows for a business transaction id, in write order
    pub fn find_by_transaction_id(&self, transaction_id: &str) -> LedgerResult<Vec<LedgerEntry>> {
        let state = self.state.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let positions = state
            .by_transaction
            .get(transaction_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        positions
            .iter()
            .filter_map(|&i| state.rows.get(i))
            .map(|row| self.open_row(row))
            .collect()
    }

    /// Rows whose transaction time falls in `[from, to]`; open ends are unbounded
    pub fn find_by_time_range(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        let state = self.state.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut rows: Vec<&StoredLedgerEntry> = state
            .rows
            .iter()
            .filter(|row| from.map_or(true, |from| row.transaction_time >= from))
            .filter(|row| to.map_or(true, |to| row.transaction_time <= to))
            .collect();
        rows.sort_by(|a, b| a.transaction_time.cmp(&b.transaction_time));

        rows.into_iter().map(|row| self.open_row(row)).collect()
    }

    fn open_row(&self, row: &StoredLedgerEntry) -> LedgerResult<LedgerEntry> {
        let account = self
            .column
            .to_entity_attribute(Some(&row.account))?
            .unwrap_or_default();

        Ok(LedgerEntry {
            id: row.id,
            transaction_id: row.transaction_id.clone(),
            account,
            in_debt: row.in_debt,
            have: row.have,
            transaction_time: row.transaction_time,
            created_at: row.created_at,
        })
    }

    fn seal_row(&self, entry: &LedgerEntry) -> LedgerResult<StoredLedgerEntry> {
        let account = self
            .column
            .to_database_column(Some(&entry.account))?
            .ok_or_else(|| LedgerError::Storage("Account column sealed to nothing".into()))?;

        Ok(StoredLedgerEntry {
            id: entry.id,
            transaction_id: entry.transaction_id.clone(),
            account,
            in_debt: entry.in_debt,
            have: entry.have,
            transaction_time: entry.transaction_time,
            created_at: entry.created_at,
        })
    }
}

/// Unit of work over the ledger
///
/// Nothing is visible to readers or written to disk until [`commit`].
///
/// [`commit`]: LedgerTransaction::commit
pub struct LedgerTransaction<'a> {
    repo: &'a LedgerRepository,
    staged: Vec<StoredLedgerEntry>,
    committed: bool,
}

impl LedgerTransaction<'_> {
    /// Validate an entry, seal its account column and stage it
    pub fn insert(&mut self, entry: &LedgerEntry) -> LedgerResult<()> {
        entry.validate().map_err(LedgerError::Validation)?;
        let row = self.repo.seal_row(entry)?;
        self.staged.push(row);
        Ok(())
    }

    /// Number of staged rows
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Write every staged row in one atomic file replacement
    ///
    /// Returns the number of rows written.
    pub fn commit(mut self) -> LedgerResult<usize> {
        let _lock = FileLock::acquire(&self.repo.path)?;
        let mut state = self.repo.state.write().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let mut rows = read_json::<LedgerData, _>(&self.repo.path)?.entries;
        rows.extend(self.staged.iter().cloned());
        write_json_atomic(&self.repo.path, &LedgerDataRef { entries: &rows })?;

        let written = self.staged.len();
        self.staged.clear();
        *state = LedgerState::default();
        for row in rows {
            state.append(row);
        }
        self.committed = true;

        debug!(rows = written, total = state.rows.len(), "Ledger transaction committed");
        Ok(written)
    }

    /// Discard every staged row
    pub fn rollback(self) {}
}

impl Drop for LedgerTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.staged.is_empty() {
            debug!(rows = self.staged.len(), "Ledger transaction rolled back");
        }
    }
}
