//! JSON file persistence
//!
//! The ledger file is replaced whole on every commit. Data is serialized in
//! memory first, written to a sibling temp file, synced, then renamed over
//! the target, so a reader sees either the old file or the new one.
//!
//! Writers from separate processes serialize on a [`FileLock`] held across
//! read, append and replace.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Read a JSON document, or `T::default()` when the file does not exist yet
pub fn read_json<T, P>(path: P) -> LedgerResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(LedgerError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    serde_json::from_slice(&bytes)
        .map_err(|e| LedgerError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Replace `path` with the JSON form of `data`
///
/// On error the previous file, if any, is left as it was.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> LedgerResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let mut contents = serde_json::to_vec_pretty(data)
        .map_err(|e| LedgerError::Storage(format!("Failed to serialize data: {}", e)))?;
    contents.push(b'\n');

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| {
        LedgerError::Storage(format!("Failed to create directory {}: {}", dir.display(), e))
    })?;

    let temp_path = temp_path_for(path);
    if let Err(e) = write_synced(&temp_path, &contents) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(LedgerError::Storage(format!(
            "Failed to replace {}: {}",
            path.display(),
            e
        )));
    }

    Ok(())
}

/// Exclusive advisory lock on a `.lock` file beside a data file
///
/// Blocks until no other holder remains. Released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    pub fn acquire(path: &Path) -> LedgerResult<Self> {
        let lock_path = sibling_path(path, "", ".lock");
        if let Some(dir) = lock_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                LedgerError::Storage(format!("Failed to create directory {}: {}", dir.display(), e))
            })?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| {
                LedgerError::Storage(format!("Failed to open {}: {}", lock_path.display(), e))
            })?;
        FileExt::lock_exclusive(&file).map_err(|e| {
            LedgerError::Storage(format!("Failed to lock {}: {}", lock_path.display(), e))
        })?;

        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn sibling_path(path: &Path, prefix: &str, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ledger".to_string());
    path.with_file_name(format!("{}{}{}", prefix, name, suffix))
}

/// Sibling temp file, unique per process
fn temp_path_for(path: &Path) -> PathBuf {
    sibling_path(path, ".", &format!(".{}.tmp", std::process::id()))
}

fn write_synced(path: &Path, contents: &[u8]) -> LedgerResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| LedgerError::Storage(format!("Failed to create temp file: {}", e)))?;

    file.write_all(contents)
        .map_err(|e| LedgerError::Storage(format!("Failed to write temp file: {}", e)))?;
    file.sync_all()
        .map_err(|e| LedgerError::Storage(format!("Failed to sync temp file: {}", e)))
}
