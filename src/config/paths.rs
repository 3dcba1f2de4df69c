//! Path management for envelope-ledger
//!
//! ## Path Resolution Order
//!
//! 1. `ENVELOPE_LEDGER_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/envelope-ledger` or `~/.config/envelope-ledger`
//! 3. Windows: `%APPDATA%\envelope-ledger`

use std::path::PathBuf;

use crate::error::LedgerError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "ENVELOPE_LEDGER_DATA_DIR";

/// Manages all paths used by envelope-ledger
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Create a new LedgerPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, LedgerError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create LedgerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (<base>/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to ledger.json
    pub fn ledger_file(&self) -> PathBuf {
        self.data_dir().join("ledger.json")
    }

    /// Default location of the PKCS12 keystore
    pub fn default_keystore(&self) -> PathBuf {
        self.base_dir.join("keystore.p12")
    }

    /// Default location of a generated PEM key
    pub fn default_pem_key(&self) -> PathBuf {
        self.base_dir.join("private_key.pem")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), LedgerError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| LedgerError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| LedgerError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if the ledger has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, LedgerError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                LedgerError::Config("HOME environment variable not set".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("envelope-ledger"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, LedgerError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| LedgerError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("envelope-ledger"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        env::set_var(DATA_DIR_ENV, custom_path);

        let paths = LedgerPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.ledger_file(),
            temp_dir.path().join("data").join("ledger.json")
        );
        assert_eq!(paths.default_keystore(), temp_dir.path().join("keystore.p12"));
    }
}
