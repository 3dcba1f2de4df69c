//! Settings for envelope-ledger
//!
//! Keystore location and credentials, the RSA key-size floor, and logging
//! preferences. Every field has a serde default so older or partial config
//! files keep loading.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::crypto::SecureString;
use crate::error::LedgerError;

/// Environment variable that overrides the stored keystore password
pub const KEYSTORE_PASSWORD_ENV: &str = "ENVELOPE_LEDGER_KEYSTORE_PASSWORD";

/// Smallest key-size floor that may be configured
pub const MIN_ALLOWED_KEY_SIZE: u32 = 1024;

/// Keystore container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeystoreType {
    /// PKCS#12 file with password and alias
    #[default]
    Pkcs12,
    /// Unencrypted PKCS#8 PEM private key
    Pem,
}

impl fmt::Display for KeystoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pkcs12 => write!(f, "PKCS12"),
            Self::Pem => write!(f, "PEM"),
        }
    }
}

/// Keystore settings
#[derive(Clone, Serialize, Deserialize)]
pub struct KeystoreSettings {
    /// Keystore file; defaults to `keystore.p12` in the base directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Alias of the private key entry
    #[serde(default = "default_alias")]
    pub alias: String,

    #[serde(default)]
    pub keystore_type: KeystoreType,

    /// Minimum RSA modulus size in bits
    #[serde(default = "default_min_key_size")]
    pub min_key_size: u32,
}

fn default_alias() -> String {
    "ledger".to_string()
}

fn default_min_key_size() -> u32 {
    2048
}

impl Default for KeystoreSettings {
    fn default() -> Self {
        Self {
            path: None,
            password: None,
            alias: default_alias(),
            keystore_type: KeystoreType::default(),
            min_key_size: default_min_key_size(),
        }
    }
}

impl KeystoreSettings {
    /// Keystore file location, falling back to the default under `paths`
    pub fn resolved_path(&self, paths: &LedgerPaths) -> PathBuf {
        match &self.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => paths.base_dir().join(path),
            None => match self.keystore_type {
                KeystoreType::Pkcs12 => paths.default_keystore(),
                KeystoreType::Pem => paths.default_pem_key(),
            },
        }
    }

    /// Effective password: the environment override, else the stored value
    pub fn password(&self) -> SecureString {
        match std::env::var(KEYSTORE_PASSWORD_ENV) {
            Ok(value) => SecureString::new(value),
            Err(_) => SecureString::new(self.password.clone().unwrap_or_default()),
        }
    }

    /// Check the values that can be checked without opening the keystore
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.min_key_size < MIN_ALLOWED_KEY_SIZE {
            return Err(LedgerError::Config(format!(
                "min_key_size must be at least {} bits, got {}",
                MIN_ALLOWED_KEY_SIZE, self.min_key_size
            )));
        }
        if self.keystore_type == KeystoreType::Pkcs12 && self.alias.trim().is_empty() {
            return Err(LedgerError::Config(
                "Keystore alias must not be blank".into(),
            ));
        }
        Ok(())
    }
}

// Keep the password out of Debug output
impl fmt::Debug for KeystoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoreSettings")
            .field("path", &self.path)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("alias", &self.alias)
            .field("keystore_type", &self.keystore_type)
            .field("min_key_size", &self.min_key_size)
            .finish()
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Settings for envelope-ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub keystore: KeystoreSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            keystore: KeystoreSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                LedgerError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            LedgerError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(&settings_path, contents).map_err(|e| {
            LedgerError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.keystore.keystore_type, KeystoreType::Pkcs12);
        assert_eq!(settings.keystore.alias, "ledger");
        assert_eq!(settings.keystore.min_key_size, 2048);
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.json);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.keystore.keystore_type = KeystoreType::Pem;
        settings.keystore.path = Some(PathBuf::from("keys/ledger.pem"));
        settings.logging.json = true;

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.keystore.keystore_type, KeystoreType::Pem);
        assert_eq!(
            loaded.keystore.resolved_path(&paths),
            temp_dir.path().join("keys/ledger.pem")
        );
        assert!(loaded.logging.json);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"keystore": {"keystore_type": "PEM"}}"#).unwrap();
        assert_eq!(settings.keystore.keystore_type, KeystoreType::Pem);
        assert_eq!(settings.keystore.min_key_size, 2048);
        assert_eq!(settings.schema_version, 1);
    }

    #[test]
    fn test_default_keystore_path() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let keystore = KeystoreSettings::default();
        assert_eq!(keystore.resolved_path(&paths), paths.default_keystore());
    }

    #[test]
    fn test_validate_rejects_low_floor() {
        let keystore = KeystoreSettings {
            min_key_size: 512,
            ..KeystoreSettings::default()
        };
        assert!(matches!(keystore.validate(), Err(LedgerError::Config(_))));
        assert!(KeystoreSettings::default().validate().is_ok());
    }

    #[test]
    fn test_debug_hides_password() {
        let keystore = KeystoreSettings {
            password: Some("changeit".into()),
            ..KeystoreSettings::default()
        };
        let debug = format!("{:?}", keystore);
        assert!(!debug.contains("changeit"));
    }
}
