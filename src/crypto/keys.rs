//! RSA key provider
//!
//! Loads the single process-wide RSA keypair from a PKCS12 keystore or a
//! PKCS#8 PEM file, enforces the configured key-size floor, and exposes
//! read-only accessors. Any failure here is fatal at startup.

use std::path::Path;

use ::rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use ::rsa::rand_core::OsRng;
use ::rsa::traits::PublicKeyParts;
use ::rsa::{RsaPrivateKey, RsaPublicKey};
use p12_keystore::{KeyStore, KeyStoreEntry};
use tracing::info;

use crate::config::{KeystoreSettings, KeystoreType};
use crate::error::{LedgerError, LedgerResult};

use super::SecureBytes;

/// Default size for generated keys
pub const DEFAULT_GENERATED_KEY_BITS: usize = 2048;

/// Immutable RSA keypair loaded once per process
pub struct RsaKeyProvider {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl RsaKeyProvider {
    /// Load and validate the keypair described by `settings`
    pub fn load(path: &Path, settings: &KeystoreSettings) -> LedgerResult<Self> {
        settings.validate()?;

        if !path.exists() {
            return Err(LedgerError::Keystore(format!(
                "Keystore file not found: {}",
                path.display()
            )));
        }

        let private_key = match settings.keystore_type {
            KeystoreType::Pkcs12 => {
                let password = settings.password();
                if password.is_blank() {
                    return Err(LedgerError::Keystore(
                        "Keystore password must not be blank".into(),
                    ));
                }
                read_pkcs12(path, password.as_str(), &settings.alias)?
            }
            KeystoreType::Pem => read_pem(path)?,
        };

        let provider = Self::from_private_key(private_key, settings.min_key_size)?;
        info!(
            keystore_type = %settings.keystore_type,
            key_bits = provider.key_size_bits(),
            "RSA keypair loaded"
        );
        Ok(provider)
    }

    /// Wrap an already-decoded private key, enforcing the size floor
    pub fn from_private_key(private_key: RsaPrivateKey, min_key_size: u32) -> LedgerResult<Self> {
        let bits = private_key.size() * 8;
        if bits < min_key_size as usize {
            return Err(LedgerError::Keystore(format!(
                "RSA key size {} bits is below the minimum of {} bits",
                bits, min_key_size
            )));
        }

        let public_key = RsaPublicKey::from(&private_key);
        Ok(Self {
            private_key,
            public_key,
        })
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Modulus size in bits
    pub fn key_size_bits(&self) -> usize {
        self.public_key.size() * 8
    }
}

// Never print key material
impl std::fmt::Debug for RsaKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyProvider")
            .field("key_bits", &self.key_size_bits())
            .finish()
    }
}

fn read_pkcs12(path: &Path, password: &str, alias: &str) -> LedgerResult<RsaPrivateKey> {
    let data = std::fs::read(path)
        .map_err(|e| LedgerError::Keystore(format!("Failed to read keystore: {}", e)))?;

    let keystore = KeyStore::from_pkcs12(&data, password)
        .map_err(|e| LedgerError::Keystore(format!("Failed to open keystore: {}", e)))?;

    let chain = match keystore.entry(alias) {
        Some(KeyStoreEntry::PrivateKeyChain(chain)) => chain,
        Some(_) => {
            return Err(LedgerError::Keystore(format!(
                "Alias '{}' does not hold a private key",
                alias
            )))
        }
        None => {
            return Err(LedgerError::Keystore(format!(
                "Alias '{}' not found in keystore",
                alias
            )))
        }
    };

    if chain.chain().is_empty() {
        return Err(LedgerError::Keystore(format!(
            "No certificate found for alias '{}'",
            alias
        )));
    }

    let der = SecureBytes::new(chain.key().to_vec());
    RsaPrivateKey::from_pkcs8_der(der.as_bytes())
        .map_err(|e| LedgerError::Keystore(format!("Keystore entry is not an RSA key: {}", e)))
}

fn read_pem(path: &Path) -> LedgerResult<RsaPrivateKey> {
    let pem = std::fs::read_to_string(path)
        .map_err(|e| LedgerError::Keystore(format!("Failed to read key file: {}", e)))?;

    RsaPrivateKey::from_pkcs8_pem(&pem)
        .map_err(|e| LedgerError::Keystore(format!("Invalid PKCS#8 private key: {}", e)))
}

/// Generate a fresh RSA private key
///
/// Refuses sizes below `min_key_size`.
pub fn generate(bits: usize, min_key_size: u32) -> LedgerResult<RsaPrivateKey> {
    if bits < min_key_size as usize {
        return Err(LedgerError::Validation(format!(
            "Key size {} bits is below the minimum of {} bits",
            bits, min_key_size
        )));
    }

    RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| LedgerError::Keystore(format!("Key generation failed: {}", e)))
}

/// Write a private key as unencrypted PKCS#8 PEM
pub fn write_pem(private_key: &RsaPrivateKey, path: &Path) -> LedgerResult<()> {
    let pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| LedgerError::Keystore(format!("Failed to encode key: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, pem.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
