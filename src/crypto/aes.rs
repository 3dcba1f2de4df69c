//! AES-256-GCM symmetric primitive
//!
//! Encrypts short byte buffers under a one-time key. Every call draws a fresh
//! 96-bit IV from the OS random source; the 128-bit tag is appended to the
//! ciphertext by the AEAD implementation.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ErrorCode, LedgerError, LedgerResult};

/// AES key size in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// A one-time AES-256 key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AesKey {
    bytes: [u8; KEY_SIZE],
}

impl AesKey {
    /// Restore a key from raw bytes recovered by the RSA unwrap
    ///
    /// The bytes only exist after a successful unwrap, so a wrong length
    /// means the wrapping key was wrong and is reported as a crypto error.
    pub fn from_bytes(bytes: &[u8]) -> LedgerResult<Self> {
        let bytes: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| LedgerError::decryption(ErrorCode::DecAesKeyRestoreFailed))?;
        Ok(Self { bytes })
    }

    /// The raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for AesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AesKey([REDACTED])")
    }
}

/// Base64 ciphertext (with tag) and IV produced by one encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AesPayload {
    pub ciphertext: String,
    pub iv: String,
}

/// Generate a fresh random 256-bit key
pub fn generate_key() -> LedgerResult<AesKey> {
    let mut bytes = [0u8; KEY_SIZE];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| LedgerError::encryption(ErrorCode::EncAesKeyFailed))?;
    let key = AesKey { bytes };
    bytes.zeroize();
    Ok(key)
}

/// Encrypt plaintext bytes under the given key with a fresh IV
pub fn encrypt(plaintext: &[u8], key: &AesKey) -> LedgerResult<AesPayload> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| LedgerError::encryption(ErrorCode::EncAesEncryptFailed))?;

    let mut iv = [0u8; IV_SIZE];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|_| LedgerError::encryption(ErrorCode::EncAesEncryptFailed))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| LedgerError::encryption(ErrorCode::EncAesEncryptFailed))?;

    Ok(AesPayload {
        ciphertext: STANDARD.encode(ciphertext),
        iv: STANDARD.encode(iv),
    })
}

/// Decrypt Base64 ciphertext and IV with the given key
///
/// Malformed Base64 and a wrong IV length are format errors. A tag mismatch,
/// whether from a wrong key or tampered bytes, is a crypto error.
pub fn decrypt(ciphertext_b64: &str, iv_b64: &str, key: &AesKey) -> LedgerResult<Vec<u8>> {
    let ciphertext = STANDARD.decode(ciphertext_b64.trim()).map_err(|e| {
        LedgerError::invalid_format_with(
            ErrorCode::DecParseFailed,
            format!("Malformed Base64 in ciphertext segment: {}", e),
        )
    })?;
    let iv = STANDARD.decode(iv_b64.trim()).map_err(|e| {
        LedgerError::invalid_format_with(
            ErrorCode::DecParseFailed,
            format!("Malformed Base64 in IV segment: {}", e),
        )
    })?;

    // Nonce::from_slice panics on any other length
    if iv.len() != IV_SIZE {
        return Err(LedgerError::invalid_format_with(
            ErrorCode::DecParseFailed,
            format!("IV must be {} bytes, got {}", IV_SIZE, iv.len()),
        ));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| LedgerError::decryption(ErrorCode::DecAesDecryptFailed))?;

    cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_ref())
        .map_err(|_| LedgerError::decryption(ErrorCode::DecAesDecryptFailed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_encrypt_decrypt() {
        let key = generate_key().unwrap();
        let plaintext = b"ACC-0001";

        let payload = encrypt(plaintext, &key).unwrap();
        let decrypted = decrypt(&payload.ciphertext, &payload.iv, &key).unwrap();

        assert_eq!(plaintext, decrypted.as_slice());
    }

    #[test]
    fn test_iv_is_twelve_bytes() {
        let key = generate_key().unwrap();
        let payload = encrypt(b"100.00", &key).unwrap();
        assert_eq!(STANDARD.decode(&payload.iv).unwrap().len(), IV_SIZE);
        // ciphertext carries the 16-byte tag
        assert_eq!(STANDARD.decode(&payload.ciphertext).unwrap().len(), 6 + 16);
    }

    #[test]
    fn test_different_ivs() {
        let key = generate_key().unwrap();
        let first = encrypt(b"same", &key).unwrap();
        let second = encrypt(b"same", &key).unwrap();

        assert_ne!(first.iv, second.iv);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn test_wrong_key_is_crypto_error() {
        let key1 = generate_key().unwrap();
        let key2 = generate_key().unwrap();

        let payload = encrypt(b"secret", &key1).unwrap();
        let err = decrypt(&payload.ciphertext, &payload.iv, &key2).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Crypto);
        assert_eq!(err.code(), Some(ErrorCode::DecAesDecryptFailed));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = generate_key().unwrap();
        let payload = encrypt(b"Hello, World!", &key).unwrap();

        let mut bytes = STANDARD.decode(&payload.ciphertext).unwrap();
        bytes[0] ^= 0xFF;
        let tampered = STANDARD.encode(&bytes);

        let err = decrypt(&tampered, &payload.iv, &key).unwrap_err();
        assert!(err.is_crypto());
    }

    #[test]
    fn test_malformed_base64_is_format_error() {
        let key = generate_key().unwrap();
        let payload = encrypt(b"x", &key).unwrap();

        let err = decrypt("not*base64!", &payload.iv, &key).unwrap_err();
        assert!(err.is_format());

        let err = decrypt(&payload.ciphertext, "%%%", &key).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_wrong_iv_length_is_format_error() {
        let key = generate_key().unwrap();
        let payload = encrypt(b"x", &key).unwrap();
        let short_iv = STANDARD.encode([0u8; 8]);

        let err = decrypt(&payload.ciphertext, &short_iv, &key).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_key_restore() {
        let key = generate_key().unwrap();
        let restored = AesKey::from_bytes(key.as_bytes()).unwrap();
        assert_eq!(key.as_bytes(), restored.as_bytes());

        let err = AesKey::from_bytes(&[1, 2, 3]).unwrap_err();
        assert!(err.is_crypto());
        assert_eq!(err.code(), Some(ErrorCode::DecAesKeyRestoreFailed));
    }

    #[test]
    fn test_key_debug_redacted() {
        let key = generate_key().unwrap();
        assert_eq!(format!("{:?}", key), "AesKey([REDACTED])");
    }
}
