//! Envelope orchestrator
//!
//! Combines the AES-GCM and RSA-OAEP primitives into one contract:
//!
//! ```text
//! base64(ciphertext+tag) :: base64(iv) :: base64(rsa-wrapped aes key)
//! ```
//!
//! Every call to [`EnvelopeCipher::encrypt`] uses a fresh AES key and IV, so
//! two envelopes of the same plaintext never match. Shape problems (null,
//! blank, part count, blank part, Base64) surface as format errors; anything
//! that fails once the shape is valid surfaces as a crypto error whose public
//! message does not reveal which step failed.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ErrorCode, LedgerError, LedgerResult};
use crate::logging::MASKED_CONTEXT;

use super::aes::{self, AesKey};
use super::keys::RsaKeyProvider;
use super::rsa;
use super::SecureBytes;

/// Segment delimiter of the envelope wire format
pub const DELIMITER: &str = "::";

/// Number of segments in a well-formed envelope
pub const PART_COUNT: usize = 3;

/// Hybrid AES-GCM / RSA-OAEP envelope cipher
///
/// Cheap to clone; the keypair is shared read-only.
#[derive(Debug, Clone)]
pub struct EnvelopeCipher {
    keys: Arc<RsaKeyProvider>,
}

impl EnvelopeCipher {
    pub fn new(keys: Arc<RsaKeyProvider>) -> Self {
        Self { keys }
    }

    /// Encrypt a plaintext into an envelope
    pub fn encrypt(&self, plaintext: &str) -> LedgerResult<String> {
        self.encrypt_optional(Some(plaintext))
    }

    /// Encrypt a possibly-absent plaintext
    ///
    /// `None` fails with `ENC_001`, a blank string with `ENC_002`.
    pub fn encrypt_optional(&self, plaintext: Option<&str>) -> LedgerResult<String> {
        match self.seal(plaintext) {
            Ok(envelope) => {
                debug!("[ENCRYPT] SUCCESS | {}", MASKED_CONTEXT);
                Ok(envelope)
            }
            Err(err) => {
                warn!("[ENCRYPT] FAILED | errorCode={} | {}", err.code_value(), MASKED_CONTEXT);
                Err(err)
            }
        }
    }

    /// Decrypt an envelope back to its plaintext
    pub fn decrypt(&self, envelope: &str) -> LedgerResult<String> {
        self.decrypt_optional(Some(envelope))
    }

    /// Decrypt a possibly-absent envelope
    ///
    /// `None` fails with `DEC_001`, a blank string with `DEC_002`, both as
    /// format errors.
    pub fn decrypt_optional(&self, envelope: Option<&str>) -> LedgerResult<String> {
        match self.open(envelope) {
            Ok(plaintext) => {
                debug!("[DECRYPT] SUCCESS | {}", MASKED_CONTEXT);
                Ok(plaintext)
            }
            Err(err) => {
                warn!("[DECRYPT] FAILED | errorCode={} | {}", err.code_value(), MASKED_CONTEXT);
                Err(err)
            }
        }
    }

    /// Access to the underlying keypair
    pub fn keys(&self) -> &RsaKeyProvider {
        &self.keys
    }

    fn seal(&self, plaintext: Option<&str>) -> LedgerResult<String> {
        let plaintext =
            plaintext.ok_or_else(|| LedgerError::encryption(ErrorCode::EncPlaintextNull))?;
        if plaintext.trim().is_empty() {
            return Err(LedgerError::encryption(ErrorCode::EncPlaintextBlank));
        }

        let key = aes::generate_key()
            .map_err(|_| LedgerError::encryption(ErrorCode::EncAesKeyFailed))?;

        let payload = aes::encrypt(plaintext.as_bytes(), &key)?;
        if payload.ciphertext.trim().is_empty() || payload.iv.trim().is_empty() {
            return Err(LedgerError::encryption(ErrorCode::EncAesEncryptNull));
        }

        let wrapped_key = rsa::encrypt(key.as_bytes(), self.keys.public_key())?;
        if wrapped_key.trim().is_empty() {
            return Err(LedgerError::encryption(ErrorCode::EncRsaEncryptNull));
        }

        let envelope = [payload.ciphertext, payload.iv, wrapped_key].join(DELIMITER);
        if envelope.trim().is_empty() {
            return Err(LedgerError::encryption(ErrorCode::EncResultNull));
        }

        Ok(envelope)
    }

    fn open(&self, envelope: Option<&str>) -> LedgerResult<String> {
        let envelope =
            envelope.ok_or_else(|| LedgerError::invalid_format(ErrorCode::DecInputNull))?;
        if envelope.trim().is_empty() {
            return Err(LedgerError::invalid_format(ErrorCode::DecInputBlank));
        }

        let parts: Vec<&str> = envelope.split(DELIMITER).collect();
        if parts.len() != PART_COUNT {
            return Err(LedgerError::invalid_format_with(
                ErrorCode::DecPartsCountInvalid,
                format!("expected {} parts, found {}", PART_COUNT, parts.len()),
            ));
        }

        let (ciphertext, iv, wrapped_key) = (parts[0], parts[1], parts[2]);
        if ciphertext.trim().is_empty() {
            return Err(LedgerError::invalid_format(ErrorCode::DecEncryptedDataBlank));
        }
        if iv.trim().is_empty() {
            return Err(LedgerError::invalid_format(ErrorCode::DecIvBlank));
        }
        if wrapped_key.trim().is_empty() {
            return Err(LedgerError::invalid_format(ErrorCode::DecAesKeyBlank));
        }

        let raw_key = SecureBytes::new(rsa::decrypt(wrapped_key, self.keys.private_key())?);
        if raw_key.is_empty() {
            return Err(LedgerError::decryption(ErrorCode::DecRsaDecryptNull));
        }

        let key = AesKey::from_bytes(raw_key.as_bytes())
            .map_err(|_| LedgerError::decryption(ErrorCode::DecAesKeyRestoreNull))?;

        let plaintext = aes::decrypt(ciphertext, iv, &key)?;
        if plaintext.is_empty() {
            return Err(LedgerError::decryption(ErrorCode::DecAesDecryptNull));
        }

        String::from_utf8(plaintext)
            .map_err(|_| LedgerError::decryption(ErrorCode::DecAesDecryptFailed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::test_support::fixture_cipher;
    use crate::error::{ErrorKind, GENERIC_CRYPTO_MESSAGE};
    use base64::{engine::general_purpose::STANDARD, Engine};

    fn flip_segment_byte(envelope: &str, segment: usize) -> String {
        let mut parts: Vec<String> = envelope.split(DELIMITER).map(String::from).collect();
        let mut bytes = STANDARD.decode(&parts[segment]).unwrap();
        bytes[0] ^= 0x01;
        parts[segment] = STANDARD.encode(bytes);
        parts.join(DELIMITER)
    }

    #[test]
    fn test_round_trip() {
        let cipher = fixture_cipher();
        for plaintext in ["ACC-0001", "100.00", "2025-01-15T10:30:00", "héllo wörld ✓", " padded "] {
            let envelope = cipher.encrypt(plaintext).unwrap();
            assert_eq!(cipher.decrypt(&envelope).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_envelope_shape() {
        let cipher = fixture_cipher();
        let envelope = cipher.encrypt("ACC-0001").unwrap();
        let parts: Vec<&str> = envelope.split(DELIMITER).collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(STANDARD.decode(parts[1]).unwrap().len(), 12);
        // 2048-bit modulus
        assert_eq!(STANDARD.decode(parts[2]).unwrap().len(), 256);
    }

    #[test]
    fn test_encryption_is_non_deterministic() {
        let cipher = fixture_cipher();
        let first = cipher.encrypt("same value").unwrap();
        let second = cipher.encrypt("same value").unwrap();

        assert_ne!(first, second);
        assert_eq!(cipher.decrypt(&first).unwrap(), "same value");
        assert_eq!(cipher.decrypt(&second).unwrap(), "same value");
    }

    #[test]
    fn test_tampered_ciphertext_is_crypto_error() {
        let cipher = fixture_cipher();
        let envelope = cipher.encrypt("ACC-0001").unwrap();

        let err = cipher.decrypt(&flip_segment_byte(&envelope, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
        assert_eq!(err.public_message(), GENERIC_CRYPTO_MESSAGE);
    }

    #[test]
    fn test_tampered_iv_is_crypto_error() {
        let cipher = fixture_cipher();
        let envelope = cipher.encrypt("ACC-0001").unwrap();

        let err = cipher.decrypt(&flip_segment_byte(&envelope, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn test_wrong_length_unwrapped_key_is_crypto_error() {
        let cipher = fixture_cipher();
        let envelope = cipher.encrypt("ACC-0001").unwrap();
        let parts: Vec<&str> = envelope.split(DELIMITER).collect();
        let short_key = rsa::encrypt(&[7u8; 16], cipher.keys.public_key()).unwrap();
        let forged = [parts[0], parts[1], short_key.as_str()].join(DELIMITER);

        let err = cipher.decrypt(&forged).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::DecAesKeyRestoreNull));
        assert_eq!(err.kind(), ErrorKind::Crypto);
        assert_eq!(err.public_message(), GENERIC_CRYPTO_MESSAGE);
    }

    #[test]
    fn test_tampered_key_is_crypto_error() {
        let cipher = fixture_cipher();
        let envelope = cipher.encrypt("ACC-0001").unwrap();

        let err = cipher.decrypt(&flip_segment_byte(&envelope, 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
        assert_eq!(err.public_message(), GENERIC_CRYPTO_MESSAGE);
    }

    #[test]
    fn test_wrong_part_count_is_format_error() {
        let cipher = fixture_cipher();
        let envelope = cipher.encrypt("ACC-0001").unwrap();
        let parts: Vec<&str> = envelope.split(DELIMITER).collect();

        let inputs = [
            parts[0].to_string(),
            parts[..2].join(DELIMITER),
            format!("{}::extra", envelope),
        ];
        for input in inputs {
            let err = cipher.decrypt(&input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format);
            assert_eq!(err.code(), Some(ErrorCode::DecPartsCountInvalid));
        }
    }

    #[test]
    fn test_blank_part_is_format_error() {
        let cipher = fixture_cipher();
        let envelope = cipher.encrypt("ACC-0001").unwrap();
        let parts: Vec<&str> = envelope.split(DELIMITER).collect();

        let cases = [
            (format!(" ::{}::{}", parts[1], parts[2]), ErrorCode::DecEncryptedDataBlank),
            (format!("{}::::{}", parts[0], parts[2]), ErrorCode::DecIvBlank),
            (format!("{}::{}::", parts[0], parts[1]), ErrorCode::DecAesKeyBlank),
        ];
        for (input, code) in cases {
            let err = cipher.decrypt(&input).unwrap_err();
            assert!(err.is_format());
            assert_eq!(err.code(), Some(code));
        }
    }

    #[test]
    fn test_malformed_base64_is_format_error() {
        let cipher = fixture_cipher();
        let err = cipher.decrypt("a!b::c!d::e!f").unwrap_err();
        assert!(err.is_format());
        assert!(err.public_message().contains("DEC_003"));
    }

    #[test]
    fn test_null_and_blank_inputs() {
        let cipher = fixture_cipher();

        let null_enc = cipher.encrypt_optional(None).unwrap_err();
        let blank_enc = cipher.encrypt("").unwrap_err();
        assert_eq!(null_enc.code(), Some(ErrorCode::EncPlaintextNull));
        assert_eq!(blank_enc.code(), Some(ErrorCode::EncPlaintextBlank));
        assert_eq!(cipher.encrypt("   ").unwrap_err().code(), Some(ErrorCode::EncPlaintextBlank));

        let null_dec = cipher.decrypt_optional(None).unwrap_err();
        let blank_dec = cipher.decrypt("").unwrap_err();
        assert_eq!(null_dec.code(), Some(ErrorCode::DecInputNull));
        assert_eq!(blank_dec.code(), Some(ErrorCode::DecInputBlank));
        assert!(null_dec.is_format());
        assert!(blank_dec.is_format());
    }

    #[test]
    fn test_crypto_failures_share_one_message() {
        let cipher = fixture_cipher();
        let envelope = cipher.encrypt("ACC-0001").unwrap();

        let messages: Vec<String> = (0..3)
            .map(|segment| {
                cipher
                    .decrypt(&flip_segment_byte(&envelope, segment))
                    .unwrap_err()
                    .public_message()
            })
            .collect();
        assert!(messages.iter().all(|m| m == GENERIC_CRYPTO_MESSAGE));
    }

    #[test]
    fn test_concurrent_use() {
        let cipher = fixture_cipher();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cipher = cipher.clone();
                std::thread::spawn(move || {
                    let value = format!("ACC-{:04}", i);
                    let envelope = cipher.encrypt(&value).unwrap();
                    assert_eq!(cipher.decrypt(&envelope).unwrap(), value);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
