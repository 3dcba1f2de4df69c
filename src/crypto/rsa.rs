//! RSA asymmetric primitive
//!
//! Wraps and unwraps short buffers (AES keys) with RSA-OAEP over SHA-256 and
//! MGF1-SHA-256, and signs/verifies with PKCS#1 v1.5 over a SHA-256 digest.

use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::rand_core::OsRng;
use rsa::{Oaep, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::{ErrorCode, LedgerError, LedgerResult};

fn decode_segment(data_b64: &str, what: &str) -> LedgerResult<Vec<u8>> {
    STANDARD.decode(data_b64.trim()).map_err(|e| {
        LedgerError::invalid_format_with(
            ErrorCode::DecParseFailed,
            format!("Malformed Base64 in {}: {}", what, e),
        )
    })
}

/// Encrypt a short payload under the public key, returning Base64
///
/// The payload must fit the OAEP capacity of the key; a 32-byte AES key
/// always fits a 2048-bit modulus.
pub fn encrypt(data: &[u8], public_key: &RsaPublicKey) -> LedgerResult<String> {
    let wrapped = public_key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), data)
        .map_err(|_| LedgerError::encryption(ErrorCode::EncRsaEncryptFailed))?;
    Ok(STANDARD.encode(wrapped))
}

/// Decrypt a Base64 payload with the private key
pub fn decrypt(data_b64: &str, private_key: &RsaPrivateKey) -> LedgerResult<Vec<u8>> {
    let wrapped = decode_segment(data_b64, "wrapped key segment")?;
    private_key
        .decrypt(Oaep::new::<Sha256>(), &wrapped)
        .map_err(|_| LedgerError::decryption(ErrorCode::DecRsaDecryptFailed))
}

/// Sign data with SHA-256, returning the Base64 signature
pub fn sign(data: &[u8], private_key: &RsaPrivateKey) -> LedgerResult<String> {
    let digest = Sha256::digest(data);
    let signature = private_key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|_| LedgerError::encryption(ErrorCode::EncRsaEncryptFailed))?;
    Ok(STANDARD.encode(signature))
}

/// Verify a Base64 SHA-256 signature over data
///
/// A malformed signature encoding is a format error; a signature that does
/// not match is `Ok(false)`.
pub fn verify(data: &[u8], signature_b64: &str, public_key: &RsaPublicKey) -> LedgerResult<bool> {
    let signature = decode_segment(signature_b64, "signature")?;
    let digest = Sha256::digest(data);
    Ok(public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &signature)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::test_support::fixture_key;
    use crate::error::ErrorKind;

    #[test]
    fn test_wrap_unwrap() {
        let key = fixture_key();
        let public = RsaPublicKey::from(&key);
        let secret = [7u8; 32];

        let wrapped = encrypt(&secret, &public).unwrap();
        let unwrapped = decrypt(&wrapped, &key).unwrap();

        assert_eq!(unwrapped, secret);
    }

    #[test]
    fn test_oaep_is_randomized() {
        let key = fixture_key();
        let public = RsaPublicKey::from(&key);

        let first = encrypt(b"same", &public).unwrap();
        let second = encrypt(b"same", &public).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_tampered_wrap_is_crypto_error() {
        let key = fixture_key();
        let public = RsaPublicKey::from(&key);

        let wrapped = encrypt(&[1u8; 32], &public).unwrap();
        let mut bytes = STANDARD.decode(&wrapped).unwrap();
        bytes[10] ^= 0x01;

        let err = decrypt(&STANDARD.encode(bytes), &key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
        assert_eq!(err.code(), Some(ErrorCode::DecRsaDecryptFailed));
    }

    #[test]
    fn test_malformed_base64_is_format_error() {
        let key = fixture_key();
        let err = decrypt("###", &key).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_sign_verify() {
        let key = fixture_key();
        let public = RsaPublicKey::from(&key);

        let signature = sign(b"transfer command", &key).unwrap();
        assert!(verify(b"transfer command", &signature, &public).unwrap());
        assert!(!verify(b"another command", &signature, &public).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_signature() {
        let key = fixture_key();
        let public = RsaPublicKey::from(&key);
        assert!(verify(b"data", "not base64!", &public).unwrap_err().is_format());
    }
}
