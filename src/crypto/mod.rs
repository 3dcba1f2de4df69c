//! Cryptographic functions for envelope-ledger
//!
//! Hybrid envelope encryption: a one-time AES-256-GCM key per value, wrapped
//! with RSA-OAEP under a single keypair loaded from a keystore.

pub mod aes;
pub mod envelope;
pub mod keys;
pub mod rsa;
pub mod secure_memory;

pub use envelope::EnvelopeCipher;
pub use keys::RsaKeyProvider;
pub use secure_memory::{SecureBytes, SecureString};
