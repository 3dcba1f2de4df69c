//! envelope-ledger - hybrid envelope encryption and an encrypted ledger
//!
//! Sensitive values are sealed with AES-256-GCM under a fresh key and IV,
//! the AES key is wrapped with RSA-OAEP (SHA-256), and the three parts are
//! joined into one text envelope:
//!
//! ```text
//! base64(ciphertext+tag)::base64(iv)::base64(wrapped key)
//! ```
//!
//! Envelopes protect transfer commands in transit and the account column of
//! the ledger at rest.
//!
//! # Architecture
//!
//! - `config`: Paths and persisted settings
//! - `error`: Error codes and the crate error type
//! - `logging`: Subscriber setup and value masking
//! - `crypto`: AES/RSA primitives, key provider, envelope cipher
//! - `models`: Money, ledger entries, transfer DTOs
//! - `storage`: JSON file storage and the encrypted-column hook
//! - `services`: The transfer protocol
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use envelope_ledger::config::{paths::LedgerPaths, settings::Settings};
//! use envelope_ledger::crypto::{EnvelopeCipher, RsaKeyProvider};
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let keys = RsaKeyProvider::load(&settings.keystore.resolved_path(&paths), &settings.keystore)?;
//! let cipher = EnvelopeCipher::new(Arc::new(keys));
//! let envelope = cipher.encrypt("ACC-1001")?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{ErrorCode, ErrorKind, LedgerError, LedgerResult};
