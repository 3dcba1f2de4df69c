//! Configuration module for envelope-ledger
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Keystore and logging settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::{KeystoreSettings, KeystoreType, LoggingSettings, Settings};
