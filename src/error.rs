//! Error types for envelope-ledger
//!
//! This module defines the stable error code catalogue and the crate error
//! hierarchy using thiserror.
//!
//! Errors are grouped by phase (`ENC_*`, `DEC_*`, `INV_*`, `TRF_*`). Format
//! and validation failures are client-caused and carry actionable messages;
//! crypto failures collapse into one generic public message so that callers
//! cannot tell a bad tag from a bad padding or a wrong key.

use std::fmt;

use thiserror::Error;

/// Stable error codes with their default messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Encryption
    EncPlaintextNull,
    EncPlaintextBlank,
    EncAesKeyFailed,
    EncAesEncryptFailed,
    EncAesEncryptNull,
    EncRsaEncryptFailed,
    EncRsaEncryptNull,
    EncCombineFailed,
    EncResultNull,

    // Decryption
    DecInputNull,
    DecInputBlank,
    DecParseFailed,
    DecPartsCountInvalid,
    DecEncryptedDataBlank,
    DecIvBlank,
    DecAesKeyBlank,
    DecRsaDecryptFailed,
    DecRsaDecryptNull,
    DecAesKeyRestoreFailed,
    DecAesKeyRestoreNull,
    DecAesDecryptFailed,
    DecAesDecryptNull,

    // Invalid format
    InvFormat,

    // Transfer
    TransferValidationFailed,
    TransferSourceAccountNull,
    TransferTargetAccountNull,
    TransferSameAccount,
    TransferInvalidAmount,
    TransferPersistenceFailed,
    TransferDecryptionFailed,
}

impl ErrorCode {
    /// The stable code string, e.g. `DEC_004`
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EncPlaintextNull => "ENC_001",
            Self::EncPlaintextBlank => "ENC_002",
            Self::EncAesKeyFailed => "ENC_003",
            Self::EncAesEncryptFailed => "ENC_004",
            Self::EncAesEncryptNull => "ENC_005",
            Self::EncRsaEncryptFailed => "ENC_006",
            Self::EncRsaEncryptNull => "ENC_007",
            Self::EncCombineFailed => "ENC_008",
            Self::EncResultNull => "ENC_009",
            Self::DecInputNull => "DEC_001",
            Self::DecInputBlank => "DEC_002",
            Self::DecParseFailed => "DEC_003",
            Self::DecPartsCountInvalid => "DEC_004",
            Self::DecEncryptedDataBlank => "DEC_005",
            Self::DecIvBlank => "DEC_006",
            Self::DecAesKeyBlank => "DEC_007",
            Self::DecRsaDecryptFailed => "DEC_008",
            Self::DecRsaDecryptNull => "DEC_009",
            Self::DecAesKeyRestoreFailed => "DEC_010",
            Self::DecAesKeyRestoreNull => "DEC_011",
            Self::DecAesDecryptFailed => "DEC_012",
            Self::DecAesDecryptNull => "DEC_013",
            Self::InvFormat => "INV_001",
            Self::TransferValidationFailed => "TRF_001",
            Self::TransferSourceAccountNull => "TRF_002",
            Self::TransferTargetAccountNull => "TRF_003",
            Self::TransferSameAccount => "TRF_004",
            Self::TransferInvalidAmount => "TRF_005",
            Self::TransferPersistenceFailed => "TRF_006",
            Self::TransferDecryptionFailed => "TRF_007",
        }
    }

    /// The default human-readable message for this code
    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::EncPlaintextNull => "Plaintext cannot be null",
            Self::EncPlaintextBlank => "Plaintext cannot be blank",
            Self::EncAesKeyFailed => "Failed to generate AES key",
            Self::EncAesEncryptFailed => "AES encryption failed",
            Self::EncAesEncryptNull => "AES encryption returned null payload",
            Self::EncRsaEncryptFailed => "RSA encryption failed",
            Self::EncRsaEncryptNull => "RSA encryption returned null or blank result",
            Self::EncCombineFailed => "Failed to combine encrypted parts",
            Self::EncResultNull => "Combined encrypted data is null or blank",
            Self::DecInputNull => "Cannot decrypt null value",
            Self::DecInputBlank => "Cannot decrypt blank value",
            Self::DecParseFailed => "Failed to parse encrypted data",
            Self::DecPartsCountInvalid => "Invalid encrypted format - wrong number of parts",
            Self::DecEncryptedDataBlank => "Encrypted data part is blank",
            Self::DecIvBlank => "IV part is blank",
            Self::DecAesKeyBlank => "Encrypted AES key part is blank",
            Self::DecRsaDecryptFailed => "RSA decryption failed",
            Self::DecRsaDecryptNull => "RSA decryption returned null or empty key",
            Self::DecAesKeyRestoreFailed => "Failed to restore AES key",
            Self::DecAesKeyRestoreNull => "Failed to restore AES key - returned null",
            Self::DecAesDecryptFailed => "AES decryption failed",
            Self::DecAesDecryptNull => "AES decryption returned null or empty data",
            Self::InvFormat => "Invalid encrypted data format",
            Self::TransferValidationFailed => "Transfer validation failed",
            Self::TransferSourceAccountNull => "Source account cannot be null or empty",
            Self::TransferTargetAccountNull => "Target account cannot be null or empty",
            Self::TransferSameAccount => "Source and target accounts cannot be the same",
            Self::TransferInvalidAmount => "Transfer amount must be positive",
            Self::TransferPersistenceFailed => "Failed to save transaction to database",
            Self::TransferDecryptionFailed => "Failed to decrypt transfer parameters",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Broad classification used for reporting decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input (envelope shape, Base64, IV length)
    Format,
    /// Wrong key, tampered data or provider fault
    Crypto,
    /// Business validation of a transfer
    Validation,
    /// Ledger write or read failed
    Persistence,
    /// Keystore or settings problem, fatal at startup
    Configuration,
    /// Anything not classified above
    Internal,
}

/// Public text for every crypto failure, whatever the underlying step
pub const GENERIC_CRYPTO_MESSAGE: &str = "Invalid encrypted data";

/// Public text for uncategorized failures
pub const GENERIC_INTERNAL_MESSAGE: &str = "Internal error";

/// The main error type for envelope-ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Encryption failed at the given step
    #[error("Encryption error [{code}]: {}", .code.default_message())]
    Encryption { code: ErrorCode },

    /// Decryption failed for a cryptographic reason
    #[error("Decryption error [{code}]: {}", .code.default_message())]
    Decryption { code: ErrorCode },

    /// Input could not be parsed as an envelope or as its segments
    #[error("Invalid encrypted data [{code}]: {detail}")]
    InvalidFormat { code: ErrorCode, detail: String },

    /// Transfer protocol failure
    #[error("Transfer error [{code}]: {detail}")]
    Transfer {
        code: ErrorCode,
        detail: String,
        #[source]
        source: Option<Box<LedgerError>>,
    },

    /// Keystore could not be loaded or failed validation
    #[error("Keystore error: {0}")]
    Keystore(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors for input values
    #[error("Validation error: {0}")]
    Validation(String),
}

impl LedgerError {
    pub fn encryption(code: ErrorCode) -> Self {
        Self::Encryption { code }
    }

    pub fn decryption(code: ErrorCode) -> Self {
        Self::Decryption { code }
    }

    /// Create a format error using the code's default message as detail
    pub fn invalid_format(code: ErrorCode) -> Self {
        Self::InvalidFormat {
            code,
            detail: code.default_message().to_string(),
        }
    }

    /// Create a format error with a specific detail
    pub fn invalid_format_with(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::InvalidFormat {
            code,
            detail: detail.into(),
        }
    }

    /// Create a transfer error using the code's default message as detail
    pub fn transfer(code: ErrorCode) -> Self {
        Self::Transfer {
            code,
            detail: code.default_message().to_string(),
            source: None,
        }
    }

    /// Create a transfer error that wraps an underlying failure
    pub fn transfer_caused_by(code: ErrorCode, detail: impl Into<String>, source: LedgerError) -> Self {
        Self::Transfer {
            code,
            detail: detail.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The error code, if this error carries one
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Encryption { code }
            | Self::Decryption { code }
            | Self::InvalidFormat { code, .. }
            | Self::Transfer { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Code string for log lines, `UNKNOWN` if none
    pub fn code_value(&self) -> &'static str {
        self.code().map(|c| c.code()).unwrap_or("UNKNOWN")
    }

    /// Classify this error for reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Encryption { code } => match code {
                ErrorCode::EncPlaintextNull | ErrorCode::EncPlaintextBlank => ErrorKind::Validation,
                _ => ErrorKind::Crypto,
            },
            Self::Decryption { .. } => ErrorKind::Crypto,
            Self::InvalidFormat { .. } => ErrorKind::Format,
            Self::Transfer { code, source, .. } => match code {
                ErrorCode::TransferPersistenceFailed => ErrorKind::Persistence,
                ErrorCode::TransferDecryptionFailed => source
                    .as_ref()
                    .map(|inner| inner.kind())
                    .unwrap_or(ErrorKind::Crypto),
                _ => ErrorKind::Validation,
            },
            Self::Keystore(_) | Self::Config(_) => ErrorKind::Configuration,
            Self::Storage(_) => ErrorKind::Persistence,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Io(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a format error
    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }

    /// Check if this is a crypto error
    pub fn is_crypto(&self) -> bool {
        self.kind() == ErrorKind::Crypto
    }

    /// Check if the caller caused this error
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Format | ErrorKind::Validation)
    }

    /// Message that is safe to show to the caller
    ///
    /// Crypto failures never reveal which step failed.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Crypto => GENERIC_CRYPTO_MESSAGE.to_string(),
            ErrorKind::Format => format!(
                "{} [{}]",
                ErrorCode::InvFormat.default_message(),
                self.code_value()
            ),
            ErrorKind::Validation => match self {
                Self::Transfer { code, .. } | Self::Encryption { code } => {
                    format!("{} [{}]", code.default_message(), code)
                }
                other => other.to_string(),
            },
            ErrorKind::Persistence => match self {
                Self::Transfer { code, .. } => {
                    format!("{} [{}]", code.default_message(), code)
                }
                _ => GENERIC_INTERNAL_MESSAGE.to_string(),
            },
            ErrorKind::Configuration => self.to_string(),
            ErrorKind::Internal => GENERIC_INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for envelope-ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
