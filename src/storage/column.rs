//! Encrypted column hook
//!
//! Transparent transform applied to at-rest fields: plaintext attributes are
//! sealed into envelopes on write and opened on read. Absent values pass
//! through untouched. The cipher is handed in at construction, so the hook
//! is usable as soon as it exists.

use std::sync::Arc;

use crate::crypto::EnvelopeCipher;
use crate::error::LedgerResult;

/// Cipher used by [`EncryptedColumn`]
pub trait ColumnCipher: Send + Sync {
    fn encrypt_column(&self, plaintext: &str) -> LedgerResult<String>;
    fn decrypt_column(&self, stored: &str) -> LedgerResult<String>;
}

impl ColumnCipher for EnvelopeCipher {
    fn encrypt_column(&self, plaintext: &str) -> LedgerResult<String> {
        self.encrypt(plaintext)
    }

    fn decrypt_column(&self, stored: &str) -> LedgerResult<String> {
        self.decrypt(stored)
    }
}

/// Bidirectional converter between entity attributes and stored columns
#[derive(Clone)]
pub struct EncryptedColumn {
    cipher: Arc<dyn ColumnCipher>,
}

impl EncryptedColumn {
    pub fn new(cipher: Arc<dyn ColumnCipher>) -> Self {
        Self { cipher }
    }

    /// Attribute to stored column
    pub fn to_database_column(&self, attribute: Option<&str>) -> LedgerResult<Option<String>> {
        attribute
            .map(|value| self.cipher.encrypt_column(value))
            .transpose()
    }

    /// Stored column to attribute
    pub fn to_entity_attribute(&self, column: Option<&str>) -> LedgerResult<Option<String>> {
        column
            .map(|value| self.cipher.decrypt_column(value))
            .transpose()
    }
}

impl std::fmt::Debug for EncryptedColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptedColumn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::test_support::fixture_cipher;

    fn column() -> EncryptedColumn {
        EncryptedColumn::new(Arc::new(fixture_cipher()))
    }

    #[test]
    fn test_none_passes_through() {
        let column = column();
        assert_eq!(column.to_database_column(None).unwrap(), None);
        assert_eq!(column.to_entity_attribute(None).unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let column = column();
        let stored = column.to_database_column(Some("ACC-0001")).unwrap().unwrap();

        assert_ne!(stored, "ACC-0001");
        assert_eq!(stored.split("::").count(), 3);
        assert_eq!(
            column.to_entity_attribute(Some(&stored)).unwrap().as_deref(),
            Some("ACC-0001")
        );
    }

    #[test]
    fn test_corrupt_column_fails() {
        let column = column();
        let err = column.to_entity_attribute(Some("not-an-envelope")).unwrap_err();
        assert!(err.is_format());
    }
}
