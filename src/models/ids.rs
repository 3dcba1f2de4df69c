//! Ledger row identifiers
//!
//! Each ledger row gets a random UUID of its own. Business transaction ids
//! are caller-supplied strings stored on the row, and two rows share one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a single ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerEntryId(Uuid);

impl LedgerEntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LedgerEntryId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(LedgerEntryId::new(), LedgerEntryId::new());
    }

    #[test]
    fn test_stored_as_plain_uuid() {
        let json = "\"550e8400-e29b-41d4-a716-446655440000\"";
        let id: LedgerEntryId = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), json);
        assert!(serde_json::from_str::<LedgerEntryId>("\"led-550e8400\"").is_err());
    }
}
