//! Transfer wire shapes
//!
//! [`EncryptedTransferCommand`] is what travels between services: six
//! independent envelopes, no plaintext. [`PlainTransferRequest`] and
//! [`DecryptedTransfer`] are the plaintext forms used by the test-only
//! encrypt/decrypt operations.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::money::Money;
use super::timestamp;

/// A transfer command whose every field is an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedTransferCommand {
    pub transaction_id: String,
    pub source_account: String,
    pub target_account: String,
    /// Debit amount envelope
    pub encrypted_in_debt: String,
    /// Credit amount envelope
    pub encrypted_have: String,
    /// Transaction time envelope
    pub time: String,
}

/// Plaintext input for producing an [`EncryptedTransferCommand`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainTransferRequest {
    pub transaction_id: String,
    pub source_account: String,
    pub target_account: String,
    pub in_debt: Money,
    pub have: Money,
    #[serde(with = "timestamp::canonical")]
    pub time: NaiveDateTime,
}

/// Plaintext view of a decrypted command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedTransfer {
    pub transaction_id: String,
    pub source_account: String,
    pub target_account: String,
    pub in_debt: Money,
    pub have: Money,
    #[serde(with = "timestamp::canonical")]
    pub time: NaiveDateTime,
}

impl From<DecryptedTransfer> for PlainTransferRequest {
    fn from(transfer: DecryptedTransfer) -> Self {
        Self {
            transaction_id: transfer.transaction_id,
            source_account: transfer.source_account,
            target_account: transfer.target_account,
            in_debt: transfer.in_debt,
            have: transfer.have,
            time: transfer.time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_names() {
        let command = EncryptedTransferCommand {
            transaction_id: "e1".into(),
            source_account: "e2".into(),
            target_account: "e3".into(),
            encrypted_in_debt: "e4".into(),
            encrypted_have: "e5".into(),
            time: "e6".into(),
        };
        let json = serde_json::to_value(&command).unwrap();

        for key in [
            "transactionId",
            "sourceAccount",
            "targetAccount",
            "encryptedInDebt",
            "encryptedHave",
            "time",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_plain_request_from_json() {
        let json = r#"{
            "transactionId": "TX-1001",
            "sourceAccount": "ACC-A",
            "targetAccount": "ACC-B",
            "inDebt": "100.00",
            "have": "100",
            "time": "2025-01-15T10:30"
        }"#;
        let request: PlainTransferRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.in_debt, Money::from_cents(10000));
        assert_eq!(request.have, Money::from_cents(10000));
        assert_eq!(
            timestamp::format_timestamp(&request.time),
            "2025-01-15T10:30:00"
        );

        let out = serde_json::to_value(&request).unwrap();
        assert_eq!(out["have"], "100.00");
        assert_eq!(out["time"], "2025-01-15T10:30:00");
    }
}
