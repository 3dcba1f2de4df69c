//! Ledger entry model
//!
//! One side of a double-entry transfer: either a debit (`in_debt`) or a credit
//! (`have`), never both. Entries are created once and never updated or
//! deleted. The account number is held in plaintext here; the storage layer
//! encrypts it on write and decrypts it on read.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::LedgerEntryId;
use super::money::Money;

/// Maximum length of a business transaction id
pub const MAX_TRANSACTION_ID_LEN: usize = 100;

/// Which side of the transfer an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySide {
    Debit,
    Credit,
}

/// A ledger entry with its account number in plaintext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,

    /// Business transaction id shared by both sides of a transfer
    pub transaction_id: String,

    /// Account number
    pub account: String,

    /// Debit amount, zero on a credit entry
    pub in_debt: Money,

    /// Credit amount, zero on a debit entry
    pub have: Money,

    /// When the transfer happened
    #[serde(with = "super::timestamp::canonical")]
    pub transaction_time: NaiveDateTime,

    /// When the row was written
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create the debit side of a transfer
    pub fn debit(
        transaction_id: impl Into<String>,
        account: impl Into<String>,
        amount: Money,
        transaction_time: NaiveDateTime,
    ) -> Self {
        Self::new(transaction_id, account, amount, Money::zero(), transaction_time)
    }

    /// Create the credit side of a transfer
    pub fn credit(
        transaction_id: impl Into<String>,
        account: impl Into<String>,
        amount: Money,
        transaction_time: NaiveDateTime,
    ) -> Self {
        Self::new(transaction_id, account, Money::zero(), amount, transaction_time)
    }

    fn new(
        transaction_id: impl Into<String>,
        account: impl Into<String>,
        in_debt: Money,
        have: Money,
        transaction_time: NaiveDateTime,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            transaction_id: transaction_id.into(),
            account: account.into(),
            in_debt,
            have,
            transaction_time,
            created_at: Utc::now(),
        }
    }

    pub fn side(&self) -> EntrySide {
        if self.have > self.in_debt {
            EntrySide::Credit
        } else {
            EntrySide::Debit
        }
    }

    /// Check the row-level constraints
    pub fn validate(&self) -> Result<(), String> {
        if self.transaction_id.trim().is_empty() {
            return Err("Transaction id must not be blank".into());
        }
        if self.transaction_id.len() > MAX_TRANSACTION_ID_LEN {
            return Err(format!(
                "Transaction id must be at most {} characters",
                MAX_TRANSACTION_ID_LEN
            ));
        }
        if self.account.trim().is_empty() {
            return Err("Account must not be blank".into());
        }
        if self.in_debt.is_negative() || self.have.is_negative() {
            return Err("Amounts must not be negative".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_debit_and_credit_sides() {
        let amount = Money::from_cents(10000);
        let debit = LedgerEntry::debit("TX-1", "A", amount, time());
        let credit = LedgerEntry::credit("TX-1", "B", amount, time());

        assert_eq!(debit.side(), EntrySide::Debit);
        assert_eq!(debit.in_debt, amount);
        assert!(debit.have.is_zero());

        assert_eq!(credit.side(), EntrySide::Credit);
        assert!(credit.in_debt.is_zero());
        assert_eq!(credit.have, amount);
        assert_ne!(debit.id, credit.id);
    }

    #[test]
    fn test_validate() {
        let ok = LedgerEntry::debit("TX-1", "A", Money::from_cents(1), time());
        assert!(ok.validate().is_ok());

        let blank_tx = LedgerEntry::debit(" ", "A", Money::from_cents(1), time());
        assert!(blank_tx.validate().is_err());

        let long_tx = LedgerEntry::debit("x".repeat(101), "A", Money::from_cents(1), time());
        assert!(long_tx.validate().is_err());

        let negative = LedgerEntry::debit("TX-1", "A", Money::from_cents(-1), time());
        assert!(negative.validate().is_err());
    }
}
