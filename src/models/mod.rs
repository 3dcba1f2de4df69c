//! Core data models for envelope-ledger
//!
//! Amounts, ids, ledger entries and the transfer wire shapes.

pub mod ids;
pub mod ledger;
pub mod money;
pub mod timestamp;
pub mod transfer;

pub use ids::LedgerEntryId;
pub use ledger::{EntrySide, LedgerEntry};
pub use money::{Money, MoneyParseError};
pub use timestamp::{format_timestamp, parse_timestamp};
pub use transfer::{DecryptedTransfer, EncryptedTransferCommand, PlainTransferRequest};
