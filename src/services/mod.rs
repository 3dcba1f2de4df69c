//! Service layer for envelope-ledger
//!
//! Business logic on top of the crypto and storage layers.

pub mod transfer;

pub use transfer::TransferService;
