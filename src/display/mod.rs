//! Display formatting for terminal output

pub mod ledger;

pub use ledger::{format_decrypted_transfer, format_ledger_register, format_ledger_row};
