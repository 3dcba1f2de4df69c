//! Ledger display formatting
//!
//! Register view of ledger entries with debit/credit columns and totals.

use crate::models::{format_timestamp, DecryptedTransfer, EntrySide, LedgerEntry, Money};

/// Format a single ledger entry (register row)
pub fn format_ledger_row(entry: &LedgerEntry) -> String {
    let side_icon = match entry.side() {
        EntrySide::Debit => "DR",
        EntrySide::Credit => "CR",
    };

    format!(
        "{:3} {} {:16} {:16} {:>12} {:>12}",
        side_icon,
        entry.transaction_time.format("%Y-%m-%d %H:%M"),
        truncate(&entry.transaction_id, 16),
        truncate(&entry.account, 16),
        entry.in_debt.to_string(),
        entry.have.to_string()
    )
}

/// Format a list of ledger entries as a register with totals
pub fn format_ledger_register(entries: &[LedgerEntry]) -> String {
    if entries.is_empty() {
        return "No ledger entries found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:3} {:16} {:16} {:16} {:>12} {:>12}\n",
        "", "Time", "Transaction", "Account", "Debit", "Credit"
    ));
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for entry in entries {
        output.push_str(&format_ledger_row(entry));
        output.push('\n');
    }

    let total_debit = format_total(Money::checked_sum(entries.iter().map(|e| e.in_debt)));
    let total_credit = format_total(Money::checked_sum(entries.iter().map(|e| e.have)));

    output.push_str(&"-".repeat(80));
    output.push('\n');
    output.push_str(&format!(
        "{:>54} {:>12} {:>12}\n",
        "Totals:", total_debit, total_credit
    ));

    output
}

/// A register total, or `overflow` when it leaves the representable range
fn format_total(total: Option<Money>) -> String {
    total.map_or_else(|| "overflow".to_string(), |m| m.to_string())
}

/// Format a decrypted transfer command for display
pub fn format_decrypted_transfer(transfer: &DecryptedTransfer) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", transfer.transaction_id));
    output.push_str(&format!("Source:      {}\n", transfer.source_account));
    output.push_str(&format!("Target:      {}\n", transfer.target_account));
    output.push_str(&format!("Debit:       {}\n", transfer.in_debt));
    output.push_str(&format!("Credit:      {}\n", transfer.have));
    output.push_str(&format!("Time:        {}\n", format_timestamp(&transfer.time)));

    output
}

/// Truncate a string to a maximum number of characters, padding short ones
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
