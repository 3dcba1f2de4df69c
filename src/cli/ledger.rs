//! Ledger CLI commands
//!
//! Read-only audit views over the ledger.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Subcommand;

use crate::display::format_ledger_register;
use crate::error::{LedgerError, LedgerResult};
use crate::models::parse_timestamp;
use crate::storage::Storage;

/// Ledger subcommands
#[derive(Subcommand)]
pub enum LedgerCommands {
    /// Show the entries of one transaction
    Show {
        /// Business transaction id
        transaction_id: String,
    },
    /// List entries, optionally within a time range
    List {
        /// Earliest transaction time (YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS])
        #[arg(long)]
        from: Option<String>,
        /// Latest transaction time (YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS])
        #[arg(long)]
        to: Option<String>,
    },
}

/// Handle a ledger command
pub fn handle_ledger_command(storage: &Storage, cmd: LedgerCommands) -> LedgerResult<()> {
    match cmd {
        LedgerCommands::Show { transaction_id } => {
            let entries = storage.ledger.find_by_transaction_id(&transaction_id)?;
            if entries.is_empty() {
                println!("No ledger entries for transaction '{}'.", transaction_id);
            } else {
                print!("{}", format_ledger_register(&entries));
            }
        }
        LedgerCommands::List { from, to } => {
            let from = from.as_deref().map(|s| parse_bound(s, false)).transpose()?;
            let to = to.as_deref().map(|s| parse_bound(s, true)).transpose()?;

            if let (Some(from), Some(to)) = (from, to) {
                if from > to {
                    return Err(LedgerError::Validation(
                        "--from must not be after --to".into(),
                    ));
                }
            }

            let entries = storage.ledger.find_by_time_range(from, to)?;
            print!("{}", format_ledger_register(&entries));
        }
    }

    Ok(())
}

/// Parse a range bound; a bare date covers the whole day
fn parse_bound(s: &str, end_of_day: bool) -> LedgerResult<NaiveDateTime> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let time = if end_of_day {
            NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
        } else {
            NaiveTime::from_hms_opt(0, 0, 0)
        };
        return time
            .map(|t| date.and_time(t))
            .ok_or_else(|| LedgerError::Validation(format!("Invalid date: '{}'", s)));
    }

    parse_timestamp(s).map_err(|_| {
        LedgerError::Validation(format!(
            "Invalid time: '{}'. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
            s
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bound_date() {
        let start = parse_bound("2025-01-15", false).unwrap();
        let end = parse_bound("2025-01-15", true).unwrap();

        assert_eq!(start.to_string(), "2025-01-15 00:00:00");
        assert!(end > NaiveDate::from_ymd_opt(2025, 1, 15).unwrap().and_hms_opt(23, 59, 59).unwrap());
    }

    #[test]
    fn test_parse_bound_datetime() {
        let bound = parse_bound("2025-01-15T10:30", false).unwrap();
        assert_eq!(bound.to_string(), "2025-01-15 10:30:00");
    }

    #[test]
    fn test_parse_bound_invalid() {
        assert!(parse_bound("yesterday", false).is_err());
    }
}
