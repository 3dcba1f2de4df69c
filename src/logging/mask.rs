//! Masking of sensitive values in log messages
//!
//! Any `key=value` pair whose key names a transaction id, an account, an
//! amount or a time has its value replaced by `?`. Keys match
//! case-insensitively and only at the start of the message or after
//! whitespace, `,` or `|`.
//!
//! A masked value runs up to the next sensitive key or the end of the
//! message, so values containing spaces or separators are hidden whole.
//! Anything after the first sensitive pair is masked too; put plain pairs
//! such as `errorCode=` first.

use std::sync::OnceLock;

use regex::Regex;

const SENSITIVE_KEY: &str = concat!(
    r"(?i)(?:^|[\s,|])(",
    r"transactionId|transaction_id|",
    r"account|sourceAccount|targetAccount|source_account|target_account|",
    r"inDebt|have|amount|in_debt|",
    r"transactionTime|transaction_time|time",
    r")="
);

/// Replacement for a whole message when the pattern is unavailable
const FULLY_MASKED: &str = "[masked]";

fn pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SENSITIVE_KEY).ok()).as_ref()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == '|'
}

/// Mask sensitive `key=value` pairs in a log message
///
/// Blank input is returned unchanged.
pub fn mask(message: &str) -> String {
    if message.trim().is_empty() {
        return message.to_string();
    }
    let Some(re) = pattern() else {
        return FULLY_MASKED.to_string();
    };

    let keys: Vec<_> = re.captures_iter(message).filter_map(|c| c.get(1)).collect();

    let mut masked = String::with_capacity(message.len());
    let mut cursor = 0;
    for (i, key) in keys.iter().enumerate() {
        // skip the '='
        let value_start = key.end() + 1;
        let limit = keys.get(i + 1).map_or(message.len(), |next| next.start());
        let value = message[value_start..limit].trim_end_matches(is_separator);

        masked.push_str(&message[cursor..value_start]);
        masked.push('?');
        cursor = value_start + value.len();
    }
    masked.push_str(&message[cursor..]);
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_all_sensitive_keys() {
        let message = "transactionId=TX-1 sourceAccount=ACC-A targetAccount=ACC-B \
                       inDebt=100.00 have=100.00 time=2025-01-15T10:30:00";
        let masked = mask(message);

        assert_eq!(
            masked,
            "transactionId=? sourceAccount=? targetAccount=? inDebt=? have=? time=?"
        );
    }

    #[test]
    fn test_snake_case_and_mixed_case_keys() {
        assert_eq!(
            mask("transaction_id=TX-9, source_account=123|target_account=456"),
            "transaction_id=?, source_account=?|target_account=?"
        );
        assert_eq!(mask("ACCOUNT=999 Amount=5"), "ACCOUNT=? Amount=?");
        assert_eq!(mask("TransactionTime=2025-01-01T00:00"), "TransactionTime=?");
    }

    #[test]
    fn test_values_with_spaces_and_separators() {
        assert_eq!(
            mask("transactionId=TX 4242 | sourceAccount=IBAN DE89 3704 0044 | targetAccount=ACC 5555"),
            "transactionId=? | sourceAccount=? | targetAccount=?"
        );
        assert_eq!(
            mask("account=A|B, still A | time=2025-01-15 10:30"),
            "account=? | time=?"
        );
    }

    #[test]
    fn test_embedded_pairs_stay_inside_the_value() {
        assert_eq!(mask("account=IBAN x=5 y=6"), "account=?");
        assert_eq!(mask("errorCode=TRF_004 | transactionId=?"), "errorCode=TRF_004 | transactionId=?");
        assert_eq!(mask("account="), "account=?");
    }

    #[test]
    fn test_leaves_other_text_alone() {
        assert_eq!(
            mask("TRANSFER_START | errorCode=DEC_004 | status=ok"),
            "TRANSFER_START | errorCode=DEC_004 | status=ok"
        );
        // only whole keys are masked
        assert_eq!(mask("subaccount=5 overtime=3"), "subaccount=5 overtime=3");
    }

    #[test]
    fn test_blank_unchanged() {
        assert_eq!(mask(""), "");
        assert_eq!(mask("   "), "   ");
    }
}
