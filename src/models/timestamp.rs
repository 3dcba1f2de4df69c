//! Transaction time text form
//!
//! ISO-8601 local date-time without offset, e.g. `2025-01-15T10:30:00`.
//! Fractional seconds are printed only when present.

use chrono::NaiveDateTime;

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const MINUTES_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Format a transaction time in canonical form
pub fn format_timestamp(time: &NaiveDateTime) -> String {
    time.format(CANONICAL_FORMAT).to_string()
}

/// Parse a transaction time, with or without seconds and fractions
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let s = s.trim();
    s.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(s, MINUTES_FORMAT))
}

/// Serde adapter for `#[serde(with = "...")]` using the canonical form
pub mod canonical {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}
