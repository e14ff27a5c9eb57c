//! Serde utilities for API payloads.

use chrono::{DateTime, Utc};

/// Fractional-seconds form, tried first.
const FRACTIONAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Parses an ISO-8601 timestamp.
///
/// The fractional-seconds form (`2024-01-15T10:20:30.123-05:00`) is tried
/// first, then the whole-second form (`2024-01-15T10:20:30Z`).
#[must_use]
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, FRACTIONAL_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Module to handle deserialization of optional ISO-8601 timestamps.
///
/// A present value that matches neither supported form is an error, not
/// `None`.
pub mod iso8601_option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, de};

    /// Deserializes an optional timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is present but not a supported timestamp.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        super::parse_iso8601(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 date: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(default, with = "iso8601_option")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_parse_fractional() {
        let dt = parse_iso8601("2024-01-15T10:20:30.123-05:00").unwrap();
        assert_eq!(dt.hour(), 15);
        assert_eq!(dt.nanosecond(), 123_000_000);
    }

    #[test]
    fn test_parse_whole_second() {
        let dt = parse_iso8601("2024-01-15T10:20:30Z").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.second(), 30);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_iso8601("15/01/2024").is_none());
        assert!(parse_iso8601("").is_none());
    }

    #[test]
    fn test_deserialize_missing_null_and_invalid() {
        let missing: Stamped = serde_json::from_str("{}").unwrap();
        assert!(missing.at.is_none());

        let null: Stamped = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert!(null.at.is_none());

        let bad = serde_json::from_str::<Stamped>(r#"{"at": "yesterday"}"#);
        assert!(bad.is_err());
    }
}
