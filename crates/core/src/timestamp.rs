//! Lenient timestamp parsing for backend payloads.
//!
//! The backend serializes Python datetimes, which come out either as
//! RFC 3339 strings or as naive ISO-8601 strings without an offset. Naive
//! values are interpreted as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer};

use crate::types::Timestamp;

/// Naive layouts accepted after RFC 3339 fails. `%.f` also matches an
/// absent fractional part.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp string.
pub fn parse(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Convert Unix seconds (as used by the payment processor) to a timestamp.
pub fn from_unix_seconds(secs: i64) -> Option<Timestamp> {
    DateTime::from_timestamp(secs, 0)
}

/// `deserialize_with` adapter for required timestamp fields.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// `deserialize_with` adapter for optional timestamp fields.
///
/// Pair with `#[serde(default)]` so a missing field also maps to `None`.
pub mod option {
    use serde::{de::Error as _, Deserialize, Deserializer};

    use super::parse;
    use crate::types::Timestamp;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| parse(&s).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{s}'"))))
            .transpose()
    }
}
