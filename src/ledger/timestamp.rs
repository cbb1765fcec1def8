//! The one place timestamps are turned into strings and back.
//!
//! Occurrence dates double as payment-history keys, so generation and lookup
//! must both go through [`format_iso`]. Nothing else in the crate formats a
//! timestamp for keying purposes.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::errors::TrackerError;

/// Renders `at` as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_iso(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as UTC
/// midnight, and normalises it to UTC.
pub fn parse_iso(raw: &str) -> Result<DateTime<Utc>, TrackerError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TrackerError::InvalidTimestamp(raw.to_string()))
}

/// Serde adapter that writes timestamps with [`format_iso`].
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_iso(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso(&raw).map_err(D::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            at: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => serializer.serialize_str(&super::super::format_iso(at)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|raw| super::super::parse_iso(&raw).map_err(D::Error::custom))
                .transpose()
        }
    }
}
