// ISO-8601 conversion for date-valued task fields
//
// `createdAt` is a UTC instant written with millisecond precision
// (`2025-01-15T09:30:00.000Z`). `dueDate` is a calendar date written as
// `YYYY-MM-DD`; on load a full date-time is also accepted and reduced to its
// UTC date.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use eyre::{Result, eyre};

/// Current time truncated to the precision the persisted form can carry
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Today's date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| eyre!("Invalid ISO-8601 date-time '{}': {}", s, e))
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Parse a calendar date, accepting either `YYYY-MM-DD` or a full date-time
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_datetime(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| eyre!("Invalid ISO-8601 date '{}'", s))
}

/// serde adapter for `DateTime<Utc>` fields
pub mod iso_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_datetime(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_datetime(&s).map_err(D::Error::custom)
    }
}

/// serde adapter for `Option<NaiveDate>` fields
///
/// Pair with `#[serde(default, skip_serializing_if = "Option::is_none")]` so
/// an absent date is omitted rather than written as `null`.
pub mod iso_date_opt {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&super::format_date(date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s {
            Some(s) if !s.trim().is_empty() => super::parse_date(&s).map(Some).map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_now_has_millisecond_precision() {
        let ts = now();
        assert_eq!(ts.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn test_format_datetime_matches_js_iso_string() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(format_datetime(&ts), "2025-01-15T09:30:00.000Z");
    }

    #[test]
    fn test_parse_datetime_roundtrip() {
        let ts = now();
        let parsed = parse_datetime(&format_datetime(&ts)).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_parse_datetime_with_offset() {
        let parsed = parse_datetime("2025-01-15T11:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_datetime_invalid() {
        assert!(parse_datetime("not a date").is_err());
        assert!(parse_datetime("").is_err());
    }

    #[test]
    fn test_parse_date_plain() {
        let date = parse_date("2025-03-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(format_date(&date), "2025-03-01");
    }

    #[test]
    fn test_parse_date_from_datetime() {
        let date = parse_date("2025-03-01T00:00:00.000Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("2025-13-40").is_err());
        assert!(parse_date("tomorrow").is_err());
    }
}
