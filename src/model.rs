//! Core data types for the pedestrian-count explorer.
//!
//! This module defines the shared domain model imported by all other modules:
//! the raw measurement record as delivered by the backend, the calendar-month
//! value used for filter bounds and bucket keys, the demographic groups and the
//! tidy output point. It contains no I/O.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use chrono_tz::Europe::Zurich;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Wire field names
// ---------------------------------------------------------------------------

/// Record field that doubles as the backend's location query parameter.
pub const FIELD_LOCATION: &str = "location_name";

// ---------------------------------------------------------------------------
// Calendar month
// ---------------------------------------------------------------------------

/// A calendar month, ordered chronologically.
///
/// Parses from `YYYY-MM` or `YYYY-MM-DD`; the day, if present, is validated
/// and then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    /// The following calendar month.
    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || FilterError::InvalidMonth(s.to_string());

        match s.len() {
            7 => {
                let (year, month) = s.split_once('-').ok_or_else(invalid)?;
                if year.len() != 4 || month.len() != 2 {
                    return Err(invalid());
                }
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let month: u32 = month.parse().map_err(|_| invalid())?;
                YearMonth::new(year, month).ok_or_else(invalid)
            }
            10 => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(YearMonth::from_date)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

// ---------------------------------------------------------------------------
// Demographic groups
// ---------------------------------------------------------------------------

/// Demographic group of a tidy point.
///
/// Declaration order is the tie-break order for points sharing a time key:
/// children first, then adults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Children,
    Adults,
}

impl Group {
    pub const ALL: [Group; 2] = [Group::Children, Group::Adults];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Children => "children",
            Group::Adults => "adults",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// Timestamp as it appears on the wire.
///
/// The backend serialises through pandas, which emits epoch milliseconds by
/// default; other producers send ISO 8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    EpochMillis(i64),
    Text(String),
}

impl Timestamp {
    /// The Zurich calendar date of the measurement, or `None` if unparseable.
    ///
    /// Every instant is converted to Europe/Zurich before its date is taken,
    /// so an epoch-millis value and an offset-carrying string for the same
    /// instant fall on the same day. Strings without an offset are already
    /// local wall-clock time and keep their date as written.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Timestamp::EpochMillis(ms) => {
                DateTime::from_timestamp_millis(*ms).map(|dt| dt.with_timezone(&Zurich).date_naive())
            }
            Timestamp::Text(s) => parse_text_date(s.trim()),
        }
    }

    pub fn year_month(&self) -> Option<YearMonth> {
        self.date().map(YearMonth::from_date)
    }
}

fn parse_text_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Zurich).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Count as written by pandas: an integer, or a float when the column holds
/// a NaN somewhere (`12.0`).
#[derive(Deserialize)]
#[serde(untagged)]
enum WireCount {
    Int(u64),
    Float(f64),
}

/// Accepts non-negative integral numbers, integer or float. `null` is `None`.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<WireCount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(WireCount::Int(n)) => Ok(Some(n)),
        Some(WireCount::Float(f)) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Ok(Some(f as u64)),
        Some(WireCount::Float(f)) => Err(D::Error::custom(format!("invalid pedestrian count: {}", f))),
    }
}

/// One pedestrian-count measurement interval for one location.
///
/// Field names follow the backend exactly. Counts are optional because the
/// backend drops the column of a group that was filtered out server-side.
/// Weather is optional because pandas writes a missing condition as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub timestamp: Timestamp,
    #[serde(rename = "location_name")]
    pub location: String,
    #[serde(default)]
    pub weather_condition: Option<String>,
    #[serde(rename = "child_pedestrians_count", default, deserialize_with = "deserialize_count")]
    pub child_count: Option<u64>,
    #[serde(rename = "adult_pedestrians_count", default, deserialize_with = "deserialize_count")]
    pub adult_count: Option<u64>,
}

impl RawRecord {
    pub fn count_for(&self, group: Group) -> Option<u64> {
        match group {
            Group::Children => self.child_count,
            Group::Adults => self.adult_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One row of the tidy series handed to the charting layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TidyPoint {
    /// Canonical sort key: `MM` or `YYYY-MM`.
    pub time_key: String,
    /// Presentation label; never used for ordering.
    pub display_label: String,
    pub group: Group,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while building a filter from caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("invalid month: '{0}' (expected YYYY-MM or YYYY-MM-DD)")]
    InvalidMonth(String),
    #[error("unknown group selector: '{0}'")]
    UnknownGroup(String),
    #[error("unknown location: '{0}'")]
    UnknownLocation(String),
}

/// Errors that can arise when fetching records from the backend.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Non-2xx HTTP response.
    #[error("HTTP error: {0}")]
    HttpError(u16),
    /// The request could not be sent or the body could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body could not be deserialized.
    #[error("Parse error: {0}")]
    ParseError(String),
    /// The backend answered but reported that it has no data loaded.
    #[error("No data available: {0}")]
    NoDataAvailable(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::ParseError(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_parses_month_and_day_precision() {
        assert_eq!("2024-03".parse::<YearMonth>().unwrap(), YearMonth { year: 2024, month: 3 });
        assert_eq!("2024-03-31".parse::<YearMonth>().unwrap(), YearMonth { year: 2024, month: 3 });
    }

    #[test]
    fn test_year_month_rejects_malformed_input() {
        for bad in ["", "2024", "2024-13", "2024-00", "24-01", "2024-1", "2024-02-30", "abcd-ef"] {
            assert!(bad.parse::<YearMonth>().is_err(), "'{}' should not parse", bad);
        }
    }

    #[test]
    fn test_year_month_orders_chronologically() {
        let dec = YearMonth::new(2023, 12).unwrap();
        let jan = YearMonth::new(2024, 1).unwrap();
        assert!(dec < jan);
        assert_eq!(dec.succ(), jan);
        assert_eq!(jan.to_string(), "2024-01");
    }

    #[test]
    fn test_group_order_puts_children_first() {
        assert!(Group::Children < Group::Adults);
        assert_eq!(Group::ALL, [Group::Children, Group::Adults]);
    }

    #[test]
    fn test_timestamp_text_formats() {
        let cases = [
            ("2024-01-15T10:00:00+01:00", (2024, 1)),
            ("2024-01-15T10:00:00.000Z", (2024, 1)),
            ("2024-01-31T22:30:00+01:00", (2024, 1)),
            ("2024-01-31T23:30:00-02:00", (2024, 2)),
            ("2024-02-01 08:15:00", (2024, 2)),
            ("2024-02-01T08:15", (2024, 2)),
            ("2024-03-05", (2024, 3)),
        ];
        for (raw, (year, month)) in cases {
            let ym = Timestamp::Text(raw.to_string()).year_month();
            assert_eq!(ym, YearMonth::new(year, month), "timestamp '{}'", raw);
        }
    }

    #[test]
    fn test_timestamp_epoch_millis_in_zurich_time() {
        // 2024-01-15T00:00:00Z
        let ts = Timestamp::EpochMillis(1_705_276_800_000);
        assert_eq!(ts.year_month(), YearMonth::new(2024, 1));

        // 2024-01-31T23:30:00Z is already February in Zurich
        let ts = Timestamp::EpochMillis(1_706_743_800_000);
        assert_eq!(ts.year_month(), YearMonth::new(2024, 2));
    }

    #[test]
    fn test_same_instant_same_month_for_both_encodings() {
        let pairs = [
            ("2024-02-01T00:30:00+01:00", 1_706_743_800_000),
            ("2024-01-31T23:30:00Z", 1_706_743_800_000),
            // summer time: 2024-07-01T00:15:00+02:00
            ("2024-06-30T22:15:00Z", 1_719_785_700_000),
        ];
        for (text, millis) in pairs {
            let from_text = Timestamp::Text(text.to_string()).year_month();
            let from_millis = Timestamp::EpochMillis(millis).year_month();
            assert!(from_text.is_some());
            assert_eq!(from_text, from_millis, "instant '{}'", text);
        }
    }

    #[test]
    fn test_unparseable_timestamp_yields_none() {
        assert_eq!(Timestamp::Text("not-a-date".into()).date(), None);
        assert_eq!(Timestamp::Text(String::new()).date(), None);
    }

    #[test]
    fn test_raw_record_deserializes_backend_field_names() {
        let json = r#"{
            "timestamp": "2024-01-15T10:00:00+00:00",
            "location_name": "Bahnhofstrasse (Nord)",
            "weather_condition": "fog",
            "child_pedestrians_count": 10,
            "adult_pedestrians_count": 40
        }"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.location, "Bahnhofstrasse (Nord)");
        assert_eq!(record.count_for(Group::Children), Some(10));
        assert_eq!(record.count_for(Group::Adults), Some(40));
    }

    #[test]
    fn test_raw_record_tolerates_dropped_count_column() {
        let json = r#"{"timestamp": 1705276800000, "location_name": "Lintheschergasse",
                       "weather_condition": "rain", "child_pedestrians_count": 7}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp, Timestamp::EpochMillis(1_705_276_800_000));
        assert_eq!(record.adult_count, None);
    }

    #[test]
    fn test_raw_record_null_weather_is_none() {
        let json = r#"{"timestamp": "2024-01-15", "location_name": "Lintheschergasse",
                       "weather_condition": null, "child_pedestrians_count": 4, "adult_pedestrians_count": 6}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.weather_condition, None);
        assert_eq!(record.count_for(Group::Adults), Some(6));
    }

    #[test]
    fn test_raw_record_accepts_integral_float_counts() {
        let json = r#"{"timestamp": "2024-01-15", "location_name": "Lintheschergasse",
                       "child_pedestrians_count": 12.0, "adult_pedestrians_count": null}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.child_count, Some(12));
        assert_eq!(record.adult_count, None);
    }

    #[test]
    fn test_raw_record_rejects_negative_or_fractional_counts() {
        for count in ["-4", "-4.0", "2.5"] {
            let json = format!(
                r#"{{"timestamp": "2024-01-15", "location_name": "Lintheschergasse", "child_pedestrians_count": {}}}"#,
                count
            );
            assert!(serde_json::from_str::<RawRecord>(&json).is_err(), "count {} should be rejected", count);
        }
    }
}
