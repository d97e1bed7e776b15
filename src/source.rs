//! Record source for the pedestrian-count backend
//!
//! Retrieves raw measurement records from the backend's `/data` endpoint,
//! plus the metadata endpoints used to populate the filter bar
//! (`/time_range`, `/locations`, `/weather`).
//!
//! The core never talks to the network itself; it receives records through
//! the `RecordSource` trait. `HttpRecordSource` is the production
//! implementation, `InMemorySource` replays a fixed batch.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::aggregate::InputMode;
use crate::config::SourceConfig;
use crate::filter::FilterSpec;
use crate::logging;
use crate::model::{RawRecord, SourceError, YearMonth, FIELD_LOCATION};

// ============================================================================
// Fetch plans
// ============================================================================

/// How much of the filter is pushed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPlan {
    /// Send location and date window only; weather and group are applied
    /// locally, so changing them needs no new request.
    #[default]
    Window,
    /// Send the whole filter; the backend returns pre-filtered records.
    Full,
}

impl FetchPlan {
    pub fn input_mode(&self) -> InputMode {
        match self {
            FetchPlan::Window => InputMode::Raw,
            FetchPlan::Full => InputMode::PreFiltered,
        }
    }
}

// ============================================================================
// Query construction
// ============================================================================

/// First day of a month, `YYYY-MM-DD`.
fn first_day(month: YearMonth) -> String {
    format!("{}-01", month)
}

/// Last day of a month, `YYYY-MM-DD`. The backend treats `end_time` as an
/// inclusive day.
fn last_day(month: YearMonth) -> String {
    let next = month.succ();
    NaiveDate::from_ymd_opt(next.year, next.month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| format!("{}-28", month))
}

/// Query parameters for `/data`. `weather` is repeated once per condition.
pub fn build_query(spec: &FilterSpec, plan: FetchPlan) -> Vec<(&'static str, String)> {
    let mut params = vec![
        (FIELD_LOCATION, spec.location.backend_name().to_string()),
        ("start_time", first_day(spec.date_from)),
        ("end_time", last_day(spec.date_to)),
    ];

    if plan == FetchPlan::Full {
        params.extend(spec.weather.iter().map(|w| ("weather", w.clone())));
        params.push(("group", spec.group.query_value().to_string()));
    }

    params
}

// ============================================================================
// Response parsing
// ============================================================================

/// Parse a `/data` body into records.
///
/// The backend wraps pandas JSON in a `JSONResponse`, so the body is usually
/// a JSON string whose content is the record array; a bare array is accepted
/// as well. Rows that fail to decode are dropped individually and counted.
/// An `{"error": "..."}` body is the backend saying it has no data loaded.
///
/// # Returns
/// The decoded records and the number of rows discarded.
pub fn parse_records_body(body: &str) -> Result<(Vec<RawRecord>, usize), SourceError> {
    let value: Value = serde_json::from_str(body)?;
    let value = match value {
        Value::String(inner) => serde_json::from_str(&inner)?,
        other => other,
    };

    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(map) => match map.get("error").and_then(Value::as_str) {
            Some(message) => return Err(SourceError::NoDataAvailable(message.to_string())),
            None => return Err(SourceError::ParseError("expected an array of records".to_string())),
        },
        _ => return Err(SourceError::ParseError("expected an array of records".to_string())),
    };

    let mut records = Vec::with_capacity(rows.len());
    let mut discarded = 0;
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!(index, error = %e, "discarding undecodable row");
                discarded += 1;
            }
        }
    }

    Ok((records, discarded))
}

/// Body of a FastAPI `HTTPException`.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

/// Maps a non-2xx response to an error. The backend answers 500 with a
/// `detail` message when its data set is empty.
fn error_from_response(status: u16, body: &str) -> SourceError {
    if status == 500 {
        if let Ok(ErrorDetail { detail }) = serde_json::from_str(body) {
            return SourceError::NoDataAvailable(detail);
        }
    }
    SourceError::HttpError(status)
}

#[derive(Debug, Deserialize)]
struct TimeRangeResponse {
    min_timestamp: String,
    max_timestamp: String,
}

#[derive(Debug, Deserialize)]
struct LocationsResponse {
    locations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    weather_condition: Vec<String>,
}

// ============================================================================
// Sources
// ============================================================================

/// Supplies raw records for a filter.
pub trait RecordSource {
    fn fetch(&self, spec: &FilterSpec) -> Result<Vec<RawRecord>, SourceError>;

    /// Whether fetched records still need local location/weather filtering.
    fn input_mode(&self) -> InputMode {
        InputMode::Raw
    }
}

/// Blocking HTTP client for the backend.
pub struct HttpRecordSource {
    client: reqwest::blocking::Client,
    base_url: String,
    plan: FetchPlan,
}

impl HttpRecordSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            plan: config.fetch_plan,
        })
    }

    fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(query)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(error_from_response(status.as_u16(), &body));
        }

        Ok(response.text()?)
    }

    /// Earliest and latest measurement timestamps held by the backend.
    pub fn fetch_time_range(&self) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), SourceError> {
        let body = self.get_text("/time_range", &[])?;
        let range: TimeRangeResponse = serde_json::from_str(&body)?;
        let parse = |s: &str| {
            DateTime::parse_from_rfc3339(s).map_err(|e| SourceError::ParseError(format!("timestamp '{}': {}", s, e)))
        };
        Ok((parse(&range.min_timestamp)?, parse(&range.max_timestamp)?))
    }

    /// Distinct `location_name` values in the data set.
    pub fn fetch_locations(&self) -> Result<Vec<String>, SourceError> {
        let body = self.get_text("/locations", &[])?;
        Ok(serde_json::from_str::<LocationsResponse>(&body)?.locations)
    }

    /// Distinct `weather_condition` values in the data set.
    pub fn fetch_weather_conditions(&self) -> Result<Vec<String>, SourceError> {
        let body = self.get_text("/weather", &[])?;
        Ok(serde_json::from_str::<WeatherResponse>(&body)?.weather_condition)
    }
}

impl RecordSource for HttpRecordSource {
    fn fetch(&self, spec: &FilterSpec) -> Result<Vec<RawRecord>, SourceError> {
        let location = spec.location.backend_name().to_string();
        let query = build_query(spec, self.plan);

        let result = self.get_text("/data", &query).and_then(|body| parse_records_body(&body));
        match result {
            Ok((records, discarded)) => {
                logging::log_fetch_summary(&location, records.len(), discarded);
                Ok(records)
            }
            Err(e) => {
                logging::log_source_failure(&location, "fetch records", &e);
                Err(e)
            }
        }
    }

    fn input_mode(&self) -> InputMode {
        self.plan.input_mode()
    }
}

/// A fixed batch of records, returned for every filter.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<RawRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Decode a `/data` body captured earlier.
    pub fn from_body(body: &str) -> Result<Self, SourceError> {
        parse_records_body(body).map(|(records, _)| Self::new(records))
    }
}

impl RecordSource for InMemorySource {
    fn fetch(&self, _spec: &FilterSpec) -> Result<Vec<RawRecord>, SourceError> {
        Ok(self.records.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================


// ---------------------------------------------------------------------------
// Integration Tests - live backend
// ---------------------------------------------------------------------------
//
// These tests need the backend running locally (uvicorn on port 8000) and
// are marked #[ignore] so normal runs don't depend on it.
//
// To run these tests manually:
//   cargo test -- --ignored live_backend

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn source() -> HttpRecordSource {
        HttpRecordSource::new(&SourceConfig::default()).expect("client should build")
    }

    #[test]
    #[ignore] // Needs a running backend
    fn live_backend_returns_records_for_a_month() {
        let spec = FilterSpec::parse("nord", "2024-01", "2024-01", "beide", Vec::<&str>::new()).unwrap();
        let records = source().fetch(&spec).expect("fetch should succeed");
        assert!(!records.is_empty(), "January 2024 at Bahnhofstrasse (Nord) should have data");
    }

    #[test]
    #[ignore] // Needs a running backend
    fn live_backend_locations_match_registry() {
        let locations = source().fetch_locations().expect("locations should load");
        for name in &locations {
            assert!(
                crate::locations::find_by_name(name).is_some(),
                "backend location '{}' is missing from LOCATION_REGISTRY",
                name
            );
        }
    }

    #[test]
    #[ignore] // Needs a running backend
    fn live_backend_time_range_is_ordered() {
        let (min, max) = source().fetch_time_range().expect("time range should load");
        assert!(min <= max);
    }
}
