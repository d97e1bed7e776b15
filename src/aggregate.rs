//! Aggregation of raw measurement records into monthly per-group buckets.
//!
//! One aggregator serves both fetch plans: records fetched with only a
//! location/date window are filtered here (`InputMode::Raw`), records the
//! backend already filtered by location and weather skip those checks
//! (`InputMode::PreFiltered`). The month window and the group rule are applied
//! in both modes.
//!
//! Records are independent units of failure: a record whose timestamp does
//! not parse, or which lacks a count the selected groups need, is skipped and
//! counted in the report. Aggregation itself never fails.

use std::collections::BTreeMap;

use tracing::debug;

use crate::filter::FilterSpec;
use crate::granularity::select_mode;
use crate::logging;
use crate::model::{Group, RawRecord};

/// Whether the records still need location and weather filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Raw,
    PreFiltered,
}

/// Bucket key. Ordering is `(time_key, group)`, which is also the output
/// order of the series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub time_key: String,
    pub group: Group,
}

impl BucketKey {
    pub fn new(time_key: impl Into<String>, group: Group) -> Self {
        Self { time_key: time_key.into(), group }
    }
}

pub type Buckets = BTreeMap<BucketKey, u64>;

/// Per-call record accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregationReport {
    pub total: usize,
    pub kept: usize,
    pub filtered_out: usize,
    pub skipped_malformed: usize,
}

/// Sums counts per `(time key, group)` for the records selected by `spec`.
///
/// Only groups selected by `spec.group` get buckets; with
/// `GroupSelector::Children` no adult bucket is ever created.
pub fn aggregate(records: &[RawRecord], spec: &FilterSpec, input: InputMode) -> Buckets {
    aggregate_with_report(records, spec, input).0
}

/// Like [`aggregate`], also returning how many records were kept, filtered
/// out or skipped as malformed.
pub fn aggregate_with_report(
    records: &[RawRecord],
    spec: &FilterSpec,
    input: InputMode,
) -> (Buckets, AggregationReport) {
    let mode = select_mode(spec.date_from, spec.date_to);
    let mut buckets = Buckets::new();
    let mut report = AggregationReport { total: records.len(), ..Default::default() };

    for (index, record) in records.iter().enumerate() {
        let Some(month) = record.timestamp.year_month() else {
            debug!(index, timestamp = ?record.timestamp, "skipping record with unparseable timestamp");
            report.skipped_malformed += 1;
            continue;
        };

        let weather = record.weather_condition.as_deref();
        let passes_source_filters = input == InputMode::PreFiltered
            || (spec.location.matches(&record.location) && spec.accepts_weather(weather));
        if !passes_source_filters || !spec.contains_month(month) {
            report.filtered_out += 1;
            continue;
        }

        // Resolve every needed count before touching a bucket so a malformed
        // record contributes nothing.
        let counts: Option<Vec<(Group, u64)>> = spec
            .group
            .groups()
            .map(|group| record.count_for(group).map(|count| (group, count)))
            .collect();
        let Some(counts) = counts else {
            debug!(index, location = %record.location, "skipping record with missing count");
            report.skipped_malformed += 1;
            continue;
        };

        let time_key = mode.time_key(month);
        for (group, count) in counts {
            let sum = buckets.entry(BucketKey::new(time_key.clone(), group)).or_insert(0);
            *sum = sum.saturating_add(count);
        }
        report.kept += 1;
    }

    logging::log_aggregation_summary(&report);
    (buckets, report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
