//! The explore pipeline: records + filter in, labeled tidy series out.
//!
//! `run` is pure and cheap to repeat; calling it twice with the same inputs
//! gives identical output. Fetching happens before it, in the caller or in
//! `fetch_and_run`. Callers that may have several fetches in flight use a
//! `RequestTracker` to drop results that a newer filter has superseded.

use serde::Serialize;
use serde_json::{json, Value};

use crate::aggregate::{aggregate, InputMode};
use crate::config::Config;
use crate::filter::FilterSpec;
use crate::granularity::{select_mode, AxisEncoding, Granularity};
use crate::labels::{apply_labels, filter_caption, group_label, Locale};
use crate::model::{RawRecord, SourceError, TidyPoint};
use crate::series::{assemble, densify};
use crate::source::RecordSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineOptions {
    pub input: InputMode,
    pub locale: Locale,
    /// Zero-fill months without records.
    pub dense: bool,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            input: config.source.fetch_plan.input_mode(),
            locale: config.display.locale,
            dense: config.display.dense,
        }
    }
}

/// A labeled tidy series plus how to chart it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub granularity: Granularity,
    pub axis: AxisEncoding,
    /// Name of the key field in `chart_records`.
    pub key_field: &'static str,
    /// Location and weather in the display locale, for the chart title.
    pub caption: String,
    pub points: Vec<TidyPoint>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Records for the charting layer:
    /// `{ <key_field>: time_key, label, group, groupLabel, count }`.
    pub fn chart_records(&self, locale: Locale) -> Vec<Value> {
        self.points
            .iter()
            .map(|p| {
                json!({
                    self.key_field: p.time_key,
                    "label": p.display_label,
                    "group": p.group,
                    "groupLabel": group_label(p.group, locale),
                    "count": p.count,
                })
            })
            .collect()
    }
}

/// Aggregate, select granularity, assemble and label.
pub fn run(records: &[RawRecord], spec: &FilterSpec, options: PipelineOptions) -> Series {
    let granularity = select_mode(spec.date_from, spec.date_to);
    let buckets = aggregate(records, spec, options.input);

    let mut points = assemble(&buckets, granularity);
    if options.dense {
        points = densify(points, spec, granularity);
    }
    apply_labels(&mut points, granularity, options.locale);

    Series {
        granularity,
        axis: granularity.axis(),
        key_field: granularity.key_field(),
        caption: filter_caption(spec, options.locale),
        points,
    }
}

/// Fetch from `source` and run the pipeline. The source decides whether its
/// records still need local filtering; `options.input` is overridden.
pub fn fetch_and_run<S: RecordSource + ?Sized>(
    source: &S,
    spec: &FilterSpec,
    options: PipelineOptions,
) -> Result<Series, SourceError> {
    let records = source.fetch(spec)?;
    let options = PipelineOptions { input: source.input_mode(), ..options };
    Ok(run(&records, spec, options))
}

// ---------------------------------------------------------------------------
// Stale request guard
// ---------------------------------------------------------------------------

/// Id of one fetch, issued by a `RequestTracker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// Issues monotonically increasing request ids and accepts only the result
/// of the most recent one.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier one.
    pub fn begin(&mut self) -> RequestId {
        self.latest += 1;
        RequestId(self.latest)
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        id.0 == self.latest
    }

    /// `Some(result)` if `id` is still the latest request, `None` if stale.
    pub fn accept<T>(&self, id: RequestId, result: T) -> Option<T> {
        self.is_current(id).then_some(result)
    }
}
