//! Assembly of aggregated buckets into the tidy series.
//!
//! The series is sorted by `time_key` (string order, valid because keys are
//! fixed width) and then by group, children before adults. Points carry the
//! canonical key as their label until `labels::apply_labels` runs.

use tracing::debug;

use crate::aggregate::Buckets;
use crate::filter::FilterSpec;
use crate::granularity::Granularity;
use crate::model::TidyPoint;

/// One point per bucket, in series order. Keys are emitted as the
/// aggregator formatted them for `mode`.
pub fn assemble(buckets: &Buckets, mode: Granularity) -> Vec<TidyPoint> {
    let mut points: Vec<TidyPoint> = buckets
        .iter()
        .map(|(key, count)| TidyPoint {
            time_key: key.time_key.clone(),
            display_label: key.time_key.clone(),
            group: key.group,
            count: *count,
        })
        .collect();

    sort_series(&mut points);
    debug!(granularity = ?mode, points = points.len(), "series assembled");
    points
}

/// Sorts by `(time_key, group)`.
pub fn sort_series(points: &mut [TidyPoint]) {
    points.sort_by(|a, b| a.time_key.cmp(&b.time_key).then(a.group.cmp(&b.group)));
}

/// Fills every month of the filter range with a zero point for each
/// selected group that has no entry yet.
///
/// Output stays sorted. An inverted range adds nothing.
pub fn densify(points: Vec<TidyPoint>, spec: &FilterSpec, mode: Granularity) -> Vec<TidyPoint> {
    if spec.is_empty_range() {
        return points;
    }

    let mut dense = points;
    let mut month = spec.date_from;
    while month <= spec.date_to {
        let time_key = mode.time_key(month);
        for group in spec.group.groups() {
            let present = dense.iter().any(|p| p.time_key == time_key && p.group == group);
            if !present {
                dense.push(TidyPoint {
                    time_key: time_key.clone(),
                    display_label: time_key.clone(),
                    group,
                    count: 0,
                });
            }
        }
        month = month.succ();
    }

    sort_series(&mut dense);
    dense
}
