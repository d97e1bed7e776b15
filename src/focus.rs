//! The focus view: how the pedestrian mix splits between children and adults
//! month by month, for one location and year under one kind of weather.
//!
//! Unlike the explore series this one is dense (all twelve months, both
//! groups) because it is charted as a normalised stacked bar.

use serde::Serialize;

use crate::filter::LocationSelector;
use crate::granularity::Granularity;
use crate::labels::{label_for, Locale};
use crate::model::{Group, RawRecord, YearMonth};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharePoint {
    pub time_key: String,
    pub display_label: String,
    pub group: Group,
    /// Fraction of the month's pedestrians in this group, 0.0..=1.0.
    pub share: f64,
}

/// Monthly children/adult shares.
///
/// `weather` matches `weather_condition` case-insensitively as a substring
/// (`"fog"` matches `"Fog"` and `"fog-light"`); an empty string matches all.
/// Months without any counted pedestrian get a share of 0 for both groups.
/// Records with an unparseable timestamp are ignored; a missing count counts
/// as zero.
pub fn share_by_month(
    records: &[RawRecord],
    location: &LocationSelector,
    year: i32,
    weather: &str,
    locale: Locale,
) -> Vec<SharePoint> {
    let needle = weather.trim().to_lowercase();
    let mut totals = [[0u64; 2]; 12];

    for record in records {
        let Some(month) = record.timestamp.year_month() else {
            continue;
        };
        if month.year != year
            || !location.matches(&record.location)
            || !record.weather_condition.as_deref().unwrap_or("").to_lowercase().contains(&needle)
        {
            continue;
        }
        let slot = &mut totals[(month.month - 1) as usize];
        slot[0] = slot[0].saturating_add(record.child_count.unwrap_or(0));
        slot[1] = slot[1].saturating_add(record.adult_count.unwrap_or(0));
    }

    let mut points = Vec::with_capacity(24);
    for (index, [children, adults]) in totals.into_iter().enumerate() {
        let Some(month) = YearMonth::new(year, index as u32 + 1) else {
            continue;
        };
        let time_key = Granularity::ByMonth.time_key(month);
        let display_label = label_for(&time_key, Granularity::ByMonth, locale);
        let total = children.saturating_add(adults);

        for (group, count) in [(Group::Children, children), (Group::Adults, adults)] {
            let share = if total > 0 { count as f64 / total as f64 } else { 0.0 };
            points.push(SharePoint { time_key: time_key.clone(), display_label: display_label.clone(), group, share });
        }
    }
    points
}
