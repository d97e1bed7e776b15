//! Display granularity selection.
//!
//! A filter range inside one calendar year is charted month-by-month on an
//! ordinal axis keyed `MM`; a range spanning years is charted on a temporal
//! axis keyed `YYYY-MM`. Only the key format changes; summation does not.

use serde::Serialize;

use crate::model::YearMonth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    /// Keys are two-digit months, `"01"`..`"12"`.
    ByMonth,
    /// Keys are `"YYYY-MM"`.
    ByYearMonth,
}

/// How the charting layer should encode the key axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisEncoding {
    Ordinal,
    Temporal,
}

/// Same calendar year on both ends selects `ByMonth`.
pub fn select_mode(date_from: YearMonth, date_to: YearMonth) -> Granularity {
    if date_from.year == date_to.year {
        Granularity::ByMonth
    } else {
        Granularity::ByYearMonth
    }
}

impl Granularity {
    /// Formats the bucket key for a month. Both formats are fixed width and
    /// zero padded so string order equals chronological order.
    pub fn time_key(&self, month: YearMonth) -> String {
        match self {
            Granularity::ByMonth => format!("{:02}", month.month),
            Granularity::ByYearMonth => month.to_string(),
        }
    }

    pub fn axis(&self) -> AxisEncoding {
        match self {
            Granularity::ByMonth => AxisEncoding::Ordinal,
            Granularity::ByYearMonth => AxisEncoding::Temporal,
        }
    }

    /// Name of the key field in chart records.
    pub fn key_field(&self) -> &'static str {
        match self {
            Granularity::ByMonth => "month",
            Granularity::ByYearMonth => "ym",
        }
    }
}
