//! Display labels for month keys, groups and the filter caption.
//!
//! Labels are looked up from one table indexed by month number; the
//! canonical `time_key` is never touched.

use std::str::FromStr;

use serde::Deserialize;

use crate::filter::{FilterSpec, LocationSelector};
use crate::granularity::Granularity;
use crate::locations;
use crate::model::{Group, TidyPoint};
use crate::weather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    De,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "de" | "de-ch" | "de-de" => Ok(Locale::De),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(format!("unsupported locale: '{}'", other)),
        }
    }
}

const MONTHS_DE: [&str; 12] = ["Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez"];
const MONTHS_EN: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Abbreviated month name for month number 1..=12.
pub fn month_abbrev(month: u32, locale: Locale) -> Option<&'static str> {
    let table = match locale {
        Locale::De => &MONTHS_DE,
        Locale::En => &MONTHS_EN,
    };
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    table.get(index).copied()
}

/// Display label for a time key: `"03"` → `"Mär"`, `"2024-03"` → `"Mär 2024"`.
/// Keys that do not match `mode`'s format are echoed unchanged.
pub fn label_for(time_key: &str, mode: Granularity, locale: Locale) -> String {
    let label = match mode {
        Granularity::ByMonth => parse_month(time_key).and_then(|m| month_abbrev(m, locale)).map(str::to_string),
        Granularity::ByYearMonth => time_key.split_once('-').and_then(|(year, month)| {
            if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let name = month_abbrev(parse_month(month)?, locale)?;
            Some(format!("{} {}", name, year))
        }),
    };
    label.unwrap_or_else(|| time_key.to_string())
}

fn parse_month(s: &str) -> Option<u32> {
    if s.len() != 2 || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Sets `display_label` on every point.
pub fn apply_labels(points: &mut [TidyPoint], mode: Granularity, locale: Locale) {
    for point in points {
        point.display_label = label_for(&point.time_key, mode, locale);
    }
}

pub fn group_label(group: Group, locale: Locale) -> &'static str {
    match (group, locale) {
        (Group::Children, Locale::De) => "Kinder",
        (Group::Adults, Locale::De) => "Erwachsene",
        (Group::Children, Locale::En) => "Children",
        (Group::Adults, Locale::En) => "Adults",
    }
}

pub fn location_label(location: &LocationSelector, locale: Locale) -> String {
    match (location, locale) {
        (LocationSelector::All, Locale::De) => "Alle Standorte".to_string(),
        (LocationSelector::All, Locale::En) => "All locations".to_string(),
        (LocationSelector::Id(id), _) => locations::find_location(id)
            .map(|l| l.label.to_string())
            .unwrap_or_else(|| id.clone()),
    }
}

/// Registry label for a weather id; unregistered ids are echoed.
pub fn weather_label(id: &str, locale: Locale) -> String {
    match weather::find_weather(id) {
        Some(w) if locale == Locale::De => w.label_de.to_string(),
        Some(w) => w.label_en.to_string(),
        None => id.to_string(),
    }
}

/// One-line chart caption: `"Bahnhofstrasse Nord · Nebel, Regen"`.
pub fn filter_caption(spec: &FilterSpec, locale: Locale) -> String {
    let weather = if spec.weather.is_empty() {
        match locale {
            Locale::De => "Alle Wetterlagen".to_string(),
            Locale::En => "All weather".to_string(),
        }
    } else {
        spec.weather.iter().map(|id| weather_label(id, locale)).collect::<Vec<_>>().join(", ")
    };
    format!("{} · {}", location_label(&spec.location, locale), weather)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_german_month_labels() {
        let labels: Vec<_> = (1..=12).map(|m| label_for(&format!("{:02}", m), Granularity::ByMonth, Locale::De)).collect();
        assert_eq!(labels, MONTHS_DE);
        assert_eq!(label_for("03", Granularity::ByMonth, Locale::De), "Mär");
        assert_eq!(label_for("10", Granularity::ByMonth, Locale::De), "Okt");
        assert_eq!(label_for("12", Granularity::ByMonth, Locale::De), "Dez");
    }

    #[test]
    fn test_year_month_labels() {
        assert_eq!(label_for("2024-05", Granularity::ByYearMonth, Locale::De), "Mai 2024");
        assert_eq!(label_for("2023-12", Granularity::ByYearMonth, Locale::En), "Dec 2023");
    }

    #[test]
    fn test_unknown_keys_are_echoed() {
        for key in ["13", "00", "1", "", "Mar", "2024-13", "24-03", "2024-3"] {
            assert_eq!(label_for(key, Granularity::ByMonth, Locale::De), key);
            assert_eq!(label_for(key, Granularity::ByYearMonth, Locale::De), key);
        }
        // A key of the other mode is not reinterpreted.
        assert_eq!(label_for("2024-03", Granularity::ByMonth, Locale::De), "2024-03");
        assert_eq!(label_for("03", Granularity::ByYearMonth, Locale::De), "03");
    }

    #[test]
    fn test_apply_labels_leaves_keys_untouched() {
        let mut points = vec![TidyPoint {
            time_key: "03".into(),
            display_label: "03".into(),
            group: Group::Children,
            count: 1,
        }];
        apply_labels(&mut points, Granularity::ByMonth, Locale::De);
        assert_eq!(points[0].time_key, "03");
        assert_eq!(points[0].display_label, "Mär");
    }

    #[test]
    fn test_group_and_locale_parsing() {
        assert_eq!(group_label(Group::Adults, Locale::De), "Erwachsene");
        assert_eq!(group_label(Group::Children, Locale::En), "Children");
        assert_eq!("de-CH".parse::<Locale>(), Ok(Locale::De));
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(month_abbrev(0, Locale::En), None);
    }

    #[test]
    fn test_weather_and_location_labels() {
        assert_eq!(weather_label("fog", Locale::De), "Nebel");
        assert_eq!(weather_label("partly-cloudy-day", Locale::En), "Partly cloudy");
        assert_eq!(weather_label("hail", Locale::De), "hail");
        assert_eq!(location_label(&LocationSelector::Id("sued".into()), Locale::En), "Bahnhofstrasse Süd");
        assert_eq!(location_label(&LocationSelector::All, Locale::De), "Alle Standorte");
    }

    #[test]
    fn test_filter_caption() {
        let spec = FilterSpec::parse("nord", "2024-01", "2024-12", "both", ["regen", "nebel"]).unwrap();
        assert_eq!(filter_caption(&spec, Locale::De), "Bahnhofstrasse Nord · Nebel, Regen");

        let spec = FilterSpec::parse("all", "2024-01", "2024-12", "both", Vec::<&str>::new()).unwrap();
        assert_eq!(filter_caption(&spec, Locale::En), "All locations · All weather");
    }
}
