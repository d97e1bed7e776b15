//! Weather conditions recorded alongside each measurement.
//!
//! The backend stores weather as an icon-style condition id per measurement
//! interval. The filter bar offers a reduced set of German choices which are
//! resolved to those ids here.

#[derive(Debug)]
pub struct WeatherCondition {
    /// Value of `weather_condition` in the data and of the `weather` query
    /// parameter.
    pub id: &'static str,
    /// Filter-bar id, if the condition is offered there.
    pub ui_id: Option<&'static str>,
    pub label_de: &'static str,
    pub label_en: &'static str,
}

pub static WEATHER_REGISTRY: &[WeatherCondition] = &[
    WeatherCondition { id: "clear-day", ui_id: Some("sonne"), label_de: "Sonnig", label_en: "Clear" },
    WeatherCondition { id: "clear-night", ui_id: None, label_de: "Klare Nacht", label_en: "Clear night" },
    WeatherCondition {
        id: "partly-cloudy-day",
        ui_id: None,
        label_de: "Teilweise bewölkt",
        label_en: "Partly cloudy",
    },
    WeatherCondition {
        id: "partly-cloudy-night",
        ui_id: None,
        label_de: "Teilweise bewölkt (Nacht)",
        label_en: "Partly cloudy night",
    },
    WeatherCondition { id: "cloudy", ui_id: Some("bewoelkt"), label_de: "Bewölkt", label_en: "Cloudy" },
    WeatherCondition { id: "fog", ui_id: Some("nebel"), label_de: "Nebel", label_en: "Fog" },
    WeatherCondition { id: "rain", ui_id: Some("regen"), label_de: "Regen", label_en: "Rain" },
    WeatherCondition { id: "sleet", ui_id: None, label_de: "Schneeregen", label_en: "Sleet" },
    WeatherCondition { id: "snow", ui_id: None, label_de: "Schnee", label_en: "Snow" },
    WeatherCondition { id: "wind", ui_id: None, label_de: "Wind", label_en: "Wind" },
];

pub fn known_weather_ids() -> Vec<&'static str> {
    WEATHER_REGISTRY.iter().map(|w| w.id).collect()
}

pub fn find_weather(id: &str) -> Option<&'static WeatherCondition> {
    WEATHER_REGISTRY.iter().find(|w| w.id == id)
}

/// Resolves a filter-bar id (`"nebel"`) to the data id (`"fog"`).
///
/// Data ids resolve to themselves; anything else is returned unchanged so
/// that conditions missing from the registry can still be filtered on.
pub fn resolve(id: &str) -> String {
    WEATHER_REGISTRY
        .iter()
        .find(|w| w.id == id || w.ui_id == Some(id))
        .map(|w| w.id.to_string())
        .unwrap_or_else(|| id.to_string())
}
