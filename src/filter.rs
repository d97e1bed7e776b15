//! Filter specification passed into every pipeline call.
//!
//! A `FilterSpec` carries caller intent without interpreting it. All
//! interpretation (which records survive, which key format applies) lives in
//! `aggregate` and `granularity`.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::locations::{self, ALL_LOCATIONS_ID};
use crate::model::{FilterError, Group, YearMonth};
use crate::weather;

// ---------------------------------------------------------------------------
// Location selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocationSelector {
    All,
    /// Registry id (`"nord"`) or a raw backend `location_name`.
    Id(String),
}

impl LocationSelector {
    pub fn matches(&self, record_location: &str) -> bool {
        match self {
            LocationSelector::All => true,
            LocationSelector::Id(id) => locations::matches(id, record_location),
        }
    }

    /// The `location_name` query value for the backend.
    pub fn backend_name(&self) -> &str {
        match self {
            LocationSelector::All => locations::ALL_LOCATIONS_NAME,
            LocationSelector::Id(id) => locations::backend_name(id),
        }
    }
}

impl FromStr for LocationSelector {
    type Err = FilterError;

    /// Accepts `"all"`/`"Alle"`, a registry id, or a registered backend name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == ALL_LOCATIONS_ID || s == locations::ALL_LOCATIONS_NAME {
            return Ok(LocationSelector::All);
        }
        if let Some(location) = locations::find_location(s).or_else(|| locations::find_by_name(s)) {
            return Ok(LocationSelector::Id(location.id.to_string()));
        }
        Err(FilterError::UnknownLocation(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Group selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupSelector {
    #[default]
    Both,
    Children,
    Adults,
}

impl GroupSelector {
    pub fn includes(&self, group: Group) -> bool {
        match self {
            GroupSelector::Both => true,
            GroupSelector::Children => group == Group::Children,
            GroupSelector::Adults => group == Group::Adults,
        }
    }

    /// Selected groups in tie-break order.
    pub fn groups(&self) -> impl Iterator<Item = Group> + '_ {
        Group::ALL.into_iter().filter(move |g| self.includes(*g))
    }

    /// The `group` query value understood by the backend.
    pub fn query_value(&self) -> &'static str {
        match self {
            GroupSelector::Both => "beide",
            GroupSelector::Children => "kinder",
            GroupSelector::Adults => "erwachsene",
        }
    }
}

impl FromStr for GroupSelector {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "both" | "beide" => Ok(GroupSelector::Both),
            "children" | "kinder" => Ok(GroupSelector::Children),
            "adults" | "erwachsene" => Ok(GroupSelector::Adults),
            other => Err(FilterError::UnknownGroup(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter specification
// ---------------------------------------------------------------------------

/// Which records to include and how to group them.
///
/// `date_from <= date_to` is expected but not enforced; an inverted range
/// selects nothing. An empty `weather` set accepts every condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub location: LocationSelector,
    pub date_from: YearMonth,
    pub date_to: YearMonth,
    pub group: GroupSelector,
    pub weather: BTreeSet<String>,
}

impl FilterSpec {
    pub fn new(
        location: LocationSelector,
        date_from: YearMonth,
        date_to: YearMonth,
        group: GroupSelector,
        weather: BTreeSet<String>,
    ) -> Self {
        Self { location, date_from, date_to, group, weather }
    }

    /// Builds a filter from the raw strings a form submits.
    ///
    /// Weather entries may be data ids (`"fog"`) or filter-bar ids
    /// (`"nebel"`); `"all"` / `"alle"` and blanks are ignored.
    pub fn parse<I, S>(location: &str, from: &str, to: &str, group: &str, weather: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let weather = weather
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty() && !w.eq_ignore_ascii_case("all") && !w.eq_ignore_ascii_case("alle"))
            .map(|w| weather::resolve(&w))
            .collect();

        Ok(Self {
            location: location.parse()?,
            date_from: from.parse()?,
            date_to: to.parse()?,
            group: group.parse()?,
            weather,
        })
    }

    pub fn is_empty_range(&self) -> bool {
        self.date_from > self.date_to
    }

    pub fn contains_month(&self, month: YearMonth) -> bool {
        self.date_from <= month && month <= self.date_to
    }

    /// An empty weather set accepts every record, including those without a
    /// recorded condition. A non-empty set never accepts a missing one.
    pub fn accepts_weather(&self, condition: Option<&str>) -> bool {
        if self.weather.is_empty() {
            return true;
        }
        condition.is_some_and(|c| self.weather.contains(c))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
