//! Location registry for the Bahnhofstrasse pedestrian counters.
//!
//! Defines the canonical list of counting locations, mapping the short ids
//! used by the filter UI to the exact `location_name` values the backend
//! stores and accepts as a query parameter. This is the single source of
//! truth for location names; other modules should resolve locations here
//! rather than hardcoding display names.

/// Selector id meaning "every location".
pub const ALL_LOCATIONS_ID: &str = "all";

/// Backend value for "every location" (`location_name=Alle` disables the
/// location filter server-side).
pub const ALL_LOCATIONS_NAME: &str = "Alle";

// ---------------------------------------------------------------------------
// Location metadata
// ---------------------------------------------------------------------------

/// Metadata for a single counting location.
#[derive(Debug)]
pub struct Location {
    /// Short id used by the filter UI.
    pub id: &'static str,
    /// Exact `location_name` as stored by the backend.
    pub name: &'static str,
    /// Short label for selectors.
    pub label: &'static str,
}

/// All counting locations, north to south along the Bahnhofstrasse, then the
/// side street.
pub static LOCATION_REGISTRY: &[Location] = &[
    Location {
        id: "nord",
        name: "Bahnhofstrasse (Nord)",
        label: "Bahnhofstrasse Nord",
    },
    Location {
        id: "mitte",
        name: "Bahnhofstrasse (Mitte)",
        label: "Bahnhofstrasse Mitte",
    },
    Location {
        id: "sued",
        name: "Bahnhofstrasse (Süd)",
        label: "Bahnhofstrasse Süd",
    },
    Location {
        id: "lintheschergasse",
        name: "Lintheschergasse",
        label: "Lintheschergasse",
    },
];

/// Returns the ids of all registered locations.
pub fn all_location_ids() -> Vec<&'static str> {
    LOCATION_REGISTRY.iter().map(|l| l.id).collect()
}

/// Looks up a location by its short id. Returns `None` if not found.
pub fn find_location(id: &str) -> Option<&'static Location> {
    LOCATION_REGISTRY.iter().find(|l| l.id == id)
}

/// Looks up a location by its backend name.
pub fn find_by_name(name: &str) -> Option<&'static Location> {
    LOCATION_REGISTRY.iter().find(|l| l.name == name)
}

/// Maps a selector id to the backend `location_name` query value.
///
/// `"all"` maps to `"Alle"`; unknown ids are passed through unchanged so a
/// caller may address a location the registry does not know yet.
pub fn backend_name(id: &str) -> &str {
    if id == ALL_LOCATIONS_ID {
        return ALL_LOCATIONS_NAME;
    }
    find_location(id).map(|l| l.name).unwrap_or(id)
}

/// Returns `true` if a record's `location_name` belongs to the location with
/// the given selector id. Accepts either the id itself or its backend name.
pub fn matches(id: &str, record_location: &str) -> bool {
    record_location == id || find_location(id).is_some_and(|l| l.name == record_location)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_ids_or_names() {
        let mut ids = std::collections::HashSet::new();
        let mut names = std::collections::HashSet::new();
        for location in LOCATION_REGISTRY {
            assert!(ids.insert(location.id), "duplicate id '{}'", location.id);
            assert!(names.insert(location.name), "duplicate name '{}'", location.name);
        }
    }

    #[test]
    fn test_backend_names_are_preserved_exactly() {
        assert_eq!(backend_name("all"), "Alle");
        assert_eq!(backend_name("nord"), "Bahnhofstrasse (Nord)");
        assert_eq!(backend_name("mitte"), "Bahnhofstrasse (Mitte)");
        assert_eq!(backend_name("sued"), "Bahnhofstrasse (Süd)");
        assert_eq!(backend_name("lintheschergasse"), "Lintheschergasse");
    }

    #[test]
    fn test_unknown_id_passes_through() {
        assert_eq!(backend_name("bellevue"), "bellevue");
        assert!(find_location("bellevue").is_none());
    }

    #[test]
    fn test_registry_does_not_contain_the_all_selector() {
        assert!(find_location(ALL_LOCATIONS_ID).is_none());
        assert_eq!(all_location_ids().len(), LOCATION_REGISTRY.len());
    }

    #[test]
    fn test_matches_accepts_id_or_backend_name() {
        assert!(matches("sued", "Bahnhofstrasse (Süd)"));
        assert!(matches("sued", "sued"));
        assert!(!matches("sued", "Bahnhofstrasse (Nord)"));
        assert_eq!(find_by_name("Lintheschergasse").map(|l| l.id), Some("lintheschergasse"));
    }
}
