//! Locality extraction from typed address components.

use super::types::GeocodeCandidate;

/// Component types tried in order, most specific municipality label first.
pub const LOCALITY_PRIORITY: [&str; 4] = [
    "locality",
    "postal_town",
    "administrative_area_level_3",
    "administrative_area_level_2",
];

/// Used only when none of [`LOCALITY_PRIORITY`] is present.
pub const LOCALITY_FALLBACK: &str = "sublocality";

/// Pick the most specific locality name of a candidate.
pub fn extract_locality(candidate: &GeocodeCandidate) -> Option<&str> {
    LOCALITY_PRIORITY
        .iter()
        .chain(std::iter::once(&LOCALITY_FALLBACK))
        .find_map(|tag| {
            candidate
                .address_components
                .iter()
                .find(|c| c.has_type(tag) && !c.long_name.trim().is_empty())
                .map(|c| c.long_name.as_str())
        })
}
