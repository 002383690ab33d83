//! Case-insensitive substring filters behind the search boxes.

use crate::models::{CityRecord, Country};

fn matches(name: &str, needle: &str) -> bool {
    needle.is_empty() || name.to_lowercase().contains(needle)
}

/// Countries whose name contains `term`, in their original order.
pub fn filter_countries<'a>(countries: &'a [Country], term: &str) -> Vec<&'a Country> {
    let needle = term.trim().to_lowercase();
    countries.iter().filter(|c| matches(&c.name, &needle)).collect()
}

/// Cities whose name contains `term`, in their original order.
pub fn filter_cities<'a>(cities: &'a [CityRecord], term: &str) -> Vec<&'a CityRecord> {
    let needle = term.trim().to_lowercase();
    cities.iter().filter(|c| matches(&c.city_name, &needle)).collect()
}
