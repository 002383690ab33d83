//! Live API tests. Run with: `cargo test --features online -- --nocapture`
#![cfg(feature = "online")]

use popstat_rs::views::{CompareView, fetch_comparison};
use popstat_rs::{Client, PopulationSource};

#[test]
fn list_countries() {
    let cli = Client::default();
    let countries = cli.countries().unwrap();
    assert!(countries.len() > 100);
    assert!(countries.iter().any(|c| c.iso2 == "DE"));
}

#[test]
fn germany_population_series() {
    let cli = Client::default();
    let de = cli.country_by_iso2("de").unwrap();
    let series = cli.population(&de.name).unwrap();
    assert!(!series.points.is_empty());
    assert!(series.points.iter().all(|p| p.value > 0));
}

#[test]
fn germany_cities() {
    let cli = Client::default();
    let cities = cli.cities("Germany").unwrap();
    assert!(!cities.is_empty());
}

#[test]
fn compare_two_countries() {
    let cli = Client::default();
    let cmp = fetch_comparison(&cli, "France", "Germany").unwrap();
    assert_eq!(cmp.merged.len(), cmp.a.points.len());

    let mut view = CompareView::load(&cli);
    view.toggle_selection("France");
    view.toggle_selection("Germany");
    view.compare(&cli);
    assert!(view.showing().is_some());
}
