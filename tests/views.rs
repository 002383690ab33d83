use popstat_rs::models::{CityCount, CityRecord, Country, PopulationPoint, PopulationSeries};
use popstat_rs::views::{
    self, CitiesView, CompareView, CountryView, ExploreView, Load, MSG_COMPARE, MSG_COUNTRIES,
    MSG_COUNTRY, MSG_NO_CITIES,
};
use popstat_rs::{Direction, FetchError, PopulationSource, RankKey};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory stand-in for the API.
#[derive(Default)]
struct StubSource {
    countries: Vec<Country>,
    series: HashMap<String, PopulationSeries>,
    cities: HashMap<String, Vec<CityRecord>>,
    fail_countries: bool,
    population_calls: AtomicUsize,
}

impl PopulationSource for StubSource {
    fn countries(&self) -> Result<Vec<Country>, FetchError> {
        if self.fail_countries {
            return Err(FetchError::Upstream("boom".into()));
        }
        Ok(self.countries.clone())
    }

    fn population(&self, country_name: &str) -> Result<PopulationSeries, FetchError> {
        self.population_calls.fetch_add(1, Ordering::SeqCst);
        self.series
            .get(country_name)
            .cloned()
            .ok_or_else(|| FetchError::Upstream(format!("no data for {country_name}")))
    }

    fn cities(&self, country_name: &str) -> Result<Vec<CityRecord>, FetchError> {
        match self.cities.get(country_name) {
            Some(c) if !c.is_empty() => Ok(c.clone()),
            _ => Err(FetchError::EmptyPayload("city list")),
        }
    }
}

fn country(name: &str, iso2: &str) -> Country {
    Country {
        name: name.into(),
        flag: format!("https://flags.example/{iso2}.svg"),
        iso2: iso2.into(),
        iso3: None,
    }
}

fn series(name: &str, raw: &[(i32, u64)]) -> PopulationSeries {
    PopulationSeries::new(
        name,
        raw.iter().map(|&(y, v)| PopulationPoint::new(y, v)).collect(),
    )
}

fn city(name: &str, value: u64) -> CityRecord {
    CityRecord {
        city_name: name.into(),
        country_name: "Germany".into(),
        population_counts: vec![CityCount {
            year: 2015,
            value,
            sex: "Both Sexes".into(),
            reliability: "Final figure, complete".into(),
        }],
    }
}

fn stub() -> StubSource {
    let mut s = StubSource {
        countries: vec![
            country("Germany", "DE"),
            country("France", "FR"),
            country("Ghana", "GH"),
            country("Atlantis", "AT"),
        ],
        ..Default::default()
    };
    let de: Vec<(i32, u64)> = (1990..2015).rev().map(|y| (y, 80_000_000 + y as u64)).collect();
    s.series.insert("Germany".into(), series("Germany", &de));
    s.series
        .insert("France".into(), series("France", &[(2020, 67_000_000), (2010, 65_000_000)]));
    s.cities.insert(
        "Germany".into(),
        vec![city("Munich", 1_500_000), city("berlin", 3_500_000), city("Bonn", 300_000)],
    );
    s.cities.insert("Ghana".into(), vec![]);
    s
}

#[test]
fn explore_filters_by_search() {
    let src = stub();
    let mut view = ExploreView::load(&src);
    assert_eq!(view.visible().len(), 4);
    view.search = "  GH ".into();
    let names: Vec<&str> = view.visible().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Ghana"]);
    view.search = "zzz".into();
    assert!(view.visible().is_empty());
}

#[test]
fn explore_failure_collapses_to_message() {
    let src = StubSource {
        fail_countries: true,
        ..Default::default()
    };
    let view = ExploreView::load(&src);
    assert_eq!(view.countries, Load::Failed(MSG_COUNTRIES.to_string()));
    assert!(view.visible().is_empty());
}

#[test]
fn country_view_latest_and_chart_window() {
    let src = stub();
    let mut view = CountryView::load(&src, "de");
    let detail = view.detail.ready().expect("loaded");
    assert_eq!(detail.country.name, "Germany");
    // Stored sorted even though the source returned newest first.
    assert_eq!(detail.series.points[0].year, 1990);

    assert_eq!(view.latest().unwrap().year, 2014);
    let chart = view.chart_points();
    assert_eq!(chart.len(), views::CHART_YEARS);
    assert_eq!(chart.first().unwrap().year, 1995);
    assert_eq!(chart.last().unwrap().year, 2014);
    assert_eq!(view.summary().unwrap().count, 25);

    assert!(!view.show_graph);
    view.toggle_graph();
    assert!(view.show_graph);
}

#[test]
fn country_view_unknown_code_is_not_found() {
    let src = stub();
    let view = CountryView::load(&src, "XX");
    assert_eq!(view.detail.failure(), Some(MSG_COUNTRY));
    // Known country without population data.
    let view = CountryView::load(&src, "GH");
    assert_eq!(view.detail.failure(), Some(MSG_COUNTRY));
}

#[test]
fn cities_view_sorts_then_filters() {
    let src = stub();
    let mut view = CitiesView::load(&src, "DE");
    let names = |v: &CitiesView| -> Vec<String> {
        v.rows().into_iter().map(|c| c.city_name).collect()
    };
    assert_eq!(names(&view), vec!["berlin", "Bonn", "Munich"]);

    view.sort_by(RankKey::Name);
    assert_eq!(view.sort.direction, Direction::Descending);
    assert_eq!(names(&view), vec!["Munich", "Bonn", "berlin"]);

    view.sort_by(RankKey::Population);
    assert_eq!(view.sort.direction, Direction::Ascending);
    assert_eq!(names(&view), vec!["Bonn", "Munich", "berlin"]);

    view.search = "B".into();
    assert_eq!(names(&view), vec!["Bonn", "berlin"]);
}

#[test]
fn cities_view_messages() {
    let src = stub();
    assert_eq!(CitiesView::load(&src, "GH").table.failure(), Some(MSG_NO_CITIES));
    assert_eq!(CitiesView::load(&src, "XX").table.failure(), Some(MSG_COUNTRY));
}

#[test]
fn compare_selection_is_capped_at_two() {
    let src = stub();
    let mut view = CompareView::load(&src);
    view.toggle_selection("Germany");
    assert!(!view.can_compare());
    view.toggle_selection("France");
    view.toggle_selection("Ghana");
    assert_eq!(view.selected, vec!["Germany", "France"]);
    assert!(view.can_compare());

    view.toggle_selection("Germany");
    assert_eq!(view.selected, vec!["France"]);
    assert!(view.pair().is_none());
}

#[test]
fn compare_joins_both_series() {
    let src = stub();
    let mut view = CompareView::load(&src);
    view.toggle_selection("France");
    view.toggle_selection("Germany");
    view.compare(&src);

    assert_eq!(src.population_calls.load(Ordering::SeqCst), 2);
    let cmp = view.showing().expect("comparison ready");
    assert_eq!(cmp.title(), "France vs Germany");
    assert_eq!(cmp.year_range(), Some((2010, 2020)));
    assert_eq!(cmp.merged.len(), 2);
    assert_eq!(cmp.merged[0].value_a, Some(65_000_000));
    assert_eq!(cmp.merged[0].value_b, Some(80_002_010));
    // Germany has no 2020 observation.
    assert_eq!(cmp.merged[1].value_b, None);

    view.reset();
    assert!(view.comparison.is_none());
}

#[test]
fn compare_fails_whole_when_one_side_fails() {
    let src = stub();
    let mut view = CompareView::load(&src);
    view.toggle_selection("Germany");
    view.toggle_selection("Atlantis");
    view.compare(&src);
    assert_eq!(view.comparison, Some(Load::Failed(MSG_COMPARE.to_string())));
    assert!(view.showing().is_none());

    assert!(views::fetch_pair(&src, "Atlantis", "Germany").is_err());
}

#[test]
fn compare_without_pair_does_nothing() {
    let src = stub();
    let mut view = CompareView::load(&src);
    view.toggle_selection("Germany");
    view.compare(&src);
    assert!(view.comparison.is_none());
    assert_eq!(src.population_calls.load(Ordering::SeqCst), 0);
}
