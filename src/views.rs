//! View models for the four dashboard pages.
//!
//! Each page owns its fetched data in a [`Load`] that moves from `Loading` to
//! `Ready` or `Failed`. Loaders collapse every [`FetchError`] into one short
//! message for the "Not Found" panel; the underlying error is only logged.
//! Fetching and finishing are split (`fetch_*` / `finish`) so a front end can
//! run the fetch on a worker thread and hand the result back.

use crate::api::PopulationSource;
use crate::cities::{RankKey, SortState, rank_cities};
use crate::error::FetchError;
use crate::models::{CityRecord, Country, MergedYearRecord, PopulationPoint, PopulationSeries};
use crate::search::{filter_cities, filter_countries};
use crate::series::{self, SeriesSummary};
use log::warn;
use std::fmt::Display;

pub const MSG_COUNTRIES: &str = "An error occurred while fetching countries";
pub const MSG_COUNTRY: &str = "Country not found or data unavailable.";
pub const MSG_NO_CITIES: &str = "No cities found for this country.";
pub const MSG_CITIES: &str = "An error occurred while fetching data.";
pub const MSG_COMPARE: &str = "Failed to fetch population data for selected countries";

/// Number of most recent years the country chart shows.
pub const CHART_YEARS: usize = 20;

/// Most countries a comparison can hold.
pub const MAX_SELECTED: usize = 2;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Load<T> {
    #[default]
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Load<T> {
    /// `Ready` on success, otherwise `Failed(message)` after logging the cause.
    pub fn from_result<E: Display>(result: Result<T, E>, message: &str) -> Self {
        match result {
            Ok(v) => Load::Ready(v),
            Err(e) => {
                warn!("{message}: {e}");
                Load::Failed(message.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Load::Failed(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }
}

// ---------------------------------------------------------------------------
// Explore

#[derive(Debug, Clone, Default)]
pub struct ExploreView {
    pub countries: Load<Vec<Country>>,
    pub search: String,
}

impl ExploreView {
    pub fn load(source: &impl PopulationSource) -> Self {
        let mut view = Self::default();
        view.finish(source.countries());
        view
    }

    pub fn finish(&mut self, result: Result<Vec<Country>, FetchError>) {
        self.countries = Load::from_result(result, MSG_COUNTRIES);
    }

    /// Countries matching the search box.
    pub fn visible(&self) -> Vec<&Country> {
        match &self.countries {
            Load::Ready(all) => filter_countries(all, &self.search),
            _ => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Country

#[derive(Debug, Clone, PartialEq)]
pub struct CountryDetail {
    pub country: Country,
    /// Sorted by year.
    pub series: PopulationSeries,
}

/// Resolve `iso2`, then fetch its population series.
pub fn fetch_country_detail(
    source: &impl PopulationSource,
    iso2: &str,
) -> Result<CountryDetail, FetchError> {
    let country = source.country_by_iso2(iso2)?;
    let series = source.population(&country.name)?.sorted();
    if series.is_empty() {
        return Err(FetchError::EmptyPayload("population counts"));
    }
    Ok(CountryDetail { country, series })
}

#[derive(Debug, Clone)]
pub struct CountryView {
    pub iso2: String,
    pub detail: Load<CountryDetail>,
    pub show_graph: bool,
}

impl CountryView {
    pub fn new(iso2: impl Into<String>) -> Self {
        Self {
            iso2: iso2.into(),
            detail: Load::Loading,
            show_graph: false,
        }
    }

    pub fn load(source: &impl PopulationSource, iso2: &str) -> Self {
        let mut view = Self::new(iso2);
        view.finish(fetch_country_detail(source, iso2));
        view
    }

    pub fn finish(&mut self, result: Result<CountryDetail, FetchError>) {
        self.detail = Load::from_result(result, MSG_COUNTRY);
    }

    /// Most recent observation ("Latest population").
    pub fn latest(&self) -> Option<PopulationPoint> {
        self.detail
            .ready()
            .and_then(|d| series::latest(&d.series.points))
    }

    /// Points the chart shows: the last [`CHART_YEARS`] years.
    pub fn chart_points(&self) -> Vec<PopulationPoint> {
        self.detail
            .ready()
            .map(|d| series::tail(&d.series.points, CHART_YEARS))
            .unwrap_or_default()
    }

    pub fn summary(&self) -> Option<SeriesSummary> {
        self.detail.ready().and_then(|d| series::summarize(&d.series))
    }

    pub fn toggle_graph(&mut self) {
        self.show_graph = !self.show_graph;
    }
}

// ---------------------------------------------------------------------------
// Explore cities

#[derive(Debug, Clone, PartialEq)]
pub struct CityTable {
    pub country_name: String,
    pub cities: Vec<CityRecord>,
}

/// Resolve `iso2`, then fetch its cities.
pub fn fetch_city_table(
    source: &impl PopulationSource,
    iso2: &str,
) -> Result<CityTable, FetchError> {
    let country = source.country_by_iso2(iso2)?;
    let cities = source.cities(&country.name)?;
    Ok(CityTable {
        country_name: country.name,
        cities,
    })
}

#[derive(Debug, Clone)]
pub struct CitiesView {
    pub iso2: String,
    pub table: Load<CityTable>,
    pub search: String,
    pub sort: SortState,
}

impl CitiesView {
    pub fn new(iso2: impl Into<String>) -> Self {
        Self {
            iso2: iso2.into(),
            table: Load::Loading,
            search: String::new(),
            sort: SortState::default(),
        }
    }

    pub fn load(source: &impl PopulationSource, iso2: &str) -> Self {
        let mut view = Self::new(iso2);
        view.finish(fetch_city_table(source, iso2));
        view
    }

    pub fn finish(&mut self, result: Result<CityTable, FetchError>) {
        let message = match &result {
            Err(FetchError::EmptyPayload(_)) => MSG_NO_CITIES,
            Err(FetchError::CountryNotFound(_)) => MSG_COUNTRY,
            _ => MSG_CITIES,
        };
        self.table = Load::from_result(result, message);
    }

    /// Column header click.
    pub fn sort_by(&mut self, key: RankKey) {
        self.sort.select(key);
    }

    /// Rows to display: ranked by the current sort, then filtered by the search box.
    pub fn rows(&self) -> Vec<CityRecord> {
        let Some(table) = self.table.ready() else {
            return Vec::new();
        };
        let ranked = rank_cities(&table.cities, self.sort.key, self.sort.direction);
        filter_cities(&ranked, &self.search)
            .into_iter()
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Compare

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub a: PopulationSeries,
    pub b: PopulationSeries,
    pub merged: Vec<MergedYearRecord>,
}

impl Comparison {
    /// Sort both series and join `b` onto `a`.
    pub fn new(a: PopulationSeries, b: PopulationSeries) -> Self {
        let a = a.sorted();
        let b = b.sorted();
        let merged = series::join_series(&a, &b);
        Self { a, b, merged }
    }

    pub fn title(&self) -> String {
        format!("{} vs {}", self.a.country_name, self.b.country_name)
    }

    /// Years the chart spans; driven by the primary series.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        series::year_range(&self.a.points)
    }
}

/// Fetch both countries' series concurrently and wait for both.
///
/// Fails as a whole if either request fails.
pub fn fetch_pair<S>(
    source: &S,
    a: &str,
    b: &str,
) -> Result<(PopulationSeries, PopulationSeries), FetchError>
where
    S: PopulationSource + Sync,
{
    let (left, right) = std::thread::scope(|scope| {
        let left = scope.spawn(|| source.population(a));
        let right = scope.spawn(|| source.population(b));
        (
            left.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
            right.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
        )
    });
    Ok((left?, right?))
}

/// Fetch and join the two named countries.
pub fn fetch_comparison<S>(source: &S, a: &str, b: &str) -> Result<Comparison, FetchError>
where
    S: PopulationSource + Sync,
{
    let (sa, sb) = fetch_pair(source, a, b)?;
    Ok(Comparison::new(sa, sb))
}

#[derive(Debug, Clone, Default)]
pub struct CompareView {
    pub countries: Load<Vec<Country>>,
    pub search: String,
    /// Selected country names, in selection order. The first one is primary.
    pub selected: Vec<String>,
    pub comparison: Option<Load<Comparison>>,
}

impl CompareView {
    pub fn load(source: &impl PopulationSource) -> Self {
        let mut view = Self::default();
        view.finish_countries(source.countries());
        view
    }

    pub fn finish_countries(&mut self, result: Result<Vec<Country>, FetchError>) {
        self.countries = Load::from_result(result, MSG_COUNTRIES);
    }

    pub fn visible(&self) -> Vec<&Country> {
        match &self.countries {
            Load::Ready(all) => filter_countries(all, &self.search),
            _ => Vec::new(),
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|s| s == name)
    }

    /// Select `name`, or deselect it if already selected. A third selection is ignored.
    pub fn toggle_selection(&mut self, name: &str) {
        if let Some(pos) = self.selected.iter().position(|s| s == name) {
            self.selected.remove(pos);
        } else if self.selected.len() < MAX_SELECTED {
            self.selected.push(name.to_string());
        }
    }

    pub fn can_compare(&self) -> bool {
        self.selected.len() == MAX_SELECTED
    }

    /// The selected pair, primary first.
    pub fn pair(&self) -> Option<(&str, &str)> {
        match self.selected.as_slice() {
            [a, b] => Some((a.as_str(), b.as_str())),
            _ => None,
        }
    }

    /// Mark the comparison as in flight.
    pub fn begin(&mut self) {
        self.comparison = Some(Load::Loading);
    }

    pub fn finish(&mut self, result: Result<Comparison, FetchError>) {
        self.comparison = Some(Load::from_result(result, MSG_COMPARE));
    }

    /// Fetch and join the selected pair. Does nothing unless two are selected.
    pub fn compare<S>(&mut self, source: &S)
    where
        S: PopulationSource + Sync,
    {
        let Some((a, b)) = self.pair() else {
            return;
        };
        let result = fetch_comparison(source, a, b);
        self.finish(result);
    }

    /// The finished comparison, if one is showing.
    pub fn showing(&self) -> Option<&Comparison> {
        self.comparison.as_ref().and_then(Load::ready)
    }

    /// Back to country selection.
    pub fn reset(&mut self) {
        self.comparison = None;
    }
}
