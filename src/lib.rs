//! popstat_rs
//!
//! A lightweight Rust library for browsing population statistics from the
//! CountriesNow API. Pairs with the `popstat` CLI and the `popstat-gui` dashboard.
//!
//! ### Features
//! - Search the country list, resolve countries by ISO2 code
//! - Fetch a country's population series and its cities' populations
//! - Rank cities by name or population, toggling direction like a table header
//! - Join two countries' series by year for side-by-side comparison
//! - Save as CSV or JSON; render SVG/PNG line charts
//!
//! ### Example
//! ```no_run
//! use popstat_rs::{Client, views};
//!
//! let client = Client::default();
//! let cmp = views::fetch_comparison(&client, "Germany", "France")?;
//! for row in &cmp.merged {
//!     println!("{} {:?} {:?}", row.year, row.value_a, row.value_b);
//! }
//! popstat_rs::storage::save_comparison_csv(&cmp, "de_fr.csv")?;
//! popstat_rs::chart::plot_comparison(&cmp, "de_fr.svg", 1000, 600)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod chart;
pub mod cities;
pub mod error;
pub mod format;
pub mod models;
pub mod search;
pub mod series;
pub mod storage;
pub mod views;

pub use api::{Client, PopulationSource};
pub use cities::{Direction, RankKey, SortState};
pub use error::FetchError;
pub use models::{CityRecord, Country, MergedYearRecord, PopulationPoint, PopulationSeries};
