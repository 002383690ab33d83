//! CSV / JSON export of countries, series, city tables and comparisons.

use crate::models::{CityRecord, Country, PopulationSeries};
use crate::views::Comparison;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Neutralize cells that a spreadsheet would evaluate as a formula.
fn sanitize(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell.to_string(),
    }
}

/// Save the country list as CSV with header.
pub fn save_countries_csv<P: AsRef<Path>>(countries: &[Country], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["name", "iso2", "iso3", "flag"])?;
    for c in countries {
        wtr.write_record([
            sanitize(&c.name),
            sanitize(&c.iso2),
            sanitize(c.iso3.as_deref().unwrap_or("")),
            sanitize(&c.flag),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save one country's series as CSV, one row per year.
pub fn save_series_csv<P: AsRef<Path>>(series: &PopulationSeries, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["country_name", "year", "value"])?;
    let name = sanitize(&series.country_name);
    for p in &series.points {
        wtr.write_record([name.clone(), p.year.to_string(), p.value.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a city table as CSV, one row per population count.
///
/// Cities without counts still get a row with empty count columns.
pub fn save_cities_csv<P: AsRef<Path>>(cities: &[CityRecord], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["city", "country", "year", "value", "sex", "reliability"])?;
    for c in cities {
        let city = sanitize(&c.city_name);
        let country = sanitize(&c.country_name);
        if c.population_counts.is_empty() {
            wtr.write_record([city.as_str(), country.as_str(), "", "", "", ""])?;
            continue;
        }
        for n in &c.population_counts {
            wtr.write_record([
                city.clone(),
                country.clone(),
                n.year.to_string(),
                n.value.to_string(),
                sanitize(&n.sex),
                sanitize(&n.reliability),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Save a comparison as CSV: `year,<country a>,<country b>`; missing values stay empty.
pub fn save_comparison_csv<P: AsRef<Path>>(cmp: &Comparison, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record([
        "year".to_string(),
        sanitize(&cmp.a.country_name),
        sanitize(&cmp.b.country_name),
    ])?;
    let cell = |v: Option<u64>| v.map(|x| x.to_string()).unwrap_or_default();
    for r in &cmp.merged {
        wtr.write_record([r.year.to_string(), cell(r.value_a), cell(r.value_b)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save any serializable value as pretty JSON.
pub fn save_json<T, P>(value: &T, path: P) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(value)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PopulationPoint;
    use tempfile::tempdir;

    #[test]
    fn sanitize_prefixes_formula_starters() {
        assert_eq!(sanitize("=1+1"), "'=1+1");
        assert_eq!(sanitize("@foo"), "'@foo");
        assert_eq!(sanitize("Berlin"), "Berlin");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn write_series_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let s = PopulationSeries::new(
            "Germany",
            vec![PopulationPoint::new(2000, 82_000_000), PopulationPoint::new(2001, 82_300_000)],
        );
        save_series_csv(&s, &csvp).unwrap();
        save_json(&s, &jsonp).unwrap();
        let txt = std::fs::read_to_string(&csvp).unwrap();
        assert!(txt.starts_with("country_name,year,value"));
        assert_eq!(txt.lines().count(), 3);
        assert!(jsonp.exists());
    }
}
