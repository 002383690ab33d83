//! Year-ordered population series: sorting, the two-country join, and summaries.

use crate::models::{MergedYearRecord, PopulationPoint, PopulationSeries};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Return the points ordered by year ascending. The input is left untouched.
pub fn sort_series(points: &[PopulationPoint]) -> Vec<PopulationPoint> {
    let mut out = points.to_vec();
    out.sort_by_key(|p| p.year);
    out
}

/// Left-join `b` onto `a` by year.
///
/// One record per point of `a` (in year order). `value_b` is `None` when `b`
/// has no point for that year; years that only `b` covers are dropped. When
/// `b` repeats a year, its first point wins.
pub fn join_series(a: &PopulationSeries, b: &PopulationSeries) -> Vec<MergedYearRecord> {
    let mut by_year: HashMap<i32, u64> = HashMap::with_capacity(b.points.len());
    for p in &b.points {
        by_year.entry(p.year).or_insert(p.value);
    }

    sort_series(&a.points)
        .into_iter()
        .map(|p| MergedYearRecord {
            year: p.year,
            value_a: Some(p.value),
            value_b: by_year.get(&p.year).copied(),
        })
        .collect()
}

/// First and last year of the series, if it has any points.
pub fn year_range(points: &[PopulationPoint]) -> Option<(i32, i32)> {
    let first = points.iter().map(|p| p.year).min()?;
    let last = points.iter().map(|p| p.year).max()?;
    Some((first, last))
}

/// The point with the greatest year.
pub fn latest(points: &[PopulationPoint]) -> Option<PopulationPoint> {
    points.iter().copied().max_by_key(|p| p.year)
}

/// The last `n` points in year order.
pub fn tail(points: &[PopulationPoint], n: usize) -> Vec<PopulationPoint> {
    let sorted = sort_series(points);
    let skip = sorted.len().saturating_sub(n);
    sorted.into_iter().skip(skip).collect()
}

/// Summary statistics for one series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesSummary {
    pub country_name: String,
    pub count: usize,
    pub first_year: i32,
    pub last_year: i32,
    pub latest: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub median: f64,
}

/// Compute summary statistics. `None` for an empty series.
pub fn summarize(series: &PopulationSeries) -> Option<SeriesSummary> {
    let (first_year, last_year) = year_range(&series.points)?;
    let latest = latest(&series.points)?.value;

    let mut vals: Vec<u64> = series.points.iter().map(|p| p.value).collect();
    vals.sort_unstable();
    let count = vals.len();
    let mean = vals.iter().map(|&v| v as f64).sum::<f64>() / count as f64;
    let median = if count % 2 == 1 {
        vals[count / 2] as f64
    } else {
        (vals[count / 2 - 1] as f64 + vals[count / 2] as f64) / 2.0
    };

    Some(SeriesSummary {
        country_name: series.country_name.clone(),
        count,
        first_year,
        last_year,
        latest,
        min: vals[0],
        max: vals[count - 1],
        mean,
        median,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(i32, u64)]) -> Vec<PopulationPoint> {
        raw.iter().map(|&(y, v)| PopulationPoint::new(y, v)).collect()
    }

    #[test]
    fn sort_orders_by_year() {
        let got = sort_series(&pts(&[(2005, 1), (1990, 2)]));
        assert_eq!(got, pts(&[(1990, 2), (2005, 1)]));
    }

    #[test]
    fn tail_keeps_most_recent_years() {
        let got = tail(&pts(&[(2003, 3), (2001, 1), (2002, 2)]), 2);
        assert_eq!(got, pts(&[(2002, 2), (2003, 3)]));
        assert_eq!(tail(&pts(&[(2001, 1)]), 20).len(), 1);
    }

    #[test]
    fn summary_even_count_median() {
        let s = PopulationSeries::new("X", pts(&[(2001, 4), (2000, 1), (2003, 3), (2002, 2)]));
        let sum = summarize(&s).unwrap();
        assert_eq!((sum.first_year, sum.last_year), (2000, 2003));
        assert_eq!(sum.latest, 3);
        assert_eq!((sum.min, sum.max), (1, 4));
        assert!((sum.median - 2.5).abs() < 1e-9);
        assert!((sum.mean - 2.5).abs() < 1e-9);
        assert!(summarize(&PopulationSeries::new("E", vec![])).is_none());
    }
}
