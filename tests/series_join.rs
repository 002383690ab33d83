use popstat_rs::models::{MergedYearRecord, PopulationPoint, PopulationSeries};
use popstat_rs::series::{join_series, sort_series};

fn series(name: &str, raw: &[(i32, u64)]) -> PopulationSeries {
    PopulationSeries::new(
        name,
        raw.iter().map(|&(y, v)| PopulationPoint::new(y, v)).collect(),
    )
}

fn rec(year: i32, a: u64, b: Option<u64>) -> MergedYearRecord {
    MergedYearRecord {
        year,
        value_a: Some(a),
        value_b: b,
    }
}

#[test]
fn join_marks_missing_years_as_absent() {
    let a = series("A", &[(2000, 100), (2010, 150)]);
    let b = series("B", &[(2010, 90)]);
    assert_eq!(
        join_series(&a, &b),
        vec![rec(2000, 100, None), rec(2010, 150, Some(90))]
    );
}

#[test]
fn join_with_empty_primary_is_empty() {
    let a = series("A", &[]);
    let b = series("B", &[(2000, 50)]);
    assert!(join_series(&a, &b).is_empty());
}

#[test]
fn join_follows_primary_years_only() {
    // B covers years A does not; those are dropped.
    let a = series("A", &[(2012, 3), (2010, 1), (2011, 2)]);
    let b = series("B", &[(1990, 7), (2011, 20), (2030, 9)]);
    let merged = join_series(&a, &b);

    assert_eq!(merged.len(), a.points.len());
    let years: Vec<i32> = merged.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2010, 2011, 2012]);
    for r in &merged {
        let in_b = b.points.iter().any(|p| p.year == r.year);
        assert_eq!(r.value_b.is_some(), in_b, "year {}", r.year);
        assert!(r.value_a.is_some());
    }
}

#[test]
fn join_uses_first_match_for_repeated_years() {
    let a = series("A", &[(2000, 1)]);
    let b = series("B", &[(2000, 10), (2000, 20)]);
    assert_eq!(join_series(&a, &b), vec![rec(2000, 1, Some(10))]);
}

#[test]
fn join_keeps_zero_values_distinct_from_absent() {
    let a = series("A", &[(2000, 5), (2001, 6)]);
    let b = series("B", &[(2000, 0)]);
    let merged = join_series(&a, &b);
    assert_eq!(merged[0].value_b, Some(0));
    assert_eq!(merged[1].value_b, None);
}

#[test]
fn join_is_deterministic() {
    let a = series("A", &[(2001, 1), (2000, 2), (2002, 3)]);
    let b = series("B", &[(2002, 30), (2000, 20)]);
    assert_eq!(join_series(&a, &b), join_series(&a, &b));
}

#[test]
fn sort_orders_by_year() {
    let got = sort_series(&series("A", &[(2005, 1), (1990, 2)]).points);
    assert_eq!(
        got,
        vec![PopulationPoint::new(1990, 2), PopulationPoint::new(2005, 1)]
    );
    assert!(sort_series(&[]).is_empty());
}

#[test]
fn sort_is_idempotent_and_a_permutation() {
    let input = series(
        "A",
        &[(2003, 30), (1999, 9), (2010, 100), (2001, 10), (1980, 8)],
    )
    .points;
    let once = sort_series(&input);
    let twice = sort_series(&once);
    assert_eq!(once, twice);
    assert!(once.windows(2).all(|w| w[0].year <= w[1].year));

    let mut a = input.clone();
    let mut b = once.clone();
    a.sort_by_key(|p| (p.year, p.value));
    b.sort_by_key(|p| (p.year, p.value));
    assert_eq!(a, b);
}

#[test]
fn sorted_series_keeps_name() {
    let s = series("Chile", &[(2001, 2), (2000, 1)]).sorted();
    assert_eq!(s.country_name, "Chile");
    assert_eq!(s.points[0].year, 2000);
}
