use popstat_rs::models::{CityCount, CityRecord, Country, PopulationPoint, PopulationSeries};
use popstat_rs::storage::{save_cities_csv, save_comparison_csv, save_countries_csv, save_json};
use popstat_rs::views::Comparison;
use tempfile::tempdir;

fn series(name: &str, raw: &[(i32, u64)]) -> PopulationSeries {
    PopulationSeries::new(
        name,
        raw.iter().map(|&(y, v)| PopulationPoint::new(y, v)).collect(),
    )
}

#[test]
fn comparison_csv_leaves_missing_cells_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cmp.csv");
    let cmp = Comparison::new(
        series("Germany", &[(2010, 150), (2000, 100)]),
        series("France", &[(2010, 90), (1995, 1)]),
    );
    save_comparison_csv(&cmp, &path).unwrap();

    let txt = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = txt.lines().collect();
    assert_eq!(lines, vec!["year,Germany,France", "2000,100,", "2010,150,90"]);
}

#[test]
fn cities_csv_writes_one_row_per_count() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cities.csv");
    let count = |year, value| CityCount {
        year,
        value,
        sex: "Both Sexes".into(),
        reliability: "Final figure, complete".into(),
    };
    let cities = vec![
        CityRecord {
            city_name: "Berlin".into(),
            country_name: "Germany".into(),
            population_counts: vec![count(2015, 3_520_031), count(2014, 3_469_849)],
        },
        CityRecord {
            city_name: "Ghost Town".into(),
            country_name: "Germany".into(),
            population_counts: vec![],
        },
    ];
    save_cities_csv(&cities, &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["city", "country", "year", "value", "sex", "reliability"]
    );
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][3], "3520031");
    assert_eq!(&rows[1][2], "2014");
    assert_eq!(&rows[2][0], "Ghost Town");
    assert_eq!(&rows[2][3], "");
}

#[test]
fn countries_csv_neutralizes_formulas() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("countries.csv");
    let countries = vec![Country {
        name: "=HYPERLINK(\"x\")".into(),
        flag: String::new(),
        iso2: "XX".into(),
        iso3: None,
    }];
    save_countries_csv(&countries, &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let row = rdr.records().next().unwrap().unwrap();
    assert!(row[0].starts_with("'="));
    assert_eq!(&row[2], "");
}

#[test]
fn json_export_round_trips_comparison_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cmp.json");
    let cmp = Comparison::new(series("A", &[(2000, 1)]), series("B", &[]));
    save_json(&cmp.merged, &path).unwrap();

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(v[0]["year"], 2000);
    assert_eq!(v[0]["value_a"], 1);
    assert!(v[0]["value_b"].is_null());
}
