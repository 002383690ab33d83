use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("popstat").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("popstat"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn cities_help_lists_sort_options() {
    let mut cmd = Command::cargo_bin("popstat").unwrap();
    cmd.args(["cities", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--sort"))
        .stdout(predicate::str::contains("population"));
}

#[test]
fn compare_requires_two_countries() {
    let mut cmd = Command::cargo_bin("popstat").unwrap();
    cmd.args(["compare", "DE"]);
    cmd.assert().failure();
}

#[test]
fn unreachable_api_reports_not_found() {
    let mut cmd = Command::cargo_bin("popstat").unwrap();
    cmd.args(["--api-url", "http://127.0.0.1:9", "--timeout", "2", "countries"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("An error occurred while fetching countries"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn cities_online() {
    let mut cmd = Command::cargo_bin("popstat").unwrap();
    cmd.args(["cities", "DE", "--sort", "population", "--desc", "--limit", "5"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Cities in Germany"));
}
