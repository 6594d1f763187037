//! Counter scenario specs

use crate::prelude::*;

#[test]
fn counter_text_report() {
    keeper()
        .args(["counter", "--callers", "5", "--increments", "1"])
        .passes()
        .stdout_has("5 callers x 1 increments (sync)")
        .stdout_has("count: 5");
}

#[test]
fn counter_json_report_with_settings() {
    let scratch = Scratch::new();
    let path = scratch.file("keeper.toml", SMALL_SETTINGS);
    let outcome = keeper()
        .args(["--config", path.to_str().unwrap()])
        .args(["counter", "--callers", "100", "--increments", "100"])
        .args(["--async", "--format", "json"])
        .passes();
    let report = outcome.json();
    assert_eq!(report["count"], 10_000);
    assert_eq!(report["count"], report["expected"]);
}

#[test]
fn counter_is_quiet_by_default() {
    keeper()
        .args(["counter", "--callers", "2", "--increments", "2"])
        .passes()
        .stderr_lacks("actor started");
}

#[test]
fn log_filter_comes_from_environment() {
    keeper()
        .env("KEEPER_LOG", "keeper=debug")
        .args(["counter", "--callers", "1", "--increments", "1"])
        .passes()
        .stderr_has("actor finalized");
}
