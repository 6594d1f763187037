//! Ping-pong scenario specs

use crate::prelude::*;

#[test]
fn pingpong_reports_totals() {
    keeper()
        .args(["pingpong", "--actors", "2", "--rounds", "10"])
        .passes()
        .stdout_has("actor 0")
        .stdout_has("actor 1")
        .stdout_has("total hits: 20");
}

#[test]
fn pingpong_needs_two_actors() {
    keeper()
        .args(["pingpong", "--actors", "1"])
        .fails()
        .stderr_has("actors");
}

#[test]
fn pingpong_hits_are_spread_across_the_ring() {
    let report = keeper()
        .args(["pingpong", "--actors", "4", "--rounds", "8", "--format", "json"])
        .passes()
        .json();
    let hits: Vec<u64> = report["hits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h.as_u64().unwrap())
        .collect();
    // each ball visits every actor twice on a ring of four
    assert_eq!(hits, vec![8, 8, 8, 8]);
    assert_eq!(report["total"], 32);
}
