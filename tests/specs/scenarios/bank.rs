//! Bank scenario specs

use crate::prelude::*;

#[test]
fn overdraft_is_refused_and_balance_kept() {
    keeper()
        .args(["bank", "--balance", "100", "--withdraw", "200"])
        .passes()
        .stdout_has("refused insufficient funds: balance 100, requested 200")
        .stdout_has("closing balance: 100");
}

#[test]
fn no_withdrawals_reports_opening_balance() {
    let report = keeper()
        .args(["bank", "--balance", "42", "--format", "json"])
        .passes()
        .json();
    assert_eq!(report["opening"], 42);
    assert_eq!(report["closing"], 42);
    assert!(report["withdrawals"].as_array().unwrap().is_empty());
}
