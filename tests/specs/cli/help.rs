//! Help and version specs

use crate::prelude::*;

#[test]
fn help_lists_every_scenario() {
    keeper()
        .args(["--help"])
        .passes()
        .stdout_has("counter")
        .stdout_has("bank")
        .stdout_has("pingpong");
}

#[test]
fn version_names_the_binary() {
    keeper().args(["--version"]).passes().stdout_has("keeper");
}

#[test]
fn subcommand_help_shows_its_flags() {
    keeper()
        .args(["counter", "--help"])
        .passes()
        .stdout_has("--callers")
        .stdout_has("--increments")
        .stdout_has("--async");
}
