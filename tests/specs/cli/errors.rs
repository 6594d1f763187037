//! Error reporting specs

use crate::prelude::*;

#[test]
fn missing_subcommand_fails() {
    keeper().fails().stderr_has("Usage");
}

#[test]
fn unknown_setting_is_rejected() {
    let scratch = Scratch::new();
    let path = scratch.file("keeper.toml", "queue_size = 8\n");
    keeper()
        .args(["--config", path.to_str().unwrap(), "counter"])
        .fails()
        .stderr_has("invalid configuration");
}

#[test]
fn malformed_duration_is_rejected() {
    let scratch = Scratch::new();
    let path = scratch.file("keeper.toml", "action_timeout = \"soon\"\n");
    keeper()
        .args(["--config", path.to_str().unwrap(), "bank"])
        .fails()
        .stderr_has("failed to load settings");
}

#[test]
fn unknown_format_is_rejected() {
    keeper()
        .args(["counter", "--format", "yaml"])
        .fails()
        .stderr_has("yaml");
}
