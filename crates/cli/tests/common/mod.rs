// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// The `keeper` binary with logging silenced unless a test asks for it
pub fn keeper() -> Command {
    let mut cmd = Command::cargo_bin("keeper").expect("keeper binary is built");
    cmd.env_remove("KEEPER_LOG");
    cmd
}

/// Write a settings file into a fresh temp directory
pub fn settings_file(contents: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let path = temp.path().join("keeper.toml");
    std::fs::write(&path, contents).expect("Failed to write settings");
    (temp, path)
}

/// Run the command and parse its stdout as JSON
pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}
