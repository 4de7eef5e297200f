// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure

//! Every registered command is built and starts up.

use assert_cmd::Command;
use quality_of_service_demo::manifest::ENTRY_POINTS;

#[test]
fn test_every_command_answers_help() {
    for entry in ENTRY_POINTS.iter() {
        let output = Command::cargo_bin(entry.command)
            .expect("binary is built")
            .arg("--help")
            .output()
            .expect("command runs");
        assert!(output.status.success(), "{} --help failed", entry.command);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("Quality of Service demo"),
            "unexpected help for {}: {}",
            entry.command,
            stdout
        );
    }
}

#[test]
fn test_commands_reject_missing_duration() {
    for entry in ENTRY_POINTS.iter() {
        Command::cargo_bin(entry.command)
            .expect("binary is built")
            .assert()
            .failure();
    }
}

#[test]
fn test_version_matches_package() {
    Command::cargo_bin("deadline")
        .expect("binary is built")
        .arg("--version")
        .assert()
        .success()
        .stdout(format!("deadline {}\n", env!("CARGO_PKG_VERSION")));
}
