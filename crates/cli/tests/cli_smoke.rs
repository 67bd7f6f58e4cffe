//! CLI smoke tests for rebin.
//!
//! These tests drive the binary against temporary directories and never
//! need a working Go toolchain.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the rebin binary.
fn rebin_cmd() -> Command {
  cargo_bin_cmd!("rebin")
}

fn arg(temp: &TempDir) -> String {
  temp.path().to_str().unwrap().to_string()
}

/// Write an executable file with mode 0755.
#[cfg(unix)]
fn write_executable(temp: &TempDir, name: &str, content: &[u8]) {
  use std::os::unix::fs::PermissionsExt;

  let path = temp.path().join(name);
  std::fs::write(&path, content).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  rebin_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  rebin_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("rebin"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["list", "update", "source", "info"] {
    rebin_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// list
// =============================================================================

#[test]
fn list_empty_directory_prints_nothing() {
  let temp = TempDir::new().unwrap();

  rebin_cmd()
    .args(["list", &arg(&temp)])
    .assert()
    .success()
    .stdout(predicate::str::is_empty());
}

#[test]
fn list_json_of_empty_directory_is_empty_array() {
  let temp = TempDir::new().unwrap();

  rebin_cmd()
    .args(["list", "--format", "json", &arg(&temp)])
    .assert()
    .success()
    .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn list_without_search_paths_fails() {
  let home = TempDir::new().unwrap();

  rebin_cmd()
    .arg("list")
    .env_clear()
    .env("HOME", home.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("couldn't find any search paths"));
}

#[cfg(unix)]
#[test]
fn list_ignores_scripts_and_unresolvable_binaries() {
  let temp = TempDir::new().unwrap();
  write_executable(&temp, "script.sh", b"#!/bin/sh\necho hello\n");
  write_executable(&temp, "native", b"\x7fELF\x02\x01\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00");

  rebin_cmd()
    .args(["list", &arg(&temp)])
    .env("REBIN_GO", temp.path().join("no-such-go"))
    .assert()
    .success()
    .stdout(predicate::str::is_empty());
}

// =============================================================================
// update
// =============================================================================

#[test]
fn update_with_nothing_found_succeeds() {
  let temp = TempDir::new().unwrap();

  rebin_cmd()
    .args(["update", &arg(&temp)])
    .assert()
    .success()
    .stderr(predicate::str::contains("No managed binaries found"));
}

#[test]
fn update_rejects_malformed_timeout() {
  let temp = TempDir::new().unwrap();

  rebin_cmd()
    .args(["update", "--timeout", "soon", &arg(&temp)])
    .assert()
    .failure();
}

// =============================================================================
// source
// =============================================================================

#[test]
fn source_dot_requires_workspace_root() {
  rebin_cmd()
    .args(["source", "."])
    .env_remove("GOPATH")
    .assert()
    .failure()
    .stderr(predicate::str::contains("GOPATH"));
}

// =============================================================================
// info
// =============================================================================

#[test]
fn info_shows_platform() {
  rebin_cmd()
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("Platform"));
}
