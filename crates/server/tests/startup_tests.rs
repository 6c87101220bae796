//! Startup failures of the server binary name what went wrong.
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("mdmirror-server")
}

#[test]
fn test_invalid_addr_is_reported() {
    cmd()
        .env_remove("MDMIRROR_CONFIG")
        .env("MDMIRROR_ADDR", "not-an-address")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid MDMIRROR_ADDR: not-an-address"));
}

#[test]
fn test_missing_config_file_is_reported() {
    cmd()
        .env("MDMIRROR_CONFIG", "definitely/not/here.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read MDMIRROR_CONFIG file: definitely/not/here.json"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mirror.json");
    std::fs::write(&path, r#"{"manifest_path": "llms.txt"}"#).unwrap();

    cmd()
        .env("MDMIRROR_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid mirror config in"));
}
