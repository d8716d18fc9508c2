//! End-to-end tests of the drb binary
//!
//! Every test runs against an isolated configuration directory. Tests that
//! reach the network are pointed at an unreachable proxy.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn drb(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_drb"))
        .args(args)
        .env("DRB_CONFIG_DIR", config_dir)
        .env("NO_COLOR", "1")
        .env_remove("DRB_APP_KEY")
        .env_remove("DRB_APP_SECRET")
        .env_remove("DRB_ROOT")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute drb")
}

#[test]
fn test_help() {
    let temp_dir = TempDir::new().unwrap();
    let output = drb(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ls"));
    assert!(stdout.contains("delta"));
}

#[test]
fn test_unauthorized_json_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = drb(temp_dir.path(), &["ls", "--json"]);

    assert_eq!(output.status.code(), Some(4));
    assert!(output.stdout.is_empty());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stderr).expect("stderr should be a JSON error");
    assert!(json["error"].as_str().unwrap().contains("Not authorized"));
}

#[test]
fn test_logout_writes_config() {
    let temp_dir = TempDir::new().unwrap();
    let output = drb(temp_dir.path(), &["auth", "--logout"]);

    assert!(output.status.success());
    assert!(temp_dir.path().join("config.toml").exists());
}

#[test]
fn test_auth_requires_app_credentials() {
    let temp_dir = TempDir::new().unwrap();
    let output = drb(temp_dir.path(), &["auth", "--key", "only-key"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_corrupt_config_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("config.toml"), "schema_version = [").unwrap();
    let output = drb(temp_dir.path(), &["account"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load configuration"));
}

#[test]
fn test_stdin_upload_needs_remote_name() {
    let temp_dir = TempDir::new().unwrap();
    let output = drb(temp_dir.path(), &["put", "-"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cp_needs_source_and_destination() {
    let temp_dir = TempDir::new().unwrap();
    let output = drb(temp_dir.path(), &["cp", "/only-one"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_bad_flag_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = drb(temp_dir.path(), &["ls", "--no-such-flag"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_bash_completions() {
    let temp_dir = TempDir::new().unwrap();
    let output = drb(temp_dir.path(), &["completions", "bash"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("drb"));
}

#[test]
fn test_failed_download_keeps_existing_file() {
    let config_dir = TempDir::new().unwrap();
    std::fs::write(
        config_dir.path().join("config.toml"),
        r#"schema_version = 1

[app]
key = "app-key"
secret = "app-secret"

[token]
key = "token-key"
secret = "token-secret"

[defaults]
network_timeout = 5
"#,
    )
    .unwrap();

    let work_dir = TempDir::new().unwrap();
    let dest = work_dir.path().join("precious.txt");
    std::fs::write(&dest, "local edits").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_drb"))
        .args(["get", "/remote.txt"])
        .arg(&dest)
        .env("DRB_CONFIG_DIR", config_dir.path())
        .env("NO_COLOR", "1")
        .env("HTTPS_PROXY", "http://127.0.0.1:1")
        .env("https_proxy", "http://127.0.0.1:1")
        .env("ALL_PROXY", "http://127.0.0.1:1")
        .env_remove("NO_PROXY")
        .env_remove("no_proxy")
        .env_remove("DRB_ROOT")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute drb");

    assert!(!output.status.success());
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "local edits");
    assert_eq!(std::fs::read_dir(work_dir.path()).unwrap().count(), 1);
}
