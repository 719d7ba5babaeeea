use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;

/// Helper to get a temporary home directory
fn temp_home() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Helper to get config file path in the temp home
fn config_file_path(home: &tempfile::TempDir) -> PathBuf {
    home.path().join(".dualfarm").join("config.json")
}

const BINARY_NAME: &str = "dualfarm";

/// The binary with `$HOME` redirected and no inherited rig selection.
fn dualfarm(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.env("HOME", home.path())
        .env_remove("DUALFARM_ENVIRONMENT");
    cmd
}

#[test]
/// Help command should display usage information.
fn cli_help_displays_usage() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("Monitor and control a DualFarm rig"))
        .stdout(contains("reset-config"));
}

#[test]
fn configure_writes_config_file() {
    let home = temp_home();
    let config_path = config_file_path(&home);
    assert!(!config_path.exists());

    dualfarm(&home)
        .args([
            "--api-url",
            "http://rig.local:8000/",
            "--user",
            "alice",
            "configure",
            "--poll-interval-ms",
            "5000",
        ])
        .assert()
        .success()
        .stdout(contains("Config saved"));

    let saved = fs::read_to_string(&config_path).unwrap();
    assert!(saved.contains("\"api_url\": \"http://rig.local:8000\""));
    assert!(saved.contains("\"user\": \"alice\""));
    assert!(saved.contains("\"poll_interval_ms\": 5000"));
}

#[test]
fn configure_rejects_invalid_api_url() {
    let home = temp_home();
    dualfarm(&home)
        .args(["--api-url", "ftp://rig.local", "configure"])
        .assert()
        .failure()
        .stderr(contains("Invalid API URL"));
    assert!(!config_file_path(&home).exists());
}

#[test]
/// reset-config should delete an existing config file.
fn reset_config_deletes_config_file() {
    let home = temp_home();
    let config_path = config_file_path(&home);
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(&config_path, "{}").unwrap();

    dualfarm(&home)
        .arg("reset-config")
        .assert()
        .success()
        .stdout(contains("Config cleared"));
    assert!(!config_path.exists());

    // A second reset has nothing to delete and still succeeds.
    dualfarm(&home).arg("reset-config").assert().success();
}

#[test]
fn dose_outside_range_is_rejected_without_contacting_the_rig() {
    let home = temp_home();
    dualfarm(&home)
        .args(["--api-url", "http://127.0.0.1:9", "dose", "2000", "--yes"])
        .assert()
        .failure()
        .stderr(contains("Dose must be between 10ml and 1000ml"));
}

#[test]
fn dose_off_step_is_rejected() {
    let home = temp_home();
    dualfarm(&home)
        .args(["--api-url", "http://127.0.0.1:9", "dose", "55", "--yes"])
        .assert()
        .failure()
        .stderr(contains("multiple of 10ml"));
}

#[test]
fn declining_the_prompt_sends_nothing() {
    let home = temp_home();
    dualfarm(&home)
        .args(["--api-url", "http://127.0.0.1:9", "pump", "on"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Turn pump ON? [y/N]"))
        .stdout(contains("Cancelled"));
}

#[test]
fn invalid_arguments_are_rejected_by_the_parser() {
    let home = temp_home();
    dualfarm(&home).args(["pump", "sideways"]).assert().failure();
    dualfarm(&home)
        .args(["history", "--range", "2d"])
        .assert()
        .failure();
}

#[test]
fn corrupt_config_is_reported() {
    let home = temp_home();
    let config_path = config_file_path(&home);
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(&config_path, "not json").unwrap();

    dualfarm(&home)
        .arg("status")
        .assert()
        .failure()
        .stderr(contains("Failed to load"));
}
