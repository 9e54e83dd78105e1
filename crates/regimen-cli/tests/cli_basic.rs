//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with a temporary settings file and verify
//! outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_regimen-cli"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn write_settings(dir: &Path, body: &str) -> String {
    let path = dir.join("settings.toml");
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_plan_json_has_every_day() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path(), "wake_time = \"07:00\"\n");

    let (stdout, stderr, code) = run_cli(&[
        "plan", "--settings", &settings, "--start", "2024-03-04", "--weeks", "2", "--json",
    ]);
    assert_eq!(code, 0, "plan failed: {stderr}");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let schedule = parsed["schedule"].as_object().unwrap();
    assert_eq!(schedule.len(), 14);
    assert!(schedule.contains_key("2024-03-04"));
    assert!(parsed["warnings"].is_array());
    assert_eq!(schedule["2024-03-04"][0]["kind"], "item");
}

#[test]
fn test_plan_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(
        dir.path(),
        "[[routines]]\nname = \"Walk\"\ntime = \"12:45\"\n",
    );

    let (stdout, _, code) = run_cli(&["plan", "--settings", &settings, "--start", "2024-03-04"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("2024-03-04"));
    assert!(stdout.contains("12:45  Walk  (routine)"));
    assert!(stdout.contains("Electrolytes"));
}

#[test]
fn test_plan_rejects_bad_settings() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path(), "bed_time = \"whenever\"\n");

    let (_, stderr, code) = run_cli(&["plan", "--settings", &settings, "--start", "2024-03-04"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("bed_time"));
}

#[test]
fn test_settings_init_then_check() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.toml");
    let path = path.to_string_lossy().to_string();

    let (stdout, _, code) = run_cli(&["settings", "init", "--settings", &path]);
    assert_eq!(code, 0);
    assert!(stdout.contains("wrote"));

    let (_, _, code) = run_cli(&["settings", "init", "--settings", &path]);
    assert_eq!(code, 1, "init should refuse to overwrite");

    let (stdout, _, code) = run_cli(&["settings", "check", "--settings", &path]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("ok"));

    let (stdout, _, code) = run_cli(&["settings", "show", "--settings", &path, "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["wake_time"], "07:00");
}

#[test]
fn test_catalog_list_json() {
    let (stdout, _, code) = run_cli(&["catalog", "list", "--json"]);
    assert_eq!(code, 0);
    let items: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(items.len(), 13);
    assert_eq!(items[0]["key"], "electrolytes");
}
