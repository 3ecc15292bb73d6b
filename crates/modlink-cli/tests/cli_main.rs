//! CLI tests for the modlink command-line interface.

use assert_cmd::Command;
use modlink_core::platform;
use predicates::prelude::*;

fn modlink() -> Command {
    let mut cmd = Command::cargo_bin("modlink").unwrap();
    cmd.env_remove("MODLINK_CONFIG")
        .env_remove("MODLINK_LIBRARY_PATH")
        .env_remove("MODLINK_LOG_JSON")
        .env_remove("RUST_LOG");
    cmd
}

/// Test that the CLI binary exists and shows help.
#[test]
fn test_cli_help() {
    modlink()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("probe"))
        .stdout(predicate::str::contains("candidates"))
        .stdout(predicate::str::contains("map-name"));
}

#[test]
fn test_cli_version() {
    modlink()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("modlink"));
}

#[test]
fn test_no_subcommand_shows_error() {
    modlink().assert().failure();
}

#[test]
fn test_map_name() {
    modlink()
        .args(["map-name", "m"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            platform::map_library_name("m")
        )));
}

#[test]
fn test_probe_math_library() {
    modlink()
        .args(["probe", platform::math_library(), "cos", "definitely_not_a_symbol_xyz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded"))
        .stdout(predicate::str::contains("cos  0x"))
        .stdout(predicate::str::contains("definitely_not_a_symbol_xyz  <not found>"));
}

#[test]
fn test_probe_json_report() {
    let output = modlink()
        .args(["probe", "--json", platform::math_library(), "cos", "missing_xyz"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["library"], platform::math_library());
    assert!(report["symbols"][0]["address"].is_string());
    assert!(report["symbols"][1]["address"].is_null());
}

#[test]
fn test_probe_missing_library_fails() {
    modlink()
        .args(["probe", "does-not-exist-xyz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist-xyz"));
}

#[test]
fn test_candidates_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("modlink.toml");
    std::fs::write(&config, "[aliases]\ngl = [\"libGL.so.1\", \"/abs/libGL.so\"]\n").unwrap();

    modlink()
        .arg("--config")
        .arg(&config)
        .args(["candidates", "gl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("libGL.so.1"))
        .stdout(predicate::str::contains("/abs/libGL.so"));
}

#[test]
fn test_probe_with_resolver() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("modlink.toml");
    std::fs::write(
        &config,
        format!(
            "[aliases]\nmath = [\"does-not-exist-xyz\", \"{}\"]\n",
            platform::math_library()
        ),
    )
    .unwrap();

    modlink()
        .arg("--config")
        .arg(&config)
        .args(["probe", "--resolve", "math", "cos"])
        .assert()
        .success()
        .stdout(predicate::str::contains(platform::math_library()));
}

#[test]
fn test_malformed_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("modlink.toml");
    std::fs::write(&config, "search_paths = 1\n").unwrap();

    modlink()
        .arg("--config")
        .arg(&config)
        .args(["candidates", "m"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn test_verbose_json_logging() {
    let output = modlink()
        .env("MODLINK_LOG_JSON", "true")
        .args(["probe", "--verbose", platform::math_library(), "cos"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    let records: Vec<serde_json::Value> = stderr
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert!(!records.is_empty());
    assert!(records.iter().any(|record| {
        record["level"] == "DEBUG"
            && record["fields"]["message"]
                .as_str()
                .map(|msg| msg.contains("Loaded native library"))
                .unwrap_or(false)
    }));
}

#[test]
fn test_probe_rejects_malformed_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("modlink.toml");
    std::fs::write(&config, "search_paths = 1\n").unwrap();

    modlink()
        .arg("--config")
        .arg(&config)
        .args(["probe", platform::math_library(), "cos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_candidates_uses_user_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("modlink");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("modlink.toml"),
        "[aliases]\nfoo = [\"libfoo-from-user-config.so.1\"]\n",
    )
    .unwrap();

    modlink()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["candidates", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::diff("libfoo-from-user-config.so.1\n"));
}
