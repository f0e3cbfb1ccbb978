//! CLI E2E tests for `ctxlog config show`.

use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;
use std::process::{Command, Output};

fn run_cli(args: &[&str], envs: &[(&str, &str)]) -> std::io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ctxlog"));
    command.args(args);
    for (key, _) in std::env::vars() {
        if key.starts_with("CTXLOG_") {
            command.env_remove(key);
        }
    }
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output()
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../crates/config/tests/fixtures")
        .join(name)
}

#[test]
fn defaults_use_error_level() -> Result<(), Box<dyn Error>> {
    let output = run_cli(&["config", "show"], &[])?;
    assert!(output.status.success());

    let config: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(config.get("level"), Some(&Value::from("error")));
    assert_eq!(config.get("devMode"), Some(&Value::from(false)));
    assert_eq!(config.get("output"), Some(&Value::from("stdout")));
    Ok(())
}

#[test]
fn env_overrides_file_values() -> Result<(), Box<dyn Error>> {
    let path = fixture("logger.valid.toml");
    let path = path.to_string_lossy();
    let output = run_cli(
        &["config", "show", "--config", &path],
        &[("CTXLOG_LEVEL", "warn"), ("CTXLOG_FIELD_NAMES_MESSAGE", "message")],
    )?;
    assert!(output.status.success());

    let config: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(config.get("level"), Some(&Value::from("warn")));
    assert_eq!(config.get("stripTime"), Some(&Value::from(true)));
    assert_eq!(
        config.pointer("/fieldNames/message"),
        Some(&Value::from("message"))
    );
    Ok(())
}

#[test]
fn toml_format_is_supported() -> Result<(), Box<dyn Error>> {
    let output = run_cli(
        &["config", "show", "--format", "toml"],
        &[("CTXLOG_DEV_MODE", "true")],
    )?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("level = \"error\""), "{stdout}");
    assert!(stdout.contains("devMode = true"), "{stdout}");
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() -> Result<(), Box<dyn Error>> {
    let path = fixture("logger.unknown-field.json");
    let path = path.to_string_lossy();
    let output = run_cli(&["config", "show", "--config", &path], &[])?;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config:invalid_json"), "{stderr}");
    Ok(())
}

#[test]
fn missing_config_file_is_reported() -> Result<(), Box<dyn Error>> {
    let output = run_cli(
        &["config", "show", "--config", "does/not/exist.toml"],
        &[],
    )?;
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    Ok(())
}
