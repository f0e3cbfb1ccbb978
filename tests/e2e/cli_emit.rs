//! CLI E2E tests for `ctxlog emit`.

use std::io;
use std::path::PathBuf;
use std::process::{Command, Output};

fn run_cli(args: &[&str], envs: &[(&str, &str)]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ctxlog"));
    command.args(args);
    scrub_scoped_env(&mut command);
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output()
}

fn scrub_scoped_env(command: &mut Command) {
    for (key, _) in std::env::vars() {
        if key.starts_with("CTXLOG_") {
            command.env_remove(key);
        }
    }
}

fn stdout_of(output: &Output) -> io::Result<String> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(io::Error::other(format!("ctxlog failed: {stderr}")));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../crates/config/tests/fixtures")
        .join(name)
}

#[test]
fn emit_writes_args_then_context_fields() -> io::Result<()> {
    let output = run_cli(
        &[
            "emit",
            "info",
            "hello",
            "--threshold",
            "info",
            "--field",
            "foo=1",
            "--context-field",
            "bar=2",
            "--field",
            "name=api",
        ],
        &[("CTXLOG_STRIP_TIME", "true")],
    )?;

    assert_eq!(
        stdout_of(&output)?,
        "{\"level\":\"info\",\"time\":\"<stripped>\",\"msg\":\"hello\",\"foo\":1,\"name\":\"api\",\"bar\":2}\n"
    );
    Ok(())
}

#[test]
fn loader_default_threshold_hides_info() -> io::Result<()> {
    let output = run_cli(&["emit", "info", "hidden"], &[])?;
    assert_eq!(stdout_of(&output)?, "");
    Ok(())
}

#[test]
fn important_and_force_debug_bypass_the_threshold() -> io::Result<()> {
    let envs = [("CTXLOG_STRIP_TIME", "true"), ("CTXLOG_LEVEL", "error")];

    let important = run_cli(&["emit", "important", "wiped"], &envs)?;
    assert_eq!(
        stdout_of(&important)?,
        "{\"level\":\"info\",\"time\":\"<stripped>\",\"msg\":\"wiped\"}\n"
    );

    let forced = run_cli(&["emit", "debug", "trace", "--force-debug"], &envs)?;
    assert_eq!(
        stdout_of(&forced)?,
        "{\"level\":\"debug\",\"time\":\"<stripped>\",\"msg\":\"trace\"}\n"
    );
    Ok(())
}

#[test]
fn threshold_flag_overrides_env() -> io::Result<()> {
    let output = run_cli(
        &["emit", "warn", "shown", "--threshold", "warn"],
        &[("CTXLOG_LEVEL", "error")],
    )?;
    assert!(stdout_of(&output)?.contains("\"msg\":\"shown\""));
    Ok(())
}

#[test]
fn config_file_sets_level_and_field_names() -> io::Result<()> {
    let path = fixture("logger.valid.toml");
    let path = path.to_string_lossy();
    let output = run_cli(&["emit", "debug", "hello", "--config", &path], &[])?;

    assert_eq!(
        stdout_of(&output)?,
        "{\"level\":\"debug\",\"time\":\"<stripped>\",\"m\":\"hello\"}\n"
    );
    Ok(())
}

#[test]
fn dev_mode_writes_console_lines_with_caller() -> io::Result<()> {
    let output = run_cli(
        &["emit", "warn", "slow", "--dev", "--threshold", "warn", "--field", "ms=1200"],
        &[("CTXLOG_STRIP_TIME", "true")],
    )?;
    let stdout = stdout_of(&output)?;

    assert!(stdout.starts_with("<stripped>\tWARN\tcommands/emit.rs:"), "{stdout}");
    assert!(stdout.ends_with("\tslow\t{\"ms\": 1200}\n"), "{stdout}");
    Ok(())
}

#[test]
fn stderr_output_target_keeps_stdout_empty() -> io::Result<()> {
    let output = run_cli(
        &["emit", "error", "boom"],
        &[("CTXLOG_OUTPUT", "stderr"), ("CTXLOG_STRIP_TIME", "true")],
    )?;

    assert_eq!(stdout_of(&output)?, "");
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "{\"level\":\"error\",\"time\":\"<stripped>\",\"msg\":\"boom\"}\n"
    );
    Ok(())
}

#[test]
fn invalid_env_exits_with_invalid_input() -> io::Result<()> {
    let output = run_cli(&["emit", "info", "m"], &[("CTXLOG_DEV_MODE", "maybe")])?;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config:invalid_env_bool"), "{stderr}");
    Ok(())
}

#[test]
fn diagnostics_go_to_stderr_only() -> io::Result<()> {
    let output = run_cli(
        &["emit", "error", "boom"],
        &[("CTXLOG_DIAGNOSTICS", "debug"), ("CTXLOG_STRIP_TIME", "true")],
    )?;

    assert_eq!(
        stdout_of(&output)?,
        "{\"level\":\"error\",\"time\":\"<stripped>\",\"msg\":\"boom\"}\n"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("building logger"), "{stderr}");
    Ok(())
}
