// tests/cli_binary.rs

//! End-to-end behaviour of the `pcfdev` binary.

#![cfg(unix)]

mod common;
use crate::common::TestScript;

use std::error::Error;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

type TestResult = Result<(), Box<dyn Error>>;

const HOSTNAME: &str = "local.pcfdev.io";

/// `pcfdev` with a clean configuration environment, pointed at `script`.
///
/// It gets a process group of its own, so it never owns the foreground of
/// the terminal `cargo test` may have been started from.
fn pcfdev(script: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pcfdev"));
    cmd.env_remove("PCFDEV_CONFIG")
        .env_remove("PCFDEV_TIMEOUT_SECS")
        .env("PCFDEV_PROVISION_SCRIPT", script)
        .env("PCFDEV_LOG", "error")
        .process_group(0);
    cmd
}

fn wait_within(child: &mut Child, limit: Duration) -> Result<ExitStatus, Box<dyn Error>> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() > limit {
            let _ = child.kill();
            return Err(format!("pcfdev still running after {limit:?}").into());
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Deliver SIGINT to `pid`, as a Ctrl-C in the terminal would.
fn interrupt(pid: u32) -> TestResult {
    let status = Command::new("kill").arg("-INT").arg(pid.to_string()).status()?;
    assert!(status.success(), "kill -INT {pid} failed");
    Ok(())
}

/// Start `pcfdev` and wait until the script has printed its first line.
fn spawn_until_ready(script: &Path) -> Result<Child, Box<dyn Error>> {
    let mut child = pcfdev(script)
        .arg(HOSTNAME)
        .stdout(Stdio::piped())
        .spawn()?;
    let stdout = child.stdout.take().ok_or("stdout not piped")?;

    let mut line = String::new();
    BufReader::new(stdout).read_line(&mut line)?;
    assert_eq!(line, "ready\n");

    // Let the tool finish installing its Ctrl-C handler.
    std::thread::sleep(Duration::from_millis(300));
    Ok(child)
}

#[test]
fn provisions_and_shows_script_output() -> TestResult {
    let script = TestScript::new("echo 'Waiting for services to start...'\necho $@")?;

    let output = pcfdev(script.path()).arg(HOSTNAME).output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Waiting for services to start..."), "{stdout}");
    assert!(stdout.contains(HOSTNAME), "{stdout}");
    assert!(!stdout.contains("Timed out"), "{stdout}");
    Ok(())
}

#[test]
fn exits_with_the_scripts_exit_status() -> TestResult {
    let script = TestScript::new("exit 42")?;

    let output = pcfdev(script.path()).arg(HOSTNAME).output()?;

    assert_eq!(output.status.code(), Some(42));
    assert!(!String::from_utf8(output.stdout)?.contains("Timed out"));
    Ok(())
}

#[test]
fn times_out_with_status_one_and_a_message() -> TestResult {
    let script = TestScript::new("sleep 20")?;

    let started = Instant::now();
    let output = pcfdev(script.path())
        .env("PCFDEV_TIMEOUT_SECS", "2")
        .arg(HOSTNAME)
        .output()?;
    let elapsed = started.elapsed();
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Timed out after 2 seconds."), "{stdout}");
    assert!(elapsed < Duration::from_millis(3500), "took {elapsed:?}");
    Ok(())
}

#[test]
fn timeout_at_default_log_level_prints_only_the_message() -> TestResult {
    let script = TestScript::new("echo before-deadline\nsleep 20")?;

    let output = pcfdev(script.path())
        .env_remove("PCFDEV_LOG")
        .env("PCFDEV_TIMEOUT_SECS", "1")
        .arg(HOSTNAME)
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout, "before-deadline\nTimed out after 1 seconds.\n");
    assert_eq!(stderr, "", "unexpected diagnostics on stderr");
    Ok(())
}

#[test]
fn script_output_precedes_the_timeout_message() -> TestResult {
    let script = TestScript::new("echo before-deadline\nsleep 20")?;

    let output = pcfdev(script.path())
        .env("PCFDEV_TIMEOUT_SECS", "1")
        .arg(HOSTNAME)
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "before-deadline\nTimed out after 1 seconds.\n");
    Ok(())
}

#[test]
fn output_is_visible_while_the_script_runs() -> TestResult {
    let script = TestScript::new("echo 'Waiting for services to start...'\nsleep 3")?;

    let mut child = pcfdev(script.path())
        .arg(HOSTNAME)
        .stdout(Stdio::piped())
        .spawn()?;
    let stdout = child.stdout.take().ok_or("stdout not piped")?;

    let mut line = String::new();
    BufReader::new(stdout).read_line(&mut line)?;

    assert_eq!(line, "Waiting for services to start...\n");
    assert!(child.try_wait()?.is_none(), "pcfdev exited before output was seen");

    let status = child.wait()?;
    assert_eq!(status.code(), Some(0));
    Ok(())
}

#[test]
fn missing_script_is_reported_with_reserved_code() -> TestResult {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("provision-script");

    let output = pcfdev(&missing).arg(HOSTNAME).output()?;
    let stderr = String::from_utf8(output.stderr)?;

    assert_eq!(output.status.code(), Some(127));
    assert!(stderr.contains("cannot start provisioning script"), "{stderr}");
    assert!(!String::from_utf8(output.stdout)?.contains("Timed out"));
    Ok(())
}

#[test]
fn invalid_hostname_is_a_usage_error() -> TestResult {
    let script = TestScript::new("exit 0")?;

    let output = pcfdev(script.path()).arg("not a hostname").output()?;

    assert_eq!(output.status.code(), Some(2));
    Ok(())
}

#[test]
fn malformed_timeout_override_fails_the_tool() -> TestResult {
    let script = TestScript::new("exit 0")?;

    let output = pcfdev(script.path())
        .env("PCFDEV_TIMEOUT_SECS", "two")
        .arg(HOSTNAME)
        .output()?;

    assert_eq!(output.status.code(), Some(125));
    assert!(String::from_utf8(output.stderr)?.contains("PCFDEV_TIMEOUT_SECS"));
    Ok(())
}

#[test]
fn config_file_supplies_script_and_timeout() -> TestResult {
    let script = TestScript::new("sleep 20")?;
    let mut config = tempfile::NamedTempFile::new()?;
    writeln!(config, "provision_script = {:?}", script.path().display().to_string())?;
    writeln!(config, "timeout_secs = 1")?;

    let output = Command::new(env!("CARGO_BIN_EXE_pcfdev"))
        .env_remove("PCFDEV_CONFIG")
        .env_remove("PCFDEV_PROVISION_SCRIPT")
        .env_remove("PCFDEV_TIMEOUT_SECS")
        .env("PCFDEV_LOG", "error")
        .arg("--config")
        .arg(config.path())
        .arg(HOSTNAME)
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stdout)?.contains("Timed out after 1 seconds."));
    Ok(())
}

#[test]
fn ctrl_c_reaches_the_script_and_its_status_is_reported() -> TestResult {
    let script = TestScript::new("trap 'exit 130' INT\necho ready\nsleep 10 &\nwait")?;

    let mut child = spawn_until_ready(script.path())?;
    interrupt(child.id())?;

    let status = wait_within(&mut child, Duration::from_secs(5))?;
    assert_eq!(status.code(), Some(130));
    Ok(())
}

#[test]
fn second_ctrl_c_kills_a_script_that_ignores_interrupts() -> TestResult {
    let script = TestScript::new("trap '' INT\necho ready\nsleep 30")?;

    let started = Instant::now();
    let mut child = spawn_until_ready(script.path())?;

    interrupt(child.id())?;
    std::thread::sleep(Duration::from_millis(300));
    assert!(child.try_wait()?.is_none(), "one Ctrl-C stopped a script ignoring SIGINT");

    interrupt(child.id())?;
    let status = wait_within(&mut child, Duration::from_secs(5))?;

    // 128 + SIGKILL
    assert_eq!(status.code(), Some(137));
    assert!(started.elapsed() < Duration::from_secs(10));
    Ok(())
}
