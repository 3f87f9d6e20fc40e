//! Tests that run real child processes through [`SystemRunner`].

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{CommandRunner, CommandSpec, ExecErrorKind, NOT_RUN_EXIT_CODE, SystemRunner};

#[fixture]
fn runner() -> SystemRunner {
    SystemRunner::new()
}

#[rstest]
fn captures_stdout_and_stderr_together(runner: SystemRunner) {
    let spec = CommandSpec::new("sh").args(["-c", "echo scanned; echo warning >&2"]);
    let result = runner.run(&spec);

    assert!(result.success(), "{}", result.errors());
    assert_eq!(result.exit_code(), 0);
    assert!(result.output().contains("scanned"));
    assert!(result.output().contains("warning"));
}

#[rstest]
fn non_zero_exit_is_a_completed_failure(runner: SystemRunner) {
    let result = runner.run(&CommandSpec::new("sh").args(["-c", "echo bad flag >&2; exit 3"]));

    assert_eq!(result.failure_kind(), None);
    assert!(!result.success());
    assert_eq!(result.exit_code(), 3);
    assert_eq!(result.error_text(), Some("bad flag\n"));
}

#[rstest]
fn stdin_payload_reaches_the_child(runner: SystemRunner) {
    let spec = CommandSpec::new("cat").input("{\"model\":\"llama\"}");
    let result = runner.run(&spec);

    assert!(result.success());
    assert_eq!(result.output(), "{\"model\":\"llama\"}");
}

#[rstest]
fn child_without_stdin_payload_sees_end_of_file(runner: SystemRunner) {
    let result = runner.run(&CommandSpec::new("cat").timeout(Duration::from_secs(5)));

    assert!(result.success());
    assert_eq!(result.output(), "");
}

#[rstest]
fn slow_command_is_killed_at_deadline(runner: SystemRunner) {
    let started = Instant::now();
    let result = runner.run(
        &CommandSpec::new("sleep")
            .arg("30")
            .timeout(Duration::from_millis(200)),
    );

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.failure_kind(), Some(ExecErrorKind::TimedOut));
    assert_eq!(result.exit_code(), NOT_RUN_EXIT_CODE);
    assert_eq!(result.output(), "");
}

#[rstest]
fn timeout_also_kills_grandchildren(runner: SystemRunner) {
    let started = Instant::now();
    let result = runner.run(
        &CommandSpec::new("sh")
            .args(["-c", "sleep 30 & sleep 30"])
            .timeout(Duration::from_millis(200)),
    );

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.failure_kind(), Some(ExecErrorKind::TimedOut));
}

/// `true` while `pid` exists and is not a zombie.
fn is_running(pid: &str) -> bool {
    fs::read_to_string(format!("/proc/{pid}/stat")).is_ok_and(|stat| {
        stat.rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z")
    })
}

#[rstest]
fn background_members_do_not_outlive_a_completed_run(runner: SystemRunner) {
    let dir = TempDir::new().expect("temp dir");
    let pid_file = dir.path().join("sleeper.pid");
    let script = format!("sleep 30 & echo $! > '{}'; echo done", pid_file.display());

    let result = runner.run(
        &CommandSpec::new("sh")
            .args(["-c", script.as_str()])
            .timeout(Duration::from_secs(5)),
    );
    assert!(result.success(), "{}", result.errors());
    assert_eq!(result.output(), "done\n");

    let recorded = fs::read_to_string(&pid_file).expect("pid file");
    let pid = recorded.trim();
    let deadline = Instant::now() + Duration::from_secs(2);
    while is_running(pid) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(!is_running(pid), "background sleeper {pid} survived the run");
}

#[rstest]
fn missing_program_is_not_found_without_spawning(runner: SystemRunner) {
    let result = runner.run(&CommandSpec::new("kali-exec-no-such-program"));

    assert_eq!(result.failure_kind(), Some(ExecErrorKind::NotFound));
    assert_eq!(
        result.errors(),
        "Command not found: kali-exec-no-such-program"
    );
    assert!(!runner.is_available("kali-exec-no-such-program"));
}

#[rstest]
#[case::empty("")]
#[case::whitespace("   ")]
fn blank_program_is_an_empty_command(runner: SystemRunner, #[case] program: &str) {
    let result = runner.run(&CommandSpec::new(program));

    assert_eq!(result.failure_kind(), Some(ExecErrorKind::EmptyCommand));
    assert_eq!(result.errors(), "Empty command");
}

#[rstest]
fn non_executable_path_is_permission_denied(runner: SystemRunner) {
    let dir = TempDir::new().expect("temp dir");
    let script = dir.path().join("locked.sh");
    fs::write(&script, "#!/bin/sh\necho hi\n").expect("write script");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).expect("chmod");

    let program = script.to_str().expect("utf8 path");
    let result = runner.run(&CommandSpec::new(program));

    assert_eq!(result.failure_kind(), Some(ExecErrorKind::PermissionDenied));
}

#[rstest]
fn shell_metacharacters_stay_literal(runner: SystemRunner) {
    let result = runner.run(&CommandSpec::new("echo").arg("10.0.0.1; touch /tmp/pwned"));

    assert!(result.success());
    assert_eq!(result.output(), "10.0.0.1; touch /tmp/pwned\n");
}

#[rstest]
fn shell_is_reported_available(runner: SystemRunner) {
    assert!(runner.is_available("sh"));
}
