//! End-to-end launch tests: spawn real processes and assert on the
//! captured console contents. Shell tools keep these unix-only.
#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use caplog::output::{OutputLogger, SharedOutputBuffer};
use caplog::subprocess::{ExitStatus, ProcessCommandBuilder, SubprocessManager};

fn console() -> (SharedOutputBuffer, OutputLogger) {
    let buffer = SharedOutputBuffer::with_capacity(64 * 1024);
    let logger = OutputLogger::new(Arc::new(buffer.clone()));
    (buffer, logger)
}

#[tokio::test]
async fn successful_launch_captures_trailing_stdout() {
    let (buffer, console) = console();
    let manager = SubprocessManager::production();
    let command = ProcessCommandBuilder::new("echo").arg("hello").build();

    let status = manager.launch(command, &console).await.unwrap();
    assert!(status.success());
    let contents = buffer.contents_string();
    assert!(contents.ends_with("hello\n"), "console: {contents:?}");
}

#[tokio::test]
async fn failing_launch_reports_failure_regardless_of_output() {
    let (buffer, console) = console();
    let manager = SubprocessManager::production();
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "echo wrote something; exit 3"])
        .build();

    let status = manager.launch(command, &console).await.unwrap();
    assert_eq!(status, ExitStatus::Error(3));
    assert!(buffer.contents_string().contains("wrote something\n"));
}

#[tokio::test]
async fn stderr_is_captured_too() {
    let (buffer, console) = console();
    let manager = SubprocessManager::production();
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "echo oops >&2"])
        .build();

    let status = manager.launch(command, &console).await.unwrap();
    assert!(status.success());
    assert!(buffer.contents_string().contains("oops\n"));
}

#[tokio::test]
async fn progress_bar_output_is_rewritten_in_place() {
    let (buffer, console) = console();
    let manager = SubprocessManager::production();
    // A child emitting terminal-style progress: two partial lines erased by
    // bare carriage returns, then the final line.
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", r"printf '50%%\r75%%\r100%%\ndone\n'"])
        .build();

    let status = manager.launch(command, &console).await.unwrap();
    assert!(status.success());
    let contents = buffer.contents_string();
    assert!(contents.ends_with("100%\ndone\n"), "console: {contents:?}");
    assert!(!contents.contains('\r'), "console: {contents:?}");
}

#[tokio::test]
async fn log_messages_and_capture_interleave_chronologically() {
    let (buffer, console) = console();
    console.info("starting tool");
    let manager = SubprocessManager::production();
    let command = ProcessCommandBuilder::new("echo").arg("payload").build();
    manager.launch(command, &console).await.unwrap();
    console.info("tool finished");

    let contents = buffer.contents_string();
    let starting = contents.find("starting tool\n").unwrap();
    let creating = contents.find("Creating process: echo payload\n").unwrap();
    let payload = contents.rfind("payload\n").unwrap();
    let finished = contents.find("tool finished\n").unwrap();
    assert!(starting < creating && creating < payload && payload < finished);
}

#[tokio::test]
async fn working_directory_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), b"x").unwrap();

    let (buffer, console) = console();
    let manager = SubprocessManager::production();
    let command = ProcessCommandBuilder::new("ls")
        .current_dir(dir.path())
        .build();

    let status = manager.launch(command, &console).await.unwrap();
    assert!(status.success());
    assert!(buffer.contents_string().contains("marker.txt"));
}

#[tokio::test]
async fn extra_environment_is_passed_to_the_child() {
    let (buffer, console) = console();
    let manager = SubprocessManager::production();
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "echo value=$CAPLOG_TEST_VAR"])
        .env("CAPLOG_TEST_VAR", "present")
        .build();

    let status = manager.launch(command, &console).await.unwrap();
    assert!(status.success());
    assert!(buffer.contents_string().contains("value=present\n"));
}

#[tokio::test]
async fn death_by_signal_is_reported_as_such() {
    let (_, console) = console();
    let manager = SubprocessManager::production();
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "kill -TERM $$"])
        .build();

    let status = manager.launch(command, &console).await.unwrap();
    assert_eq!(status, ExitStatus::Signal(15));
}

#[tokio::test]
async fn timeout_kills_a_stuck_child() {
    let (buffer, console) = console();
    let manager = SubprocessManager::production();
    let command = ProcessCommandBuilder::new("sleep")
        .arg("5")
        .timeout(Duration::from_millis(100))
        .build();

    let status = manager.launch(command, &console).await.unwrap();
    assert_eq!(status, ExitStatus::Timeout);
    assert!(buffer.contents_string().contains("timed out"));
}

#[tokio::test]
async fn blocking_backend_captures_the_combined_stream() {
    let (buffer, console) = console();
    let manager = SubprocessManager::blocking();
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "echo first; echo second >&2; echo third"])
        .build();

    let status = manager.launch(command, &console).await.unwrap();
    assert!(status.success());
    let contents = buffer.contents_string();
    for line in ["first\n", "second\n", "third\n"] {
        assert!(contents.contains(line), "missing {line:?} in {contents:?}");
    }
}

#[tokio::test]
async fn blocking_backend_reports_failure_exit() {
    let (_, console) = console();
    let manager = SubprocessManager::blocking();
    let command = ProcessCommandBuilder::new("false").build();

    let status = manager.launch(command, &console).await.unwrap();
    assert_eq!(status, ExitStatus::Error(1));
}

#[tokio::test]
async fn large_output_is_bounded_by_the_store() {
    // 1 KiB store, ~100 KiB of output: the store must never exceed its
    // capacity and must retain the newest lines.
    let buffer = SharedOutputBuffer::with_capacity(1024);
    let console = OutputLogger::new(Arc::new(buffer.clone()));
    let manager = SubprocessManager::production();
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "i=0; while [ $i -lt 5000 ]; do echo line $i; i=$((i+1)); done"])
        .build();

    let status = manager.launch(command, &console).await.unwrap();
    assert!(status.success());
    let guard = buffer.lock();
    assert!(guard.len() <= guard.capacity());
    drop(guard);
    assert!(buffer.contents_string().ends_with("line 4999\n"));
}
