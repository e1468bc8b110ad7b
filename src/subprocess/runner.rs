use async_trait::async_trait;
use std::process::Stdio;

use crate::output::OutputLogger;

use super::builder::ProcessCommand;
use super::error::ProcessError;
use super::pump::{self, StreamSource};

/// Terminal state of one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
    Timeout,
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            _ => None,
        }
    }
}

/// One capability, two backends: launch a command with stdout/stderr
/// redirected, feed everything it writes into the console as it arrives,
/// and return its exit status once the output is fully drained.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// The awaiting task is dedicated to the launch until the child's
    /// output is drained and its exit status is known. Captured bytes and
    /// launch diagnostics land in `console`, interleaved chronologically.
    async fn launch(
        &self,
        command: ProcessCommand,
        console: &OutputLogger,
    ) -> Result<ExitStatus, ProcessError>;
}

/// Proactor backend: separate stdout/stderr pipes, each drained by an
/// async read loop; the runtime's reactor supplies the platform completion
/// mechanism.
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    fn configure_command(command: &ProcessCommand) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args);
        for (key, value) in &command.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }
        // stdin is inherited unchanged; only the output streams are
        // redirected.
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    fn take_pipe<T>(
        pipe: Option<T>,
        stream: StreamSource,
        console: &OutputLogger,
    ) -> Result<T, ProcessError> {
        match pipe {
            Some(pipe) => Ok(pipe),
            None => {
                let error = ProcessError::PipeCreationFailed {
                    stream,
                    source: std::io::Error::other("pipe was not captured"),
                };
                console.error(error.to_string());
                Err(error)
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn launch(
        &self,
        command: ProcessCommand,
        console: &OutputLogger,
    ) -> Result<ExitStatus, ProcessError> {
        let command_line = command.command_line();
        console.info(format!("Creating process: {command_line}"));
        tracing::debug!("launching subprocess: {command_line}");

        let mut cmd = Self::configure_command(&command);
        let mut child = cmd.spawn().map_err(|error| {
            let error = map_spawn_error(error, &command);
            console.error(error.to_string());
            error
        })?;
        // The parent's copies of the pipe write ends were closed during
        // spawn, so each read end observes end-of-stream once the child
        // exits and the pipe is empty.

        let stdout = Self::take_pipe(child.stdout.take(), StreamSource::Stdout, console)?;
        let stderr = Self::take_pipe(child.stderr.take(), StreamSource::Stderr, console)?;

        let drain_and_wait = async {
            // Drain to completion before waiting: the pipes hold only a few
            // tens of KiB and the child stalls once they fill.
            let (stdout_bytes, stderr_bytes) = tokio::join!(
                pump::drain_async(stdout, StreamSource::Stdout, console),
                pump::drain_async(stderr, StreamSource::Stderr, console),
            );
            tracing::trace!("captured {stdout_bytes} stdout and {stderr_bytes} stderr bytes");
            child.wait().await
        };

        let wait_result = match command.timeout {
            Some(limit) => {
                let timed = tokio::time::timeout(limit, drain_and_wait).await;
                match timed {
                    Ok(wait_result) => wait_result,
                    Err(_) => {
                        console.error(format!(
                            "process timed out after {limit:?}, killing: {command_line}"
                        ));
                        if let Err(error) = child.kill().await {
                            tracing::warn!("failed to kill timed out child: {error}");
                        }
                        let _ = child.wait().await;
                        return Ok(ExitStatus::Timeout);
                    }
                }
            }
            None => drain_and_wait.await,
        };

        let status = wait_result.map_err(|error| {
            let error = ProcessError::WaitFailed(error);
            console.error(error.to_string());
            error
        })?;

        let exit = parse_exit_status(status);
        tracing::debug!("subprocess finished with {exit:?}: {command_line}");
        Ok(exit)
    }
}

pub(crate) fn map_spawn_error(error: std::io::Error, command: &ProcessCommand) -> ProcessError {
    if error.kind() == std::io::ErrorKind::NotFound {
        ProcessError::CommandNotFound(command.program.clone())
    } else {
        ProcessError::SpawnFailed {
            command: command.command_line(),
            source: error,
        }
    }
}

pub(crate) fn parse_exit_status(status: std::process::ExitStatus) -> ExitStatus {
    if status.success() {
        ExitStatus::Success
    } else if let Some(code) = status.code() {
        ExitStatus::Error(code)
    } else {
        parse_signal_status(status)
    }
}

#[cfg(unix)]
fn parse_signal_status(status: std::process::ExitStatus) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = status.signal() {
        ExitStatus::Signal(signal)
    } else {
        ExitStatus::Error(1)
    }
}

#[cfg(not(unix))]
fn parse_signal_status(_status: std::process::ExitStatus) -> ExitStatus {
    ExitStatus::Error(1)
}
