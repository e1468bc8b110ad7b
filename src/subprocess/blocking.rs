//! Blocking backend: stdout and stderr share a single anonymous pipe that
//! is drained with a plain read loop before waiting on the child, the way
//! the streams would interleave on a terminal.

use async_trait::async_trait;
use std::io;
use std::process::Stdio;

use crate::output::OutputLogger;

use super::builder::ProcessCommand;
use super::error::ProcessError;
use super::pump::{self, StreamSource};
use super::runner::{map_spawn_error, parse_exit_status, ExitStatus, ProcessRunner};

pub struct BlockingProcessRunner;

#[async_trait]
impl ProcessRunner for BlockingProcessRunner {
    async fn launch(
        &self,
        command: ProcessCommand,
        console: &OutputLogger,
    ) -> Result<ExitStatus, ProcessError> {
        let console = console.clone();
        // The drain loop and the wait are synchronous; keep them off the
        // async executor. The caller still awaits the whole launch.
        tokio::task::spawn_blocking(move || launch_blocking(&command, &console))
            .await
            .map_err(|error| ProcessError::WaitFailed(io::Error::other(error)))?
    }
}

fn launch_blocking(
    command: &ProcessCommand,
    console: &OutputLogger,
) -> Result<ExitStatus, ProcessError> {
    let command_line = command.command_line();
    console.info(format!("Creating process: {command_line}"));
    tracing::debug!("launching subprocess (blocking): {command_line}");

    if command.timeout.is_some() {
        console.warn("timeout is not supported by the blocking backend and will be ignored");
    }

    let (reader, writer) = io::pipe().map_err(|error| pipe_error(error, console))?;
    let writer_clone = writer.try_clone().map_err(|error| pipe_error(error, console))?;

    let mut cmd = std::process::Command::new(&command.program);
    cmd.args(&command.args);
    for (key, value) in &command.env {
        cmd.env(key, value);
    }
    if let Some(dir) = &command.working_dir {
        cmd.current_dir(dir);
    }
    cmd.stdout(Stdio::from(writer));
    cmd.stderr(Stdio::from(writer_clone));

    let mut child = cmd.spawn().map_err(|error| {
        let error = map_spawn_error(error, command);
        console.error(error.to_string());
        error
    })?;

    // `cmd` still holds the parent's copies of the write end; they must be
    // closed now or the read side never observes end-of-stream after the
    // child exits.
    drop(cmd);

    pump::drain_blocking(reader, StreamSource::Combined, console);

    let status = child.wait().map_err(|error| {
        let error = ProcessError::WaitFailed(error);
        console.error(error.to_string());
        error
    })?;

    let exit = parse_exit_status(status);
    tracing::debug!("subprocess finished with {exit:?}: {command_line}");
    Ok(exit)
}

fn pipe_error(source: io::Error, console: &OutputLogger) -> ProcessError {
    let error = ProcessError::PipeCreationFailed {
        stream: StreamSource::Combined,
        source,
    };
    console.error(error.to_string());
    error
}
