//! Unified subprocess layer: launch external tools with their output
//! redirected, drain it as it arrives, and feed every byte into the
//! bounded console store.

pub mod blocking;
pub mod builder;
pub mod error;
pub mod mock;
pub mod pump;
pub mod runner;


pub use blocking::BlockingProcessRunner;
pub use builder::{ProcessCommand, ProcessCommandBuilder};
pub use error::ProcessError;
pub use mock::{MockCommandConfig, MockProcessRunner};
pub use pump::StreamSource;
pub use runner::{ExitStatus, ProcessRunner, TokioProcessRunner};

use std::sync::Arc;

use crate::output::OutputLogger;

#[derive(Clone)]
pub struct SubprocessManager {
    runner: Arc<dyn ProcessRunner>,
}

impl SubprocessManager {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Proactor backend: separate stdout/stderr pipes drained
    /// asynchronously.
    pub fn production() -> Self {
        Self::new(Arc::new(TokioProcessRunner))
    }

    /// Blocking backend: one combined pipe drained on a blocking thread.
    pub fn blocking() -> Self {
        Self::new(Arc::new(BlockingProcessRunner))
    }

    #[cfg(test)]
    pub fn mock() -> (Self, MockProcessRunner) {
        let mock = MockProcessRunner::new();
        let runner = Arc::new(mock.clone()) as Arc<dyn ProcessRunner>;
        (Self::new(runner), mock)
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    pub async fn launch(
        &self,
        command: ProcessCommand,
        console: &OutputLogger,
    ) -> Result<ExitStatus, ProcessError> {
        self.runner.launch(command, console).await
    }
}
