use super::pump::StreamSource;

/// Failures surfaced by a launch.
///
/// `StreamReadFailed` is only ever rendered into the console log: a single
/// stream's read error stops capture for that stream but does not fail the
/// launch. Everything else aborts the call and is returned, never retried.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("failed to create {stream} pipe: {source}")]
    PipeCreationFailed {
        stream: StreamSource,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read child {stream}: {source}")]
    StreamReadFailed {
        stream: StreamSource,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to retrieve child exit status: {0}")]
    WaitFailed(#[source] std::io::Error),

    #[error("mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}
