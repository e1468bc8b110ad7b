//! Leveled log formatting into the shared capture sink.
//!
//! Each emitted line lands in the bounded store, interleaved with captured
//! process output, and is mirrored to the terminal through `tracing`.

use std::sync::Arc;

use super::OutputSink;

/// Severity threshold for formatted messages. `Error` is the least verbose
/// setting, `Trace` the most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Formats leveled messages into the capture sink.
///
/// `raw` is the unleveled passthrough the stream pumps use for captured
/// child output: always forwarded, never filtered or reformatted.
#[derive(Clone)]
pub struct OutputLogger {
    sink: Arc<dyn OutputSink>,
    level: LogLevel,
}

impl OutputLogger {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            sink,
            level: LogLevel::Info,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Forward captured bytes to the sink unchanged.
    pub fn raw(&self, bytes: &[u8]) {
        self.sink.append(bytes);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message.as_ref());
    }

    pub fn trace(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Trace, message.as_ref());
    }

    fn log(&self, level: LogLevel, message: &str) {
        if level > self.level {
            return;
        }

        match level {
            LogLevel::Error => tracing::error!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Trace => tracing::trace!("{message}"),
        }

        let prefix = match level {
            LogLevel::Error => "ERROR: ",
            LogLevel::Warn => "WARN: ",
            _ => "",
        };
        let mut line = String::with_capacity(prefix.len() + message.len() + 1);
        line.push_str(prefix);
        line.push_str(message);
        if !line.ends_with('\n') {
            line.push('\n');
        }
        self.sink.append(line.as_bytes());
    }
}
