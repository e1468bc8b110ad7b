//! Stream pumps: drain a child's redirected output into the capture sink.
//!
//! Both variants honor the same contract: forward every byte a stream
//! produces, in delivery order, until its write end closes. The async
//! variant services each read completion and immediately re-arms the next
//! read; the blocking variant loops on the launching thread. A read error
//! other than clean end-of-stream stops that one stream only and is
//! reported through the console, not as a launch failure.

use std::fmt;
use std::io::Read;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::output::OutputLogger;

use super::error::ProcessError;

/// One OS read per chunk; the buffer is transient and never retained.
pub const CHUNK_SIZE: usize = 4096;

/// Which redirected stream a pump is draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
    /// stdout and stderr share one pipe (blocking backend).
    Combined,
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSource::Stdout => f.write_str("stdout"),
            StreamSource::Stderr => f.write_str("stderr"),
            StreamSource::Combined => f.write_str("output"),
        }
    }
}

/// Drain `reader` to end-of-stream, forwarding chunks as they complete.
/// Returns the total number of bytes forwarded.
pub async fn drain_async<R>(mut reader: R, source: StreamSource, console: &OutputLogger) -> u64
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break, // write end closed
            Ok(n) => {
                console.raw(&chunk[..n]);
                total += n as u64;
            }
            Err(error) => {
                report_read_failure(source, error, console);
                break;
            }
        }
    }
    tracing::trace!("drained {total} bytes from child {source}");
    total
}

/// Blocking counterpart of [`drain_async`], used when a single combined
/// stream is drained on the launching thread.
pub fn drain_blocking<R>(mut reader: R, source: StreamSource, console: &OutputLogger) -> u64
where
    R: Read,
{
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                console.raw(&chunk[..n]);
                total += n as u64;
            }
            Err(error) => {
                report_read_failure(source, error, console);
                break;
            }
        }
    }
    tracing::trace!("drained {total} bytes from child {source}");
    total
}

fn report_read_failure(source: StreamSource, error: std::io::Error, console: &OutputLogger) {
    let error = ProcessError::StreamReadFailed {
        stream: source,
        source: error,
    };
    console.error(error.to_string());
}
