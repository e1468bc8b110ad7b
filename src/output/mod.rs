//! Bounded capture store shared by the stream pumps and the application's
//! own log calls, plus the sink seam the rendering side consumes.

pub mod buffer;
pub mod logger;

pub use buffer::{OutputBuffer, View, DEFAULT_CAPACITY};
pub use logger::{LogLevel, OutputLogger};

use std::sync::{Arc, Mutex, MutexGuard};

/// Write seam into the bounded store. Both captured process output and
/// locally formatted log messages go through this single entry point, so
/// they interleave chronologically.
pub trait OutputSink: Send + Sync {
    fn append(&self, bytes: &[u8]);
}

/// Cloneable handle to one process-wide [`OutputBuffer`].
///
/// Appends are serialized behind a mutex, and views are computed from a
/// single locked snapshot, so multi-threaded producers are safe.
#[derive(Clone)]
pub struct SharedOutputBuffer {
    inner: Arc<Mutex<OutputBuffer>>,
}

impl SharedOutputBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(OutputBuffer::with_capacity(capacity))),
        }
    }

    /// Lock the store for reading. Renderers take this once per redraw and
    /// call [`OutputBuffer::view`] on the guard.
    pub fn lock(&self) -> MutexGuard<'_, OutputBuffer> {
        self.inner.lock().unwrap()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Snapshot of the retained bytes with the spans concatenated.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().view().to_vec()
    }

    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Default for SharedOutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for SharedOutputBuffer {
    fn append(&self, bytes: &[u8]) {
        self.lock().append(bytes);
    }
}
