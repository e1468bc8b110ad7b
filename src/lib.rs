//! # Caplog
//!
//! Run an external tool with its output captured: the child's stdout and
//! stderr are redirected into pipes, drained as bytes arrive, and stored
//! alongside the application's own log messages in a fixed-capacity,
//! line-aware circular buffer that never overflows and renders console-style
//! progress bars the way a terminal would.
//!
//! ## Modules
//!
//! - `output` - Bounded capture store, the shared sink seam, and the leveled
//!   log formatter that writes through it
//! - `subprocess` - Process launch and capture: command builder, the
//!   `ProcessRunner` backends (async proactor and blocking combined-pipe),
//!   the stream pumps, and a mock runner for tests

pub mod output;
pub mod subprocess;
