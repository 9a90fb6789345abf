//! Abstract progress reporting.
//!
//! Download workers feed byte counters into a [`ProgressSink`]; the sink is
//! the only coupling between the engine and any UI. Implementations may
//! render a terminal multi-bar display or do nothing at all; the engine
//! behaves identically either way.

use std::io::Read;

/// One in-flight transfer's progress bar.
pub trait ProgressHandle: Send + Sync {
    /// Advance the bar by `n` bytes.
    fn inc(&self, n: u64);

    /// Tap a reader so every byte read advances the bar.
    fn wrap_read<'r>(&self, reader: Box<dyn Read + Send + 'r>) -> Box<dyn Read + Send + 'r>;

    /// Remove the bar, finished or not.
    fn abort(&self);
}

/// A pool-wide multi-bar sink.
pub trait ProgressSink: Send + Sync {
    /// Register a bar for a transfer expected to move `total` bytes.
    fn add_bar(&self, label: &str, total: u64) -> Box<dyn ProgressHandle>;

    /// Block until all rendering has settled. May be a no-op.
    fn wait(&self);
}

/// Sink that discards all progress. Used headless and in tests.
#[derive(Debug, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn add_bar(&self, _label: &str, _total: u64) -> Box<dyn ProgressHandle> {
        Box::new(NoopHandle)
    }

    fn wait(&self) {}
}

struct NoopHandle;

impl ProgressHandle for NoopHandle {
    fn inc(&self, _n: u64) {}

    fn wrap_read<'r>(&self, reader: Box<dyn Read + Send + 'r>) -> Box<dyn Read + Send + 'r> {
        reader
    }

    fn abort(&self) {}
}
