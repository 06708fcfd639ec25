//! File change monitoring.
//!
//! The cache tells its monitor which files to watch and drains reported
//! changes on its own thread with [`poll_changes`](FileChangeMonitor::poll_changes).
//! Debouncing and the detection strategy are up to the implementation.

mod manual;
mod notify;

pub use manual::ManualMonitor;
pub use notify::NotifyMonitor;

use std::path::{Path, PathBuf};

/// Watches a set of absolute file paths.
pub trait FileChangeMonitor {
    /// Start watching `path`.
    fn watch(&mut self, path: &Path);

    /// Stop watching `path`.
    fn unwatch(&mut self, path: &Path);

    /// Watched paths modified since the last call, each listed once.
    fn poll_changes(&mut self) -> Vec<PathBuf>;
}
