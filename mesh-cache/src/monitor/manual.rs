use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::FileChangeMonitor;

#[derive(Default)]
struct ManualState {
    watched: HashSet<PathBuf>,
    pending: Vec<PathBuf>,
}

/// Monitor driven by explicit [`trigger`](Self::trigger) calls.
///
/// Clones share state, so a host can keep one handle to report changes
/// while the cache owns another.
#[derive(Clone, Default)]
pub struct ManualMonitor {
    state: Rc<RefCell<ManualState>>,
}

impl ManualMonitor {
    /// Create a monitor with no watched files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a change to `path`. Ignored unless the path is watched.
    pub fn trigger(&self, path: &Path) {
        let mut state = self.state.borrow_mut();
        if !state.watched.contains(path) {
            log::debug!("Ignoring change to unwatched {:?}", path);
            return;
        }
        if !state.pending.iter().any(|p| p == path) {
            state.pending.push(path.to_path_buf());
        }
    }

    /// Whether `path` is being watched.
    pub fn is_watched(&self, path: &Path) -> bool {
        self.state.borrow().watched.contains(path)
    }

    /// Number of watched files.
    pub fn watched_count(&self) -> usize {
        self.state.borrow().watched.len()
    }
}

impl FileChangeMonitor for ManualMonitor {
    fn watch(&mut self, path: &Path) {
        self.state.borrow_mut().watched.insert(path.to_path_buf());
    }

    fn unwatch(&mut self, path: &Path) {
        let mut state = self.state.borrow_mut();
        state.watched.remove(path);
        state.pending.retain(|p| p != path);
    }

    fn poll_changes(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }
}
