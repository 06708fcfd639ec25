use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::FileChangeMonitor;

/// Monitor backed by the platform file watcher.
///
/// Watches the parent directory of every registered file non-recursively,
/// so that files replaced by rename (as editors and exporters do) keep being
/// reported. Events arrive on a background thread and are queued until
/// [`poll_changes`](FileChangeMonitor::poll_changes).
pub struct NotifyMonitor {
    /// The underlying file watcher.
    watcher: RecommendedWatcher,
    /// Receives raw notify events from the background thread.
    event_rx: mpsc::Receiver<notify::Event>,
    /// Files reported to the cache.
    files: HashSet<PathBuf>,
    /// Watched directories with the number of files in each.
    dirs: HashMap<PathBuf, usize>,
}

impl NotifyMonitor {
    /// Create a monitor with no watched files.
    pub fn new() -> notify::Result<Self> {
        let (tx, rx) = mpsc::channel::<notify::Event>();

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let _ = tx.send(event);
                }
                Err(e) => log::warn!("File watcher error: {e}"),
            }
        })?;

        Ok(Self {
            watcher,
            event_rx: rx,
            files: HashSet::new(),
            dirs: HashMap::new(),
        })
    }

    /// Number of files being watched.
    pub fn watched_count(&self) -> usize {
        self.files.len()
    }
}

impl FileChangeMonitor for NotifyMonitor {
    fn watch(&mut self, path: &Path) {
        if self.files.contains(path) {
            return;
        }
        let Some(dir) = path.parent() else {
            log::warn!("Cannot watch {:?}: no parent directory", path);
            return;
        };
        if let Some(count) = self.dirs.get_mut(dir) {
            *count += 1;
        } else {
            // Leave no bookkeeping behind for a failed watch so a later call retries.
            if let Err(e) = self.watcher.watch(dir, RecursiveMode::NonRecursive) {
                log::warn!("Failed to watch {:?}: {e}", dir);
                return;
            }
            log::debug!("Watching directory {:?}", dir);
            self.dirs.insert(dir.to_path_buf(), 1);
        }
        self.files.insert(path.to_path_buf());
    }

    fn unwatch(&mut self, path: &Path) {
        if !self.files.remove(path) {
            return;
        }
        let Some(dir) = path.parent() else {
            return;
        };
        if let Some(count) = self.dirs.get_mut(dir) {
            *count -= 1;
            if *count == 0 {
                self.dirs.remove(dir);
                if let Err(e) = self.watcher.unwatch(dir) {
                    log::debug!("Failed to unwatch {:?}: {e}", dir);
                }
            }
        }
    }

    fn poll_changes(&mut self) -> Vec<PathBuf> {
        let mut changed = Vec::new();

        while let Ok(event) = self.event_rx.try_recv() {
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                continue;
            }
            for path in event.paths {
                if self.files.contains(&path) && !changed.contains(&path) {
                    changed.push(path);
                }
            }
        }

        changed
    }
}
