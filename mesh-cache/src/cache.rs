//! The path-keyed mesh cache.
//!
//! [`MeshCache`] owns at most one loader entry per absolute path, created
//! on first access and kept while any listener for the path is registered.
//! When the file changes, the entry's parsed state is dropped and every
//! listener for the path is called, in registration order, with the cache
//! already showing the invalidated state.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use composer_core::mesh::SharedMeshData;
use composer_core::scene::{MeshScenegraph, SharedAnimationSamplerData, SharedSkinData};

use crate::descriptor::MeshDescriptor;
use crate::loader::{MeshLoader, create_loader};
use crate::monitor::FileChangeMonitor;
use crate::settings::CacheSettings;

/// Identity of a loader entry. A recreated entry gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// Handle returned by [`MeshCache::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Receives change notifications for one path.
pub trait MeshChangeListener {
    /// Called after the cache has dropped the parsed state of `path`.
    fn on_mesh_changed(&mut self, cache: &mut MeshCache, path: &Path);
}

impl<F> MeshChangeListener for F
where
    F: FnMut(&mut MeshCache, &Path),
{
    fn on_mesh_changed(&mut self, cache: &mut MeshCache, path: &Path) {
        self(cache, path)
    }
}

/// Shared listener handle.
pub type SharedListener = Rc<RefCell<dyn MeshChangeListener>>;

/// One loader entry.
pub struct CacheEntry {
    id: EntryId,
    loader: Box<dyn MeshLoader>,
}

impl CacheEntry {
    /// Identity of this entry.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// The format loader.
    pub fn loader(&self) -> &dyn MeshLoader {
        self.loader.as_ref()
    }

    /// Mutable access to the format loader.
    pub fn loader_mut(&mut self) -> &mut dyn MeshLoader {
        self.loader.as_mut()
    }
}

/// Mesh resource cache keyed by absolute file path.
///
/// Single-threaded: listener handles are `Rc<RefCell<_>>` and change events
/// are drained on the owning thread by [`process_file_changes`](Self::process_file_changes).
pub struct MeshCache {
    monitor: Box<dyn FileChangeMonitor>,
    settings: CacheSettings,
    entries: HashMap<PathBuf, CacheEntry>,
    listeners: HashMap<PathBuf, Vec<(ListenerId, SharedListener)>>,
    next_entry_id: u64,
    next_listener_id: u64,
}

impl MeshCache {
    /// Create an empty cache reporting watched paths to `monitor`.
    pub fn new(monitor: Box<dyn FileChangeMonitor>, settings: CacheSettings) -> Self {
        Self {
            monitor,
            settings,
            entries: HashMap::new(),
            listeners: HashMap::new(),
            next_entry_id: 0,
            next_listener_id: 0,
        }
    }

    /// Settings the cache was created with.
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    // ---- Registration ----

    /// Register `listener` for changes to `abs_path`.
    ///
    /// The first listener of a path starts watching it.
    pub fn register(&mut self, abs_path: &Path, listener: SharedListener) -> ListenerId {
        debug_assert!(
            abs_path.is_absolute(),
            "mesh paths must be absolute: {}",
            abs_path.display()
        );
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;

        let list = self.listeners.entry(abs_path.to_path_buf()).or_default();
        let first = list.is_empty();
        list.push((id, listener));

        if first && self.settings.cache.watch {
            self.monitor.watch(abs_path);
        }
        log::debug!("Registered listener {:?} for {}", id, abs_path.display());
        id
    }

    /// Register a closure as a listener.
    pub fn register_fn(
        &mut self,
        abs_path: &Path,
        listener: impl FnMut(&mut MeshCache, &Path) + 'static,
    ) -> ListenerId {
        self.register(abs_path, Rc::new(RefCell::new(listener)))
    }

    /// Remove one listener. Evicts the entry when it was the last one.
    ///
    /// Returns `false` if the listener was not registered for the path.
    pub fn unregister(&mut self, abs_path: &Path, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(abs_path) else {
            return false;
        };
        let Some(pos) = list.iter().position(|(lid, _)| *lid == id) else {
            return false;
        };
        list.remove(pos);

        if list.is_empty() {
            self.listeners.remove(abs_path);
            if self.entries.remove(abs_path).is_some() {
                log::debug!("Evicted {}", abs_path.display());
            }
            if self.settings.cache.watch {
                self.monitor.unwatch(abs_path);
            }
        }
        true
    }

    /// Whether any listener is registered for `abs_path`.
    pub fn is_registered(&self, abs_path: &Path) -> bool {
        self.listeners.contains_key(abs_path)
    }

    /// Number of listeners registered for `abs_path`.
    pub fn listener_count(&self, abs_path: &Path) -> usize {
        self.listeners.get(abs_path).map_or(0, Vec::len)
    }

    // ---- Entries ----

    /// The entry for `abs_path`, created without parsing if needed.
    ///
    /// A listener must be registered for the path.
    pub fn get_or_create_loader(&mut self, abs_path: &Path) -> &mut CacheEntry {
        debug_assert!(
            self.is_registered(abs_path),
            "no listener registered for {}; register before loading",
            abs_path.display()
        );
        let settings = &self.settings;
        let next_id = &mut self.next_entry_id;
        self.entries.entry(abs_path.to_path_buf()).or_insert_with(|| {
            let id = EntryId(*next_id);
            *next_id += 1;
            let loader = create_loader(abs_path, settings);
            log::debug!(
                "Created {:?} loader for {}",
                loader.kind(),
                abs_path.display()
            );
            CacheEntry { id, loader }
        })
    }

    /// Identity of the current entry for `abs_path`, if one exists.
    pub fn entry_id(&self, abs_path: &Path) -> Option<EntryId> {
        self.entries.get(abs_path).map(CacheEntry::id)
    }

    /// Number of live entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    // ---- Queries ----

    /// Extract the mesh selected by `descriptor`.
    pub fn load_mesh(&mut self, descriptor: &MeshDescriptor) -> Option<SharedMeshData> {
        self.get_or_create_loader(&descriptor.abs_path)
            .loader_mut()
            .load_mesh(descriptor)
    }

    /// The scenegraph of `abs_path`. `None` for formats without one.
    pub fn scenegraph(&mut self, abs_path: &Path) -> Option<&MeshScenegraph> {
        self.get_or_create_loader(abs_path).loader_mut().scenegraph()
    }

    /// Extract one animation sampler of `abs_path`.
    pub fn animation_sampler_data(
        &mut self,
        abs_path: &Path,
        animation: usize,
        sampler: usize,
    ) -> Option<SharedAnimationSamplerData> {
        self.get_or_create_loader(abs_path)
            .loader_mut()
            .animation_sampler_data(animation, sampler)
    }

    /// Extract one skin of `abs_path`.
    pub fn load_skin(&mut self, abs_path: &Path, skin: usize) -> Option<SharedSkinData> {
        self.get_or_create_loader(abs_path).loader_mut().load_skin(skin)
    }

    /// Number of loadable meshes in `abs_path`.
    pub fn total_mesh_count(&mut self, abs_path: &Path) -> usize {
        self.get_or_create_loader(abs_path)
            .loader_mut()
            .total_mesh_count()
    }

    /// Export `graph` to exactly `abs_path`.
    ///
    /// Only glTF targets support export. Mesh geometry is taken from the file
    /// currently at `abs_path`. A registered target's entry is reset on
    /// success and keeps the error on failure; an unregistered target is
    /// written through a loader that is dropped afterwards.
    pub fn write_scenegraph(&mut self, graph: &MeshScenegraph, abs_path: &Path) -> bool {
        if self.is_registered(abs_path) {
            return self
                .get_or_create_loader(abs_path)
                .loader_mut()
                .write_scenegraph(graph);
        }

        let mut loader = create_loader(abs_path, &self.settings);
        let written = loader.write_scenegraph(graph);
        if !written && let Some(error) = loader.error() {
            log::warn!("Export to unregistered {} failed: {error}", abs_path.display());
        }
        written
    }

    /// Last error recorded for `abs_path`.
    pub fn error(&self, abs_path: &Path) -> Option<String> {
        self.entries
            .get(abs_path)
            .and_then(|entry| entry.loader().error())
    }

    // ---- Invalidation ----

    /// Drop the parsed state of `abs_path`. The entry is kept.
    pub fn force_reload(&mut self, abs_path: &Path) {
        if let Some(entry) = self.entries.get_mut(abs_path) {
            entry.loader_mut().reset();
            log::debug!("Invalidated {}", abs_path.display());
        }
    }

    /// Invalidate `abs_path` and notify its listeners in registration order.
    pub fn on_file_changed(&mut self, abs_path: &Path) {
        self.force_reload(abs_path);

        let Some(listeners) = self.listeners.get(abs_path).cloned() else {
            return;
        };
        log::info!(
            "{} changed, notifying {} listener(s)",
            abs_path.display(),
            listeners.len()
        );
        for (id, listener) in listeners {
            // Skip listeners removed by an earlier one in this dispatch.
            let still_registered = self
                .listeners
                .get(abs_path)
                .is_some_and(|list| list.iter().any(|(lid, _)| *lid == id));
            if !still_registered {
                continue;
            }
            match listener.try_borrow_mut() {
                Ok(mut listener) => listener.on_mesh_changed(self, abs_path),
                Err(_) => log::warn!(
                    "Listener {:?} for {} is already running, skipping",
                    id,
                    abs_path.display()
                ),
            }
        }
    }

    /// Drain the monitor and dispatch each changed path once.
    ///
    /// Returns the number of paths dispatched.
    pub fn process_file_changes(&mut self) -> usize {
        let mut changed = self.monitor.poll_changes();
        let mut seen = std::collections::HashSet::new();
        changed.retain(|path| seen.insert(path.clone()));

        for path in &changed {
            self.on_file_changed(path);
        }
        changed.len()
    }
}
