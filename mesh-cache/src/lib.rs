//! # Composer Mesh Cache
//!
//! Loads mesh files for the scene editor and keeps the parsed result keyed
//! by absolute path until the file changes.
//!
//! - [`MeshCache`] maps each path to one loader entry and dispatches change
//!   notifications to registered listeners
//! - [`MeshLoader`] is implemented per format: [`GltfMeshLoader`] for
//!   `.gltf`/`.glb` and [`CtmMeshLoader`] for the compressed container
//! - [`FileChangeMonitor`] reports modified files; [`NotifyMonitor`] uses
//!   the platform watcher, [`ManualMonitor`] is driven by the host
//!
//! ```no_run
//! use std::path::Path;
//! use composer_mesh_cache::{CacheSettings, ManualMonitor, MeshCache, MeshDescriptor};
//!
//! let mut cache = MeshCache::new(Box::new(ManualMonitor::new()), CacheSettings::default());
//! let path = Path::new("/project/meshes/crate.glb");
//! cache.register_fn(path, |cache, path| {
//!     log::info!("{} reloaded: {:?}", path.display(), cache.error(path));
//! });
//! let mesh = cache.load_mesh(&MeshDescriptor::new(path));
//! ```

mod cache;
mod descriptor;
mod error;
pub mod loader;
pub mod monitor;
pub mod placeholder;
mod settings;

pub use cache::{CacheEntry, EntryId, ListenerId, MeshCache, MeshChangeListener, SharedListener};
pub use descriptor::MeshDescriptor;
pub use error::LoadError;
pub use loader::{CtmMeshLoader, GltfMeshLoader, LoaderKind, MeshLoader, ParseState, create_loader};
pub use monitor::{FileChangeMonitor, ManualMonitor, NotifyMonitor};
pub use settings::{CacheSection, CacheSettings, GltfSection, load_settings};
