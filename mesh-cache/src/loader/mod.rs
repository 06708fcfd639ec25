//! Format loaders.
//!
//! A [`MeshLoader`] owns the parse state of one file. Parsing is deferred
//! until the first operation that needs it and memoized until
//! [`reset`](MeshLoader::reset). Two implementations exist:
//!
//! - [`GltfMeshLoader`] for `.gltf`/`.glb`
//! - [`CtmMeshLoader`] for the compressed single-mesh format
//!
//! [`create_loader`] picks one from the file suffix alone; contents are
//! never sniffed.

mod ctm;
mod gltf;

pub use ctm::CtmMeshLoader;
pub use gltf::GltfMeshLoader;

use std::path::Path;

use composer_core::mesh::SharedMeshData;
use composer_core::scene::{MeshScenegraph, SharedAnimationSamplerData, SharedSkinData};

use crate::descriptor::MeshDescriptor;
use crate::error::LoadError;
use crate::settings::CacheSettings;

/// Concrete loader variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
    /// glTF 2.0 / GLB.
    Gltf,
    /// Compressed single-mesh container.
    Ctm,
}

impl LoaderKind {
    /// Loader variant for a path: `.gltf`/`.glb` (any case) select glTF,
    /// everything else the compressed format.
    pub fn for_path(path: &Path) -> Self {
        let is_gltf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gltf") || e.eq_ignore_ascii_case("glb"));
        if is_gltf { Self::Gltf } else { Self::Ctm }
    }
}

/// Parse state of a loader entry.
#[derive(Debug)]
pub enum ParseState<T> {
    /// Nothing parsed yet, or dropped by a reset.
    Unloaded,
    /// Parsed successfully.
    Loaded(T),
    /// Parsing failed; the error is kept until the next reset.
    Failed(LoadError),
}

impl<T> ParseState<T> {
    /// Whether a parse has been attempted since the last reset.
    pub fn is_unloaded(&self) -> bool {
        matches!(self, Self::Unloaded)
    }

    /// The parse failure, if any.
    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Run `parse` if unloaded and return the loaded value.
    pub(crate) fn ensure(
        &mut self,
        path: &Path,
        parse: impl FnOnce() -> Result<T, LoadError>,
    ) -> Option<&mut T> {
        if self.is_unloaded() {
            *self = match parse() {
                Ok(value) => {
                    log::debug!("Parsed {}", path.display());
                    Self::Loaded(value)
                }
                Err(e) => {
                    log::warn!("Failed to load {}: {e}", path.display());
                    Self::Failed(e)
                }
            };
        }
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Format-specific parser for one file.
///
/// Operations never panic on malformed input. Failures return `None` (or
/// `false`) and are recorded for [`error`](Self::error); operations a format
/// does not support return `None`/`false` without recording anything.
pub trait MeshLoader {
    /// Concrete variant.
    fn kind(&self) -> LoaderKind;

    /// The file this loader reads.
    fn path(&self) -> &Path;

    /// Extract the mesh selected by `descriptor`.
    fn load_mesh(&mut self, descriptor: &MeshDescriptor) -> Option<SharedMeshData>;

    /// The parsed scenegraph, if the format has one.
    fn scenegraph(&mut self) -> Option<&MeshScenegraph>;

    /// Export `graph` to this loader's path. Resets the loader on success.
    fn write_scenegraph(&mut self, graph: &MeshScenegraph) -> bool;

    /// Number of independently loadable meshes in the file.
    fn total_mesh_count(&mut self) -> usize;

    /// Extract one animation sampler.
    fn animation_sampler_data(
        &mut self,
        animation: usize,
        sampler: usize,
    ) -> Option<SharedAnimationSamplerData>;

    /// Extract one skin.
    fn load_skin(&mut self, skin: usize) -> Option<SharedSkinData>;

    /// The parse failure, or else the last failed operation, as text.
    fn error(&self) -> Option<String>;

    /// Whether the file is currently parsed (successfully or not).
    fn is_loaded(&self) -> bool;

    /// Drop all parsed state and errors. The path is kept.
    fn reset(&mut self);
}

/// Create the loader for `path`, selected by suffix.
pub fn create_loader(path: &Path, settings: &CacheSettings) -> Box<dyn MeshLoader> {
    match LoaderKind::for_path(path) {
        LoaderKind::Gltf => Box::new(GltfMeshLoader::new(path, settings)),
        LoaderKind::Ctm => Box::new(CtmMeshLoader::new(path, settings)),
    }
}
