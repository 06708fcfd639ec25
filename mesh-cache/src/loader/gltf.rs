use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use composer_core::gltf::{ExportFormat, GltfDocument, GltfError, load_gltf, save_gltf};
use composer_core::mesh::SharedMeshData;
use composer_core::scene::{MeshScenegraph, SharedAnimationSamplerData, SharedSkinData};

use super::{LoaderKind, MeshLoader, ParseState};
use crate::descriptor::MeshDescriptor;
use crate::error::LoadError;
use crate::placeholder;
use crate::settings::CacheSettings;

/// Memoized extraction key: a mesh index, or `None` for the baked mesh.
type MeshKey = Option<usize>;

/// A parsed document plus everything extracted from it so far.
struct GltfState {
    document: GltfDocument,
    meshes: HashMap<MeshKey, SharedMeshData>,
    samplers: HashMap<(usize, usize), SharedAnimationSamplerData>,
    skins: HashMap<usize, SharedSkinData>,
}

/// Loader for glTF 2.0 JSON and binary files.
pub struct GltfMeshLoader {
    path: PathBuf,
    bake_skinned: bool,
    scan_bytes: usize,
    state: ParseState<GltfState>,
    op_error: Option<LoadError>,
}

impl GltfMeshLoader {
    /// Create an unloaded loader for `path`.
    pub fn new(path: &Path, settings: &CacheSettings) -> Self {
        Self {
            path: path.to_path_buf(),
            bake_skinned: settings.gltf.bake_skinned_meshes,
            scan_bytes: settings.cache.placeholder_scan_bytes,
            state: ParseState::Unloaded,
            op_error: None,
        }
    }

    fn ensure_loaded(&mut self) -> Option<&mut GltfState> {
        let path = &self.path;
        let scan_bytes = self.scan_bytes;
        self.state.ensure(path, || parse(path, scan_bytes))
    }

    /// Record the outcome of an extraction.
    fn finish<T>(&mut self, result: Result<T, LoadError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.op_error = None;
                Some(value)
            }
            Err(e) => {
                log::warn!("{}: {e}", self.path.display());
                self.op_error = Some(e);
                None
            }
        }
    }
}

fn parse(path: &Path, scan_bytes: usize) -> Result<GltfState, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = load_gltf(&bytes, path.parent()).map_err(|e| match e {
        GltfError::Parse(_) if placeholder::looks_like_lfs_pointer(&bytes[..bytes.len().min(scan_bytes)]) => {
            LoadError::Placeholder {
                path: path.to_path_buf(),
            }
        }
        other => LoadError::Gltf(other),
    })?;
    Ok(GltfState {
        document,
        meshes: HashMap::new(),
        samplers: HashMap::new(),
        skins: HashMap::new(),
    })
}

impl MeshLoader for GltfMeshLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Gltf
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load_mesh(&mut self, descriptor: &MeshDescriptor) -> Option<SharedMeshData> {
        let bake_skinned = self.bake_skinned;
        let state = self.ensure_loaded()?;
        let key = (!descriptor.bake_all_submeshes).then_some(descriptor.submesh_index);
        if let Some(mesh) = state.meshes.get(&key) {
            return Some(Arc::clone(mesh));
        }

        let result = match key {
            Some(index) => state.document.load_mesh(index),
            None => state.document.bake_meshes(bake_skinned),
        };
        let result = result.map(|mesh| {
            let shared = Arc::new(mesh);
            state.meshes.insert(key, Arc::clone(&shared));
            shared
        });
        self.finish(result.map_err(LoadError::from))
    }

    fn scenegraph(&mut self) -> Option<&MeshScenegraph> {
        self.ensure_loaded().map(|state| state.document.scenegraph())
    }

    fn write_scenegraph(&mut self, graph: &MeshScenegraph) -> bool {
        // Geometry comes from the file currently at the target path, if any.
        if self.path.exists() {
            self.ensure_loaded();
        }
        let document = match &self.state {
            ParseState::Loaded(state) => Some(&state.document),
            _ => None,
        };

        let format = ExportFormat::for_path(&self.path);
        let result = save_gltf(graph, format, |index| {
            document.and_then(|doc| match doc.load_mesh(index) {
                Ok(mesh) => Some(mesh),
                Err(e) => {
                    log::warn!("Cannot export geometry of mesh {index}: {e}");
                    None
                }
            })
        })
        .map_err(LoadError::from)
        .and_then(|bytes| {
            std::fs::write(&self.path, bytes).map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })
        });

        match result {
            Ok(()) => {
                log::info!("Wrote scenegraph to {}", self.path.display());
                self.reset();
                true
            }
            Err(e) => {
                log::error!("Failed to write {}: {e}", self.path.display());
                self.op_error = Some(e);
                false
            }
        }
    }

    fn total_mesh_count(&mut self) -> usize {
        self.ensure_loaded()
            .map(|state| state.document.mesh_count())
            .unwrap_or(0)
    }

    fn animation_sampler_data(
        &mut self,
        animation: usize,
        sampler: usize,
    ) -> Option<SharedAnimationSamplerData> {
        let state = self.ensure_loaded()?;
        if let Some(data) = state.samplers.get(&(animation, sampler)) {
            return Some(Arc::clone(data));
        }
        let result = state
            .document
            .animation_sampler(animation, sampler)
            .map(|data| {
                let shared = Arc::new(data);
                state.samplers.insert((animation, sampler), Arc::clone(&shared));
                shared
            });
        self.finish(result.map_err(LoadError::from))
    }

    fn load_skin(&mut self, skin: usize) -> Option<SharedSkinData> {
        let state = self.ensure_loaded()?;
        if let Some(data) = state.skins.get(&skin) {
            return Some(Arc::clone(data));
        }
        let result = state.document.skin(skin).map(|data| {
            let shared = Arc::new(data);
            state.skins.insert(skin, Arc::clone(&shared));
            shared
        });
        self.finish(result.map_err(LoadError::from))
    }

    fn error(&self) -> Option<String> {
        self.state
            .error()
            .or(self.op_error.as_ref())
            .map(ToString::to_string)
    }

    fn is_loaded(&self) -> bool {
        !self.state.is_unloaded()
    }

    fn reset(&mut self) {
        self.state = ParseState::Unloaded;
        self.op_error = None;
    }
}

#[cfg(test)]
#[path = "../../tests/common/skinned.rs"]
mod skinned_fixture;
