use std::path::{Path, PathBuf};
use std::sync::Arc;

use composer_core::ctm::{self, CtmError};
use composer_core::mesh::SharedMeshData;
use composer_core::scene::{MeshScenegraph, SharedAnimationSamplerData, SharedSkinData};

use super::{LoaderKind, MeshLoader, ParseState};
use crate::descriptor::MeshDescriptor;
use crate::error::LoadError;
use crate::placeholder;
use crate::settings::CacheSettings;

/// Loader for the compressed single-mesh format.
///
/// The file holds exactly one mesh and no scenegraph, animations or skins.
pub struct CtmMeshLoader {
    path: PathBuf,
    scan_bytes: usize,
    state: ParseState<SharedMeshData>,
    op_error: Option<LoadError>,
}

impl CtmMeshLoader {
    /// Create an unloaded loader for `path`.
    pub fn new(path: &Path, settings: &CacheSettings) -> Self {
        Self {
            path: path.to_path_buf(),
            scan_bytes: settings.cache.placeholder_scan_bytes,
            state: ParseState::Unloaded,
            op_error: None,
        }
    }
}

fn parse(path: &Path, scan_bytes: usize) -> Result<SharedMeshData, LoadError> {
    match ctm::read_mesh_file(path) {
        Ok(file) => {
            log::debug!(
                "{}: {} vertices, {} triangles",
                path.display(),
                file.mesh.vertex_count(),
                file.mesh.triangle_count()
            );
            Ok(Arc::new(file.mesh))
        }
        Err(CtmError::InvalidFile(_)) if placeholder::is_lfs_pointer(path, scan_bytes) => {
            Err(LoadError::Placeholder {
                path: path.to_path_buf(),
            })
        }
        Err(CtmError::Io(source)) => Err(LoadError::Io {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) => Err(LoadError::Ctm(e)),
    }
}

impl MeshLoader for CtmMeshLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Ctm
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load_mesh(&mut self, descriptor: &MeshDescriptor) -> Option<SharedMeshData> {
        if !descriptor.bake_all_submeshes && descriptor.submesh_index != 0 {
            self.op_error = Some(LoadError::SubmeshOutOfRange {
                index: descriptor.submesh_index,
                count: 1,
            });
            return None;
        }
        let path = &self.path;
        let scan_bytes = self.scan_bytes;
        let mesh = self
            .state
            .ensure(path, || parse(path, scan_bytes))
            .map(|mesh| Arc::clone(mesh));
        if mesh.is_some() {
            self.op_error = None;
        }
        mesh
    }

    fn scenegraph(&mut self) -> Option<&MeshScenegraph> {
        None
    }

    fn write_scenegraph(&mut self, _graph: &MeshScenegraph) -> bool {
        log::debug!(
            "{}: scenegraph export is not supported for this format",
            self.path.display()
        );
        false
    }

    fn total_mesh_count(&mut self) -> usize {
        1
    }

    fn animation_sampler_data(
        &mut self,
        _animation: usize,
        _sampler: usize,
    ) -> Option<SharedAnimationSamplerData> {
        None
    }

    fn load_skin(&mut self, _skin: usize) -> Option<SharedSkinData> {
        None
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
mod tests {
    use super::*;
    use composer_core::ctm::CtmMethod;
    use composer_core::mesh::{MeshData, VertexAttribute, names};

    fn write_triangle(path: &Path) {
        let mesh = MeshData::new(
            vec![VertexAttribute::from_vec3(
                names::POSITION,
                &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            )],
            vec![0, 1, 2],
        );
        std::fs::write(path, ctm::write_mesh(&mesh, CtmMethod::Brotli, "").unwrap()).unwrap();
    }

    #[test]
    fn parse_is_deferred_and_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.ctm");
        write_triangle(&path);

        let mut loader = CtmMeshLoader::new(&path, &CacheSettings::default());
        assert!(!loader.is_loaded());
        let first = loader.load_mesh(&MeshDescriptor::new(&path)).unwrap();
        assert!(loader.is_loaded());
        let second = loader.load_mesh(&MeshDescriptor::new(&path).baked()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        loader.reset();
        assert!(!loader.is_loaded());
        let third = loader.load_mesh(&MeshDescriptor::new(&path)).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn unsupported_operations_return_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.ctm");
        write_triangle(&path);

        let mut loader = CtmMeshLoader::new(&path, &CacheSettings::default());
        assert!(loader.scenegraph().is_none());
        assert!(loader.animation_sampler_data(0, 0).is_none());
        assert!(loader.load_skin(0).is_none());
        assert!(!loader.write_scenegraph(&MeshScenegraph::new()));
        assert_eq!(loader.total_mesh_count(), 1);
        assert!(loader.error().is_none());
        assert!(!loader.is_loaded());
    }

    #[test]
    fn second_submesh_is_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.ctm");
        write_triangle(&path);

        let mut loader = CtmMeshLoader::new(&path, &CacheSettings::default());
        assert!(loader.load_mesh(&MeshDescriptor::new(&path).with_submesh(1)).is_none());
        assert!(loader.error().unwrap().contains("out of range"));
        assert!(loader.load_mesh(&MeshDescriptor::new(&path)).is_some());
        assert!(loader.error().is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ctm");
        let mut loader = CtmMeshLoader::new(&path, &CacheSettings::default());
        assert!(loader.load_mesh(&MeshDescriptor::new(&path)).is_none());
        assert!(loader.error().unwrap().contains("missing.ctm"));
    }
}
