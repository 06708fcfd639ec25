use std::path::{Path, PathBuf};

/// Identifies which mesh to extract from a (possibly multi-mesh) file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeshDescriptor {
    /// Absolute path of the mesh file.
    pub abs_path: PathBuf,
    /// Mesh index within the file.
    pub submesh_index: usize,
    /// Bake every mesh instance of the file into one mesh.
    pub bake_all_submeshes: bool,
}

impl MeshDescriptor {
    /// Descriptor for the first mesh of `abs_path`.
    pub fn new(abs_path: impl AsRef<Path>) -> Self {
        Self {
            abs_path: abs_path.as_ref().to_path_buf(),
            submesh_index: 0,
            bake_all_submeshes: false,
        }
    }

    /// Select a mesh by index.
    #[must_use]
    pub fn with_submesh(mut self, index: usize) -> Self {
        self.submesh_index = index;
        self
    }

    /// Request all meshes baked into one.
    #[must_use]
    pub fn baked(mut self) -> Self {
        self.bake_all_submeshes = true;
        self
    }
}
