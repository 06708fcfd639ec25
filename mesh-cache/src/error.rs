//! Errors recorded by mesh loaders.

use std::path::PathBuf;

use composer_core::ctm::CtmError;
use composer_core::gltf::GltfError;

/// A load failure captured by a loader entry.
///
/// Loaders never propagate these; they are kept on the entry and rendered
/// to a string by [`MeshLoader::error`](crate::MeshLoader::error).
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read or written.
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// glTF parse, extraction or export failure.
    Gltf(GltfError),
    /// Compressed mesh decode failure.
    Ctm(CtmError),
    /// The file is a Git LFS pointer instead of mesh data.
    Placeholder {
        /// The pointer file.
        path: PathBuf,
    },
    /// A sub-mesh index beyond the single mesh of the file.
    SubmeshOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of meshes in the file.
        count: usize,
    },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Gltf(e) => write!(f, "{e}"),
            Self::Ctm(e) => write!(f, "{e}"),
            Self::Placeholder { path } => write!(
                f,
                "{} is a Git LFS pointer file, not mesh data. Run `git lfs pull` to fetch the actual file",
                path.display()
            ),
            Self::SubmeshOutOfRange { index, count } => {
                write!(f, "sub-mesh index {index} out of range ({count} available)")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Gltf(e) => Some(e),
            Self::Ctm(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GltfError> for LoadError {
    fn from(e: GltfError) -> Self {
        Self::Gltf(e)
    }
}

impl From<CtmError> for LoadError {
    fn from(e: CtmError) -> Self {
        Self::Ctm(e)
    }
}
