//! Error types for glTF loading and export.

/// Errors that can occur while reading or writing glTF data.
#[derive(Debug)]
pub enum GltfError {
    /// Failed to parse the glTF document.
    Parse(gltf_dep::Error),
    /// Failed to read an external buffer.
    Io(std::io::Error),
    /// Unsupported primitive topology.
    UnsupportedTopology(String),
    /// A primitive is missing position data.
    MissingPositions {
        /// Mesh index in the glTF document.
        mesh: usize,
        /// Primitive index within the mesh.
        primitive: usize,
    },
    /// Error reading accessor data.
    AccessorError(String),
    /// Error resolving buffer data.
    BufferError(String),
    /// A mesh, animation, sampler or skin index is out of range.
    IndexOutOfRange {
        /// What was indexed ("mesh", "skin", ...).
        kind: &'static str,
        /// Requested index.
        index: usize,
        /// Number of available items.
        count: usize,
    },
    /// Error while building the output document.
    ExportError(String),
}

impl std::fmt::Display for GltfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "glTF parse error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnsupportedTopology(msg) => write!(f, "unsupported topology: {msg}"),
            Self::MissingPositions { mesh, primitive } => {
                write!(
                    f,
                    "mesh {mesh} primitive {primitive} has no POSITION attribute"
                )
            }
            Self::AccessorError(msg) => write!(f, "accessor error: {msg}"),
            Self::BufferError(msg) => write!(f, "buffer error: {msg}"),
            Self::IndexOutOfRange { kind, index, count } => {
                write!(f, "{kind} index {index} out of range ({count} available)")
            }
            Self::ExportError(msg) => write!(f, "export error: {msg}"),
        }
    }
}

impl std::error::Error for GltfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<gltf_dep::Error> for GltfError {
    fn from(e: gltf_dep::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<std::io::Error> for GltfError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
