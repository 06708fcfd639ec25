//! Error types for the compressed mesh container.

/// Errors that can occur while decoding or encoding a CTM file.
#[derive(Debug)]
pub enum CtmError {
    /// Bad magic, truncated data, or a malformed chunk.
    InvalidFile(String),
    /// The container version is not supported.
    UnsupportedFormatVersion(u32),
    /// The compression method tag is not supported.
    UnsupportedMethod([u8; 4]),
    /// A compressed array could not be decompressed.
    Decompress(String),
    /// The decoded mesh is inconsistent.
    InvalidMesh(String),
    /// The file could not be read or written.
    Io(std::io::Error),
}

impl std::fmt::Display for CtmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFile(msg) => write!(f, "invalid CTM file: {msg}"),
            Self::UnsupportedFormatVersion(v) => {
                write!(f, "unsupported CTM format version {v}")
            }
            Self::UnsupportedMethod(tag) => write!(
                f,
                "unsupported CTM compression method {:?}",
                String::from_utf8_lossy(tag)
            ),
            Self::Decompress(msg) => write!(f, "CTM decompression failed: {msg}"),
            Self::InvalidMesh(msg) => write!(f, "invalid CTM mesh: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CtmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CtmError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
