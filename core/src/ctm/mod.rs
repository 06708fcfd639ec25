//! Compressed single-mesh container (CTM).
//!
//! A CTM file holds exactly one triangle mesh. The layout is little-endian:
//!
//! ```text
//! "OCTM"  u32 version  method tag  u32 vertices  u32 triangles
//! u32 uv maps  u32 attribute maps  u32 flags  string comment
//! "INDX" indices  "VERT" positions  ["NORM" normals]
//! ("TEXC" name file-name coords)*  ("ATTR" name values)*
//! ```
//!
//! Strings are a `u32` byte length followed by UTF-8. With method `RAW\0`
//! arrays are stored as-is; with `BRT1` every array is a `u32` packed length
//! followed by a brotli stream.
//!
//! UV maps decode to `TEXCOORD_n` attributes in file order. Attribute maps
//! keep their stored names and decode as 4-component attributes.

mod error;
mod reader;
mod writer;

pub use error::CtmError;
pub use reader::{read_mesh, read_mesh_file};
pub use writer::write_mesh;

use crate::mesh::MeshData;

/// File magic.
pub const MAGIC: [u8; 4] = *b"OCTM";

/// The only supported container version.
pub const FORMAT_VERSION: u32 = 5;

/// Header flag: the file carries a `NORM` chunk.
pub const FLAG_NORMALS: u32 = 1;

/// Array storage method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtmMethod {
    /// Uncompressed arrays.
    Raw,
    /// Brotli-compressed arrays.
    Brotli,
}

impl CtmMethod {
    /// Four-byte tag written to the header.
    pub fn tag(&self) -> [u8; 4] {
        match self {
            Self::Raw => *b"RAW\0",
            Self::Brotli => *b"BRT1",
        }
    }

    /// Method for a header tag.
    pub fn from_tag(tag: [u8; 4]) -> Option<Self> {
        match &tag {
            b"RAW\0" => Some(Self::Raw),
            b"BRT1" => Some(Self::Brotli),
            _ => None,
        }
    }
}

/// A decoded CTM file.
#[derive(Debug, Clone, PartialEq)]
pub struct CtmMesh {
    /// Free-form comment from the header.
    pub comment: String,
    /// Storage method the file used.
    pub method: CtmMethod,
    /// The mesh.
    pub mesh: MeshData,
}
