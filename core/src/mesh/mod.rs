//! CPU-side mesh types.
//!
//! - [`MeshData`] - Immutable mesh with named attributes, indices and
//!   per-primitive submesh ranges
//! - [`VertexAttribute`] / [`AttributeFormat`] - Named float attribute arrays
//!
//! Loaders produce `MeshData` once per successful load and hand it out as
//! [`SharedMeshData`].

mod attribute;
mod data;

pub use attribute::{AttributeFormat, VertexAttribute, names};
pub use data::{MeshData, SharedMeshData, Submesh};
