//! # Composer Core
//!
//! CPU-side mesh and scene-graph data for the Composer scene editor, plus
//! the format adaptation layers that produce them:
//!
//! - [`mesh`] - [`MeshData`](mesh::MeshData) with named vertex attributes
//! - [`scene`] - [`MeshScenegraph`](scene::MeshScenegraph) and the
//!   animation/skin payloads extracted from mesh files
//! - [`gltf`] - glTF 2.0 / GLB loading and export
//! - [`ctm`] - the compressed single-mesh container

pub mod ctm;
#[cfg(feature = "gltf")]
pub mod gltf;
pub mod math;
pub mod mesh;
pub mod scene;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core version once at startup.
pub fn init() {
    log::info!("Composer Core v{} initialized", VERSION);
}
