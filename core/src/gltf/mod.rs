//! glTF 2.0 loader and exporter.
//!
//! Parses `.gltf`/`.glb` files into a [`GltfDocument`] that keeps the
//! resolved buffers and a flat [`MeshScenegraph`]. Geometry, animation
//! samplers and skins are extracted on demand by index, so a document that
//! is only inspected never decodes vertex data.
//!
//! # Example
//!
//! ```ignore
//! use composer_core::gltf::load_gltf;
//!
//! let data = std::fs::read("model.glb").unwrap();
//! let doc = load_gltf(&data, None).unwrap();
//! println!("Meshes: {}", doc.mesh_count());
//! let mesh = doc.load_mesh(0).unwrap();
//! println!("Vertices: {}", mesh.vertex_count());
//! ```

mod error;
mod exporter;
mod geometry;
mod loader;
#[cfg(test)]
mod tests;

pub use error::GltfError;

use std::path::Path;

use crate::mesh::MeshData;
use crate::scene::{AnimationSamplerData, MeshScenegraph, SkinData};

/// Output encoding for [`save_gltf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON text with the buffer embedded as a base64 data URI.
    Text,
    /// Binary glTF container.
    Binary,
}

impl ExportFormat {
    /// Format implied by a target path: `.glb` is binary, anything else text.
    pub fn for_path(path: &Path) -> Self {
        let is_glb = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("glb"));
        if is_glb { Self::Binary } else { Self::Text }
    }
}

/// A parsed glTF document with resolved buffer data.
pub struct GltfDocument {
    document: gltf_dep::Document,
    buffers: Vec<Vec<u8>>,
    scenegraph: MeshScenegraph,
}

impl std::fmt::Debug for GltfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GltfDocument")
            .field("buffers", &self.buffers.len())
            .field("scenegraph", &self.scenegraph)
            .finish()
    }
}

/// Load a glTF document from binary data.
///
/// Supports binary glTF (`.glb`) and JSON glTF (`.gltf`). Buffers embedded
/// as data URIs are decoded; other buffer URIs are read relative to
/// `base_dir` and fail when it is `None`.
pub fn load_gltf(data: &[u8], base_dir: Option<&Path>) -> Result<GltfDocument, GltfError> {
    let gltf = gltf_dep::Gltf::from_slice(data)?;
    let blob = gltf.blob;
    let document = gltf.document;

    let buffers = loader::resolve_buffers(&document, blob, base_dir)?;
    let scenegraph = loader::build_scenegraph(&document);
    log::debug!(
        "Parsed glTF: {} nodes, {} meshes, {} animations",
        scenegraph.nodes.len(),
        scenegraph.meshes.len(),
        scenegraph.animations.len()
    );

    Ok(GltfDocument {
        document,
        buffers,
        scenegraph,
    })
}

impl GltfDocument {
    /// The parsed scenegraph.
    pub fn scenegraph(&self) -> &MeshScenegraph {
        &self.scenegraph
    }

    /// Number of glTF meshes in the document.
    pub fn mesh_count(&self) -> usize {
        self.scenegraph.meshes.len()
    }

    /// Extract one glTF mesh, merging its primitives into one [`MeshData`].
    pub fn load_mesh(&self, index: usize) -> Result<MeshData, GltfError> {
        let mesh = self
            .document
            .meshes()
            .nth(index)
            .ok_or(GltfError::IndexOutOfRange {
                kind: "mesh",
                index,
                count: self.mesh_count(),
            })?;

        let parts = mesh
            .primitives()
            .map(|p| geometry::read_primitive(&p, index, &self.buffers))
            .collect::<Result<Vec<_>, _>>()?;
        let merged = MeshData::merge(parts);
        Ok(match mesh.name() {
            Some(name) => merged.with_label(name),
            None => merged,
        })
    }

    /// Bake every mesh instance of the scene into one [`MeshData`].
    ///
    /// Each instance is transformed by its node's world matrix. Nodes with
    /// a skin are skipped unless `include_skinned` is set. A document with
    /// meshes but no mesh nodes bakes its meshes untransformed.
    pub fn bake_meshes(&self, include_skinned: bool) -> Result<MeshData, GltfError> {
        let graph = &self.scenegraph;
        let mut parts = Vec::new();
        let mut instanced = false;

        for index in graph.traverse() {
            let node = &graph.nodes[index];
            let Some(mesh_index) = node.mesh else {
                continue;
            };
            instanced = true;
            if node.skin.is_some() && !include_skinned {
                log::debug!("Skipping skinned node {index} while baking");
                continue;
            }
            let mut mesh = self.load_mesh(mesh_index)?;
            geometry::transform_mesh(&mut mesh, &graph.world_matrix(index));
            parts.push(mesh);
        }

        if !instanced {
            for mesh_index in 0..self.mesh_count() {
                parts.push(self.load_mesh(mesh_index)?);
            }
        }

        Ok(MeshData::merge(parts).with_label("baked"))
    }

    /// Extract one animation sampler.
    pub fn animation_sampler(
        &self,
        animation: usize,
        sampler: usize,
    ) -> Result<AnimationSamplerData, GltfError> {
        loader::read_animation_sampler(&self.document, &self.buffers, animation, sampler)
    }

    /// Extract one skin.
    pub fn skin(&self, index: usize) -> Result<SkinData, GltfError> {
        loader::read_skin(&self.document, &self.buffers, index)
    }
}

/// Export a scenegraph to glTF bytes.
///
/// `geometry_fn` supplies the geometry of each scenegraph mesh by index;
/// each submesh of the returned data becomes one primitive. A mesh without
/// geometry (`None` or no vertices) fails the export with
/// [`GltfError::ExportError`]. Skins and animations are not exported.
///
/// # Example
///
/// ```ignore
/// use composer_core::gltf::{save_gltf, ExportFormat};
///
/// let bytes = save_gltf(doc.scenegraph(), ExportFormat::Text, |i| doc.load_mesh(i).ok()).unwrap();
/// std::fs::write("output.gltf", &bytes).unwrap();
/// ```
pub fn save_gltf(
    graph: &MeshScenegraph,
    format: ExportFormat,
    mut geometry_fn: impl FnMut(usize) -> Option<MeshData>,
) -> Result<Vec<u8>, GltfError> {
    let mut ctx = exporter::ExportContext::new();

    ctx.build_materials(graph);
    ctx.build_cameras(graph);
    ctx.build_meshes(graph, &mut geometry_fn)?;
    ctx.build_nodes(graph)?;
    ctx.finalize_buffer(format == ExportFormat::Text);
    match format {
        ExportFormat::Text => ctx.to_json(),
        ExportFormat::Binary => ctx.to_glb(),
    }
}
