//! CPU-side mesh data structures.
//!
//! This module provides:
//! - [`Submesh`] - One primitive's index/vertex range inside a [`MeshData`]
//! - [`MeshData`] - Immutable triangle mesh with named vertex attributes

use std::sync::Arc;

use super::attribute::{AttributeFormat, VertexAttribute, names};

/// Shared handle to immutable mesh data.
///
/// A reload produces a new `MeshData`; handles to the previous one stay valid.
pub type SharedMeshData = Arc<MeshData>;

/// Index and vertex range of one primitive inside a [`MeshData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submesh {
    /// First index of this primitive in [`MeshData::indices`].
    pub index_offset: u32,
    /// Number of indices (3 per triangle).
    pub index_count: u32,
    /// First vertex used by this primitive.
    pub vertex_offset: u32,
    /// Number of vertices owned by this primitive.
    pub vertex_count: u32,
    /// Material index in the owning scenegraph, if any.
    pub material: Option<usize>,
}

/// A triangle mesh with named vertex attributes and `u32` indices.
///
/// Every attribute holds one element per vertex. Indices are absolute (they
/// already include the primitive's vertex offset). Primitives that were
/// merged into this mesh are described by [`submeshes`](Self::submeshes).
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    label: Option<String>,
    attributes: Vec<VertexAttribute>,
    indices: Vec<u32>,
    submeshes: Vec<Submesh>,
}

impl MeshData {
    /// Create a single-primitive mesh from attributes and triangle indices.
    pub fn new(attributes: Vec<VertexAttribute>, indices: Vec<u32>) -> Self {
        let vertex_count = attributes
            .iter()
            .find(|a| a.name == names::POSITION)
            .map(|a| a.element_count())
            .unwrap_or(0);
        let submeshes = vec![Submesh {
            index_offset: 0,
            index_count: indices.len() as u32,
            vertex_offset: 0,
            vertex_count: vertex_count as u32,
            material: None,
        }];
        Self {
            label: None,
            attributes,
            indices,
            submeshes,
        }
    }

    /// Set a label for diagnostics.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the material of every submesh.
    #[must_use]
    pub fn with_material(mut self, material: Option<usize>) -> Self {
        for submesh in &mut self.submeshes {
            submesh.material = material;
        }
        self
    }

    /// Merge several meshes into one, keeping each input's submeshes.
    ///
    /// The attribute set of the first part defines the result. Attributes
    /// missing from later parts are zero-filled; attributes only present in
    /// later parts are dropped.
    pub fn merge(parts: Vec<MeshData>) -> Self {
        let mut iter = parts.into_iter();
        let Some(mut result) = iter.next() else {
            return Self::new(Vec::new(), Vec::new());
        };

        for part in iter {
            let base_vertex = result.vertex_count() as u32;
            let base_index = result.indices.len() as u32;
            let part_vertices = part.vertex_count();

            for attr in &mut result.attributes {
                match part.attribute(&attr.name) {
                    Some(src) if src.format == attr.format => {
                        attr.data.extend_from_slice(&src.data);
                    }
                    _ => {
                        if part.attribute(&attr.name).is_some() {
                            log::warn!(
                                "Attribute {} has mismatching format in merged part, zero-filling",
                                attr.name
                            );
                        }
                        attr.data
                            .extend(std::iter::repeat_n(0.0, part_vertices * attr.format.components()));
                    }
                }
            }

            result
                .indices
                .extend(part.indices.iter().map(|i| i + base_vertex));
            result
                .submeshes
                .extend(part.submeshes.iter().map(|s| Submesh {
                    index_offset: s.index_offset + base_index,
                    vertex_offset: s.vertex_offset + base_vertex,
                    ..*s
                }));
        }

        result
    }

    /// Reverse the winding order of every triangle.
    pub fn flip_winding(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    /// Get the label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// All vertex attributes, in declaration order.
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Mutable access to an attribute by name.
    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut VertexAttribute> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }

    /// Number of vertex attributes.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Component layout of an attribute.
    pub fn attribute_format(&self, name: &str) -> Option<AttributeFormat> {
        self.attribute(name).map(|a| a.format)
    }

    /// Triangle indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Primitive ranges.
    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    /// Number of primitives merged into this mesh.
    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// Number of vertices (elements of `POSITION`).
    pub fn vertex_count(&self) -> usize {
        self.attribute(names::POSITION)
            .map(|a| a.element_count())
            .unwrap_or(0)
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Positions as `[x, y, z]` arrays.
    pub fn positions(&self) -> Vec<[f32; 3]> {
        self.attribute(names::POSITION)
            .map(|a| {
                a.data
                    .chunks_exact(3)
                    .map(|c| [c[0], c[1], c[2]])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check internal consistency.
    ///
    /// Every attribute must have one element per vertex, the index count must
    /// be a multiple of three, and every index must reference a vertex.
    pub fn validate(&self) -> Result<(), String> {
        let vertex_count = self.vertex_count();
        if self.attribute(names::POSITION).is_none() {
            return Err("mesh has no POSITION attribute".into());
        }
        for attr in &self.attributes {
            if attr.data.len() % attr.format.components() != 0 {
                return Err(format!(
                    "attribute {} has {} components, not a multiple of {}",
                    attr.name,
                    attr.data.len(),
                    attr.format.components()
                ));
            }
            if attr.element_count() != vertex_count {
                return Err(format!(
                    "attribute {} has {} elements, expected {vertex_count}",
                    attr.name,
                    attr.element_count()
                ));
            }
        }
        if self.indices.len() % 3 != 0 {
            return Err(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            ));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(format!(
                "index {bad} out of range for {vertex_count} vertices"
            ));
        }
        Ok(())
    }
}
