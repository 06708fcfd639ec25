//! glTF 2.0 exporter.
//!
//! Writes a [`MeshScenegraph`] to glTF JSON (buffer embedded as a base64 data
//! URI) or binary glTF (`.glb`). Geometry is pulled per mesh from a caller
//! callback so the scenegraph itself stays free of vertex data.

use std::collections::BTreeMap;

use base64::Engine;
use gltf_dep::json as gj;

use crate::mesh::{AttributeFormat, MeshData, names};
use crate::scene::{CameraProjection, MeshScenegraph};

use super::error::GltfError;

// ---------------------------------------------------------------------------
// Export context
// ---------------------------------------------------------------------------

pub(super) struct ExportContext {
    root: gj::Root,
    buffer_data: Vec<u8>,
}

impl ExportContext {
    pub(super) fn new() -> Self {
        Self {
            root: gj::Root::default(),
            buffer_data: Vec::new(),
        }
    }

    // -- Materials and cameras -----------------------------------------------

    pub(super) fn build_materials(&mut self, graph: &MeshScenegraph) {
        for mat in &graph.materials {
            let pbr = gj::material::PbrMetallicRoughness {
                base_color_factor: gj::material::PbrBaseColorFactor(mat.base_color_factor),
                ..Default::default()
            };
            self.root.materials.push(gj::Material {
                name: mat.name.clone(),
                pbr_metallic_roughness: pbr,
                double_sided: mat.double_sided,
                ..Default::default()
            });
        }
    }

    pub(super) fn build_cameras(&mut self, graph: &MeshScenegraph) {
        for cam in &graph.cameras {
            let camera = match &cam.projection {
                CameraProjection::Perspective {
                    yfov,
                    aspect,
                    znear,
                    zfar,
                } => gj::Camera {
                    name: cam.name.clone(),
                    type_: gj::validation::Checked::Valid(gj::camera::Type::Perspective),
                    orthographic: None,
                    perspective: Some(gj::camera::Perspective {
                        aspect_ratio: *aspect,
                        yfov: *yfov,
                        zfar: *zfar,
                        znear: *znear,
                        extensions: None,
                        extras: gj::Extras::default(),
                    }),
                    extensions: None,
                    extras: gj::Extras::default(),
                },
                CameraProjection::Orthographic {
                    xmag,
                    ymag,
                    znear,
                    zfar,
                } => gj::Camera {
                    name: cam.name.clone(),
                    type_: gj::validation::Checked::Valid(gj::camera::Type::Orthographic),
                    orthographic: Some(gj::camera::Orthographic {
                        xmag: *xmag,
                        ymag: *ymag,
                        zfar: *zfar,
                        znear: *znear,
                        extensions: None,
                        extras: gj::Extras::default(),
                    }),
                    perspective: None,
                    extensions: None,
                    extras: gj::Extras::default(),
                },
            };
            self.root.cameras.push(camera);
        }
    }

    // -- Meshes --------------------------------------------------------------

    /// Write one glTF mesh per scenegraph mesh, one primitive per submesh.
    ///
    /// Fails when a mesh has no geometry, since a glTF mesh needs at least
    /// one primitive.
    pub(super) fn build_meshes(
        &mut self,
        graph: &MeshScenegraph,
        geometry_fn: &mut dyn FnMut(usize) -> Option<MeshData>,
    ) -> Result<(), GltfError> {
        let material_count = graph.materials.len();
        for (mesh_index, info) in graph.meshes.iter().enumerate() {
            let Some(data) = geometry_fn(mesh_index).filter(|data| data.vertex_count() > 0) else {
                return Err(GltfError::ExportError(format!(
                    "no geometry for mesh {mesh_index} ({})",
                    info.name.as_deref().unwrap_or("unnamed")
                )));
            };
            let primitives = self.build_primitives(&data, material_count)?;
            self.root.meshes.push(gj::Mesh {
                name: info.name.clone(),
                primitives,
                weights: None,
                extensions: None,
                extras: gj::Extras::default(),
            });
        }
        Ok(())
    }

    fn build_primitives(
        &mut self,
        data: &MeshData,
        material_count: usize,
    ) -> Result<Vec<gj::mesh::Primitive>, GltfError> {
        data.validate().map_err(GltfError::ExportError)?;

        let mut primitives = Vec::with_capacity(data.submesh_count());
        for submesh in data.submeshes() {
            let first = submesh.vertex_offset as usize;
            let count = submesh.vertex_count as usize;

            let mut attributes = BTreeMap::new();
            for attr in data.attributes() {
                let Some(semantic) = map_semantic(&attr.name) else {
                    log::debug!("Skipping attribute {} on export", attr.name);
                    continue;
                };
                let c = attr.format.components();
                let slice = &attr.data[first * c..(first + count) * c];
                let (min, max) = if attr.name == names::POSITION {
                    compute_min_max(slice, c)
                } else {
                    (None, None)
                };

                let view_idx = self.push_buffer_view(
                    bytemuck::cast_slice(slice),
                    Some(gj::buffer::Target::ArrayBuffer),
                );
                let acc_idx = self.push_accessor(
                    view_idx,
                    count as u32,
                    gj::accessor::ComponentType::F32,
                    map_accessor_type(attr.format),
                    min,
                    max,
                );
                attributes.insert(
                    gj::validation::Checked::Valid(semantic),
                    gj::Index::new(acc_idx),
                );
            }

            let start = submesh.index_offset as usize;
            let end = start + submesh.index_count as usize;
            let rebased: Vec<u32> = data.indices()[start..end]
                .iter()
                .map(|&i| i - submesh.vertex_offset)
                .collect();
            let indices = if rebased.is_empty() {
                None
            } else {
                let view_idx = self.push_buffer_view(
                    bytemuck::cast_slice(&rebased),
                    Some(gj::buffer::Target::ElementArrayBuffer),
                );
                let acc_idx = self.push_accessor(
                    view_idx,
                    rebased.len() as u32,
                    gj::accessor::ComponentType::U32,
                    gj::accessor::Type::Scalar,
                    None,
                    None,
                );
                Some(gj::Index::new(acc_idx))
            };

            let material = submesh.material.filter(|&m| m < material_count);
            primitives.push(gj::mesh::Primitive {
                attributes,
                extensions: None,
                extras: gj::Extras::default(),
                indices,
                material: material.map(|m| gj::Index::new(m as u32)),
                mode: gj::validation::Checked::Valid(gj::mesh::Mode::Triangles),
                targets: None,
            });
        }
        Ok(primitives)
    }

    // -- Nodes and scene -----------------------------------------------------

    pub(super) fn build_nodes(&mut self, graph: &MeshScenegraph) -> Result<(), GltfError> {
        let node_count = graph.nodes.len();
        for node in &graph.nodes {
            let t = node.transform;
            let children = node
                .children
                .iter()
                .map(|&c| check("node", c, node_count))
                .collect::<Result<Vec<_>, _>>()?;

            self.root.nodes.push(gj::Node {
                name: node.name.clone(),
                camera: node
                    .camera
                    .map(|c| check("camera", c, graph.cameras.len()))
                    .transpose()?,
                children: if children.is_empty() {
                    None
                } else {
                    Some(children)
                },
                mesh: node
                    .mesh
                    .map(|m| check("mesh", m, graph.meshes.len()))
                    .transpose()?,
                // Skins are not exported.
                skin: None,
                translation: (t.translation != [0.0, 0.0, 0.0]).then_some(t.translation),
                rotation: (t.rotation != [0.0, 0.0, 0.0, 1.0])
                    .then_some(gj::scene::UnitQuaternion(t.rotation)),
                scale: (t.scale != [1.0, 1.0, 1.0]).then_some(t.scale),
                matrix: None,
                weights: None,
                extensions: None,
                extras: gj::Extras::default(),
            });
        }

        let roots = graph
            .root_nodes
            .iter()
            .map(|&r| check("node", r, node_count))
            .collect::<Result<Vec<_>, _>>()?;
        self.root.scenes.push(gj::Scene {
            name: None,
            nodes: roots,
            extensions: None,
            extras: gj::Extras::default(),
        });
        self.root.scene = Some(gj::Index::new(0));
        self.root.asset = gj::Asset {
            generator: Some(format!("Composer v{}", crate::VERSION)),
            version: "2.0".into(),
            ..Default::default()
        };
        Ok(())
    }

    // -- Buffer/accessor helpers ---------------------------------------------

    fn align_buffer(&mut self) {
        let padding = (4 - (self.buffer_data.len() % 4)) % 4;
        self.buffer_data.extend(std::iter::repeat_n(0u8, padding));
    }

    fn push_buffer_view(&mut self, data: &[u8], target: Option<gj::buffer::Target>) -> u32 {
        self.align_buffer();
        let offset = self.buffer_data.len();
        self.buffer_data.extend_from_slice(data);

        let view_idx = self.root.buffer_views.len() as u32;
        self.root.buffer_views.push(gj::buffer::View {
            buffer: gj::Index::new(0),
            byte_offset: Some(gj::validation::USize64(offset as u64)),
            byte_length: gj::validation::USize64(data.len() as u64),
            byte_stride: None,
            target: target.map(gj::validation::Checked::Valid),
            name: None,
            extensions: None,
            extras: gj::Extras::default(),
        });

        view_idx
    }

    fn push_accessor(
        &mut self,
        buffer_view: u32,
        count: u32,
        component_type: gj::accessor::ComponentType,
        type_: gj::accessor::Type,
        min: Option<gj::Value>,
        max: Option<gj::Value>,
    ) -> u32 {
        let acc_idx = self.root.accessors.len() as u32;
        self.root.accessors.push(gj::Accessor {
            buffer_view: Some(gj::Index::new(buffer_view)),
            byte_offset: Some(gj::validation::USize64(0)),
            count: gj::validation::USize64(count as u64),
            component_type: gj::validation::Checked::Valid(gj::accessor::GenericComponentType(
                component_type,
            )),
            type_: gj::validation::Checked::Valid(type_),
            min,
            max,
            normalized: false,
            name: None,
            sparse: None,
            extensions: None,
            extras: gj::Extras::default(),
        });
        acc_idx
    }

    /// Add the single buffer. Text output embeds it as a data URI.
    pub(super) fn finalize_buffer(&mut self, embed_uri: bool) {
        if self.buffer_data.is_empty() {
            return;
        }
        self.align_buffer();
        let uri = embed_uri.then(|| {
            format!(
                "data:application/octet-stream;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&self.buffer_data)
            )
        });
        self.root.buffers.push(gj::Buffer {
            byte_length: gj::validation::USize64(self.buffer_data.len() as u64),
            name: None,
            uri,
            extensions: None,
            extras: gj::Extras::default(),
        });
    }

    // -- Output --------------------------------------------------------------

    pub(super) fn to_json(&self) -> Result<Vec<u8>, GltfError> {
        self.root
            .to_string_pretty()
            .map(String::into_bytes)
            .map_err(|e| GltfError::ExportError(format!("JSON serialization failed: {e}")))
    }

    pub(super) fn to_glb(&self) -> Result<Vec<u8>, GltfError> {
        let json_bytes = self
            .root
            .to_vec()
            .map_err(|e| GltfError::ExportError(format!("JSON serialization failed: {e}")))?;

        let json_pad = (4 - (json_bytes.len() % 4)) % 4;
        let json_chunk_len = json_bytes.len() + json_pad;

        let bin_pad = (4 - (self.buffer_data.len() % 4)) % 4;
        let bin_chunk_len = self.buffer_data.len() + bin_pad;

        let has_bin = !self.buffer_data.is_empty();
        let total_length = 12 + 8 + json_chunk_len + if has_bin { 8 + bin_chunk_len } else { 0 };

        let mut glb = Vec::with_capacity(total_length);

        // Header
        glb.extend_from_slice(&0x46546C67u32.to_le_bytes()); // magic "glTF"
        glb.extend_from_slice(&2u32.to_le_bytes()); // version
        glb.extend_from_slice(&(total_length as u32).to_le_bytes());

        // JSON chunk
        glb.extend_from_slice(&(json_chunk_len as u32).to_le_bytes());
        glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // "JSON"
        glb.extend_from_slice(&json_bytes);
        glb.extend(std::iter::repeat_n(b' ', json_pad));

        // BIN chunk
        if has_bin {
            glb.extend_from_slice(&(bin_chunk_len as u32).to_le_bytes());
            glb.extend_from_slice(&0x004E4942u32.to_le_bytes()); // "BIN\0"
            glb.extend_from_slice(&self.buffer_data);
            glb.extend(std::iter::repeat_n(0u8, bin_pad));
        }

        Ok(glb)
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn map_accessor_type(format: AttributeFormat) -> gj::accessor::Type {
    match format {
        AttributeFormat::Float => gj::accessor::Type::Scalar,
        AttributeFormat::Float2 => gj::accessor::Type::Vec2,
        AttributeFormat::Float3 => gj::accessor::Type::Vec3,
        AttributeFormat::Float4 => gj::accessor::Type::Vec4,
    }
}

/// Map an attribute name to its glTF semantic.
///
/// Joints are stored as floats and have no lossless glTF float encoding, so
/// they are dropped along with custom attributes.
fn map_semantic(name: &str) -> Option<gj::mesh::Semantic> {
    match name {
        names::POSITION => Some(gj::mesh::Semantic::Positions),
        names::NORMAL => Some(gj::mesh::Semantic::Normals),
        names::TANGENT => Some(gj::mesh::Semantic::Tangents),
        names::COLOR_0 => Some(gj::mesh::Semantic::Colors(0)),
        names::WEIGHTS_0 => Some(gj::mesh::Semantic::Weights(0)),
        other => other
            .strip_prefix("TEXCOORD_")
            .and_then(|set| set.parse().ok())
            .map(gj::mesh::Semantic::TexCoords),
    }
}

/// Checked conversion of a scenegraph index to a glTF index.
fn check<T>(kind: &'static str, index: usize, count: usize) -> Result<gj::Index<T>, GltfError> {
    if index < count {
        Ok(gj::Index::new(index as u32))
    } else {
        Err(GltfError::IndexOutOfRange { kind, index, count })
    }
}

/// Build a JSON array of f32 values (for accessor min/max).
fn json_f32_array(values: &[f32]) -> gj::Value {
    gj::Value::Array(values.iter().map(|&v| gj::Value::from(v as f64)).collect())
}

/// Per-component min/max of flat attribute data.
fn compute_min_max(data: &[f32], components: usize) -> (Option<gj::Value>, Option<gj::Value>) {
    if data.is_empty() {
        return (None, None);
    }
    let mut min = vec![f32::MAX; components];
    let mut max = vec![f32::MIN; components];
    for element in data.chunks_exact(components) {
        for (c, &v) in element.iter().enumerate() {
            min[c] = min[c].min(v);
            max[c] = max[c].max(v);
        }
    }
    (Some(json_f32_array(&min)), Some(json_f32_array(&max)))
}
