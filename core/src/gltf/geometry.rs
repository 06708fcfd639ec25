//! Primitive geometry extraction and baking for glTF meshes.

use crate::math::{self, Mat4};
use crate::mesh::{AttributeFormat, MeshData, VertexAttribute, names};

use super::error::GltfError;

/// Read one primitive into a single-submesh [`MeshData`].
///
/// Strips and fans are converted to triangle lists. The primitive's material
/// index is recorded on its submesh.
pub(crate) fn read_primitive(
    primitive: &gltf_dep::Primitive<'_>,
    mesh_index: usize,
    buffers: &[Vec<u8>],
) -> Result<MeshData, GltfError> {
    let prim_index = primitive.index();
    if primitive.get(&gltf_dep::Semantic::Positions).is_none() {
        return Err(GltfError::MissingPositions {
            mesh: mesh_index,
            primitive: prim_index,
        });
    }

    let reader = primitive.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| {
            GltfError::BufferError(format!(
                "mesh {mesh_index} primitive {prim_index}: position data unavailable"
            ))
        })?
        .collect();
    let vertex_count = positions.len();

    let mut attributes = vec![VertexAttribute::from_vec3(names::POSITION, &positions)];

    if let Some(normals) = reader.read_normals() {
        let normals: Vec<[f32; 3]> = normals.collect();
        attributes.push(VertexAttribute::from_vec3(names::NORMAL, &normals));
    }
    if let Some(tangents) = reader.read_tangents() {
        let tangents: Vec<[f32; 4]> = tangents.collect();
        attributes.push(VertexAttribute::from_vec4(names::TANGENT, &tangents));
    }
    let mut set = 0;
    while let Some(tex_coords) = reader.read_tex_coords(set) {
        let tex_coords: Vec<[f32; 2]> = tex_coords.into_f32().collect();
        attributes.push(VertexAttribute::from_vec2(
            names::tex_coord(set as usize),
            &tex_coords,
        ));
        set += 1;
    }
    if let Some(colors) = reader.read_colors(0) {
        let colors: Vec<[f32; 4]> = colors.into_rgba_f32().collect();
        attributes.push(VertexAttribute::from_vec4(names::COLOR_0, &colors));
    }
    if let Some(joints) = reader.read_joints(0) {
        let joints: Vec<[f32; 4]> = joints.into_u16().map(|j| j.map(f32::from)).collect();
        attributes.push(VertexAttribute::from_vec4(names::JOINTS_0, &joints));
    }
    if let Some(weights) = reader.read_weights(0) {
        let weights: Vec<[f32; 4]> = weights.into_f32().collect();
        attributes.push(VertexAttribute::from_vec4(names::WEIGHTS_0, &weights));
    }

    if let Some(bad) = attributes
        .iter()
        .find(|a| a.element_count() != vertex_count)
    {
        return Err(GltfError::AccessorError(format!(
            "mesh {mesh_index} primitive {prim_index}: {} has {} elements, expected {vertex_count}",
            bad.name,
            bad.element_count()
        )));
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertex_count as u32).collect(),
    };
    let indices = triangulate(primitive.mode(), indices)?;

    let mesh = MeshData::new(attributes, indices).with_material(primitive.material().index());
    mesh.validate().map_err(|msg| {
        GltfError::AccessorError(format!("mesh {mesh_index} primitive {prim_index}: {msg}"))
    })?;
    Ok(mesh)
}

/// Convert strip and fan index sequences into a triangle list.
pub(crate) fn triangulate(
    mode: gltf_dep::mesh::Mode,
    indices: Vec<u32>,
) -> Result<Vec<u32>, GltfError> {
    use gltf_dep::mesh::Mode;

    match mode {
        Mode::Triangles => Ok(indices),
        Mode::TriangleStrip => {
            let mut list = Vec::with_capacity(indices.len().saturating_sub(2) * 3);
            for (i, w) in indices.windows(3).enumerate() {
                // Odd triangles swap the first two vertices to keep winding.
                if i % 2 == 0 {
                    list.extend_from_slice(&[w[0], w[1], w[2]]);
                } else {
                    list.extend_from_slice(&[w[1], w[0], w[2]]);
                }
            }
            Ok(list)
        }
        Mode::TriangleFan => {
            let Some((&hub, rest)) = indices.split_first() else {
                return Ok(Vec::new());
            };
            let mut list = Vec::with_capacity(rest.len().saturating_sub(1) * 3);
            for w in rest.windows(2) {
                list.extend_from_slice(&[hub, w[0], w[1]]);
            }
            Ok(list)
        }
        other => Err(GltfError::UnsupportedTopology(format!("{other:?}"))),
    }
}

/// Apply a world matrix to mesh geometry in place.
///
/// Positions are transformed as points, normals by the inverse-transpose,
/// tangents by the linear part (handedness kept). Mirroring transforms flip
/// the triangle winding.
pub(crate) fn transform_mesh(mesh: &mut MeshData, matrix: &Mat4) {
    if let Some(positions) = mesh.attribute_mut(names::POSITION) {
        for p in positions.data.chunks_exact_mut(3) {
            let t = math::transform_point(matrix, [p[0], p[1], p[2]]);
            p.copy_from_slice(&t);
        }
    }

    let normal_matrix = math::normal_matrix(matrix);
    if let Some(normals) = mesh.attribute_mut(names::NORMAL) {
        for n in normals.data.chunks_exact_mut(3) {
            let t = math::transform_normal(&normal_matrix, [n[0], n[1], n[2]]);
            n.copy_from_slice(&t);
        }
    }

    if let Some(tangents) = mesh.attribute_mut(names::TANGENT)
        && tangents.format == AttributeFormat::Float4
    {
        for t in tangents.data.chunks_exact_mut(4) {
            let v = math::transform_vector(matrix, [t[0], t[1], t[2]]);
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            if len > f32::EPSILON {
                t[0] = v[0] / len;
                t[1] = v[1] / len;
                t[2] = v[2] / len;
            }
        }
    }

    let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    if linear.determinant() < 0.0 {
        mesh.flip_winding();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf_dep::mesh::Mode;

    #[test]
    fn strip_alternates_winding() {
        let list = triangulate(Mode::TriangleStrip, vec![0, 1, 2, 3]).unwrap();
        assert_eq!(list, vec![0, 1, 2, 2, 1, 3]);
    }

    #[test]
    fn fan_shares_first_vertex() {
        let list = triangulate(Mode::TriangleFan, vec![0, 1, 2, 3]).unwrap();
        assert_eq!(list, vec![0, 1, 2, 0, 2, 3]);
        assert!(triangulate(Mode::TriangleFan, Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn lines_are_rejected() {
        let err = triangulate(Mode::Lines, vec![0, 1]).unwrap_err();
        assert!(matches!(err, GltfError::UnsupportedTopology(_)));
    }

    #[test]
    fn transform_moves_positions_and_flips_mirrored_winding() {
        let mut mesh = MeshData::new(
            vec![
                VertexAttribute::from_vec3(
                    names::POSITION,
                    &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                ),
                VertexAttribute::from_vec3(names::NORMAL, &[[0.0, 0.0, 1.0]; 3]),
            ],
            vec![0, 1, 2],
        );
        let mirror = math::mat4_from_scale_rotation_translation(
            math::Vec3::new(-1.0, 1.0, 1.0),
            math::quat_from_xyzw([0.0, 0.0, 0.0, 1.0]),
            math::Vec3::new(0.0, 0.0, 5.0),
        );
        transform_mesh(&mut mesh, &mirror);
        assert_eq!(mesh.positions()[1], [-1.0, 0.0, 5.0]);
        assert_eq!(mesh.indices(), &[0, 2, 1]);
        let normal = mesh.attribute(names::NORMAL).unwrap().element(0).unwrap();
        assert!((normal[2] - 1.0).abs() < 1e-5);
    }
}
