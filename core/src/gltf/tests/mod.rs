use base64::Engine;

use crate::mesh::{MeshData, VertexAttribute, names};
use crate::scene::{
    CameraProjection, MaterialInfo, MeshInfo, MeshScenegraph, NodeTransform, SceneCamera,
    ScenegraphNode,
};


/// A small scene: a translated root with a rotated child holding mesh 0, and
/// a scaled sibling holding mesh 1 and a camera.
fn sample_scenegraph() -> MeshScenegraph {
    let mut graph = MeshScenegraph::new();
    graph.meshes = vec![
        MeshInfo {
            name: Some("body".into()),
            primitive_materials: vec![Some(0), None],
        },
        MeshInfo {
            name: Some("quad".into()),
            primitive_materials: vec![Some(1)],
        },
    ];
    graph.materials = vec![
        MaterialInfo {
            name: Some("red".into()),
            base_color_factor: [1.0, 0.0, 0.0, 1.0],
            double_sided: false,
        },
        MaterialInfo {
            name: Some("glass".into()),
            base_color_factor: [0.5, 0.5, 1.0, 0.25],
            double_sided: true,
        },
    ];
    graph.cameras = vec![SceneCamera {
        name: Some("main".into()),
        projection: CameraProjection::Perspective {
            yfov: 0.8,
            aspect: Some(1.5),
            znear: 0.1,
            zfar: Some(100.0),
        },
    }];

    let root = graph.add_node(
        ScenegraphNode::new()
            .with_name("root")
            .with_transform(NodeTransform::IDENTITY.with_translation([0.0, 0.0, 10.0])),
        None,
    );
    graph.add_node(
        ScenegraphNode::new()
            .with_name("body")
            .with_mesh(0)
            .with_transform(NodeTransform::IDENTITY.with_rotation([0.0, 0.0, 0.0, 1.0])),
        Some(root),
    );
    graph.add_node(
        ScenegraphNode::new()
            .with_name("window")
            .with_mesh(1)
            .with_camera(0)
            .with_transform(NodeTransform::IDENTITY.with_scale([2.0, 2.0, 2.0])),
        Some(root),
    );
    graph
}

fn triangle(offset: f32) -> MeshData {
    MeshData::new(
        vec![
            VertexAttribute::from_vec3(
                names::POSITION,
                &[[offset, 0.0, 0.0], [offset + 1.0, 0.0, 0.0], [offset, 1.0, 0.0]],
            ),
            VertexAttribute::from_vec3(names::NORMAL, &[[0.0, 0.0, 1.0]; 3]),
            VertexAttribute::from_vec2(names::tex_coord(0), &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
        ],
        vec![0, 1, 2],
    )
}

fn quad() -> MeshData {
    MeshData::new(
        vec![
            VertexAttribute::from_vec3(
                names::POSITION,
                &[
                    [-1.0, -1.0, 0.0],
                    [1.0, -1.0, 0.0],
                    [1.0, 1.0, 0.0],
                    [-1.0, 1.0, 0.0],
                ],
            ),
            VertexAttribute::from_vec3(names::NORMAL, &[[0.0, 0.0, 1.0]; 4]),
            VertexAttribute::from_vec2(
                names::tex_coord(0),
                &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            ),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
    .with_material(Some(1))
}

/// Geometry matching [`sample_scenegraph`].
fn sample_geometry(index: usize) -> Option<MeshData> {
    match index {
        0 => Some(MeshData::merge(vec![
            triangle(0.0).with_material(Some(0)),
            triangle(5.0),
        ])),
        1 => Some(quad()),
        _ => None,
    }
}

/// Hand-written glTF with a skinned triangle, one skin and one animation.
fn skinned_document() -> Vec<u8> {
    let mut bin: Vec<u8> = Vec::new();
    let mut push = |values: &[f32]| {
        for v in values {
            bin.extend_from_slice(&v.to_le_bytes());
        }
    };
    // 0..36: positions
    push(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // 36..44: keyframe times
    push(&[0.0, 1.0]);
    // 44..68: translations
    push(&[0.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
    // 68..132: inverse bind matrix with translation (-1, 0, 0)
    push(&[
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 1.0,
    ]);
    // 132..156: joints (u16)
    for _ in 0..3 {
        for j in [0u16, 0, 0, 0] {
            bin.extend_from_slice(&j.to_le_bytes());
        }
    }
    // 156..204: weights
    for _ in 0..3 {
        for w in [1.0f32, 0.0, 0.0, 0.0] {
            bin.extend_from_slice(&w.to_le_bytes());
        }
    }
    assert_eq!(bin.len(), 204);

    let uri = format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bin)
    );
    SKINNED_TEMPLATE.replace("@URI@", &uri).into_bytes()
}

const SKINNED_TEMPLATE: &str = r#"{
  "asset": { "version": "2.0" },
  "buffers": [{ "byteLength": 204, "uri": "@URI@" }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 8 },
    { "buffer": 0, "byteOffset": 44, "byteLength": 24 },
    { "buffer": 0, "byteOffset": 68, "byteLength": 64 },
    { "buffer": 0, "byteOffset": 132, "byteLength": 24 },
    { "buffer": 0, "byteOffset": 156, "byteLength": 48 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0] },
    { "bufferView": 1, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0], "max": [1] },
    { "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC3" },
    { "bufferView": 3, "componentType": 5126, "count": 1, "type": "MAT4" },
    { "bufferView": 4, "componentType": 5123, "count": 3, "type": "VEC4" },
    { "bufferView": 5, "componentType": 5126, "count": 3, "type": "VEC4" }
  ],
  "meshes": [
    { "name": "tri", "primitives": [{ "attributes": { "POSITION": 0, "JOINTS_0": 4, "WEIGHTS_0": 5 } }] }
  ],
  "nodes": [
    { "name": "joint", "translation": [1, 0, 0] },
    { "name": "skinned", "mesh": 0, "skin": 0 }
  ],
  "skins": [{ "name": "rig", "joints": [0], "inverseBindMatrices": 3 }],
  "animations": [{
    "name": "move",
    "samplers": [{ "input": 1, "output": 2, "interpolation": "LINEAR" }],
    "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }]
  }],
  "scenes": [{ "nodes": [0, 1] }],
  "scene": 0
}"#;
