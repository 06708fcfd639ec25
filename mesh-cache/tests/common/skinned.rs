//! Skinned and animated glTF fixture with an external buffer.

use std::path::Path;

/// Write a `.gltf` file to `path` and its `.bin` buffer next to it.
///
/// Node 0 ("joint") is animated from the origin to `(0, end_y, 0)`; node 1
/// ("skinned") holds a triangle bound to skin 0 ("rig").
pub fn write_skinned_gltf(path: &Path, end_y: f32) {
    let stem = path.file_stem().unwrap().to_string_lossy();
    let bin_name = format!("{stem}.bin");

    let mut bin: Vec<u8> = Vec::new();
    let floats: [&[f32]; 4] = [
        // 0..36: positions
        &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        // 36..44: keyframe times
        &[0.0, 1.0],
        // 44..68: translations
        &[0.0, 0.0, 0.0, 0.0, end_y, 0.0],
        // 68..132: inverse bind matrix
        &[
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 1.0,
        ],
    ];
    for v in floats.concat() {
        bin.extend_from_slice(&v.to_le_bytes());
    }
    // 132..156: joints
    bin.extend(std::iter::repeat_n(0u8, 24));
    // 156..204: weights
    for _ in 0..3 {
        for w in [1.0f32, 0.0, 0.0, 0.0] {
            bin.extend_from_slice(&w.to_le_bytes());
        }
    }
    assert_eq!(bin.len(), 204);

    std::fs::write(path.with_file_name(&bin_name), &bin).unwrap();
    std::fs::write(path, TEMPLATE.replace("@URI@", &bin_name)).unwrap();
}

const TEMPLATE: &str = r#"{
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
