#![allow(dead_code)]

mod skinned;

pub use skinned::write_skinned_gltf;

use std::path::Path;

use composer_core::ctm::{self, CtmMethod};
use composer_core::gltf::{ExportFormat, save_gltf};
use composer_core::mesh::{MeshData, VertexAttribute, names};
use composer_core::scene::{MeshInfo, MeshScenegraph, ScenegraphNode};
use composer_mesh_cache::{CacheSettings, ManualMonitor, MeshCache};

pub const LFS_POINTER: &str = "version https://git-lfs.github.com/spec/v1\n\
oid sha256:4d7a214614ab2935c943f9e0ff69d22eadbb8f32b1258daaa5e2ca24d17e2393\n\
size 12345\n";

/// A flat polygon with `vertices` corners, fanned into triangles.
pub fn polygon(vertices: usize) -> MeshData {
    assert!(vertices >= 3);
    let positions: Vec<[f32; 3]> = (0..vertices)
        .map(|i| {
            let a = i as f32 / vertices as f32 * std::f32::consts::TAU;
            [a.cos(), a.sin(), 0.0]
        })
        .collect();
    let normals: Vec<[f32; 3]> = vec![[0.0, 0.0, 1.0]; vertices];
    let indices = (1..vertices as u32 - 1)
        .flat_map(|i| [0, i, i + 1])
        .collect();
    MeshData::new(
        vec![
            VertexAttribute::from_vec3(names::POSITION, &positions),
            VertexAttribute::from_vec3(names::NORMAL, &normals),
        ],
        indices,
    )
}

pub fn write_ctm(path: &Path, vertices: usize) {
    let bytes = ctm::write_mesh(&polygon(vertices), CtmMethod::Brotli, "fixture").unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// One root node per mesh, named `node<i>`.
pub fn scenegraph_for(mesh_count: usize) -> MeshScenegraph {
    let mut graph = MeshScenegraph::new();
    for i in 0..mesh_count {
        graph.meshes.push(MeshInfo {
            name: Some(format!("mesh{i}")),
            primitive_materials: vec![None],
        });
        graph.add_node(
            ScenegraphNode::new().with_name(format!("node{i}")).with_mesh(i),
            None,
        );
    }
    graph
}

/// Write a glTF or GLB file (chosen by suffix) with one polygon mesh per entry.
pub fn write_gltf(path: &Path, vertex_counts: &[usize]) {
    let graph = scenegraph_for(vertex_counts.len());
    let bytes = save_gltf(&graph, ExportFormat::for_path(path), |i| {
        vertex_counts.get(i).map(|&n| polygon(n))
    })
    .unwrap();
    std::fs::write(path, bytes).unwrap();
}

pub fn new_cache() -> (MeshCache, ManualMonitor) {
    let monitor = ManualMonitor::new();
    let cache = MeshCache::new(Box::new(monitor.clone()), CacheSettings::default());
    (cache, monitor)
}
