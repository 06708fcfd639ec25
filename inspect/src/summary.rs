//! Human-readable summaries of loaded data.

use std::fmt::Write;

use composer_core::mesh::{AttributeFormat, MeshData};
use composer_core::scene::MeshScenegraph;

fn format_name(format: AttributeFormat) -> &'static str {
    match format {
        AttributeFormat::Float => "float",
        AttributeFormat::Float2 => "vec2",
        AttributeFormat::Float3 => "vec3",
        AttributeFormat::Float4 => "vec4",
    }
}

/// Counts, attributes and sub-ranges of a mesh.
pub fn describe_mesh(mesh: &MeshData) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Mesh {}: {} vertices, {} triangles, {} submesh(es)",
        mesh.label().unwrap_or("<unnamed>"),
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.submesh_count()
    );
    for attr in mesh.attributes() {
        let _ = writeln!(out, "  {:<12} {}", attr.name, format_name(attr.format));
    }
    for (i, submesh) in mesh.submeshes().iter().enumerate() {
        let material = submesh
            .material
            .map_or_else(|| "-".to_string(), |m| m.to_string());
        let _ = writeln!(
            out,
            "  submesh {i}: {} indices from {}, material {material}",
            submesh.index_count, submesh.index_offset
        );
    }
    out
}

/// Resource counts and the node hierarchy of a scenegraph.
pub fn describe_scenegraph(graph: &MeshScenegraph) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Scenegraph: {} nodes, {} meshes, {} materials, {} cameras, {} skins, {} animations",
        graph.nodes.len(),
        graph.meshes.len(),
        graph.materials.len(),
        graph.cameras.len(),
        graph.skins.len(),
        graph.animations.len()
    );

    let mut stack: Vec<(usize, usize)> = graph.root_nodes.iter().rev().map(|&r| (r, 0)).collect();
    while let Some((index, depth)) = stack.pop() {
        let Some(node) = graph.nodes.get(index) else {
            continue;
        };
        let _ = write!(
            out,
            "{:indent$}- {}",
            "",
            node.name.as_deref().unwrap_or("<node>"),
            indent = depth * 2
        );
        if let Some(mesh) = node.mesh {
            let _ = write!(out, " [mesh {mesh}]");
        }
        if let Some(camera) = node.camera {
            let _ = write!(out, " [camera {camera}]");
        }
        if let Some(skin) = node.skin {
            let _ = write!(out, " [skin {skin}]");
        }
        out.push('\n');
        stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
    }

    for (i, animation) in graph.animations.iter().enumerate() {
        let _ = writeln!(
            out,
            "Animation {i} {}: {} samplers, {} channels",
            animation.name.as_deref().unwrap_or("<unnamed>"),
            animation.samplers.len(),
            animation.channels.len()
        );
    }
    out
}
