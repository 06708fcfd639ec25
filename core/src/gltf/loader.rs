//! Internal glTF loading logic.
//!
//! Buffer resolution, scenegraph construction, and extraction of animation
//! samplers and skins from a parsed document.

use std::path::Path;

use base64::Engine;

use crate::scene::{
    AnimationChannelInfo, AnimationInfo, AnimationProperty, AnimationSamplerData,
    AnimationSamplerInfo, CameraProjection, Interpolation, MaterialInfo, MeshInfo,
    MeshScenegraph, NodeTransform, SceneCamera, ScenegraphNode, SkinData, SkinInfo,
};

use super::error::GltfError;

/// Resolve all buffer data from the glTF document.
///
/// For binary glTF (.glb), the first buffer is the embedded blob. Data URIs
/// are decoded in place; other URIs are read relative to `base_dir`.
pub(crate) fn resolve_buffers(
    document: &gltf_dep::Document,
    blob: Option<Vec<u8>>,
    base_dir: Option<&Path>,
) -> Result<Vec<Vec<u8>>, GltfError> {
    let mut blob = blob;
    let mut buffers = Vec::new();

    for buffer in document.buffers() {
        let mut data = match buffer.source() {
            gltf_dep::buffer::Source::Bin => blob.take().ok_or_else(|| {
                GltfError::BufferError("binary buffer referenced but no blob present".into())
            })?,
            gltf_dep::buffer::Source::Uri(uri) => {
                if let Some(data) = parse_data_uri(uri)? {
                    data
                } else {
                    let dir = base_dir.ok_or_else(|| {
                        GltfError::BufferError(format!(
                            "external buffer {uri} cannot be resolved without a base directory"
                        ))
                    })?;
                    std::fs::read(dir.join(uri))?
                }
            }
        };

        if data.len() < buffer.length() {
            return Err(GltfError::BufferError(format!(
                "buffer {} has {} bytes, expected {}",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        // GLB chunks are padded to 4 bytes.
        data.truncate(buffer.length());
        buffers.push(data);
    }

    Ok(buffers)
}

/// Parse a data URI (e.g., `data:application/octet-stream;base64,...`).
///
/// Returns `Ok(None)` for URIs that are not data URIs.
pub(crate) fn parse_data_uri(uri: &str) -> Result<Option<Vec<u8>>, GltfError> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Ok(None);
    };
    let Some(base64_start) = rest.find(";base64,") else {
        return Err(GltfError::BufferError(
            "only base64 data URIs are supported".into(),
        ));
    };
    let encoded = &rest[base64_start + 8..];
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map(Some)
        .map_err(|e| GltfError::BufferError(format!("invalid base64 data URI: {e}")))
}

/// Build the flat scenegraph of a document.
///
/// Roots come from the default scene, else the first scene, else every node
/// without a parent.
pub(crate) fn build_scenegraph(document: &gltf_dep::Document) -> MeshScenegraph {
    let mut nodes: Vec<ScenegraphNode> = document.nodes().map(|n| load_node(&n)).collect();
    for index in 0..nodes.len() {
        for child in nodes[index].children.clone() {
            if let Some(node) = nodes.get_mut(child) {
                node.parent = Some(index);
            }
        }
    }

    let root_nodes = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => (0..nodes.len())
            .filter(|&i| nodes[i].parent.is_none())
            .collect(),
    };

    MeshScenegraph {
        nodes,
        root_nodes,
        meshes: load_meshes(document),
        materials: load_materials(document),
        cameras: load_cameras(document),
        skins: load_skins(document),
        animations: load_animations(document),
    }
}

fn load_node(node: &gltf_dep::Node<'_>) -> ScenegraphNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    ScenegraphNode {
        name: node.name().map(String::from),
        parent: None,
        children: node.children().map(|c| c.index()).collect(),
        transform: NodeTransform {
            translation,
            rotation,
            scale,
        },
        mesh: node.mesh().map(|m| m.index()),
        camera: node.camera().map(|c| c.index()),
        skin: node.skin().map(|s| s.index()),
    }
}

fn load_meshes(document: &gltf_dep::Document) -> Vec<MeshInfo> {
    document
        .meshes()
        .map(|mesh| MeshInfo {
            name: mesh.name().map(String::from),
            primitive_materials: mesh
                .primitives()
                .map(|p| p.material().index())
                .collect(),
        })
        .collect()
}

fn load_materials(document: &gltf_dep::Document) -> Vec<MaterialInfo> {
    document
        .materials()
        .map(|mat| MaterialInfo {
            name: mat.name().map(String::from),
            base_color_factor: mat.pbr_metallic_roughness().base_color_factor(),
            double_sided: mat.double_sided(),
        })
        .collect()
}

fn load_cameras(document: &gltf_dep::Document) -> Vec<SceneCamera> {
    document
        .cameras()
        .map(|cam| {
            let projection = match cam.projection() {
                gltf_dep::camera::Projection::Perspective(p) => CameraProjection::Perspective {
                    yfov: p.yfov(),
                    aspect: p.aspect_ratio(),
                    znear: p.znear(),
                    zfar: p.zfar(),
                },
                gltf_dep::camera::Projection::Orthographic(o) => {
                    CameraProjection::Orthographic {
                        xmag: o.xmag(),
                        ymag: o.ymag(),
                        znear: o.znear(),
                        zfar: o.zfar(),
                    }
                }
            };
            SceneCamera {
                name: cam.name().map(String::from),
                projection,
            }
        })
        .collect()
}

fn load_skins(document: &gltf_dep::Document) -> Vec<SkinInfo> {
    document
        .skins()
        .map(|skin| SkinInfo {
            name: skin.name().map(String::from),
            joints: skin.joints().map(|j| j.index()).collect(),
            skeleton: skin.skeleton().map(|n| n.index()),
        })
        .collect()
}

fn load_animations(document: &gltf_dep::Document) -> Vec<AnimationInfo> {
    document
        .animations()
        .map(|anim| AnimationInfo {
            name: anim.name().map(String::from),
            samplers: anim
                .samplers()
                .map(|s| AnimationSamplerInfo {
                    interpolation: map_interpolation(s.interpolation()),
                    keyframe_count: s.input().count(),
                })
                .collect(),
            channels: anim
                .channels()
                .map(|c| AnimationChannelInfo {
                    sampler: c.sampler().index(),
                    target_node: c.target().node().index(),
                    property: map_property(c.target().property()),
                })
                .collect(),
        })
        .collect()
}

/// Extract keyframes and outputs of one animation sampler.
///
/// The sampler's property is taken from the first channel that uses it; a
/// sampler no channel references has no meaningful output type and is
/// reported as an accessor error.
pub(crate) fn read_animation_sampler(
    document: &gltf_dep::Document,
    buffers: &[Vec<u8>],
    animation: usize,
    sampler: usize,
) -> Result<AnimationSamplerData, GltfError> {
    let anim = document
        .animations()
        .nth(animation)
        .ok_or(GltfError::IndexOutOfRange {
            kind: "animation",
            index: animation,
            count: document.animations().count(),
        })?;
    let sampler_count = anim.samplers().count();
    if sampler >= sampler_count {
        return Err(GltfError::IndexOutOfRange {
            kind: "animation sampler",
            index: sampler,
            count: sampler_count,
        });
    }

    let channel = anim
        .channels()
        .find(|c| c.sampler().index() == sampler)
        .ok_or_else(|| {
            GltfError::AccessorError(format!(
                "animation {animation} sampler {sampler} is not used by any channel"
            ))
        })?;

    let interpolation = map_interpolation(channel.sampler().interpolation());
    let property = map_property(channel.target().property());
    let reader = channel.reader(|b| buffers.get(b.index()).map(Vec::as_slice));

    let keyframes: Vec<f32> = reader
        .read_inputs()
        .ok_or_else(|| {
            GltfError::AccessorError(format!(
                "animation {animation} sampler {sampler}: input data unavailable"
            ))
        })?
        .collect();

    let outputs = reader.read_outputs().ok_or_else(|| {
        GltfError::AccessorError(format!(
            "animation {animation} sampler {sampler}: output data unavailable"
        ))
    })?;
    let output: Vec<f32> = match outputs {
        gltf_dep::animation::util::ReadOutputs::Translations(it)
        | gltf_dep::animation::util::ReadOutputs::Scales(it) => it.flatten().collect(),
        gltf_dep::animation::util::ReadOutputs::Rotations(it) => {
            it.into_f32().flatten().collect()
        }
        gltf_dep::animation::util::ReadOutputs::MorphTargetWeights(it) => {
            it.into_f32().collect()
        }
    };

    let components = match property {
        AnimationProperty::MorphTargetWeights => {
            let per_key = match interpolation {
                Interpolation::CubicSpline => keyframes.len() * 3,
                _ => keyframes.len(),
            };
            if per_key == 0 { 1 } else { (output.len() / per_key).max(1) }
        }
        other => other.components(),
    };

    Ok(AnimationSamplerData {
        interpolation,
        property,
        keyframes,
        output,
        components,
    })
}

/// Extract joints and inverse bind matrices of one skin.
///
/// Missing inverse bind matrices default to identity.
pub(crate) fn read_skin(
    document: &gltf_dep::Document,
    buffers: &[Vec<u8>],
    index: usize,
) -> Result<SkinData, GltfError> {
    let skin = document
        .skins()
        .nth(index)
        .ok_or(GltfError::IndexOutOfRange {
            kind: "skin",
            index,
            count: document.skins().count(),
        })?;
    let joints: Vec<usize> = skin.joints().map(|j| j.index()).collect();

    let reader = skin.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
    let inverse_bind_matrices: Vec<[f32; 16]> = match reader.read_inverse_bind_matrices() {
        Some(matrices) => matrices
            .map(|m| {
                let mut flat = [0.0f32; 16];
                for (col, column) in m.iter().enumerate() {
                    flat[col * 4..col * 4 + 4].copy_from_slice(column);
                }
                flat
            })
            .collect(),
        None => vec![IDENTITY_MATRIX; joints.len()],
    };

    if inverse_bind_matrices.len() < joints.len() {
        return Err(GltfError::AccessorError(format!(
            "skin {index} has {} inverse bind matrices for {} joints",
            inverse_bind_matrices.len(),
            joints.len()
        )));
    }

    Ok(SkinData {
        name: skin.name().map(String::from),
        joints,
        inverse_bind_matrices,
        skeleton: skin.skeleton().map(|n| n.index()),
    })
}

#[rustfmt::skip]
const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

fn map_interpolation(interpolation: gltf_dep::animation::Interpolation) -> Interpolation {
    match interpolation {
        gltf_dep::animation::Interpolation::Linear => Interpolation::Linear,
        gltf_dep::animation::Interpolation::Step => Interpolation::Step,
        gltf_dep::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
    }
}

fn map_property(property: gltf_dep::animation::Property) -> AnimationProperty {
    match property {
        gltf_dep::animation::Property::Translation => AnimationProperty::Translation,
        gltf_dep::animation::Property::Rotation => AnimationProperty::Rotation,
        gltf_dep::animation::Property::Scale => AnimationProperty::Scale,
        gltf_dep::animation::Property::MorphTargetWeights => {
            AnimationProperty::MorphTargetWeights
        }
    }
}
