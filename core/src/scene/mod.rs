//! Scene graph types for loaded mesh files.
//!
//! These types are format-agnostic and can be produced by any loader or
//! built programmatically (for export).
//!
//! - [`MeshScenegraph`] - flat node list with resource tables
//! - [`ScenegraphNode`] - a node with TRS transform and attachments
//! - [`NodeTransform`] - TRS transform using plain arrays
//! - [`SceneCamera`] / [`CameraProjection`] - Camera definitions
//! - [`AnimationSamplerData`] / [`SkinData`] - extracted payloads

mod animation;
mod types;

pub use animation::{AnimationSamplerData, SharedAnimationSamplerData, SharedSkinData, SkinData};
pub use types::{
    AnimationChannelInfo, AnimationInfo, AnimationProperty, AnimationSamplerInfo,
    CameraProjection, Interpolation, MaterialInfo, MeshInfo, MeshScenegraph, NodeTransform,
    SceneCamera, ScenegraphNode, SkinInfo,
};
