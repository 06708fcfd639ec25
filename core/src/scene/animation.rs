//! Animation sampler and skin payloads extracted from mesh files.

use std::sync::Arc;

use super::types::{AnimationProperty, Interpolation};

/// Shared handle to extracted sampler data.
pub type SharedAnimationSamplerData = Arc<AnimationSamplerData>;

/// Shared handle to extracted skin data.
pub type SharedSkinData = Arc<SkinData>;

/// Keyframes and output values of one animation sampler.
///
/// `output` is flat: `keyframes.len() * components` floats, or three times
/// that for [`Interpolation::CubicSpline`] (in-tangent, value, out-tangent).
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSamplerData {
    /// Interpolation mode.
    pub interpolation: Interpolation,
    /// Property the sampler output is applied to.
    pub property: AnimationProperty,
    /// Keyframe times in seconds.
    pub keyframes: Vec<f32>,
    /// Flat output values.
    pub output: Vec<f32>,
    /// Components per output element.
    pub components: usize,
}

impl AnimationSamplerData {
    /// Number of keyframes.
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Duration of the sampler (time of the last keyframe).
    pub fn duration(&self) -> f32 {
        self.keyframes.last().copied().unwrap_or(0.0)
    }

    /// Output value at keyframe `index`, skipping spline tangents.
    pub fn value(&self, index: usize) -> Option<&[f32]> {
        let stride = match self.interpolation {
            Interpolation::CubicSpline => 3,
            _ => 1,
        };
        let offset = match self.interpolation {
            Interpolation::CubicSpline => self.components,
            _ => 0,
        };
        let start = index * stride * self.components + offset;
        self.output.get(start..start + self.components)
    }
}

/// Joints and inverse bind matrices of one skin.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinData {
    /// Skin name.
    pub name: Option<String>,
    /// Joint node indices.
    pub joints: Vec<usize>,
    /// Inverse bind matrices, column-major, one per joint.
    pub inverse_bind_matrices: Vec<[f32; 16]>,
    /// Root skeleton node index, if specified.
    pub skeleton: Option<usize>,
}

impl SkinData {
    /// Number of joints.
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}
