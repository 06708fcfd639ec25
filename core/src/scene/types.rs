//! Scene graph data types.
//!
//! All types use plain arrays (`[f32; 3]`, `[f32; 4]`, etc.) instead of
//! math library types. Nodes are stored flat and reference each other by
//! index so that skins and animation channels can address them directly.

/// Node transform decomposed into translation, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    /// Translation [x, y, z].
    pub translation: [f32; 3],
    /// Rotation quaternion [x, y, z, w].
    pub rotation: [f32; 4],
    /// Scale [x, y, z].
    pub scale: [f32; 3],
}

impl NodeTransform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Returns this transform with a different translation.
    #[must_use]
    pub const fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }

    /// Returns this transform with a different rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this transform with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    /// Whether this is exactly the identity transform.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Local TRS matrix.
    pub fn to_matrix(&self) -> crate::math::Mat4 {
        crate::math::mat4_from_scale_rotation_translation(
            self.scale.into(),
            crate::math::quat_from_xyzw(self.rotation),
            self.translation.into(),
        )
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A node of a [`MeshScenegraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScenegraphNode {
    /// Node name, if any.
    pub name: Option<String>,
    /// Index of the parent node, `None` for roots.
    pub parent: Option<usize>,
    /// Indices of child nodes, in file order.
    pub children: Vec<usize>,
    /// Local transform relative to the parent.
    pub transform: NodeTransform,
    /// Index into [`MeshScenegraph::meshes`].
    pub mesh: Option<usize>,
    /// Index into [`MeshScenegraph::cameras`].
    pub camera: Option<usize>,
    /// Index into [`MeshScenegraph::skins`].
    pub skin: Option<usize>,
}

impl ScenegraphNode {
    /// Creates a new node with identity transform and no attachments.
    pub fn new() -> Self {
        Self {
            name: None,
            parent: None,
            children: Vec::new(),
            transform: NodeTransform::IDENTITY,
            mesh: None,
            camera: None,
            skin: None,
        }
    }

    /// Set the node name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the mesh index.
    #[must_use]
    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Set the camera index.
    #[must_use]
    pub fn with_camera(mut self, camera: usize) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Set the skin index.
    #[must_use]
    pub fn with_skin(mut self, skin: usize) -> Self {
        self.skin = Some(skin);
        self
    }
}

impl Default for ScenegraphNode {
    fn default() -> Self {
        Self::new()
    }
}

/// A mesh entry: one independently loadable sub-mesh of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInfo {
    /// Mesh name, if any.
    pub name: Option<String>,
    /// Material index of each primitive.
    pub primitive_materials: Vec<Option<usize>>,
}

/// A material entry. Only the properties the editor displays are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialInfo {
    /// Material name, if any.
    pub name: Option<String>,
    /// Base color factor (linear RGBA).
    pub base_color_factor: [f32; 4],
    /// Whether the material is double-sided.
    pub double_sided: bool,
}

impl Default for MaterialInfo {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            double_sided: false,
        }
    }
}

// -- Cameras --

/// A camera definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCamera {
    /// Camera name.
    pub name: Option<String>,
    /// Projection type and parameters.
    pub projection: CameraProjection,
}

/// Camera projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraProjection {
    /// Perspective projection.
    Perspective {
        /// Vertical field of view in radians.
        yfov: f32,
        /// Aspect ratio (width/height), if specified.
        aspect: Option<f32>,
        /// Near clipping plane distance.
        znear: f32,
        /// Far clipping plane distance, if specified.
        zfar: Option<f32>,
    },
    /// Orthographic projection.
    Orthographic {
        /// Horizontal magnification.
        xmag: f32,
        /// Vertical magnification.
        ymag: f32,
        /// Near clipping plane distance.
        znear: f32,
        /// Far clipping plane distance.
        zfar: f32,
    },
}

// -- Skins --

/// Skin description as listed in the scenegraph.
///
/// Matrices are not part of the graph; extract them with a skin load.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinInfo {
    /// Skin name.
    pub name: Option<String>,
    /// Joint node indices.
    pub joints: Vec<usize>,
    /// Root skeleton node index, if specified.
    pub skeleton: Option<usize>,
}

// -- Animations --

/// Keyframe interpolation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Linear interpolation (slerp for rotations).
    Linear,
    /// Step (constant) interpolation.
    Step,
    /// Cubic spline with in/out tangents.
    CubicSpline,
}

/// Node property targeted by an animation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationProperty {
    /// Translation `[x, y, z]`.
    Translation,
    /// Rotation quaternion `[x, y, z, w]`.
    Rotation,
    /// Scale `[x, y, z]`.
    Scale,
    /// Morph target weights.
    MorphTargetWeights,
}

impl AnimationProperty {
    /// Number of output components per keyframe.
    pub fn components(&self) -> usize {
        match self {
            Self::Translation | Self::Scale => 3,
            Self::Rotation => 4,
            Self::MorphTargetWeights => 1,
        }
    }
}

/// One sampler of an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSamplerInfo {
    /// Interpolation mode.
    pub interpolation: Interpolation,
    /// Number of keyframes.
    pub keyframe_count: usize,
}

/// One channel of an animation: which sampler drives which node property.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationChannelInfo {
    /// Index into [`AnimationInfo::samplers`].
    pub sampler: usize,
    /// Target node index.
    pub target_node: usize,
    /// Animated property.
    pub property: AnimationProperty,
}

/// An animation with its sampler list.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationInfo {
    /// Animation name.
    pub name: Option<String>,
    /// Samplers, addressed by index when extracting sampler data.
    pub samplers: Vec<AnimationSamplerInfo>,
    /// Channels binding samplers to nodes.
    pub channels: Vec<AnimationChannelInfo>,
}

/// Parsed node hierarchy and resource listing of a mesh file.
///
/// Owned by the loader that parsed it. Resource references are indices into
/// the arrays of the same graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshScenegraph {
    /// All nodes, flat.
    pub nodes: Vec<ScenegraphNode>,
    /// Root nodes of the default scene, in order.
    pub root_nodes: Vec<usize>,
    /// Meshes (sub-meshes of the file).
    pub meshes: Vec<MeshInfo>,
    /// Materials.
    pub materials: Vec<MaterialInfo>,
    /// Cameras.
    pub cameras: Vec<SceneCamera>,
    /// Skins.
    pub skins: Vec<SkinInfo>,
    /// Animations.
    pub animations: Vec<AnimationInfo>,
}

impl MeshScenegraph {
    /// Creates an empty scenegraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its index.
    ///
    /// Links the node to `parent`; a `None` parent makes it a root.
    pub fn add_node(&mut self, mut node: ScenegraphNode, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        node.parent = parent;
        self.nodes.push(node);
        match parent {
            Some(p) => self.nodes[p].children.push(index),
            None => self.root_nodes.push(index),
        }
        index
    }

    /// Find the first node with the given name.
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.name.as_deref() == Some(name))
    }

    /// Depth-first order of nodes reachable from the roots.
    pub fn traverse(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.root_nodes.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            if index >= self.nodes.len() || order.contains(&index) {
                continue;
            }
            order.push(index);
            stack.extend(self.nodes[index].children.iter().rev());
        }
        order
    }

    /// World matrix of a node (product of its ancestors' local transforms).
    pub fn world_matrix(&self, index: usize) -> crate::math::Mat4 {
        let mut matrix = crate::math::Mat4::identity();
        let mut current = Some(index);
        let mut guard = 0;
        while let Some(i) = current {
            let Some(node) = self.nodes.get(i) else {
                break;
            };
            matrix = node.transform.to_matrix() * matrix;
            current = node.parent;
            guard += 1;
            if guard > self.nodes.len() {
                log::warn!("Cycle detected in node hierarchy at node {index}");
                break;
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_transform_default_is_identity() {
        let t = NodeTransform::default();
        assert_eq!(t, NodeTransform::IDENTITY);
        assert!(t.is_identity());
        assert_eq!(t.rotation, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn node_transform_builder() {
        let t = NodeTransform::IDENTITY
            .with_translation([1.0, 2.0, 3.0])
            .with_rotation([0.0, 0.707, 0.0, 0.707])
            .with_scale([2.0, 2.0, 2.0]);
        assert_eq!(t.translation, [1.0, 2.0, 3.0]);
        assert_eq!(t.scale, [2.0, 2.0, 2.0]);
        assert!(!t.is_identity());
    }

    #[test]
    fn add_node_links_parent_and_roots() {
        let mut graph = MeshScenegraph::new();
        let root = graph.add_node(ScenegraphNode::new().with_name("root"), None);
        let child = graph.add_node(ScenegraphNode::new().with_name("child").with_mesh(0), Some(root));
        assert_eq!(graph.root_nodes, vec![root]);
        assert_eq!(graph.nodes[root].children, vec![child]);
        assert_eq!(graph.nodes[child].parent, Some(root));
        assert_eq!(graph.find_node("child"), Some(child));
        assert_eq!(graph.traverse(), vec![root, child]);
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut graph = MeshScenegraph::new();
        let root = graph.add_node(
            ScenegraphNode::new()
                .with_transform(NodeTransform::IDENTITY.with_translation([1.0, 0.0, 0.0])),
            None,
        );
        let child = graph.add_node(
            ScenegraphNode::new()
                .with_transform(NodeTransform::IDENTITY.with_translation([0.0, 2.0, 0.0])),
            Some(root),
        );
        let p = crate::math::transform_point(&graph.world_matrix(child), [0.0, 0.0, 0.0]);
        assert_eq!(p, [1.0, 2.0, 0.0]);
    }
}
