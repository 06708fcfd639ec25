//! Named vertex attributes.

/// Well-known attribute names.
///
/// These follow glTF semantic naming so that geometry coming from either
/// format addresses its attributes the same way.
pub mod names {
    /// Vertex positions (`Float3`).
    pub const POSITION: &str = "POSITION";
    /// Vertex normals (`Float3`).
    pub const NORMAL: &str = "NORMAL";
    /// Tangents with handedness in w (`Float4`).
    pub const TANGENT: &str = "TANGENT";
    /// Vertex color (`Float4`).
    pub const COLOR_0: &str = "COLOR_0";
    /// Skinning joint indices, stored as floats (`Float4`).
    pub const JOINTS_0: &str = "JOINTS_0";
    /// Skinning weights (`Float4`).
    pub const WEIGHTS_0: &str = "WEIGHTS_0";

    /// Name of the texture coordinate set `set` (`TEXCOORD_<set>`).
    pub fn tex_coord(set: usize) -> String {
        format!("TEXCOORD_{set}")
    }
}

/// Component layout of a vertex attribute. All components are `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeFormat {
    /// Single float.
    Float,
    /// 2 floats.
    Float2,
    /// 3 floats.
    Float3,
    /// 4 floats.
    Float4,
}

impl AttributeFormat {
    /// Number of components per element.
    pub fn components(&self) -> usize {
        match self {
            Self::Float => 1,
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 => 4,
        }
    }

    /// Size in bytes of one element.
    pub fn size(&self) -> usize {
        self.components() * std::mem::size_of::<f32>()
    }

    /// Format with the given component count, if supported.
    pub fn from_components(components: usize) -> Option<Self> {
        match components {
            1 => Some(Self::Float),
            2 => Some(Self::Float2),
            3 => Some(Self::Float3),
            4 => Some(Self::Float4),
            _ => None,
        }
    }
}

/// A named, typed vertex attribute array.
///
/// Data is stored flat: `element_count() * format.components()` floats.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    /// Attribute name (see [`names`]).
    pub name: String,
    /// Component layout.
    pub format: AttributeFormat,
    /// Flat component data.
    pub data: Vec<f32>,
}

impl VertexAttribute {
    /// Create an attribute from flat component data.
    pub fn new(name: impl Into<String>, format: AttributeFormat, data: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            format,
            data,
        }
    }

    /// Create a `Float2` attribute from per-vertex arrays.
    pub fn from_vec2(name: impl Into<String>, values: &[[f32; 2]]) -> Self {
        Self::new(name, AttributeFormat::Float2, values.concat())
    }

    /// Create a `Float3` attribute from per-vertex arrays.
    pub fn from_vec3(name: impl Into<String>, values: &[[f32; 3]]) -> Self {
        Self::new(name, AttributeFormat::Float3, values.concat())
    }

    /// Create a `Float4` attribute from per-vertex arrays.
    pub fn from_vec4(name: impl Into<String>, values: &[[f32; 4]]) -> Self {
        Self::new(name, AttributeFormat::Float4, values.concat())
    }

    /// Number of elements (vertices) stored.
    pub fn element_count(&self) -> usize {
        self.data.len() / self.format.components()
    }

    /// Components of element `index`.
    pub fn element(&self, index: usize) -> Option<&[f32]> {
        let c = self.format.components();
        self.data.get(index * c..(index + 1) * c)
    }

    /// Raw bytes of the attribute data (native endianness).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}
