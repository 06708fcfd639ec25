//! Cache configuration loaded from TOML.
//!
//! ```toml
//! [cache]
//! watch = true
//! placeholder_scan_bytes = 1024
//!
//! [gltf]
//! bake_skinned_meshes = false
//! ```
//!
//! Every field is optional.

use std::path::Path;

use serde::Deserialize;

/// Top-level cache settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Cache behavior.
    pub cache: CacheSection,
    /// glTF loader options.
    pub gltf: GltfSection,
}

/// `[cache]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Register paths with the file change monitor.
    pub watch: bool,
    /// How many leading bytes to inspect when checking for Git LFS pointers.
    pub placeholder_scan_bytes: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            watch: true,
            placeholder_scan_bytes: 1024,
        }
    }
}

/// `[gltf]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GltfSection {
    /// Include skinned nodes when baking all meshes of a file.
    pub bake_skinned_meshes: bool,
}

impl CacheSettings {
    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("invalid cache settings: {e}"))
    }
}

/// Load cache settings from a TOML file.
///
/// Returns `Err` with a human-readable message if the file cannot be read
/// or parsed.
pub fn load_settings(path: &Path) -> Result<CacheSettings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    toml::from_str(&content).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}
