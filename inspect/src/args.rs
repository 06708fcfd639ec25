//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Load a mesh file through the mesh cache and print what it contains.
#[derive(Parser, Debug)]
#[command(
    name = "inspect",
    about = "Inspect a glTF/GLB or compressed mesh file",
    long_about = "Loads a mesh file the same way the editor does and prints a summary \
        of its geometry and scenegraph.\n\n\
        EXAMPLES:\n\
          # Summarize the first mesh and the scenegraph\n\
          inspect assets/crate.glb\n\
        \n\
          # Bake every mesh instance with node transforms applied\n\
          inspect assets/level.gltf --bake\n\
        \n\
          # Keep running and report every change to the file\n\
          inspect assets/crate.ctm --watch",
    version
)]
pub struct Args {
    /// Mesh file to load.
    pub file: PathBuf,

    /// Mesh index within the file.
    #[arg(long, default_value = "0", conflicts_with = "bake")]
    pub submesh: usize,

    /// Bake all mesh instances into one mesh.
    #[arg(long)]
    pub bake: bool,

    /// Watch the file and print a new summary on every change.
    #[arg(long)]
    pub watch: bool,

    /// Cache settings file (TOML).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["inspect", "mesh.glb"]).unwrap();
        assert_eq!(args.file, PathBuf::from("mesh.glb"));
        assert_eq!(args.submesh, 0);
        assert!(!args.bake);
        assert!(!args.watch);
        assert!(args.config.is_none());
    }

    #[test]
    fn all_flags() {
        let args = Args::try_parse_from([
            "inspect", "mesh.gltf", "--submesh", "2", "--watch", "--config", "cache.toml",
        ])
        .unwrap();
        assert_eq!(args.submesh, 2);
        assert!(args.watch);
        assert_eq!(args.config, Some(PathBuf::from("cache.toml")));
    }

    #[test]
    fn bake_conflicts_with_submesh() {
        assert!(Args::try_parse_from(["inspect", "m.glb", "--bake", "--submesh", "1"]).is_err());
    }
}
