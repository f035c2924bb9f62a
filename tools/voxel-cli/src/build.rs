//! Build command - assemble a primitive's shader program
//!
//! Prints both stages to stdout, or writes `<name>.vert.glsl` and
//! `<name>.frag.glsl` into an output directory.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use voxel_shader::{RenderResources, build_render_resources};

use crate::manifest::load_config;

/// Arguments for the build command
#[derive(Args)]
pub struct BuildArgs {
    /// Path to the primitive manifest
    pub manifest: PathBuf,

    /// Directory to write shader files into (prints to stdout if omitted)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

/// Execute the build command
pub fn execute(args: BuildArgs) -> Result<()> {
    let (name, config) = load_config(&args.manifest)?;
    let resources = build_render_resources(&config)
        .with_context(|| format!("Failed to assemble shaders for {}", name))?;

    match args.out_dir {
        Some(out_dir) => {
            let (vertex_path, fragment_path) = write_sources(&resources, &name, &out_dir)?;
            println!("Built {} ({} shape)", name, resources.shape);
            println!("  Vertex:   {}", vertex_path.display());
            println!("  Fragment: {}", fragment_path.display());
            println!("  Intersections: {}", resources.intersection_count);
        }
        None => {
            println!("// {}.vert.glsl", name);
            print!("{}", resources.vertex.source);
            println!();
            println!("// {}.frag.glsl", name);
            print!("{}", resources.fragment.source);
        }
    }

    Ok(())
}

/// Write both stages into `out_dir`, returning the vertex and fragment paths
pub fn write_sources(
    resources: &RenderResources,
    name: &str,
    out_dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let vertex_path = out_dir.join(format!("{name}.vert.glsl"));
    let fragment_path = out_dir.join(format!("{name}.frag.glsl"));

    std::fs::write(&vertex_path, &resources.vertex.source)
        .with_context(|| format!("Failed to write {}", vertex_path.display()))?;
    std::fs::write(&fragment_path, &resources.fragment.source)
        .with_context(|| format!("Failed to write {}", fragment_path.display()))?;

    tracing::debug!(
        "wrote {} ({} bytes) and {} ({} bytes)",
        vertex_path.display(),
        resources.vertex.source.len(),
        fragment_path.display(),
        resources.fragment.source.len()
    );

    Ok((vertex_path, fragment_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_writes_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("terrain.toml");
        std::fs::write(
            &manifest_path,
            "[shape]\nkind = \"BOX\"\n\n[render]\nsample_count = 2\n",
        )
        .unwrap();
        let out_dir = dir.path().join("out");

        execute(BuildArgs {
            manifest: manifest_path,
            out_dir: Some(out_dir.clone()),
        })
        .unwrap();

        let vertex = std::fs::read_to_string(out_dir.join("terrain.vert.glsl")).unwrap();
        let fragment = std::fs::read_to_string(out_dir.join("terrain.frag.glsl")).unwrap();
        assert_eq!(vertex, format!("{}\n", voxel_shader::fragments::VOXEL_VS));
        assert!(fragment.starts_with("#define DEPTH_TEST\n#define SHAPE_BOX\n"));
        assert!(fragment.contains("#define SAMPLE_COUNT 2\n"));
    }

    #[test]
    fn test_build_reports_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(BuildArgs {
            manifest: dir.path().join("missing.toml"),
            out_dir: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest"));
    }
}
