//! Inspect command - show what a build declares without the GLSL bodies

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use voxel_shader::{
    Define, RenderResources, ShapeKind, StageSource, UniformDeclaration, build_render_resources,
};

use crate::manifest::load_config;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Path to the primitive manifest
    pub manifest: PathBuf,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    name: &'a str,
    shape: ShapeKind,
    intersection_count: u32,
    clipping_planes_length: usize,
    vertex: StageReport<'a>,
    fragment: StageReport<'a>,
    /// Uniforms with a bound value, in binding order
    bound_uniforms: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct StageReport<'a> {
    defines: &'a [Define],
    uniforms: &'a [UniformDeclaration],
    source_bytes: usize,
}

impl<'a> StageReport<'a> {
    fn new(stage: &'a StageSource) -> Self {
        Self {
            defines: &stage.defines,
            uniforms: &stage.uniforms,
            source_bytes: stage.source.len(),
        }
    }
}

impl<'a> InspectReport<'a> {
    fn new(name: &'a str, resources: &'a RenderResources) -> Self {
        Self {
            name,
            shape: resources.shape,
            intersection_count: resources.intersection_count,
            clipping_planes_length: resources.clipping_planes_length,
            vertex: StageReport::new(&resources.vertex),
            fragment: StageReport::new(&resources.fragment),
            bound_uniforms: resources.uniform_map.names().collect(),
        }
    }

    fn to_text(&self) -> String {
        let mut lines = vec![
            format!("{} ({} shape)", self.name, self.shape),
            format!("  Intersections: {}", self.intersection_count),
            format!("  Clipping planes: {}", self.clipping_planes_length),
        ];
        for (label, stage) in [("Vertex", &self.vertex), ("Fragment", &self.fragment)] {
            lines.push(format!("  {} stage ({} bytes):", label, stage.source_bytes));
            lines.extend(stage.defines.iter().map(|d| format!("    {}", d)));
            lines.extend(stage.uniforms.iter().map(|u| format!("    {}", u)));
        }
        lines.push(format!("  Bound uniforms: {}", self.bound_uniforms.join(", ")));
        lines.join("\n")
    }
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let (name, config) = load_config(&args.manifest)?;
    let resources = build_render_resources(&config)
        .with_context(|| format!("Failed to assemble shaders for {}", name))?;
    let report = InspectReport::new(&name, &resources);

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        println!("{}", report.to_text());
    }
    Ok(())
}
