//! Voxel CLI - Assemble and inspect voxel primitive shaders
//!
//! # Commands
//!
//! - `voxel build` - Assemble both stages and print or write them
//! - `voxel slots` - Print the intersection slot table
//! - `voxel inspect` - Print defines and uniform declarations per stage
//!
//! # Manifest
//!
//! ```toml
//! name = "clouds"
//!
//! [shape]
//! kind = "ELLIPSOID"
//! radii = [6378137.0, 6378137.0, 6356752.3]
//!
//! [shape.ellipsoid]
//! min_height = -1000.0
//! max_height = 20000.0
//!
//! [clipping]
//! union = true
//! planes = [{ normal = [0.0, 0.0, 1.0], distance = 0.0 }]
//!
//! [render]
//! sample_count = 4
//!
//! [custom_shader]
//! path = "clouds.glsl"
//! uniforms = [{ name = "u_density", type = "float", value = 0.8 }]
//! ```

mod build;
mod inspect;
mod manifest;
mod slots;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Voxel CLI - Assemble and inspect voxel primitive shaders
#[derive(Parser)]
#[command(name = "voxel")]
#[command(about = "Assemble and inspect voxel primitive shaders")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble vertex and fragment shaders
    Build(build::BuildArgs),

    /// Print the intersection slot table
    Slots(slots::SlotsArgs),

    /// Print defines and uniform declarations per stage
    Inspect(inspect::InspectArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => build::execute(args),
        Commands::Slots(args) => slots::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
    }
}
