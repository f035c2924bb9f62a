//! Slots command - print a primitive's intersection slot table

use anyhow::Result;
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;

use voxel_shader::{
    IntersectionSlotTable, PrimitiveConfig, ShapeModule, allocate_intersections,
    select_shape_module,
};

use crate::manifest::load_config;

/// Arguments for the slots command
#[derive(Args)]
pub struct SlotsArgs {
    /// Path to the primitive manifest
    pub manifest: PathBuf,
}

/// Execute the slots command
pub fn execute(args: SlotsArgs) -> Result<()> {
    let (name, config) = load_config(&args.manifest)?;
    let (module, table) = slot_table(&config)?;
    print!("{}", render_table(&name, &module, &table));
    Ok(())
}

fn slot_table(config: &PrimitiveConfig) -> Result<(ShapeModule, IntersectionSlotTable)> {
    let module = select_shape_module(config.shape.as_ref())?;
    let table = allocate_intersections(
        module.maximum_intersections,
        config.clipping_planes.active_len(),
        config.clipping_planes.union_clipping_regions,
        config.depth_test,
    )?;
    Ok((module, table))
}

fn render_table(name: &str, module: &ShapeModule, table: &IntersectionSlotTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} shape)", name, module.kind);

    let shape_indices = module
        .defines
        .iter()
        .filter(|(define, _)| define.contains("_INTERSECTION_INDEX"))
        .filter_map(|(define, value)| value.to_builder_value().flatten().map(|v| (define, v)));
    for (define, index) in shape_indices {
        let _ = writeln!(out, "  {:>3}  {}", index, define);
    }
    for (define, index) in table.defines() {
        if define == voxel_shader::intersection::INTERSECTION_COUNT_DEFINE {
            continue;
        }
        let _ = writeln!(out, "  {:>3}  {}", index, define);
    }
    let _ = writeln!(
        out,
        "  total {} ({} shape, {} global)",
        table.total,
        table.shape_slots,
        table.total - table.shape_slots
    );
    out
}
