//! Render resource assembly
//!
//! [`build_render_resources`] turns a [`PrimitiveConfig`] snapshot into the
//! two shader sources plus the uniform bindings they read. Every call starts
//! from a fresh [`ShaderBuilder`], so rebuilding after a config change never
//! sees state from a previous build.

use crate::builder::{ShaderBuilder, ShaderStage, StageSource};
use crate::clipping::CLIPPING_PLANES_UNIFORM;
use crate::config::PrimitiveConfig;
use crate::error::BuildError;
use crate::fragments;
use crate::intersection::allocate_intersections;
use crate::shape::{ShapeKind, select_shape_module};
use crate::uniforms::{UniformMap, UniformValue, resolve_uniforms};

/// Assembled shader program and the uniform bindings it reads
#[derive(Debug, Clone)]
pub struct RenderResources {
    pub shape: ShapeKind,
    pub vertex: StageSource,
    pub fragment: StageSource,
    pub uniform_map: UniformMap,
    pub clipping_planes_length: usize,
    pub intersection_count: u32,
}

/// Build the vertex and fragment programs for one primitive
///
/// # Errors
///
/// Fails if the shape reports no maximum intersection count, if
/// `metadata_count` or `sample_count` is zero, if the intersection slots
/// overflow a `u32`, or if two contributors declare the same define or
/// uniform differently. Nothing is returned in that case.
pub fn build_render_resources(config: &PrimitiveConfig) -> Result<RenderResources, BuildError> {
    if config.sample_count == 0 {
        return Err(BuildError::InvalidSampleCount);
    }

    let mut builder = ShaderBuilder::new();

    let mut uniform_map = resolve_uniforms(
        &config.uniform_map,
        &config.custom_shader,
        config.metadata_count,
        &mut builder,
    )?;

    builder.add_vertex_lines(&[fragments::VOXEL_VS]);

    builder.add_custom_fragment_lines(config.custom_shader.fragment_shader_text());
    builder.add_fragment_lines(&[
        fragments::OCTREE,
        fragments::INTERSECTION_UTILS,
        fragments::MEGATEXTURE,
    ]);

    let clipping_planes_length = config.clipping_planes.active_len();
    let clipping_union = config.clipping_planes.union_clipping_regions;
    if clipping_planes_length > 0 {
        builder.add_define("CLIPPING_PLANES", None, ShaderStage::Fragment)?;
        builder.add_define(
            "CLIPPING_PLANES_COUNT",
            Some(clipping_planes_length.to_string()),
            ShaderStage::Fragment,
        )?;
        if clipping_union {
            builder.add_define("CLIPPING_PLANES_UNION", None, ShaderStage::Fragment)?;
        }
        builder.add_fragment_lines(&[fragments::INTERSECT_CLIPPING_PLANES]);
        uniform_map.insert_constant(
            CLIPPING_PLANES_UNIFORM,
            UniformValue::Vec4Array(config.clipping_planes.plane_equations()),
        );
    }

    if config.depth_test {
        builder.add_define("DEPTH_TEST", None, ShaderStage::Fragment)?;
        builder.add_fragment_lines(&[fragments::INTERSECT_DEPTH]);
    }

    let shape_module = select_shape_module(config.shape.as_ref())?;
    shape_module.apply(&mut builder)?;

    builder.add_fragment_lines(&[fragments::VOXEL_FS]);

    let slots = allocate_intersections(
        shape_module.maximum_intersections,
        clipping_planes_length,
        clipping_union,
        config.depth_test,
    )?;
    for (name, value) in slots.defines() {
        builder.add_define(name, Some(value), ShaderStage::Fragment)?;
    }

    for (name, enabled) in [
        ("PADDING", config.has_padding()),
        ("LOG_DEPTH_READ_ONLY", config.use_log_depth),
        ("JITTER", config.jitter),
        ("NEAREST_SAMPLING", config.nearest_sampling),
    ] {
        if enabled {
            builder.add_define(name, None, ShaderStage::Fragment)?;
        }
    }

    builder.add_define(
        "SAMPLE_COUNT",
        Some(config.sample_count.to_string()),
        ShaderStage::Fragment,
    )?;

    let program = builder.finalize();

    tracing::debug!(
        "built {} voxel program: {} intersections, {} clipping planes, {} fragment defines, {} uniforms",
        shape_module.kind,
        slots.total,
        clipping_planes_length,
        program.fragment.defines.len(),
        uniform_map.len()
    );

    Ok(RenderResources {
        shape: shape_module.kind,
        vertex: program.vertex,
        fragment: program.fragment,
        uniform_map,
        clipping_planes_length,
        intersection_count: slots.total,
    })
}
