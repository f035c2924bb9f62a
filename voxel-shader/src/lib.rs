//! Voxel shader composition
//!
//! Assembles the vertex and fragment GLSL programs for a volumetric voxel
//! primitive from a fixed fragment library, selecting fragments and compile
//! time defines from the primitive's shape, clipping planes, depth test and
//! custom shader. The entry point is [`build_render_resources`].

pub mod assembler;
pub mod builder;
pub mod clipping;
pub mod config;
pub mod custom_shader;
pub mod error;
pub mod fragments;
pub mod intersection;
pub mod shape;
pub mod uniforms;

pub use assembler::{RenderResources, build_render_resources};
pub use builder::{
    Define, DefineValue, ShaderBuilder, ShaderProgramSource, ShaderStage, StageSource,
    UniformDeclaration,
};
pub use clipping::{ClippingPlane, ClippingPlaneCollection};
pub use config::PrimitiveConfig;
pub use custom_shader::{CustomShader, CustomUniform};
pub use error::BuildError;
pub use intersection::{
    IntersectionFeature, IntersectionSlot, IntersectionSlotTable, allocate_intersections,
};
pub use shape::{
    BoxShape, CylinderBounds, CylinderShape, EllipsoidBounds, EllipsoidShape, ShapeKind,
    ShapeModule, VoxelShape, select_shape_module,
};
pub use uniforms::{UniformAccessor, UniformMap, UniformType, UniformValue, resolve_uniforms};
