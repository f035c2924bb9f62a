//! GLSL fragment library embedded at compile time.
//!
//! Fragments are trusted inputs: they reference only macros the assembler
//! defines, plus `vx_*` built-ins and the `FragmentInput` / `vx_modelMaterial`
//! types that the program compiler's prelude supplies.
//!
//! Ordering between fragments is significant. Later fragments call functions
//! and read macros and uniforms introduced by earlier ones, so a stage only
//! compiles when the assembler concatenates them in its documented order.

macro_rules! glsl {
    ($file:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/", $file))
    };
}

/// Vertex entry point (bounding quad)
pub const VOXEL_VS: &str = glsl!("voxel_vs.glsl");

/// Fragment entry point (ray march loop)
pub const VOXEL_FS: &str = glsl!("voxel_fs.glsl");

/// Octree traversal; sized by `SAMPLE_COUNT`
pub const OCTREE: &str = glsl!("octree.glsl");

/// Ray type and the per-ray intersection list; sized by `INTERSECTION_COUNT`
pub const INTERSECTION_UTILS: &str = glsl!("intersection_utils.glsl");

/// Megatexture sampling through `u_megatextureTextures`
pub const MEGATEXTURE: &str = glsl!("megatexture.glsl");

/// Clipping plane test
pub const INTERSECT_CLIPPING_PLANES: &str = glsl!("intersect_clipping_planes.glsl");

/// Scene depth test
pub const INTERSECT_DEPTH: &str = glsl!("intersect_depth.glsl");

/// Shape-independent intersection driver
pub const INTERSECTION: &str = glsl!("intersection.glsl");

pub const CONVERT_UV_TO_BOX: &str = glsl!("convert_uv_to_box.glsl");
pub const INTERSECT_BOX: &str = glsl!("intersect_box.glsl");

pub const CONVERT_UV_TO_CYLINDER: &str = glsl!("convert_uv_to_cylinder.glsl");
pub const INTERSECT_CYLINDER: &str = glsl!("intersect_cylinder.glsl");

pub const CONVERT_UV_TO_ELLIPSOID: &str = glsl!("convert_uv_to_ellipsoid.glsl");
pub const INTERSECT_ELLIPSOID: &str = glsl!("intersect_ellipsoid.glsl");

/// Marker appended after user-supplied text so compiler diagnostics for the
/// fragments that follow report their own line numbers.
pub const LINE_RESET_MARKER: &str = "#line 0";

/// Fragment shader used when a primitive carries no custom shader
pub const DEFAULT_CUSTOM_FRAGMENT_SHADER: &str = "void fragmentMain(FragmentInput fsInput, inout vx_modelMaterial material)
{
    material.diffuse = vec3(1.0);
    material.alpha = 1.0;
}
";
