//! Primitive manifest parsing
//!
//! A manifest describes one voxel primitive: its shape, clipping planes,
//! render flags and custom shader. It converts into a
//! [`PrimitiveConfig`] for the assembler.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use voxel_shader::{
    BoxShape, ClippingPlane, ClippingPlaneCollection, CustomShader, CylinderBounds,
    CylinderShape, EllipsoidBounds, EllipsoidShape, PrimitiveConfig, ShapeKind, UniformMap,
    UniformType, UniformValue, VoxelShape,
};

/// Primitive manifest structure
#[derive(Debug, Deserialize)]
pub struct PrimitiveManifest {
    /// Output file stem; defaults to the manifest file stem
    pub name: Option<String>,
    pub shape: ShapeSection,
    #[serde(default)]
    pub clipping: ClippingSection,
    #[serde(default)]
    pub render: RenderSection,
    pub custom_shader: Option<CustomShaderSection>,
    /// Uniforms bound in addition to the shape's own
    #[serde(default)]
    pub uniforms: Vec<UniformEntry>,
}

/// Shape section
///
/// Only the fields for `kind` are read; the others keep their defaults.
#[derive(Debug, Deserialize)]
pub struct ShapeSection {
    /// BOX, CYLINDER or ELLIPSOID
    pub kind: String,

    /// Box bounds within the unit cube
    #[serde(default = "default_min_bounds")]
    pub min_bounds: [f64; 3],
    #[serde(default = "default_max_bounds")]
    pub max_bounds: [f64; 3],

    /// Ellipsoid radii
    #[serde(default = "default_radii")]
    pub radii: [f64; 3],

    #[serde(default)]
    pub cylinder: CylinderBounds,
    #[serde(default)]
    pub ellipsoid: EllipsoidBounds,
}

fn default_min_bounds() -> [f64; 3] {
    [-1.0; 3]
}

fn default_max_bounds() -> [f64; 3] {
    [1.0; 3]
}

fn default_radii() -> [f64; 3] {
    [1.0; 3]
}

/// Clipping plane section
#[derive(Debug, Deserialize)]
pub struct ClippingSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Clip where any plane clips instead of where all do
    #[serde(default)]
    pub union: bool,
    #[serde(default)]
    pub planes: Vec<ClippingPlane>,
}

impl Default for ClippingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            union: false,
            planes: Vec::new(),
        }
    }
}

/// Render flags section
#[derive(Debug, Deserialize)]
pub struct RenderSection {
    #[serde(default = "default_true")]
    pub depth_test: bool,
    #[serde(default)]
    pub log_depth: bool,
    #[serde(default)]
    pub jitter: bool,
    #[serde(default)]
    pub nearest_sampling: bool,
    #[serde(default)]
    pub padding_before: [u32; 3],
    #[serde(default)]
    pub padding_after: [u32; 3],
    #[serde(default = "default_count")]
    pub sample_count: u32,
    #[serde(default = "default_count")]
    pub metadata_count: u32,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            depth_test: true,
            log_depth: false,
            jitter: false,
            nearest_sampling: false,
            padding_before: [0; 3],
            padding_after: [0; 3],
            sample_count: 1,
            metadata_count: 1,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_count() -> u32 {
    1
}

/// Custom fragment shader section
#[derive(Debug, Deserialize)]
pub struct CustomShaderSection {
    /// Inline GLSL
    pub source: Option<String>,
    /// GLSL file, relative to the manifest
    pub path: Option<String>,
    #[serde(default)]
    pub uniforms: Vec<UniformEntry>,
}

/// Single uniform with a constant value
#[derive(Debug, Deserialize)]
pub struct UniformEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: UniformType,
    pub value: toml::Value,
}

impl UniformEntry {
    pub fn uniform_value(&self) -> Result<UniformValue> {
        parse_uniform_value(self.ty, &self.value)
            .with_context(|| format!("Invalid value for uniform '{}'", self.name))
    }
}

impl PrimitiveManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse primitive manifest")
    }

    /// Output name, falling back to the manifest's file stem
    pub fn output_name(&self, manifest_path: &Path) -> String {
        self.name.clone().unwrap_or_else(|| {
            manifest_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "primitive".to_string())
        })
    }

    /// Build the assembler input; relative paths resolve against `base_dir`
    pub fn into_config(self, base_dir: &Path) -> Result<PrimitiveConfig> {
        let (shape, mut uniform_map) = self.shape.build()?;

        for entry in &self.uniforms {
            uniform_map.insert_constant(entry.name.as_str(), entry.uniform_value()?);
        }

        let custom_shader = match self.custom_shader {
            Some(section) => section.build(base_dir)?,
            None => CustomShader::default(),
        };

        let mut clipping_planes =
            ClippingPlaneCollection::new(self.clipping.planes).with_union(self.clipping.union);
        clipping_planes.enabled = self.clipping.enabled;

        let render = self.render;
        Ok(PrimitiveConfig {
            shape,
            clipping_planes,
            depth_test: render.depth_test,
            use_log_depth: render.log_depth,
            jitter: render.jitter,
            nearest_sampling: render.nearest_sampling,
            padding_before: render.padding_before,
            padding_after: render.padding_after,
            sample_count: render.sample_count,
            metadata_count: render.metadata_count,
            custom_shader,
            uniform_map,
        })
    }
}

/// Load a manifest and convert it, returning the output name alongside
pub fn load_config(path: &Path) -> Result<(String, PrimitiveConfig)> {
    let manifest = PrimitiveManifest::load(path)?;
    let name = manifest.output_name(path);
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = manifest
        .into_config(base_dir)
        .with_context(|| format!("Invalid primitive manifest: {}", path.display()))?;
    Ok((name, config))
}

impl ShapeSection {
    /// Construct the shape and the uniform values its fragments read
    fn build(&self) -> Result<(Arc<dyn VoxelShape>, UniformMap)> {
        let kind: ShapeKind = self.kind.parse()?;
        let built: (Arc<dyn VoxelShape>, UniformMap) = match kind {
            ShapeKind::Box => {
                let shape = BoxShape::new(self.min_bounds, self.max_bounds)?;
                let uniforms = shape.uniform_map();
                (Arc::new(shape), uniforms)
            }
            ShapeKind::Cylinder => {
                let shape = CylinderShape::new(self.cylinder)?;
                let uniforms = shape.uniform_map();
                (Arc::new(shape), uniforms)
            }
            ShapeKind::Ellipsoid => {
                let shape = EllipsoidShape::new(self.radii, self.ellipsoid)?;
                let uniforms = shape.uniform_map();
                (Arc::new(shape), uniforms)
            }
        };
        Ok(built)
    }
}

impl CustomShaderSection {
    fn build(self, base_dir: &Path) -> Result<CustomShader> {
        let text = match (self.source, self.path) {
            (Some(_), Some(_)) => bail!("custom_shader sets both 'source' and 'path'"),
            (Some(source), None) => source,
            (None, Some(path)) => {
                let path: PathBuf = base_dir.join(path);
                std::fs::read_to_string(&path).with_context(|| {
                    format!("Failed to read custom shader: {}", path.display())
                })?
            }
            (None, None) => bail!("custom_shader needs 'source' or 'path'"),
        };

        let mut shader = CustomShader::new(text);
        for entry in &self.uniforms {
            shader = shader.with_constant_uniform(entry.name.as_str(), entry.uniform_value()?);
        }
        Ok(shader)
    }
}

fn parse_uniform_value(ty: UniformType, value: &toml::Value) -> Result<UniformValue> {
    Ok(match ty {
        UniformType::Float => UniformValue::Float(number(value)?),
        UniformType::Int => UniformValue::Int(integer(value)?),
        UniformType::Bool => UniformValue::Bool(
            value
                .as_bool()
                .with_context(|| format!("expected a boolean, found {}", value.type_str()))?,
        ),
        UniformType::Vec2 => UniformValue::Vec2(numbers(value)?),
        UniformType::Vec3 => UniformValue::Vec3(numbers(value)?),
        UniformType::Vec4 => UniformValue::Vec4(numbers(value)?),
        UniformType::Mat2 => UniformValue::Mat2(numbers(value)?),
        UniformType::Mat3 => UniformValue::Mat3(numbers(value)?),
        UniformType::Mat4 => UniformValue::Mat4(numbers(value)?),
        UniformType::Sampler2D => UniformValue::Texture(
            u32::try_from(integer(value)?).context("texture handle must not be negative")?,
        ),
    })
}

fn number(value: &toml::Value) -> Result<f32> {
    match value {
        toml::Value::Float(f) => Ok(*f as f32),
        toml::Value::Integer(i) => Ok(*i as f32),
        other => bail!("expected a number, found {}", other.type_str()),
    }
}

fn integer(value: &toml::Value) -> Result<i32> {
    let i = value
        .as_integer()
        .with_context(|| format!("expected an integer, found {}", value.type_str()))?;
    i32::try_from(i).with_context(|| format!("{i} does not fit in a 32-bit int"))
}

fn numbers<const N: usize>(value: &toml::Value) -> Result<[f32; N]> {
    let items = value
        .as_array()
        .with_context(|| format!("expected an array of {N} numbers, found {}", value.type_str()))?;
    if items.len() != N {
        bail!("expected {N} numbers, found {}", items.len());
    }

    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = number(item)?;
    }
    Ok(out)
}
