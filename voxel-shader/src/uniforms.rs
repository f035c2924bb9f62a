//! Uniform values, ordered uniform maps and uniform binding resolution

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::builder::{ShaderBuilder, ShaderStage};
use crate::custom_shader::CustomShader;
use crate::error::BuildError;

/// Name of the reserved sampler array read by the megatexture fragment
pub const MEGATEXTURE_TEXTURES_UNIFORM: &str = "u_megatextureTextures";

/// GLSL type of a uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UniformType {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
}

impl UniformType {
    pub fn glsl_name(self) -> &'static str {
        match self {
            UniformType::Float => "float",
            UniformType::Int => "int",
            UniformType::Bool => "bool",
            UniformType::Vec2 => "vec2",
            UniformType::Vec3 => "vec3",
            UniformType::Vec4 => "vec4",
            UniformType::Mat2 => "mat2",
            UniformType::Mat3 => "mat3",
            UniformType::Mat4 => "mat4",
            UniformType::Sampler2D => "sampler2D",
        }
    }
}

impl fmt::Display for UniformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

/// Host-side value pushed to a uniform at draw time
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
    /// Element values of a `vec4` array uniform
    Vec4Array(Vec<[f32; 4]>),
    /// Texture handle owned by the renderer
    Texture(u32),
}

impl UniformValue {
    /// Element type; arrays report the type of one element
    pub fn uniform_type(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Int(_) => UniformType::Int,
            UniformValue::Bool(_) => UniformType::Bool,
            UniformValue::Vec2(_) => UniformType::Vec2,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Vec4(_) | UniformValue::Vec4Array(_) => UniformType::Vec4,
            UniformValue::Mat2(_) => UniformType::Mat2,
            UniformValue::Mat3(_) => UniformType::Mat3,
            UniformValue::Mat4(_) => UniformType::Mat4,
            UniformValue::Texture(_) => UniformType::Sampler2D,
        }
    }
}

/// Zero-argument accessor producing a uniform's current value
pub type UniformAccessor = Arc<dyn Fn() -> UniformValue + Send + Sync>;

/// Accessor that always returns `value`
pub fn constant(value: UniformValue) -> UniformAccessor {
    Arc::new(move || value.clone())
}

/// Insertion-ordered map from uniform name to accessor
///
/// Inserting an existing name replaces its accessor in place, so iteration
/// order reflects first insertion.
#[derive(Clone, Default)]
pub struct UniformMap {
    entries: Vec<(String, UniformAccessor)>,
    index: HashMap<String, usize>,
}

impl UniformMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the replaced accessor
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        accessor: UniformAccessor,
    ) -> Option<UniformAccessor> {
        let name = name.into();
        if let Some(&i) = self.index.get(&name) {
            return Some(std::mem::replace(&mut self.entries[i].1, accessor));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, accessor));
        None
    }

    pub fn insert_constant(&mut self, name: impl Into<String>, value: UniformValue) {
        self.insert(name, constant(value));
    }

    pub fn get(&self, name: &str) -> Option<&UniformAccessor> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Evaluate the accessor for `name`
    pub fn value(&self, name: &str) -> Option<UniformValue> {
        self.get(name).map(|accessor| accessor())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformAccessor)> {
        self.entries
            .iter()
            .map(|(name, accessor)| (name.as_str(), accessor))
    }

    /// Merge `other` into `self`; entries of `other` win on collision
    pub fn merge(&mut self, other: &UniformMap) {
        for (name, accessor) in other.iter() {
            if self.insert(name, Arc::clone(accessor)).is_some() {
                tracing::debug!("uniform {} overridden during merge", name);
            }
        }
    }
}

impl fmt::Debug for UniformMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Merge the primitive's uniforms with the custom shader's and declare the
/// custom uniforms plus the reserved megatexture sampler array on the
/// fragment stage.
///
/// Custom shader entries override base entries that share a name.
///
/// # Errors
///
/// Returns `BuildError::InvalidMetadataCount` if `metadata_count` is zero, or
/// a builder conflict if a custom uniform collides with an earlier declaration.
pub fn resolve_uniforms(
    base: &UniformMap,
    custom_shader: &CustomShader,
    metadata_count: u32,
    builder: &mut ShaderBuilder,
) -> Result<UniformMap, BuildError> {
    if metadata_count == 0 {
        return Err(BuildError::InvalidMetadataCount);
    }

    for (name, uniform) in custom_shader.uniforms() {
        builder.add_uniform(uniform.ty, name, None, ShaderStage::Fragment)?;
    }

    let mut uniform_map = base.clone();
    uniform_map.merge(&custom_shader.uniform_map());

    // Shared fragments sample through this array whether or not the custom
    // shader reads metadata.
    builder.add_uniform(
        UniformType::Sampler2D,
        MEGATEXTURE_TEXTURES_UNIFORM,
        Some(metadata_count),
        ShaderStage::Fragment,
    )?;

    Ok(uniform_map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = UniformMap::new();
        map.insert_constant("u_a", UniformValue::Float(1.0));
        map.insert_constant("u_b", UniformValue::Float(2.0));
        map.insert_constant("u_a", UniformValue::Float(3.0));

        assert_eq!(map.names().collect::<Vec<_>>(), vec!["u_a", "u_b"]);
        assert_eq!(map.value("u_a"), Some(UniformValue::Float(3.0)));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base = UniformMap::new();
        base.insert_constant("u_shared", UniformValue::Int(1));
        base.insert_constant("u_base", UniformValue::Int(2));

        let mut other = UniformMap::new();
        other.insert_constant("u_shared", UniformValue::Int(10));
        other.insert_constant("u_other", UniformValue::Int(20));

        base.merge(&other);
        assert_eq!(
            base.names().collect::<Vec<_>>(),
            vec!["u_shared", "u_base", "u_other"]
        );
        assert_eq!(base.value("u_shared"), Some(UniformValue::Int(10)));
    }

    #[test]
    fn test_accessor_reads_current_value() {
        use std::sync::atomic::{AtomicI32, Ordering};

        let counter = Arc::new(AtomicI32::new(0));
        let source = Arc::clone(&counter);
        let mut map = UniformMap::new();
        map.insert(
            "u_frame",
            Arc::new(move || UniformValue::Int(source.load(Ordering::SeqCst))),
        );

        assert_eq!(map.value("u_frame"), Some(UniformValue::Int(0)));
        counter.store(5, Ordering::SeqCst);
        assert_eq!(map.value("u_frame"), Some(UniformValue::Int(5)));
    }

    #[test]
    fn test_resolve_custom_overrides_base() {
        let mut base = UniformMap::new();
        base.insert_constant("u_tint", UniformValue::Vec3([0.0, 0.0, 0.0]));
        base.insert_constant("u_stepSize", UniformValue::Float(0.01));

        let custom = CustomShader::new("void fragmentMain() {}")
            .with_constant_uniform("u_tint", UniformValue::Vec3([1.0, 0.5, 0.25]));

        let mut builder = ShaderBuilder::new();
        let merged = resolve_uniforms(&base, &custom, 1, &mut builder).unwrap();

        assert_eq!(
            merged.value("u_tint"),
            Some(UniformValue::Vec3([1.0, 0.5, 0.25]))
        );
        assert_eq!(merged.value("u_stepSize"), Some(UniformValue::Float(0.01)));
    }

    #[test]
    fn test_resolve_declares_custom_then_megatexture() {
        let custom = CustomShader::new("")
            .with_constant_uniform("u_b", UniformValue::Float(1.0))
            .with_constant_uniform("u_a", UniformValue::Mat4([0.0; 16]));

        let mut builder = ShaderBuilder::new();
        resolve_uniforms(&UniformMap::new(), &custom, 4, &mut builder).unwrap();
        let output = builder.finalize();

        let declared: Vec<String> = output
            .fragment
            .uniforms
            .iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(
            declared,
            vec![
                "uniform float u_b;",
                "uniform mat4 u_a;",
                "uniform sampler2D u_megatextureTextures[4];",
            ]
        );
        assert!(output.vertex.uniforms.is_empty());
    }

    #[test]
    fn test_resolve_always_declares_megatexture() {
        let mut builder = ShaderBuilder::new();
        resolve_uniforms(&UniformMap::new(), &CustomShader::default(), 1, &mut builder)
            .unwrap();
        let output = builder.finalize();

        let declaration = output.fragment.uniform(MEGATEXTURE_TEXTURES_UNIFORM).unwrap();
        assert_eq!(declaration.ty, UniformType::Sampler2D);
        assert_eq!(declaration.array_len, Some(1));
    }

    #[test]
    fn test_resolve_rejects_zero_metadata_count() {
        let mut builder = ShaderBuilder::new();
        let err = resolve_uniforms(&UniformMap::new(), &CustomShader::default(), 0, &mut builder)
            .unwrap_err();
        assert_eq!(err, BuildError::InvalidMetadataCount);
    }

    #[test]
    fn test_resolve_rejects_custom_megatexture_redeclaration() {
        let custom = CustomShader::new("")
            .with_constant_uniform(MEGATEXTURE_TEXTURES_UNIFORM, UniformValue::Texture(0));

        let mut builder = ShaderBuilder::new();
        let err = resolve_uniforms(&UniformMap::new(), &custom, 2, &mut builder).unwrap_err();
        assert!(matches!(err, BuildError::ConflictingUniform { .. }));
    }
}
