//! User-supplied fragment shader code and its uniforms

use std::fmt;

use crate::fragments::DEFAULT_CUSTOM_FRAGMENT_SHADER;
use crate::uniforms::{UniformAccessor, UniformMap, UniformType, UniformValue, constant};

/// A uniform declared by a custom shader
#[derive(Clone)]
pub struct CustomUniform {
    pub ty: UniformType,
    pub value: UniformAccessor,
}

impl fmt::Debug for CustomUniform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomUniform")
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// Custom fragment shader text plus its uniforms, in declaration order
///
/// The text must define `fragmentMain(FragmentInput, inout vx_modelMaterial)`.
#[derive(Debug, Clone)]
pub struct CustomShader {
    fragment_shader_text: String,
    uniforms: Vec<(String, CustomUniform)>,
}

impl CustomShader {
    pub fn new(fragment_shader_text: impl Into<String>) -> Self {
        Self {
            fragment_shader_text: fragment_shader_text.into(),
            uniforms: Vec::new(),
        }
    }

    /// Declare a uniform; redeclaring a name replaces it in place
    pub fn with_uniform(
        mut self,
        name: impl Into<String>,
        ty: UniformType,
        value: UniformAccessor,
    ) -> Self {
        let name = name.into();
        let uniform = CustomUniform { ty, value };
        match self.uniforms.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = uniform,
            None => self.uniforms.push((name, uniform)),
        }
        self
    }

    /// Declare a uniform whose type follows from a fixed value
    ///
    /// Custom uniforms are declared without an array length, so array values
    /// belong in the primitive's base uniform map instead.
    pub fn with_constant_uniform(self, name: impl Into<String>, value: UniformValue) -> Self {
        let ty = value.uniform_type();
        self.with_uniform(name, ty, constant(value))
    }

    pub fn fragment_shader_text(&self) -> &str {
        &self.fragment_shader_text
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &CustomUniform)> {
        self.uniforms.iter().map(|(name, u)| (name.as_str(), u))
    }

    pub fn uniform_map(&self) -> UniformMap {
        let mut map = UniformMap::new();
        for (name, uniform) in &self.uniforms {
            map.insert(name.as_str(), uniform.value.clone());
        }
        map
    }
}

impl Default for CustomShader {
    fn default() -> Self {
        Self::new(DEFAULT_CUSTOM_FRAGMENT_SHADER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_keep_declaration_order() {
        let shader = CustomShader::new("")
            .with_constant_uniform("u_z", UniformValue::Float(0.0))
            .with_constant_uniform("u_a", UniformValue::Bool(true))
            .with_constant_uniform("u_z", UniformValue::Int(3));

        let uniforms: Vec<(&str, UniformType)> =
            shader.uniforms().map(|(n, u)| (n, u.ty)).collect();
        assert_eq!(
            uniforms,
            vec![("u_z", UniformType::Int), ("u_a", UniformType::Bool)]
        );
        assert_eq!(
            shader.uniform_map().value("u_z"),
            Some(UniformValue::Int(3))
        );
    }

    #[test]
    fn test_default_shader_has_no_uniforms() {
        let shader = CustomShader::default();
        assert_eq!(shader.uniforms().count(), 0);
        assert!(shader.fragment_shader_text().contains("fragmentMain"));
    }
}
