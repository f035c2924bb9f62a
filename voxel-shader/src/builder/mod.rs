//! Two-stage shader source accumulator
//!
//! A [`ShaderBuilder`] collects defines, uniform declarations and source
//! fragments for the vertex and fragment stages independently, then renders
//! each stage as:
//!
//! 1. one `#define` line per define, in insertion order
//! 2. one `uniform` line per declaration, in insertion order
//! 3. the source fragments, in call order
//!
//! Defines therefore precede every fragment of their stage no matter when
//! they were added. Names are stage-scoped: the same define may exist on both
//! stages, but within one stage it can only be declared once. Repeating an
//! identical declaration is a no-op; changing it is a [`BuildError`].

use std::fmt;

use hashbrown::HashMap;
use serde::Serialize;

use crate::error::BuildError;
use crate::fragments::LINE_RESET_MARKER;
use crate::uniforms::UniformType;

/// Pipeline stage a declaration or fragment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Tri-state define value contributed by collaborators (e.g. shapes)
///
/// `Absent` means "do not define"; it is distinct from `Flag`, which defines
/// the name with no replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefineValue {
    Absent,
    Flag,
    Text(String),
}

impl DefineValue {
    pub fn text(value: impl ToString) -> Self {
        DefineValue::Text(value.to_string())
    }

    /// `Flag` when `enabled`, `Absent` otherwise
    pub fn flag_if(enabled: bool) -> Self {
        if enabled {
            DefineValue::Flag
        } else {
            DefineValue::Absent
        }
    }

    /// Builder-level value, or `None` when nothing should be defined
    pub fn to_builder_value(&self) -> Option<Option<String>> {
        match self {
            DefineValue::Absent => None,
            DefineValue::Flag => Some(None),
            DefineValue::Text(text) => Some(Some(text.clone())),
        }
    }
}

/// A rendered `#define`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Define {
    pub name: String,
    pub value: Option<String>,
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "#define {} {}", self.name, value),
            None => write!(f, "#define {}", self.name),
        }
    }
}

/// A rendered `uniform` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniformDeclaration {
    #[serde(rename = "type")]
    pub ty: UniformType,
    pub name: String,
    pub array_len: Option<u32>,
}

impl fmt::Display for UniformDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.array_len {
            Some(len) => write!(f, "uniform {} {}[{}];", self.ty, self.name, len),
            None => write!(f, "uniform {} {};", self.ty, self.name),
        }
    }
}

/// Finished output of one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSource {
    pub source: String,
    pub defines: Vec<Define>,
    pub uniforms: Vec<UniformDeclaration>,
}

impl StageSource {
    pub fn define(&self, name: &str) -> Option<&Define> {
        self.defines.iter().find(|d| d.name == name)
    }

    pub fn has_define(&self, name: &str) -> bool {
        self.define(name).is_some()
    }

    /// Replacement text of a define; `None` if it is undefined or has no text
    pub fn define_text(&self, name: &str) -> Option<&str> {
        self.define(name).and_then(|d| d.value.as_deref())
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformDeclaration> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

/// Finished output of both stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShaderProgramSource {
    pub vertex: StageSource,
    pub fragment: StageSource,
}

#[derive(Debug, Default, Clone)]
struct StageBuilder {
    defines: Vec<Define>,
    define_index: HashMap<String, usize>,
    uniforms: Vec<UniformDeclaration>,
    uniform_index: HashMap<String, usize>,
    lines: Vec<String>,
}

impl StageBuilder {
    fn add_define(
        &mut self,
        stage: ShaderStage,
        name: String,
        value: Option<String>,
    ) -> Result<(), BuildError> {
        if let Some(&index) = self.define_index.get(&name) {
            let existing = &self.defines[index];
            if existing.value == value {
                return Ok(());
            }
            return Err(BuildError::ConflictingDefine {
                name,
                stage,
                existing: existing.value.clone(),
                requested: value,
            });
        }

        self.define_index.insert(name.clone(), self.defines.len());
        self.defines.push(Define { name, value });
        Ok(())
    }

    fn add_uniform(
        &mut self,
        stage: ShaderStage,
        declaration: UniformDeclaration,
    ) -> Result<(), BuildError> {
        if let Some(&index) = self.uniform_index.get(&declaration.name) {
            if self.uniforms[index] == declaration {
                return Ok(());
            }
            return Err(BuildError::ConflictingUniform {
                name: declaration.name,
                stage,
            });
        }

        self.uniform_index
            .insert(declaration.name.clone(), self.uniforms.len());
        self.uniforms.push(declaration);
        Ok(())
    }

    fn finalize(self) -> StageSource {
        let mut source = String::new();
        for define in &self.defines {
            source.push_str(&define.to_string());
            source.push('\n');
        }
        for uniform in &self.uniforms {
            source.push_str(&uniform.to_string());
            source.push('\n');
        }
        for line in &self.lines {
            source.push_str(line);
            source.push('\n');
        }

        StageSource {
            source,
            defines: self.defines,
            uniforms: self.uniforms,
        }
    }
}

/// Accumulates one shader program; consumed by [`ShaderBuilder::finalize`]
#[derive(Debug, Default, Clone)]
pub struct ShaderBuilder {
    vertex: StageBuilder,
    fragment: StageBuilder,
}

impl ShaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn stage_mut(&mut self, stage: ShaderStage) -> &mut StageBuilder {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        }
    }

    /// Add a define; `None` defines the name without replacement text
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ConflictingDefine` if the name is already defined
    /// on `stage` with a different value.
    pub fn add_define(
        &mut self,
        name: impl Into<String>,
        value: Option<String>,
        stage: ShaderStage,
    ) -> Result<(), BuildError> {
        self.stage_mut(stage).add_define(stage, name.into(), value)
    }

    /// Add a uniform declaration, optionally as a fixed-length array
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ConflictingUniform` if the name is already declared
    /// on `stage` with a different type or array length.
    pub fn add_uniform(
        &mut self,
        ty: UniformType,
        name: impl Into<String>,
        array_len: Option<u32>,
        stage: ShaderStage,
    ) -> Result<(), BuildError> {
        let declaration = UniformDeclaration {
            ty,
            name: name.into(),
            array_len,
        };
        self.stage_mut(stage).add_uniform(stage, declaration)
    }

    pub fn add_vertex_lines(&mut self, lines: &[&str]) {
        self.vertex
            .lines
            .extend(lines.iter().map(|line| line.to_string()));
    }

    pub fn add_fragment_lines(&mut self, lines: &[&str]) {
        self.fragment
            .lines
            .extend(lines.iter().map(|line| line.to_string()));
    }

    /// Add user-supplied fragment text followed by a line-number reset
    pub fn add_custom_fragment_lines(&mut self, text: &str) {
        self.add_fragment_lines(&[text, LINE_RESET_MARKER]);
    }

    pub fn finalize(self) -> ShaderProgramSource {
        ShaderProgramSource {
            vertex: self.vertex.finalize(),
            fragment: self.fragment.finalize(),
        }
    }
}
