use crate::builder::ShaderStage;
use crate::shape::ShapeKind;

/// Error type for voxel shader builds
///
/// Every variant is fatal to the build that raised it. A build never hands out a
/// partially assembled program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Shape kind text did not name a supported shape
    #[error("unrecognized shape kind '{0}' (expected BOX, CYLINDER or ELLIPSOID)")]
    UnrecognizedShape(String),

    /// A define was declared twice on one stage with different values
    #[error(
        "define {name} redeclared on {stage} stage with {requested:?} (already {existing:?})"
    )]
    ConflictingDefine {
        name: String,
        stage: ShaderStage,
        existing: Option<String>,
        requested: Option<String>,
    },

    /// A uniform was declared twice on one stage with a different type or array length
    #[error("uniform {name} redeclared on {stage} stage with a different declaration")]
    ConflictingUniform { name: String, stage: ShaderStage },

    /// Shape collaborator did not provide a required value
    #[error("{kind} shape does not provide {field}")]
    MissingShapeData {
        kind: ShapeKind,
        field: &'static str,
    },

    /// The megatexture sampler array needs at least one metadata texture
    #[error("metadata count must be at least 1")]
    InvalidMetadataCount,

    /// The octree sample array needs at least one sample per step
    #[error("sample count must be at least 1")]
    InvalidSampleCount,

    /// Shape and global tests together need more slots than fit in a `u32`
    #[error("intersection slot count overflows u32")]
    IntersectionCountOverflow,

    /// Built-in shape constructed with unusable bounds
    #[error("invalid {kind} bounds: {reason}")]
    InvalidShapeBounds { kind: ShapeKind, reason: String },
}
