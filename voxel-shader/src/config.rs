//! Per-primitive build input

use std::sync::Arc;

use crate::clipping::ClippingPlaneCollection;
use crate::custom_shader::CustomShader;
use crate::shape::{BoxShape, VoxelShape};
use crate::uniforms::UniformMap;

/// Snapshot of a voxel primitive's rendering state
///
/// Owned by the caller and only read during a build, so one config can be
/// rebuilt any number of times.
#[derive(Debug, Clone)]
pub struct PrimitiveConfig {
    pub shape: Arc<dyn VoxelShape>,
    pub clipping_planes: ClippingPlaneCollection,
    pub depth_test: bool,
    pub use_log_depth: bool,
    pub jitter: bool,
    pub nearest_sampling: bool,
    pub padding_before: [u32; 3],
    pub padding_after: [u32; 3],
    /// Samples taken per traversal step, at least 1
    pub sample_count: u32,
    /// Metadata textures bound to the megatexture sampler array
    pub metadata_count: u32,
    pub custom_shader: CustomShader,
    pub uniform_map: UniformMap,
}

impl PrimitiveConfig {
    pub fn new(shape: Arc<dyn VoxelShape>) -> Self {
        Self {
            shape,
            clipping_planes: ClippingPlaneCollection::default(),
            depth_test: true,
            use_log_depth: false,
            jitter: false,
            nearest_sampling: false,
            padding_before: [0; 3],
            padding_after: [0; 3],
            sample_count: 1,
            metadata_count: 1,
            custom_shader: CustomShader::default(),
            uniform_map: UniformMap::new(),
        }
    }

    pub fn has_padding(&self) -> bool {
        self.padding_before != [0; 3] || self.padding_after != [0; 3]
    }
}

impl Default for PrimitiveConfig {
    fn default() -> Self {
        Self::new(Arc::new(BoxShape::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_on_either_side() {
        let mut config = PrimitiveConfig::default();
        assert!(!config.has_padding());

        config.padding_after = [0, 1, 0];
        assert!(config.has_padding());

        config.padding_after = [0; 3];
        config.padding_before = [2, 0, 0];
        assert!(config.has_padding());
    }
}
