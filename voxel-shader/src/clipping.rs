//! Clipping plane collection consumed by the assembler

use serde::{Deserialize, Serialize};

/// Name of the plane equation array read by the clipping fragment
pub const CLIPPING_PLANES_UNIFORM: &str = "u_clippingPlanes";

/// Plane in Hessian normal form: `dot(normal, p) + distance = 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClippingPlane {
    pub normal: [f64; 3],
    pub distance: f64,
}

impl ClippingPlane {
    pub fn new(normal: [f64; 3], distance: f64) -> Self {
        Self { normal, distance }
    }

    /// Packed `vec4` as read by the clipping fragment
    pub fn equation(&self) -> [f32; 4] {
        [
            self.normal[0] as f32,
            self.normal[1] as f32,
            self.normal[2] as f32,
            self.distance as f32,
        ]
    }
}

/// Ordered clipping planes plus how they combine
///
/// In union mode a point is clipped if it is behind *any* plane; otherwise it
/// is clipped only if it is behind *all* of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClippingPlaneCollection {
    pub planes: Vec<ClippingPlane>,
    pub enabled: bool,
    pub union_clipping_regions: bool,
}

impl ClippingPlaneCollection {
    /// Enabled collection in intersection mode
    pub fn new(planes: Vec<ClippingPlane>) -> Self {
        Self {
            planes,
            enabled: true,
            union_clipping_regions: false,
        }
    }

    pub fn with_union(mut self, union_clipping_regions: bool) -> Self {
        self.union_clipping_regions = union_clipping_regions;
        self
    }

    /// Number of planes the shader must test; zero when disabled
    pub fn active_len(&self) -> usize {
        if self.enabled { self.planes.len() } else { 0 }
    }

    /// Packed equations of every plane, in collection order
    pub fn plane_equations(&self) -> Vec<[f32; 4]> {
        self.planes.iter().map(ClippingPlane::equation).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_len_respects_enabled() {
        let mut planes = ClippingPlaneCollection::new(vec![
            ClippingPlane::new([1.0, 0.0, 0.0], 0.5),
            ClippingPlane::new([0.0, 1.0, 0.0], -0.5),
        ]);
        assert_eq!(planes.active_len(), 2);

        planes.enabled = false;
        assert_eq!(planes.active_len(), 0);
        assert_eq!(ClippingPlaneCollection::default().active_len(), 0);
    }

    #[test]
    fn test_plane_equation_packing() {
        let plane = ClippingPlane::new([0.0, 0.0, -1.0], 2.0);
        assert_eq!(plane.equation(), [0.0, 0.0, -1.0, 2.0]);
    }
}
