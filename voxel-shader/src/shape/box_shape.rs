use crate::builder::DefineValue;
use crate::error::BuildError;
use crate::uniforms::{UniformMap, UniformValue};

use super::{ShapeKind, VoxelShape, define, validate_finite};

const UNIT_MIN: [f64; 3] = [-1.0; 3];
const UNIT_MAX: [f64; 3] = [1.0; 3];

/// Axis-aligned box rendered inside the unit cube `[-1, 1]³`
#[derive(Debug, Clone, PartialEq)]
pub struct BoxShape {
    min_bounds: [f64; 3],
    max_bounds: [f64; 3],
    defines: Vec<(String, DefineValue)>,
    maximum_intersections: u32,
}

impl BoxShape {
    /// Box covering a sub-region of the unit cube
    ///
    /// An axis whose min equals its max is flat; the box is then 2D along it.
    pub fn new(min_bounds: [f64; 3], max_bounds: [f64; 3]) -> Result<Self, BuildError> {
        let kind = ShapeKind::Box;
        validate_finite(kind, &min_bounds)?;
        validate_finite(kind, &max_bounds)?;

        for axis in 0..3 {
            let (min, max) = (min_bounds[axis], max_bounds[axis]);
            if min > max {
                return Err(BuildError::InvalidShapeBounds {
                    kind,
                    reason: format!("axis {axis}: min {min} exceeds max {max}"),
                });
            }
            if min < -1.0 || max > 1.0 {
                return Err(BuildError::InvalidShapeBounds {
                    kind,
                    reason: format!("axis {axis}: [{min}, {max}] leaves the unit cube"),
                });
            }
        }

        let has_render_bounds = min_bounds != UNIT_MIN || max_bounds != UNIT_MAX;
        let is_2d = (0..3).any(|axis| min_bounds[axis] == max_bounds[axis]);

        let defines = vec![
            define("SHAPE_BOX", DefineValue::Flag),
            define("BOX_HAS_RENDER_BOUNDS", DefineValue::flag_if(has_render_bounds)),
            define("BOX_IS_2D", DefineValue::flag_if(is_2d)),
        ];

        Ok(Self {
            min_bounds,
            max_bounds,
            defines,
            maximum_intersections: 1,
        })
    }

    pub fn min_bounds(&self) -> [f64; 3] {
        self.min_bounds
    }

    pub fn max_bounds(&self) -> [f64; 3] {
        self.max_bounds
    }

    /// Values for the uniforms the box fragments declare
    pub fn uniform_map(&self) -> UniformMap {
        let mut map = UniformMap::new();
        let mut scale = [0.0f32; 3];
        let mut translate = [0.0f32; 3];
        let mut flat = [0.0f32; 3];

        for axis in 0..3 {
            let extent = self.max_bounds[axis] - self.min_bounds[axis];
            if extent == 0.0 {
                flat[axis] = 1.0;
            } else {
                scale[axis] = (2.0 / extent) as f32;
                translate[axis] = (-(self.min_bounds[axis] + 1.0) / extent) as f32;
            }
        }

        map.insert_constant("u_renderMinBounds", UniformValue::Vec3(to_f32(self.min_bounds)));
        map.insert_constant("u_renderMaxBounds", UniformValue::Vec3(to_f32(self.max_bounds)));
        map.insert_constant("u_boxUvToShapeUvScale", UniformValue::Vec3(scale));
        map.insert_constant("u_boxUvToShapeUvTranslate", UniformValue::Vec3(translate));
        map.insert_constant("u_boxFlatAxes", UniformValue::Vec3(flat));
        map
    }
}

impl Default for BoxShape {
    fn default() -> Self {
        Self {
            min_bounds: UNIT_MIN,
            max_bounds: UNIT_MAX,
            defines: vec![
                define("SHAPE_BOX", DefineValue::Flag),
                define("BOX_HAS_RENDER_BOUNDS", DefineValue::Absent),
                define("BOX_IS_2D", DefineValue::Absent),
            ],
            maximum_intersections: 1,
        }
    }
}

impl VoxelShape for BoxShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Box
    }

    fn shader_defines(&self) -> &[(String, DefineValue)] {
        &self.defines
    }

    fn shader_maximum_intersections_length(&self) -> Option<u32> {
        Some(self.maximum_intersections)
    }
}

fn to_f32(v: [f64; 3]) -> [f32; 3] {
    [v[0] as f32, v[1] as f32, v[2] as f32]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(shape: &BoxShape, name: &str) -> DefineValue {
        shape
            .shader_defines()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .unwrap()
    }

    #[test]
    fn test_unit_cube_matches_default() {
        let shape = BoxShape::new(UNIT_MIN, UNIT_MAX).unwrap();
        assert_eq!(shape, BoxShape::default());
        assert_eq!(value(&shape, "SHAPE_BOX"), DefineValue::Flag);
        assert_eq!(value(&shape, "BOX_HAS_RENDER_BOUNDS"), DefineValue::Absent);
        assert_eq!(shape.shader_maximum_intersections_length(), Some(1));
    }

    #[test]
    fn test_render_bounds_flag() {
        let shape = BoxShape::new([-0.5, -1.0, -1.0], [1.0, 1.0, 0.25]).unwrap();
        assert_eq!(value(&shape, "BOX_HAS_RENDER_BOUNDS"), DefineValue::Flag);
        assert_eq!(value(&shape, "BOX_IS_2D"), DefineValue::Absent);
    }

    #[test]
    fn test_flat_axis_is_2d() {
        let shape = BoxShape::new([-1.0, -1.0, 0.0], [1.0, 1.0, 0.0]).unwrap();
        assert_eq!(value(&shape, "BOX_IS_2D"), DefineValue::Flag);

        let map = shape.uniform_map();
        assert_eq!(
            map.value("u_boxFlatAxes"),
            Some(UniformValue::Vec3([0.0, 0.0, 1.0]))
        );
    }

    #[test]
    fn test_uv_transform_maps_bounds_to_unit_range() {
        let shape = BoxShape::new([0.0, -1.0, -0.5], [1.0, 1.0, 0.5]).unwrap();
        let map = shape.uniform_map();
        let Some(UniformValue::Vec3(scale)) = map.value("u_boxUvToShapeUvScale") else {
            panic!("scale missing");
        };
        let Some(UniformValue::Vec3(translate)) = map.value("u_boxUvToShapeUvTranslate") else {
            panic!("translate missing");
        };

        // uv 0.5 is local 0.0, the min bound on x
        assert_eq!(0.5 * scale[0] + translate[0], 0.0);
        assert_eq!(1.0 * scale[0] + translate[0], 1.0);
        assert_eq!(0.25 * scale[2] + translate[2], 0.0);
        assert_eq!(0.75 * scale[2] + translate[2], 1.0);
    }

    #[test]
    fn test_rejects_invalid_bounds() {
        assert!(matches!(
            BoxShape::new([0.5, -1.0, -1.0], [0.0, 1.0, 1.0]),
            Err(BuildError::InvalidShapeBounds { kind: ShapeKind::Box, .. })
        ));
        assert!(matches!(
            BoxShape::new([-2.0, -1.0, -1.0], [1.0, 1.0, 1.0]),
            Err(BuildError::InvalidShapeBounds { .. })
        ));
        assert!(matches!(
            BoxShape::new([f64::NAN, -1.0, -1.0], [1.0, 1.0, 1.0]),
            Err(BuildError::InvalidShapeBounds { .. })
        ));
    }
}
