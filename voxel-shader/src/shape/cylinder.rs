use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::builder::DefineValue;
use crate::error::BuildError;
use crate::uniforms::{UniformMap, UniformValue};

use super::{ShapeKind, SlotCounter, VoxelShape, define, validate_finite};

/// Render bounds of a cylinder in its local `[-1, 1]³` space
///
/// Radii are in `[0, 1]`, heights in `[-1, 1]` and angles in radians within
/// `[-π, π]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CylinderBounds {
    pub min_radius: f64,
    pub max_radius: f64,
    pub min_height: f64,
    pub max_height: f64,
    pub min_angle: f64,
    pub max_angle: f64,
}

impl Default for CylinderBounds {
    fn default() -> Self {
        Self {
            min_radius: 0.0,
            max_radius: 1.0,
            min_height: -1.0,
            max_height: 1.0,
            min_angle: -PI,
            max_angle: PI,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CylinderShape {
    bounds: CylinderBounds,
    defines: Vec<(String, DefineValue)>,
    maximum_intersections: u32,
}

impl CylinderShape {
    pub fn new(bounds: CylinderBounds) -> Result<Self, BuildError> {
        validate(&bounds)?;

        let has_inner_radius = bounds.min_radius > 0.0;
        let has_height = bounds.min_height > -1.0 || bounds.max_height < 1.0;
        let angle_range = bounds.max_angle - bounds.min_angle;
        let has_angle = angle_range < TAU;
        let angle_under_half = has_angle && angle_range < PI;
        let angle_over_half = has_angle && !angle_under_half;

        let mut slots = SlotCounter::default();
        let radius_max_index = slots.claim(1)?;
        let radius_min_index = slots.claim_if(has_inner_radius, 1)?;
        let angle_index = slots.claim_if(has_angle, if angle_under_half { 1 } else { 2 })?;

        let defines = vec![
            define("SHAPE_CYLINDER", DefineValue::Flag),
            define(
                "CYLINDER_HAS_RENDER_BOUNDS_RADIUS_MIN",
                DefineValue::flag_if(has_inner_radius),
            ),
            define("CYLINDER_HAS_RENDER_BOUNDS_HEIGHT", DefineValue::flag_if(has_height)),
            define("CYLINDER_HAS_RENDER_BOUNDS_ANGLE", DefineValue::flag_if(has_angle)),
            define(
                "CYLINDER_HAS_RENDER_BOUNDS_ANGLE_RANGE_UNDER_HALF",
                DefineValue::flag_if(angle_under_half),
            ),
            define(
                "CYLINDER_HAS_RENDER_BOUNDS_ANGLE_RANGE_OVER_HALF",
                DefineValue::flag_if(angle_over_half),
            ),
            define("CYLINDER_INTERSECTION_INDEX_RADIUS_MAX", radius_max_index),
            define("CYLINDER_INTERSECTION_INDEX_RADIUS_MIN", radius_min_index),
            define("CYLINDER_INTERSECTION_INDEX_ANGLE", angle_index),
        ];

        Ok(Self {
            bounds,
            defines,
            maximum_intersections: slots.total(),
        })
    }

    pub fn bounds(&self) -> &CylinderBounds {
        &self.bounds
    }

    /// Values for the uniforms the cylinder fragments declare
    pub fn uniform_map(&self) -> UniformMap {
        let b = &self.bounds;
        let radius_extent = b.max_radius - b.min_radius;
        let height_extent = b.max_height - b.min_height;
        let angle_extent = b.max_angle - b.min_angle;

        let mut map = UniformMap::new();
        map.insert_constant("u_cylinderRenderRadiusMinMax", vec2(b.min_radius, b.max_radius));
        map.insert_constant("u_cylinderRenderHeightMinMax", vec2(b.min_height, b.max_height));
        map.insert_constant("u_cylinderRenderAngleMinMax", vec2(b.min_angle, b.max_angle));
        map.insert_constant(
            "u_cylinderUvToShapeUvRadius",
            vec2(1.0 / radius_extent, -b.min_radius / radius_extent),
        );
        map.insert_constant(
            "u_cylinderUvToShapeUvHeight",
            vec2(2.0 / height_extent, -(b.min_height + 1.0) / height_extent),
        );
        map.insert_constant(
            "u_cylinderUvToShapeUvAngle",
            vec2(TAU / angle_extent, -(b.min_angle + PI) / angle_extent),
        );
        map
    }
}

impl Default for CylinderShape {
    fn default() -> Self {
        // Full radius, height and angle ranges: only the outer surface is tested
        let defines = vec![
            define("SHAPE_CYLINDER", DefineValue::Flag),
            define("CYLINDER_HAS_RENDER_BOUNDS_RADIUS_MIN", DefineValue::Absent),
            define("CYLINDER_HAS_RENDER_BOUNDS_HEIGHT", DefineValue::Absent),
            define("CYLINDER_HAS_RENDER_BOUNDS_ANGLE", DefineValue::Absent),
            define("CYLINDER_HAS_RENDER_BOUNDS_ANGLE_RANGE_UNDER_HALF", DefineValue::Absent),
            define("CYLINDER_HAS_RENDER_BOUNDS_ANGLE_RANGE_OVER_HALF", DefineValue::Absent),
            define("CYLINDER_INTERSECTION_INDEX_RADIUS_MAX", DefineValue::text(0)),
            define("CYLINDER_INTERSECTION_INDEX_RADIUS_MIN", DefineValue::Absent),
            define("CYLINDER_INTERSECTION_INDEX_ANGLE", DefineValue::Absent),
        ];
        Self {
            bounds: CylinderBounds::default(),
            defines,
            maximum_intersections: 1,
        }
    }
}

impl VoxelShape for CylinderShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Cylinder
    }

    fn shader_defines(&self) -> &[(String, DefineValue)] {
        &self.defines
    }

    fn shader_maximum_intersections_length(&self) -> Option<u32> {
        Some(self.maximum_intersections)
    }
}

fn vec2(x: f64, y: f64) -> UniformValue {
    UniformValue::Vec2([x as f32, y as f32])
}

fn validate(b: &CylinderBounds) -> Result<(), BuildError> {
    let kind = ShapeKind::Cylinder;
    validate_finite(
        kind,
        &[
            b.min_radius,
            b.max_radius,
            b.min_height,
            b.max_height,
            b.min_angle,
            b.max_angle,
        ],
    )?;

    let invalid = |reason: &str| BuildError::InvalidShapeBounds {
        kind,
        reason: reason.to_string(),
    };

    if !(0.0 <= b.min_radius && b.min_radius < b.max_radius && b.max_radius <= 1.0) {
        return Err(invalid("radius range must satisfy 0 <= min < max <= 1"));
    }
    if !(-1.0 <= b.min_height && b.min_height < b.max_height && b.max_height <= 1.0) {
        return Err(invalid("height range must satisfy -1 <= min < max <= 1"));
    }
    if !(-PI <= b.min_angle && b.min_angle < b.max_angle && b.max_angle <= PI) {
        return Err(invalid("angle range must satisfy -pi <= min < max <= pi"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(shape: &CylinderShape) -> Vec<(&str, DefineValue)> {
        shape
            .shader_defines()
            .iter()
            .filter(|(_, v)| *v != DefineValue::Absent)
            .map(|(n, v)| (n.as_str(), v.clone()))
            .collect()
    }

    #[test]
    fn test_full_cylinder() {
        let shape = CylinderShape::new(CylinderBounds::default()).unwrap();
        assert_eq!(shape.shader_maximum_intersections_length(), Some(1));
        assert_eq!(
            present(&shape),
            vec![
                ("SHAPE_CYLINDER", DefineValue::Flag),
                ("CYLINDER_INTERSECTION_INDEX_RADIUS_MAX", DefineValue::text(0)),
            ]
        );
    }

    #[test]
    fn test_default_matches_default_bounds() {
        assert_eq!(
            CylinderShape::default(),
            CylinderShape::new(CylinderBounds::default()).unwrap()
        );
    }

    #[test]
    fn test_inner_radius_and_narrow_wedge() {
        let shape = CylinderShape::new(CylinderBounds {
            min_radius: 0.25,
            min_angle: 0.0,
            max_angle: PI / 2.0,
            ..CylinderBounds::default()
        })
        .unwrap();

        assert_eq!(shape.shader_maximum_intersections_length(), Some(3));
        let defines = present(&shape);
        assert!(defines.contains(&("CYLINDER_HAS_RENDER_BOUNDS_RADIUS_MIN", DefineValue::Flag)));
        assert!(defines.contains(&(
            "CYLINDER_HAS_RENDER_BOUNDS_ANGLE_RANGE_UNDER_HALF",
            DefineValue::Flag
        )));
        assert!(defines.contains(&("CYLINDER_INTERSECTION_INDEX_RADIUS_MIN", DefineValue::text(1))));
        assert!(defines.contains(&("CYLINDER_INTERSECTION_INDEX_ANGLE", DefineValue::text(2))));
    }

    #[test]
    fn test_wide_wedge_takes_two_slots() {
        let shape = CylinderShape::new(CylinderBounds {
            min_angle: -PI,
            max_angle: PI / 2.0,
            ..CylinderBounds::default()
        })
        .unwrap();

        assert_eq!(shape.shader_maximum_intersections_length(), Some(3));
        let defines = present(&shape);
        assert!(defines.contains(&(
            "CYLINDER_HAS_RENDER_BOUNDS_ANGLE_RANGE_OVER_HALF",
            DefineValue::Flag
        )));
        assert!(defines.contains(&("CYLINDER_INTERSECTION_INDEX_ANGLE", DefineValue::text(1))));
        assert!(!defines.iter().any(|(n, _)| *n == "CYLINDER_INTERSECTION_INDEX_RADIUS_MIN"));
    }

    #[test]
    fn test_height_bounds_do_not_claim_slots() {
        let shape = CylinderShape::new(CylinderBounds {
            min_height: -0.5,
            ..CylinderBounds::default()
        })
        .unwrap();
        assert_eq!(shape.shader_maximum_intersections_length(), Some(1));
        assert!(present(&shape).contains(&("CYLINDER_HAS_RENDER_BOUNDS_HEIGHT", DefineValue::Flag)));
    }

    #[test]
    fn test_rejects_inverted_ranges() {
        for bounds in [
            CylinderBounds { min_radius: 0.5, max_radius: 0.5, ..CylinderBounds::default() },
            CylinderBounds { min_height: 0.5, max_height: -0.5, ..CylinderBounds::default() },
            CylinderBounds { max_angle: 4.0, ..CylinderBounds::default() },
        ] {
            assert!(matches!(
                CylinderShape::new(bounds),
                Err(BuildError::InvalidShapeBounds { kind: ShapeKind::Cylinder, .. })
            ));
        }
    }
}
