use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::builder::DefineValue;
use crate::error::BuildError;
use crate::uniforms::{UniformMap, UniformValue};

use super::{ShapeKind, SlotCounter, VoxelShape, define, validate_finite};

/// Render bounds of an ellipsoid shell
///
/// Longitudes are in `[-π, π]`, latitudes in `[-π/2, π/2]`. Heights are
/// measured from the ellipsoid surface along the normal, in the same units
/// as the radii.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipsoidBounds {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl Default for EllipsoidBounds {
    fn default() -> Self {
        Self {
            min_longitude: -PI,
            max_longitude: PI,
            min_latitude: -FRAC_PI_2,
            max_latitude: FRAC_PI_2,
            min_height: f64::NEG_INFINITY,
            max_height: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EllipsoidShape {
    radii: [f64; 3],
    bounds: EllipsoidBounds,
    defines: Vec<(String, DefineValue)>,
    maximum_intersections: u32,
}

impl EllipsoidShape {
    /// Ellipsoid with the given radii, clamped by `bounds`
    ///
    /// A `min_height` at or below `-min(radii)` means the shell is solid down
    /// to the center; it is clamped there.
    pub fn new(radii: [f64; 3], bounds: EllipsoidBounds) -> Result<Self, BuildError> {
        let kind = ShapeKind::Ellipsoid;
        validate_finite(kind, &radii)?;
        if radii.iter().any(|r| *r <= 0.0) {
            return Err(BuildError::InvalidShapeBounds {
                kind,
                reason: "radii must be positive".to_string(),
            });
        }

        let smallest_radius = radii.iter().copied().fold(f64::INFINITY, f64::min);
        let bounds = EllipsoidBounds {
            min_height: bounds.min_height.max(-smallest_radius),
            ..bounds
        };
        validate(&bounds)?;

        let has_inner_shell = bounds.min_height > -smallest_radius;
        let longitude_range = bounds.max_longitude - bounds.min_longitude;
        let has_longitude = longitude_range < TAU;
        let longitude_under_half = has_longitude && longitude_range < PI;
        let longitude_over_half = has_longitude && !longitude_under_half;
        let has_latitude_min = bounds.min_latitude > -FRAC_PI_2;
        let has_latitude_max = bounds.max_latitude < FRAC_PI_2;

        let mut slots = SlotCounter::default();
        let height_max_index = slots.claim(1)?;
        let height_min_index = slots.claim_if(has_inner_shell, 1)?;
        let longitude_index =
            slots.claim_if(has_longitude, if longitude_under_half { 1 } else { 2 })?;
        let latitude_max_index = slots.claim_if(has_latitude_max, 1)?;
        let latitude_min_index = slots.claim_if(has_latitude_min, 1)?;

        let defines = vec![
            define("SHAPE_ELLIPSOID", DefineValue::Flag),
            define(
                "ELLIPSOID_HAS_RENDER_BOUNDS_HEIGHT_MIN",
                DefineValue::flag_if(has_inner_shell),
            ),
            define(
                "ELLIPSOID_HAS_RENDER_BOUNDS_LONGITUDE",
                DefineValue::flag_if(has_longitude),
            ),
            define(
                "ELLIPSOID_HAS_RENDER_BOUNDS_LONGITUDE_RANGE_UNDER_HALF",
                DefineValue::flag_if(longitude_under_half),
            ),
            define(
                "ELLIPSOID_HAS_RENDER_BOUNDS_LONGITUDE_RANGE_OVER_HALF",
                DefineValue::flag_if(longitude_over_half),
            ),
            define(
                "ELLIPSOID_HAS_RENDER_BOUNDS_LATITUDE_MAX",
                DefineValue::flag_if(has_latitude_max),
            ),
            define(
                "ELLIPSOID_HAS_RENDER_BOUNDS_LATITUDE_MIN",
                DefineValue::flag_if(has_latitude_min),
            ),
            define("ELLIPSOID_INTERSECTION_INDEX_HEIGHT_MAX", height_max_index),
            define("ELLIPSOID_INTERSECTION_INDEX_HEIGHT_MIN", height_min_index),
            define("ELLIPSOID_INTERSECTION_INDEX_LONGITUDE", longitude_index),
            define("ELLIPSOID_INTERSECTION_INDEX_LATITUDE_MAX", latitude_max_index),
            define("ELLIPSOID_INTERSECTION_INDEX_LATITUDE_MIN", latitude_min_index),
        ];

        Ok(Self {
            radii,
            bounds,
            defines,
            maximum_intersections: slots.total(),
        })
    }

    pub fn radii(&self) -> [f64; 3] {
        self.radii
    }

    pub fn bounds(&self) -> &EllipsoidBounds {
        &self.bounds
    }

    /// Values for the uniforms the ellipsoid fragments declare
    ///
    /// The outer shell is scaled to touch the local `[-1, 1]³` cube.
    pub fn uniform_map(&self) -> UniformMap {
        let b = &self.bounds;
        let outer = self
            .radii
            .iter()
            .map(|r| r + b.max_height)
            .fold(0.0, f64::max);
        let scale = 1.0 / outer;

        let radii_uv = [
            (self.radii[0] * scale) as f32,
            (self.radii[1] * scale) as f32,
            (self.radii[2] * scale) as f32,
        ];
        let height_min = b.min_height * scale;
        let height_max = b.max_height * scale;
        let height_extent = height_max - height_min;
        let longitude_extent = b.max_longitude - b.min_longitude;
        let latitude_extent = b.max_latitude - b.min_latitude;

        let mut map = UniformMap::new();
        map.insert_constant("u_ellipsoidRadiiUv", UniformValue::Vec3(radii_uv));
        map.insert_constant("u_ellipsoidRenderHeightMinMax", vec2(height_min, height_max));
        map.insert_constant(
            "u_ellipsoidRenderLongitudeMinMax",
            vec2(b.min_longitude, b.max_longitude),
        );
        map.insert_constant(
            "u_ellipsoidRenderLatitudeMinMax",
            vec2(b.min_latitude, b.max_latitude),
        );
        map.insert_constant(
            "u_ellipsoidUvToShapeUvHeight",
            vec2(1.0 / height_extent, -height_min / height_extent),
        );
        map.insert_constant(
            "u_ellipsoidUvToShapeUvLongitude",
            vec2(TAU / longitude_extent, -(b.min_longitude + PI) / longitude_extent),
        );
        map.insert_constant(
            "u_ellipsoidUvToShapeUvLatitude",
            vec2(PI / latitude_extent, -(b.min_latitude + FRAC_PI_2) / latitude_extent),
        );
        map
    }
}

impl VoxelShape for EllipsoidShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Ellipsoid
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

fn validate(b: &EllipsoidBounds) -> Result<(), BuildError> {
    let kind = ShapeKind::Ellipsoid;
    validate_finite(
        kind,
        &[
            b.min_longitude,
            b.max_longitude,
            b.min_latitude,
            b.max_latitude,
            b.min_height,
            b.max_height,
        ],
    )?;

    let invalid = |reason: &str| BuildError::InvalidShapeBounds {
        kind,
        reason: reason.to_string(),
    };

    if !(-PI <= b.min_longitude && b.min_longitude < b.max_longitude && b.max_longitude <= PI) {
        return Err(invalid("longitude range must satisfy -pi <= min < max <= pi"));
    }
    if !(-FRAC_PI_2 <= b.min_latitude
        && b.min_latitude < b.max_latitude
        && b.max_latitude <= FRAC_PI_2)
    {
        return Err(invalid("latitude range must satisfy -pi/2 <= min < max <= pi/2"));
    }
    if b.min_height >= b.max_height {
        return Err(invalid("min height must be below max height"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPHERE: [f64; 3] = [1.0, 1.0, 1.0];

    fn text_define(shape: &EllipsoidShape, name: &str) -> Option<String> {
        shape
            .shader_defines()
            .iter()
            .find_map(|(n, v)| match v {
                DefineValue::Text(text) if n == name => Some(text.clone()),
                _ => None,
            })
    }

    fn has_flag(shape: &EllipsoidShape, name: &str) -> bool {
        shape
            .shader_defines()
            .iter()
            .any(|(n, v)| n == name && *v == DefineValue::Flag)
    }

    #[test]
    fn test_solid_sphere_uses_one_slot() {
        let shape = EllipsoidShape::new(SPHERE, EllipsoidBounds::default()).unwrap();
        assert_eq!(shape.shader_maximum_intersections_length(), Some(1));
        assert!(has_flag(&shape, "SHAPE_ELLIPSOID"));
        assert!(!has_flag(&shape, "ELLIPSOID_HAS_RENDER_BOUNDS_HEIGHT_MIN"));
        assert_eq!(
            text_define(&shape, "ELLIPSOID_INTERSECTION_INDEX_HEIGHT_MAX").as_deref(),
            Some("0")
        );
        assert_eq!(shape.bounds().min_height, -1.0);
    }

    #[test]
    fn test_all_bounds_enabled() {
        let shape = EllipsoidShape::new(
            [2.0, 2.0, 1.5],
            EllipsoidBounds {
                min_longitude: -PI,
                max_longitude: 0.5,
                min_latitude: -0.5,
                max_latitude: 0.5,
                min_height: -0.25,
                max_height: 0.25,
            },
        )
        .unwrap();

        // shell + inner shell + wide longitude (2) + two latitude cones
        assert_eq!(shape.shader_maximum_intersections_length(), Some(6));
        assert!(has_flag(&shape, "ELLIPSOID_HAS_RENDER_BOUNDS_LONGITUDE_RANGE_OVER_HALF"));
        assert_eq!(
            text_define(&shape, "ELLIPSOID_INTERSECTION_INDEX_HEIGHT_MIN").as_deref(),
            Some("1")
        );
        assert_eq!(
            text_define(&shape, "ELLIPSOID_INTERSECTION_INDEX_LONGITUDE").as_deref(),
            Some("2")
        );
        assert_eq!(
            text_define(&shape, "ELLIPSOID_INTERSECTION_INDEX_LATITUDE_MAX").as_deref(),
            Some("4")
        );
        assert_eq!(
            text_define(&shape, "ELLIPSOID_INTERSECTION_INDEX_LATITUDE_MIN").as_deref(),
            Some("5")
        );
    }

    #[test]
    fn test_single_latitude_edge() {
        let shape = EllipsoidShape::new(
            SPHERE,
            EllipsoidBounds {
                min_latitude: 0.0,
                min_longitude: 0.0,
                max_longitude: 1.0,
                ..EllipsoidBounds::default()
            },
        )
        .unwrap();

        assert_eq!(shape.shader_maximum_intersections_length(), Some(3));
        assert!(has_flag(&shape, "ELLIPSOID_HAS_RENDER_BOUNDS_LONGITUDE_RANGE_UNDER_HALF"));
        assert!(has_flag(&shape, "ELLIPSOID_HAS_RENDER_BOUNDS_LATITUDE_MIN"));
        assert!(!has_flag(&shape, "ELLIPSOID_HAS_RENDER_BOUNDS_LATITUDE_MAX"));
        assert_eq!(text_define(&shape, "ELLIPSOID_INTERSECTION_INDEX_LATITUDE_MAX"), None);
        assert_eq!(
            text_define(&shape, "ELLIPSOID_INTERSECTION_INDEX_LATITUDE_MIN").as_deref(),
            Some("2")
        );
    }

    #[test]
    fn test_outer_shell_fills_unit_cube() {
        let shape = EllipsoidShape::new([4.0, 2.0, 1.0], EllipsoidBounds::default()).unwrap();
        assert_eq!(
            shape.uniform_map().value("u_ellipsoidRadiiUv"),
            Some(UniformValue::Vec3([1.0, 0.5, 0.25]))
        );
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(EllipsoidShape::new([1.0, 0.0, 1.0], EllipsoidBounds::default()).is_err());
        assert!(
            EllipsoidShape::new(
                SPHERE,
                EllipsoidBounds {
                    min_latitude: 0.5,
                    max_latitude: 0.25,
                    ..EllipsoidBounds::default()
                }
            )
            .is_err()
        );
        assert!(
            EllipsoidShape::new(
                SPHERE,
                EllipsoidBounds {
                    min_height: 0.5,
                    max_height: 0.5,
                    ..EllipsoidBounds::default()
                }
            )
            .is_err()
        );
    }
}
