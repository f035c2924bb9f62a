//! Shape-specific fragment selection
//!
//! Each [`ShapeKind`] contributes three fragments: its intersection test, the
//! generic intersection driver and its uv-to-shape conversion. The order is
//! fixed per kind:
//!
//! - BOX: conversion, box intersection, driver
//! - CYLINDER: cylinder intersection, driver, conversion
//! - ELLIPSOID: ellipsoid intersection, driver, conversion
//!
//! Later fragments read uniforms and functions introduced by earlier ones, so
//! the order must be reproduced exactly.
//!
//! The defines and maximum intersection count come from the shape object
//! itself (see [`VoxelShape`]); built-in implementations live in the
//! submodules.

mod box_shape;
mod cylinder;
mod ellipsoid;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::builder::{DefineValue, ShaderBuilder, ShaderStage};
use crate::error::BuildError;
use crate::fragments;

pub use box_shape::BoxShape;
pub use cylinder::{CylinderBounds, CylinderShape};
pub use ellipsoid::{EllipsoidBounds, EllipsoidShape};

/// Bounding shape of a voxel primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShapeKind {
    Box,
    Cylinder,
    Ellipsoid,
}

const BOX_FRAGMENTS: &[&str] = &[
    fragments::CONVERT_UV_TO_BOX,
    fragments::INTERSECT_BOX,
    fragments::INTERSECTION,
];

const CYLINDER_FRAGMENTS: &[&str] = &[
    fragments::INTERSECT_CYLINDER,
    fragments::INTERSECTION,
    fragments::CONVERT_UV_TO_CYLINDER,
];

const ELLIPSOID_FRAGMENTS: &[&str] = &[
    fragments::INTERSECT_ELLIPSOID,
    fragments::INTERSECTION,
    fragments::CONVERT_UV_TO_ELLIPSOID,
];

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Box, ShapeKind::Cylinder, ShapeKind::Ellipsoid];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Box => "BOX",
            ShapeKind::Cylinder => "CYLINDER",
            ShapeKind::Ellipsoid => "ELLIPSOID",
        }
    }

    /// Fragments this shape adds to the fragment stage, in order
    pub fn fragments(self) -> &'static [&'static str] {
        match self {
            ShapeKind::Box => BOX_FRAGMENTS,
            ShapeKind::Cylinder => CYLINDER_FRAGMENTS,
            ShapeKind::Ellipsoid => ELLIPSOID_FRAGMENTS,
        }
    }

    pub fn conversion_fragment(self) -> &'static str {
        match self {
            ShapeKind::Box => fragments::CONVERT_UV_TO_BOX,
            ShapeKind::Cylinder => fragments::CONVERT_UV_TO_CYLINDER,
            ShapeKind::Ellipsoid => fragments::CONVERT_UV_TO_ELLIPSOID,
        }
    }

    pub fn intersection_fragment(self) -> &'static str {
        match self {
            ShapeKind::Box => fragments::INTERSECT_BOX,
            ShapeKind::Cylinder => fragments::INTERSECT_CYLINDER,
            ShapeKind::Ellipsoid => fragments::INTERSECT_ELLIPSOID,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BuildError::UnrecognizedShape(s.to_string()))
    }
}

/// Shape collaborator as seen by the assembler
pub trait VoxelShape: fmt::Debug + Send + Sync {
    fn kind(&self) -> ShapeKind;

    /// Ordered defines; `Absent` entries are skipped by the assembler
    fn shader_defines(&self) -> &[(String, DefineValue)];

    /// Slots the shape's own tests occupy, or `None` if not yet known
    fn shader_maximum_intersections_length(&self) -> Option<u32>;
}

/// Everything a shape contributes to one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeModule {
    pub kind: ShapeKind,
    pub fragments: &'static [&'static str],
    pub maximum_intersections: u32,
    pub defines: Vec<(String, DefineValue)>,
}

impl ShapeModule {
    /// Add the shape's fragments, then its defines, to the fragment stage
    ///
    /// # Errors
    ///
    /// Propagates builder conflicts if a shape define collides with one added
    /// earlier in the build.
    pub fn apply(&self, builder: &mut ShaderBuilder) -> Result<(), BuildError> {
        builder.add_fragment_lines(self.fragments);
        for (name, value) in &self.defines {
            if let Some(value) = value.to_builder_value() {
                builder.add_define(name.as_str(), value, ShaderStage::Fragment)?;
            }
        }
        Ok(())
    }
}

/// Select the fragments for `shape` and capture its defines and slot count
///
/// # Errors
///
/// Returns `BuildError::MissingShapeData` if the shape reports no maximum
/// intersection count.
pub fn select_shape_module(shape: &dyn VoxelShape) -> Result<ShapeModule, BuildError> {
    let kind = shape.kind();
    let maximum_intersections =
        shape
            .shader_maximum_intersections_length()
            .ok_or(BuildError::MissingShapeData {
                kind,
                field: "shaderMaximumIntersectionsLength",
            })?;

    Ok(ShapeModule {
        kind,
        fragments: kind.fragments(),
        maximum_intersections,
        defines: shape.shader_defines().to_vec(),
    })
}

/// Hands out consecutive intersection slot indices for a shape's own tests
#[derive(Debug, Default)]
struct SlotCounter {
    next: u32,
}

impl SlotCounter {
    /// Claim `width` slots and return the first index as a text define
    fn claim(&mut self, width: u32) -> Result<DefineValue, BuildError> {
        let index = self.next;
        self.next = index
            .checked_add(width)
            .ok_or(BuildError::IntersectionCountOverflow)?;
        Ok(DefineValue::text(index))
    }

    /// Claim only when `enabled`
    fn claim_if(&mut self, enabled: bool, width: u32) -> Result<DefineValue, BuildError> {
        if enabled {
            self.claim(width)
        } else {
            Ok(DefineValue::Absent)
        }
    }

    fn total(&self) -> u32 {
        self.next
    }
}

fn define(name: &str, value: DefineValue) -> (String, DefineValue) {
    (name.to_string(), value)
}

fn validate_finite(kind: ShapeKind, values: &[f64]) -> Result<(), BuildError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(BuildError::InvalidShapeBounds {
            kind,
            reason: "bounds must be finite".to_string(),
        })
    }
}
