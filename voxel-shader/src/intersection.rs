//! Intersection slot allocation
//!
//! Every ray keeps a fixed-size list of entry/exit pairs. The shape reserves
//! the first `M` slots for its own tests and numbers them itself; the
//! globally-applicable tests are appended after it in a fixed order:
//!
//! 1. clipping planes: one slot for a single plane or intersection mode, two
//!    slots for union mode with more than one plane
//! 2. depth: one slot
//!
//! The final counter becomes `INTERSECTION_COUNT`. Swapping the order would
//! hand each fragment a different index than the one it writes to.

use serde::Serialize;

use crate::error::BuildError;

pub const INTERSECTION_COUNT_DEFINE: &str = "INTERSECTION_COUNT";

/// Global test that claims intersection slots after the shape's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntersectionFeature {
    ClippingPlanes,
    Depth,
}

impl IntersectionFeature {
    /// Define carrying the feature's first slot index
    pub fn define_name(self) -> &'static str {
        match self {
            IntersectionFeature::ClippingPlanes => "CLIPPING_PLANES_INTERSECTION_INDEX",
            IntersectionFeature::Depth => "DEPTH_INTERSECTION_INDEX",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntersectionSlot {
    pub feature: IntersectionFeature,
    pub index: u32,
}

/// Allocated slots in allocation order, plus the total slot count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntersectionSlotTable {
    pub shape_slots: u32,
    pub slots: Vec<IntersectionSlot>,
    pub total: u32,
}

impl IntersectionSlotTable {
    pub fn index_of(&self, feature: IntersectionFeature) -> Option<u32> {
        self.slots
            .iter()
            .find(|slot| slot.feature == feature)
            .map(|slot| slot.index)
    }

    /// `(name, decimal value)` defines in emission order, ending with the total
    pub fn defines(&self) -> Vec<(&'static str, String)> {
        self.slots
            .iter()
            .map(|slot| (slot.feature.define_name(), slot.index.to_string()))
            .chain(std::iter::once((
                INTERSECTION_COUNT_DEFINE,
                self.total.to_string(),
            )))
            .collect()
    }
}

/// Slots used by the clipping test for `plane_count` active planes
pub fn clipping_slot_width(plane_count: usize, union_clipping_regions: bool) -> u32 {
    match plane_count {
        0 => 0,
        1 => 1,
        _ if union_clipping_regions => 2,
        _ => 1,
    }
}

/// Allocate slot indices for the enabled global tests
///
/// # Errors
///
/// Returns `BuildError::IntersectionCountOverflow` if the total does not fit
/// in a `u32`.
pub fn allocate_intersections(
    shape_maximum_intersections: u32,
    clipping_planes_length: usize,
    clipping_union: bool,
    depth_test: bool,
) -> Result<IntersectionSlotTable, BuildError> {
    let mut counter = shape_maximum_intersections;
    let mut slots = Vec::with_capacity(2);

    if clipping_planes_length > 0 {
        slots.push(IntersectionSlot {
            feature: IntersectionFeature::ClippingPlanes,
            index: counter,
        });
        counter = counter
            .checked_add(clipping_slot_width(clipping_planes_length, clipping_union))
            .ok_or(BuildError::IntersectionCountOverflow)?;
    }

    if depth_test {
        slots.push(IntersectionSlot {
            feature: IntersectionFeature::Depth,
            index: counter,
        });
        counter = counter
            .checked_add(1)
            .ok_or(BuildError::IntersectionCountOverflow)?;
    }

    Ok(IntersectionSlotTable {
        shape_slots: shape_maximum_intersections,
        slots,
        total: counter,
    })
}
