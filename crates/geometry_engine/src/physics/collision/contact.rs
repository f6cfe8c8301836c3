//! Contact query result types

use crate::foundation::math::Vec3;

/// Contact produced by a narrow-phase query between overlapping shapes
///
/// One flat result struct shared by the generic GJK/EPA path and the
/// external-library bridge. Absence of contact is an absent `ContactInfo`
/// (`None`), never a zeroed struct that could be mistaken for a real
/// zero-depth hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// Contact normal, pointing from shape A toward shape B (unit length)
    pub normal: Vec3,
    /// Penetration depth along the normal (non-negative)
    pub depth: f32,
    /// Contact point in world space
    pub point: Vec3,
}

/// Result of a closest-points query between two shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClosestPoints {
    /// The shapes overlap or touch; there is no separating gap
    Intersecting,
    /// The shapes are separated
    Separated {
        /// Closest point on shape A's surface in world space
        point_a: Vec3,
        /// Closest point on shape B's surface in world space
        point_b: Vec3,
        /// Distance between the surfaces
        distance: f32,
    },
}
