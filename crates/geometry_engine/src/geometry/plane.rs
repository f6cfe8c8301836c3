//! Plane primitive and half-space classification
//!
//! A plane is the set of points P with `dot(normal, P) + distance == 0`.
//! Every classification routine in this module is built on the single
//! signed-distance primitive [`Plane::distance_to_point`].

use serde::{Deserialize, Serialize};

use super::{Frustum, PlaneSide, Sphere, AABB};
use crate::foundation::math::{Vec3, Vec4};

const EPSILON: f32 = 0.000001;

/// Plane defined by a normal and signed distance from the origin
///
/// The normal should be unit length for signed distances to be metrically
/// correct; constructors that build the plane from non-normalized inputs
/// call [`Plane::normalize`] to re-establish this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Normal vector (should be normalized)
    pub normal: Vec3,
    /// Signed distance from the origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a plane from a normal and signed distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Create a plane through three points
    ///
    /// The normal is `cross(b - a, c - a)`, normalized. Collinear points
    /// produce a degenerate zero normal; callers must guard against
    /// degenerate triangles, this is not checked here.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(&(c - a));
        let mut plane = Self {
            normal,
            distance: -normal.dot(&a),
        };
        plane.normalize();
        plane
    }

    /// Create a plane through a point with the given normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            distance: -normal.dot(&point),
        }
    }

    /// Create a plane from the raw 4-component form (normal.xyz, distance)
    pub fn from_vec4(v: Vec4) -> Self {
        Self {
            normal: Vec3::new(v.x, v.y, v.z),
            distance: v.w,
        }
    }

    /// Rescale so the normal is unit length
    ///
    /// Leaves the plane unchanged when the normal length is below epsilon,
    /// so a degenerate plane stays degenerate instead of becoming NaN.
    pub fn normalize(&mut self) {
        let length = self.normal.norm();
        if length > EPSILON {
            self.normal /= length;
            self.distance /= length;
        }
    }

    /// Signed distance of a point from the plane
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }

    /// Classify a point against the plane
    ///
    /// `Front` for a strictly positive signed distance, `Back` for strictly
    /// negative, `Intersecting` when the point lies exactly on the plane.
    pub fn classify_point(&self, point: Vec3) -> PlaneSide {
        let distance = self.distance_to_point(point);
        if distance > 0.0 {
            PlaneSide::Front
        } else if distance < 0.0 {
            PlaneSide::Back
        } else {
            PlaneSide::Intersecting
        }
    }

    /// Classify an AABB against the plane
    ///
    /// Uses the standard half-space box test: the corner most aligned with
    /// the normal (positive vertex) and the corner most opposed to it
    /// (negative vertex) decide the side. Equality falls into
    /// `Intersecting`.
    pub fn classify_aabb(&self, aabb: &AABB) -> PlaneSide {
        let mut positive = aabb.min;
        let mut negative = aabb.max;

        if self.normal.x >= 0.0 {
            positive.x = aabb.max.x;
            negative.x = aabb.min.x;
        }
        if self.normal.y >= 0.0 {
            positive.y = aabb.max.y;
            negative.y = aabb.min.y;
        }
        if self.normal.z >= 0.0 {
            positive.z = aabb.max.z;
            negative.z = aabb.min.z;
        }

        if self.distance_to_point(negative) > 0.0 {
            PlaneSide::Front
        } else if self.distance_to_point(positive) < 0.0 {
            PlaneSide::Back
        } else {
            PlaneSide::Intersecting
        }
    }

    /// Classify a sphere against the plane
    pub fn classify_sphere(&self, sphere: &Sphere) -> PlaneSide {
        let distance = self.distance_to_point(sphere.center);
        if distance > sphere.radius {
            PlaneSide::Front
        } else if distance < -sphere.radius {
            PlaneSide::Back
        } else {
            PlaneSide::Intersecting
        }
    }

    /// Classify a frustum against the plane by testing its eight corners
    pub fn classify_frustum(&self, frustum: &Frustum) -> PlaneSide {
        let mut front = 0;
        let mut back = 0;

        for corner in frustum.corners() {
            let distance = self.distance_to_point(*corner);
            if distance > 0.0 {
                front += 1;
            } else if distance < 0.0 {
                back += 1;
            }
        }

        if front > 0 && back > 0 {
            PlaneSide::Intersecting
        } else if front > 0 {
            PlaneSide::Front
        } else if back > 0 {
            PlaneSide::Back
        } else {
            // All corners exactly on the plane
            PlaneSide::Intersecting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_from_points_round_trip() {
        let a = Vec3::new(1.0, 0.0, 2.0);
        let b = Vec3::new(4.0, 1.0, -1.0);
        let c = Vec3::new(-2.0, 3.0, 0.5);
        let plane = Plane::from_points(a, b, c);

        assert_relative_eq!(plane.normal.norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(plane.distance_to_point(a), 0.0, epsilon = 1e-4);
        assert_relative_eq!(plane.distance_to_point(b), 0.0, epsilon = 1e-4);
        assert_relative_eq!(plane.distance_to_point(c), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_plane_from_collinear_points_is_degenerate() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 1.0, 1.0);
        let c = Vec3::new(2.0, 2.0, 2.0);
        let plane = Plane::from_points(a, b, c);

        // Degenerate, but never NaN
        assert_relative_eq!(plane.normal.norm(), 0.0, epsilon = 1e-6);
        assert!(plane.distance.is_finite());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut plane = Plane::new(Vec3::new(0.0, 3.0, 4.0), 10.0);
        plane.normalize();
        let once = plane;
        plane.normalize();

        assert_relative_eq!(plane.normal.x, once.normal.x, epsilon = 1e-6);
        assert_relative_eq!(plane.normal.y, once.normal.y, epsilon = 1e-6);
        assert_relative_eq!(plane.normal.z, once.normal.z, epsilon = 1e-6);
        assert_relative_eq!(plane.distance, once.distance, epsilon = 1e-6);
    }

    #[test]
    fn test_classify_point() {
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), 0.0);

        assert_eq!(
            plane.classify_point(Vec3::new(0.0, 2.0, 0.0)),
            PlaneSide::Front
        );
        assert_eq!(
            plane.classify_point(Vec3::new(0.0, -2.0, 0.0)),
            PlaneSide::Back
        );
        assert_eq!(
            plane.classify_point(Vec3::new(5.0, 0.0, -3.0)),
            PlaneSide::Intersecting
        );
    }

    #[test]
    fn test_classify_aabb() {
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), 0.0);

        let above = AABB::new(Vec3::new(-1.0, 1.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        let below = AABB::new(Vec3::new(-1.0, -2.0, -1.0), Vec3::new(1.0, -1.0, 1.0));
        let straddling = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        assert_eq!(plane.classify_aabb(&above), PlaneSide::Front);
        assert_eq!(plane.classify_aabb(&below), PlaneSide::Back);
        assert_eq!(plane.classify_aabb(&straddling), PlaneSide::Intersecting);
    }

    #[test]
    fn test_classify_sphere() {
        let plane = Plane::new(Vec3::new(1.0, 0.0, 0.0), -2.0);

        let front = Sphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0);
        let back = Sphere::new(Vec3::new(-3.0, 0.0, 0.0), 1.0);
        let touching = Sphere::new(Vec3::new(2.5, 0.0, 0.0), 1.0);

        assert_eq!(plane.classify_sphere(&front), PlaneSide::Front);
        assert_eq!(plane.classify_sphere(&back), PlaneSide::Back);
        assert_eq!(plane.classify_sphere(&touching), PlaneSide::Intersecting);
    }
}
