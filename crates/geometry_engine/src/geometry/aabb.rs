//! Axis-aligned bounding box
//!
//! The canonical AABB used for broad-phase culling, spatial partitioning
//! and debug drawing. An empty box (`min = +inf`, `max = -inf`) is the
//! identity element for [`AABB::merge`], so boxes can be accumulated from
//! points in any order.

use serde::{Deserialize, Serialize};

use super::{Containment, Frustum, OrientedBox, Plane, PlaneSide, Ray, Sphere};
use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box for spatial queries
///
/// Invariant: `min` is component-wise less than or equal to `max` once any
/// point has been inserted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(
            min.x <= max.x && min.y <= max.y && min.z <= max.z,
            "AABB min must not exceed max"
        );
        Self { min, max }
    }

    /// Create an empty AABB
    ///
    /// The empty box contains nothing and is the identity for
    /// [`AABB::merge`] and [`AABB::insert`].
    pub fn empty() -> Self {
        Self {
            min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Create an AABB centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Create the smallest AABB enclosing all given points
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.insert(point);
        }
        aabb
    }

    /// Whether any point has been inserted
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Grow to include a point
    pub fn insert(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Grow to include another AABB
    ///
    /// Commutative and associative on the min/max fields; merging with an
    /// empty box is a no-op.
    pub fn merge(&mut self, other: &AABB) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Shift the whole box by an offset
    pub fn translate(&mut self, offset: Vec3) {
        self.min += offset;
        self.max += offset;
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// The eight corners of the box
    ///
    /// Corner `i` takes `max` on the axes whose bit is set in `i`
    /// (bit 0 = x, bit 1 = y, bit 2 = z), so corner 0 is `min` and
    /// corner 7 is `max`. Plane classification and wireframe drawing
    /// depend on this exact ordering.
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::zeros(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Vec3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            );
        }
        corners
    }

    /// The point inside the box closest to the given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Classify a point against this box
    ///
    /// `Disjoint` when strictly outside on any axis, `Intersects` when on a
    /// face, `Contains` when strictly interior.
    pub fn contains_point(&self, point: Vec3) -> Containment {
        if point.x < self.min.x
            || point.x > self.max.x
            || point.y < self.min.y
            || point.y > self.max.y
            || point.z < self.min.z
            || point.z > self.max.z
        {
            return Containment::Disjoint;
        }

        if point.x == self.min.x
            || point.x == self.max.x
            || point.y == self.min.y
            || point.y == self.max.y
            || point.z == self.min.z
            || point.z == self.max.z
        {
            return Containment::Intersects;
        }

        Containment::Contains
    }

    /// Classify another AABB against this box
    pub fn contains_aabb(&self, other: &AABB) -> Containment {
        if other.min.x > self.max.x
            || other.max.x < self.min.x
            || other.min.y > self.max.y
            || other.max.y < self.min.y
            || other.min.z > self.max.z
            || other.max.z < self.min.z
        {
            return Containment::Disjoint;
        }

        if other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
            && other.min.z >= self.min.z
            && other.max.z <= self.max.z
        {
            return Containment::Contains;
        }

        Containment::Intersects
    }

    /// Classify a sphere against this box
    ///
    /// `Contains` requires the sphere to fit inside the box on every axis
    /// in both directions; `Disjoint` when the distance from the sphere
    /// center to the closest box point exceeds the radius.
    pub fn contains_sphere(&self, sphere: &Sphere) -> Containment {
        let center = sphere.center;
        let radius = sphere.radius;

        let to_closest = center - self.closest_point(center);
        if to_closest.norm_squared() > radius * radius {
            return Containment::Disjoint;
        }

        let fits = radius <= center.x - self.min.x
            && radius <= self.max.x - center.x
            && radius <= center.y - self.min.y
            && radius <= self.max.y - center.y
            && radius <= center.z - self.min.z
            && radius <= self.max.z - center.z;

        if fits {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    /// Classify an oriented box against this box
    pub fn contains_obb(&self, obb: &OrientedBox) -> Containment {
        let corners = obb.corners();
        if corners
            .iter()
            .all(|c| self.contains_point(*c) != Containment::Disjoint)
        {
            return Containment::Contains;
        }

        if self.intersects_obb(obb) {
            Containment::Intersects
        } else {
            Containment::Disjoint
        }
    }

    /// Classify a frustum against this box by its corners
    pub fn contains_frustum(&self, frustum: &Frustum) -> Containment {
        let inside = frustum
            .corners()
            .iter()
            .filter(|c| self.contains_point(**c) != Containment::Disjoint)
            .count();

        if inside == 8 {
            Containment::Contains
        } else if frustum.intersects_aabb(self) {
            Containment::Intersects
        } else {
            Containment::Disjoint
        }
    }

    /// Fast boolean overlap test against another AABB
    pub fn intersects_aabb(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Fast boolean overlap test against a sphere
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let to_closest = sphere.center - self.closest_point(sphere.center);
        to_closest.norm_squared() <= sphere.radius * sphere.radius
    }

    /// Fast boolean overlap test against an oriented box
    pub fn intersects_obb(&self, obb: &OrientedBox) -> bool {
        OrientedBox::from_aabb(self).intersects_obb(obb)
    }

    /// Fast boolean overlap test against a frustum
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum.intersects_aabb(self)
    }

    /// Which side of a plane this box lies on
    pub fn side_of_plane(&self, plane: &Plane) -> PlaneSide {
        plane.classify_aabb(self)
    }

    /// Ray intersection; returns the entry distance if hit
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_aabb(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_nested_aabb() {
        let outer = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let inner = AABB::new(
            Vec3::new(0.25, 0.25, 0.25),
            Vec3::new(0.75, 0.75, 0.75),
        );

        assert_eq!(outer.contains_aabb(&inner), Containment::Contains);
    }

    #[test]
    fn test_contains_overlapping_aabb() {
        let a = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.5, 1.5, 1.5));

        assert_eq!(a.contains_aabb(&b), Containment::Intersects);
    }

    #[test]
    fn test_contains_disjoint_aabb() {
        let a = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = AABB::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));

        assert_eq!(a.contains_aabb(&b), Containment::Disjoint);
        assert!(!a.intersects_aabb(&b));
    }

    #[test]
    fn test_empty_is_merge_identity() {
        let mut a = AABB::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 5.0));
        let before = a;
        a.merge(&AABB::empty());
        assert_eq!(a, before);

        let mut empty = AABB::empty();
        empty.merge(&before);
        assert_eq!(empty, before);
    }

    #[test]
    fn test_merge_commutes() {
        let a = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(0.5, 0.5, 0.5));
        let b = AABB::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));

        let mut ab = a;
        ab.merge(&b);
        let mut ba = b;
        ba.merge(&a);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_merge_is_associative() {
        let a = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(0.5, 0.5, 0.5));
        let b = AABB::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let c = AABB::new(Vec3::new(-3.0, 1.0, 0.0), Vec3::new(-2.0, 4.0, 1.0));

        let mut left = a;
        left.merge(&b);
        left.merge(&c);

        let mut bc = b;
        bc.merge(&c);
        let mut right = a;
        right.merge(&bc);

        assert_eq!(left, right);
    }

    #[test]
    fn test_inserted_point_is_never_disjoint() {
        let points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-4.0, 5.0, -6.0),
        ];

        for point in points {
            let mut aabb = AABB::empty();
            aabb.insert(point);
            assert_ne!(aabb.contains_point(point), Containment::Disjoint);
        }
    }

    #[test]
    fn test_point_classification_boundary() {
        let aabb = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));

        assert_eq!(
            aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)),
            Containment::Contains
        );
        assert_eq!(
            aabb.contains_point(Vec3::new(0.0, 0.5, 0.5)),
            Containment::Intersects
        );
        assert_eq!(
            aabb.contains_point(Vec3::new(-0.1, 0.5, 0.5)),
            Containment::Disjoint
        );
    }

    #[test]
    fn test_containment_implies_intersection() {
        let a = AABB::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let cases = [
            AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 1.0, 1.0)),
            AABB::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0)),
            AABB::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(6.0, 6.0, 6.0)),
        ];

        for b in &cases {
            match a.contains_aabb(b) {
                Containment::Contains | Containment::Intersects => {
                    assert!(a.intersects_aabb(b));
                    assert!(b.intersects_aabb(&a));
                }
                Containment::Disjoint => {
                    assert!(!a.intersects_aabb(b));
                    assert!(!b.intersects_aabb(&a));
                }
            }
        }
    }

    #[test]
    fn test_contains_sphere() {
        let aabb = AABB::new(Vec3::new(-2.0, -2.0, -2.0), Vec3::new(2.0, 2.0, 2.0));

        let inside = Sphere::new(Vec3::zeros(), 1.0);
        let poking = Sphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0);
        let outside = Sphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0);

        assert_eq!(aabb.contains_sphere(&inside), Containment::Contains);
        assert_eq!(aabb.contains_sphere(&poking), Containment::Intersects);
        assert_eq!(aabb.contains_sphere(&outside), Containment::Disjoint);
    }

    #[test]
    fn test_corner_ordering() {
        let aabb = AABB::new(Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0));
        let corners = aabb.corners();

        assert_eq!(corners[0], Vec3::zeros());
        assert_eq!(corners[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(corners[2], Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(corners[4], Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(corners[7], Vec3::new(1.0, 2.0, 3.0));
    }
}
