//! Oriented bounding box
//!
//! A box with arbitrary orientation, tested against other volumes with the
//! separating axis theorem. Immutable value type; transforming produces a
//! new instance.

use serde::{Deserialize, Serialize};

use super::{Containment, Frustum, Plane, PlaneSide, Ray, Sphere, AABB};
use crate::foundation::math::{Iso, Quat, Vec3};

const EPSILON: f32 = 0.000001;

/// A box with arbitrary position, orientation and half-extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    /// Center position in world space
    pub center: Vec3,
    /// Half-widths along each local axis (all non-negative)
    pub half_extents: Vec3,
    /// Orientation quaternion (unit)
    pub orientation: Quat,
}

impl OrientedBox {
    /// Creates a new oriented box
    pub fn new(center: Vec3, half_extents: Vec3, orientation: Quat) -> Self {
        debug_assert!(
            half_extents.x >= 0.0 && half_extents.y >= 0.0 && half_extents.z >= 0.0,
            "oriented box half-extents must be non-negative"
        );
        Self {
            center,
            half_extents,
            orientation,
        }
    }

    /// Creates an axis-aligned oriented box from an AABB
    pub fn from_aabb(aabb: &AABB) -> Self {
        Self {
            center: aabb.center(),
            half_extents: aabb.extents(),
            orientation: Quat::identity(),
        }
    }

    /// The three local axes in world space
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.orientation * Vec3::x(),
            self.orientation * Vec3::y(),
            self.orientation * Vec3::z(),
        ]
    }

    /// The eight corners of the box
    ///
    /// Same bit ordering as [`AABB::corners`]: corner `i` takes the
    /// positive extent on the axes whose bit is set in `i`
    /// (bit 0 = x, bit 1 = y, bit 2 = z).
    pub fn corners(&self) -> [Vec3; 8] {
        let [x, y, z] = self.axes();
        let ex = x * self.half_extents.x;
        let ey = y * self.half_extents.y;
        let ez = z * self.half_extents.z;

        let mut corners = [Vec3::zeros(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let sx = if i & 1 != 0 { 1.0 } else { -1.0 };
            let sy = if i & 2 != 0 { 1.0 } else { -1.0 };
            let sz = if i & 4 != 0 { 1.0 } else { -1.0 };
            *corner = self.center + ex * sx + ey * sy + ez * sz;
        }
        corners
    }

    /// The smallest AABB enclosing this box
    pub fn aabb(&self) -> AABB {
        AABB::from_points(self.corners())
    }

    /// Map a world-space point into the box's local frame
    fn to_local(&self, point: Vec3) -> Vec3 {
        self.orientation.inverse() * (point - self.center)
    }

    /// Classify a point against this box
    pub fn contains_point(&self, point: Vec3) -> Containment {
        let local = self.to_local(point);
        let e = self.half_extents;

        if local.x.abs() > e.x || local.y.abs() > e.y || local.z.abs() > e.z {
            return Containment::Disjoint;
        }

        if local.x.abs() == e.x || local.y.abs() == e.y || local.z.abs() == e.z {
            return Containment::Intersects;
        }

        Containment::Contains
    }

    /// Radius of this box projected onto an axis
    fn projected_radius(&self, axis: &Vec3) -> f32 {
        let [x, y, z] = self.axes();
        self.half_extents.x * axis.dot(&x).abs()
            + self.half_extents.y * axis.dot(&y).abs()
            + self.half_extents.z * axis.dot(&z).abs()
    }

    /// Whether the projections of two boxes onto an axis overlap
    fn overlap_on_axis(&self, other: &OrientedBox, axis: &Vec3) -> bool {
        let distance = (other.center - self.center).dot(axis).abs();
        distance <= self.projected_radius(axis) + other.projected_radius(axis)
    }

    /// Separating-axis overlap test against another oriented box
    ///
    /// Tests the 15 candidate axes: 3 face normals per box and the 9
    /// edge-edge cross products, skipping near-degenerate cross axes.
    pub fn intersects_obb(&self, other: &OrientedBox) -> bool {
        let axes_a = self.axes();
        let axes_b = other.axes();

        for axis in &axes_a {
            if !self.overlap_on_axis(other, axis) {
                return false;
            }
        }
        for axis in &axes_b {
            if !self.overlap_on_axis(other, axis) {
                return false;
            }
        }
        for a in &axes_a {
            for b in &axes_b {
                let cross = a.cross(b);
                if cross.norm_squared() < EPSILON {
                    continue;
                }
                if !self.overlap_on_axis(other, &cross.normalize()) {
                    return false;
                }
            }
        }

        true
    }

    /// Fast boolean overlap test against an AABB
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.intersects_obb(&OrientedBox::from_aabb(aabb))
    }

    /// Fast boolean overlap test against a sphere
    ///
    /// Clamps the sphere center to the box in local space and compares the
    /// residual distance with the radius.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let local = self.to_local(sphere.center);
        let clamped = Vec3::new(
            local.x.clamp(-self.half_extents.x, self.half_extents.x),
            local.y.clamp(-self.half_extents.y, self.half_extents.y),
            local.z.clamp(-self.half_extents.z, self.half_extents.z),
        );

        (local - clamped).norm_squared() <= sphere.radius * sphere.radius
    }

    /// Classify another oriented box against this one
    pub fn contains_obb(&self, other: &OrientedBox) -> Containment {
        let all_inside = other
            .corners()
            .iter()
            .all(|c| self.contains_point(*c) != Containment::Disjoint);

        if all_inside {
            Containment::Contains
        } else if self.intersects_obb(other) {
            Containment::Intersects
        } else {
            Containment::Disjoint
        }
    }

    /// Classify an AABB against this box
    pub fn contains_aabb(&self, aabb: &AABB) -> Containment {
        self.contains_obb(&OrientedBox::from_aabb(aabb))
    }

    /// Classify a sphere against this box
    pub fn contains_sphere(&self, sphere: &Sphere) -> Containment {
        let local = self.to_local(sphere.center);
        let e = self.half_extents;
        let r = sphere.radius;

        let fits = r <= e.x - local.x.abs()
            && r <= e.y - local.y.abs()
            && r <= e.z - local.z.abs();
        if fits {
            return Containment::Contains;
        }

        if self.intersects_sphere(sphere) {
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
        } else if frustum.intersects_obb(self) {
            Containment::Intersects
        } else {
            Containment::Disjoint
        }
    }

    /// Which side of a plane this box lies on
    ///
    /// Projects the half-extents onto the plane normal and compares the
    /// projected radius with the center distance.
    pub fn side_of_plane(&self, plane: &Plane) -> PlaneSide {
        let radius = self.projected_radius(&plane.normal);
        let distance = plane.distance_to_point(self.center);

        if distance > radius {
            PlaneSide::Front
        } else if distance < -radius {
            PlaneSide::Back
        } else {
            PlaneSide::Intersecting
        }
    }

    /// Fast boolean overlap test against a frustum
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum.intersects_obb(self)
    }

    /// Ray intersection; returns the entry distance if hit
    ///
    /// The ray is mapped into the box's local frame and run through the
    /// axis-aligned slab test; `t` keeps world-space semantics because a
    /// rigid transform preserves the direction's length.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inverse = self.orientation.inverse();
        let local_ray = Ray::new(
            inverse * (ray.origin - self.center),
            inverse * ray.direction,
        );
        let local_box = AABB::from_center_extents(Vec3::zeros(), self.half_extents);
        local_ray.intersect_aabb(&local_box)
    }

    /// Apply a rigid transform, producing a new box
    pub fn transformed(&self, iso: &Iso) -> Self {
        Self {
            center: iso.rotation * self.center + iso.translation.vector,
            half_extents: self.half_extents,
            orientation: iso.rotation * self.orientation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;

    #[test]
    fn test_axis_aligned_obb_matches_aabb() {
        let aabb = AABB::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let obb = OrientedBox::from_aabb(&aabb);

        assert_eq!(
            obb.contains_point(Vec3::zeros()),
            Containment::Contains
        );
        assert_eq!(
            obb.contains_point(Vec3::new(1.0, 0.0, 0.0)),
            Containment::Intersects
        );
        assert_eq!(
            obb.contains_point(Vec3::new(1.5, 0.0, 0.0)),
            Containment::Disjoint
        );
    }

    #[test]
    fn test_rotated_boxes_separating_axis() {
        // Two unit boxes rotated 45 degrees about Z, centers 2.5 apart: the
        // face-normal projections overlap but the boxes are separated.
        let rot = Quat::from_axis_angle(&Vec3::z_axis(), HALF_PI * 0.5);
        let a = OrientedBox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), rot);
        let b = OrientedBox::new(Vec3::new(2.95, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), rot);

        assert!(!a.intersects_obb(&b));

        let close = OrientedBox::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), rot);
        assert!(a.intersects_obb(&close));
    }

    #[test]
    fn test_obb_sphere() {
        let rot = Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI);
        let obb = OrientedBox::new(Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0), rot);

        // Rotation about Y swaps the long axis from X onto Z
        assert!(obb.intersects_sphere(&Sphere::new(Vec3::new(0.0, 0.0, 2.5), 1.0)));
        assert!(!obb.intersects_sphere(&Sphere::new(Vec3::new(2.5, 0.0, 0.0), 1.0)));
    }

    #[test]
    fn test_obb_plane_classification() {
        let obb = OrientedBox::new(
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Quat::identity(),
        );
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), 0.0);

        assert_eq!(obb.side_of_plane(&plane), PlaneSide::Front);

        let low = OrientedBox::new(
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Quat::identity(),
        );
        assert_eq!(low.side_of_plane(&plane), PlaneSide::Intersecting);
    }

    #[test]
    fn test_obb_ray_intersection() {
        use approx::assert_relative_eq;

        // Unit box rotated 45 degrees about Z: its silhouette along X is a
        // diamond reaching sqrt(2) from the center
        let rot = Quat::from_axis_angle(&Vec3::z_axis(), HALF_PI * 0.5);
        let obb = OrientedBox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), rot);

        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let t = obb.intersect_ray(&ray).expect("should hit");
        assert_relative_eq!(t, 5.0 - 2.0f32.sqrt(), epsilon = 1e-4);

        let miss = Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(obb.intersect_ray(&miss), None);
    }

    #[test]
    fn test_obb_contains_obb() {
        let outer = OrientedBox::new(Vec3::zeros(), Vec3::new(3.0, 3.0, 3.0), Quat::identity());
        let inner = OrientedBox::new(
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Quat::from_axis_angle(&Vec3::z_axis(), 0.3),
        );

        assert_eq!(outer.contains_obb(&inner), Containment::Contains);
        assert_eq!(inner.contains_obb(&outer), Containment::Intersects);
    }
}
