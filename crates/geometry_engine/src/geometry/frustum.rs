//! View frustum derived from a combined projection-view matrix
//!
//! The six planes come from Gribb-Hartmann row extraction and the eight
//! corners from triple-plane intersections. Planes and corners are a cache
//! recomputed whenever the matrix is set, never independent data.

use serde::{Deserialize, Serialize};

use super::{Containment, OrientedBox, Plane, PlaneSide, QueryPrecision, Ray, Sphere, AABB};
use crate::foundation::math::{Mat4, Vec3, Vec4};

const EPSILON: f32 = 0.000001;

/// Frustum for visibility culling
///
/// Plane normals point into the frustum, so a point inside has a positive
/// signed distance to all six planes. The projection convention is clip
/// depth in [0, 1] (the matrices produced by
/// [`Mat4Ext::perspective`](crate::foundation::math::Mat4Ext::perspective)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    matrix: Mat4,
    planes: [Plane; 6],
    corners: [Vec3; 8],
}

impl Frustum {
    /// Index of the left plane in [`Frustum::planes`]
    pub const LEFT: usize = 0;
    /// Index of the right plane
    pub const RIGHT: usize = 1;
    /// Index of the bottom plane
    pub const BOTTOM: usize = 2;
    /// Index of the top plane
    pub const TOP: usize = 3;
    /// Index of the near plane
    pub const NEAR: usize = 4;
    /// Index of the far plane
    pub const FAR: usize = 5;

    /// Build a frustum from a combined projection-view matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        let mut frustum = Self {
            matrix: Mat4::identity(),
            planes: [Plane::new(Vec3::zeros(), 0.0); 6],
            corners: [Vec3::zeros(); 8],
        };
        frustum.set_matrix(matrix);
        frustum
    }

    /// The combined projection-view matrix
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// The six planes, indexed by the `LEFT`..`FAR` constants
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// The eight corners
    ///
    /// Same bit ordering as [`AABB::corners`]: bit 0 picks left/right,
    /// bit 1 bottom/top, bit 2 near/far, so corner 0 is near-bottom-left
    /// and corner 7 is far-top-right.
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// Replace the matrix and recompute planes and corners
    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;

        let row = |i: usize| {
            let r = matrix.row(i);
            Vec4::new(r[0], r[1], r[2], r[3])
        };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        self.planes[Self::LEFT] = Plane::from_vec4(r3 + r0);
        self.planes[Self::RIGHT] = Plane::from_vec4(r3 - r0);
        self.planes[Self::BOTTOM] = Plane::from_vec4(r3 + r1);
        self.planes[Self::TOP] = Plane::from_vec4(r3 - r1);
        self.planes[Self::NEAR] = Plane::from_vec4(r2);
        self.planes[Self::FAR] = Plane::from_vec4(r3 - r2);

        for plane in &mut self.planes {
            plane.normalize();
        }

        for i in 0..8 {
            let horizontal = if i & 1 != 0 { Self::RIGHT } else { Self::LEFT };
            let vertical = if i & 2 != 0 { Self::TOP } else { Self::BOTTOM };
            let depth = if i & 4 != 0 { Self::FAR } else { Self::NEAR };
            self.corners[i] = Self::intersect_planes(
                &self.planes[depth],
                &self.planes[vertical],
                &self.planes[horizontal],
            );
        }
    }

    /// Intersection point of three mutually non-parallel planes
    ///
    /// Degenerate for projection matrices whose planes are parallel at the
    /// corner; the solve is guarded and falls back to the origin.
    fn intersect_planes(a: &Plane, b: &Plane, c: &Plane) -> Vec3 {
        let bc = b.normal.cross(&c.normal);
        let denom = a.normal.dot(&bc);

        if denom.abs() < EPSILON {
            log::warn!("degenerate frustum: three planes share no unique corner");
            return Vec3::zeros();
        }

        let ca = c.normal.cross(&a.normal);
        let ab = a.normal.cross(&b.normal);
        (bc * -a.distance + ca * -b.distance + ab * -c.distance) / denom
    }

    /// Classify a point against the frustum at the given precision
    ///
    /// `Fast` skips boundary detection: a point on a plane counts as
    /// contained. `Precise` reports boundary touches as `Intersects`.
    pub fn contains_point_with(&self, point: Vec3, precision: QueryPrecision) -> Containment {
        let mut boundary = false;

        for plane in &self.planes {
            let distance = plane.distance_to_point(point);
            match precision {
                QueryPrecision::Fast => {
                    if distance < 0.0 {
                        return Containment::Disjoint;
                    }
                }
                QueryPrecision::Precise => {
                    if distance < 0.0 {
                        return Containment::Disjoint;
                    }
                    if distance == 0.0 {
                        boundary = true;
                    }
                }
            }
        }

        if boundary {
            Containment::Intersects
        } else {
            Containment::Contains
        }
    }

    /// Classify a point against the frustum (precise)
    pub fn contains_point(&self, point: Vec3) -> Containment {
        self.contains_point_with(point, QueryPrecision::Precise)
    }

    /// Classify an AABB against the frustum
    ///
    /// Any plane with the box entirely outside returns `Disjoint`
    /// immediately; any straddling plane caps the result at `Intersects`.
    pub fn contains_aabb(&self, aabb: &AABB) -> Containment {
        let mut straddling = false;

        for plane in &self.planes {
            match plane.classify_aabb(aabb) {
                PlaneSide::Back => return Containment::Disjoint,
                PlaneSide::Intersecting => straddling = true,
                PlaneSide::Front => {}
            }
        }

        if straddling {
            Containment::Intersects
        } else {
            Containment::Contains
        }
    }

    /// Classify a sphere against the frustum
    pub fn contains_sphere(&self, sphere: &Sphere) -> Containment {
        let mut straddling = false;

        for plane in &self.planes {
            match plane.classify_sphere(sphere) {
                PlaneSide::Back => return Containment::Disjoint,
                PlaneSide::Intersecting => straddling = true,
                PlaneSide::Front => {}
            }
        }

        if straddling {
            Containment::Intersects
        } else {
            Containment::Contains
        }
    }

    /// Classify an oriented box against the frustum
    pub fn contains_obb(&self, obb: &OrientedBox) -> Containment {
        let mut straddling = false;

        for plane in &self.planes {
            match obb.side_of_plane(plane) {
                PlaneSide::Back => return Containment::Disjoint,
                PlaneSide::Intersecting => straddling = true,
                PlaneSide::Front => {}
            }
        }

        if straddling {
            Containment::Intersects
        } else {
            Containment::Contains
        }
    }

    /// Classify another frustum against this one by its corners
    pub fn contains_frustum(&self, other: &Frustum) -> Containment {
        let mut straddling = false;

        for plane in &self.planes {
            let mut front = 0;
            let mut back = 0;
            for corner in other.corners() {
                if plane.distance_to_point(*corner) >= 0.0 {
                    front += 1;
                } else {
                    back += 1;
                }
            }

            if front == 0 {
                return Containment::Disjoint;
            }
            if back > 0 {
                straddling = true;
            }
        }

        if straddling {
            Containment::Intersects
        } else {
            Containment::Contains
        }
    }

    /// Fast boolean overlap test against an AABB (positive-vertex test)
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        for plane in &self.planes {
            let mut p = aabb.min;
            if plane.normal.x >= 0.0 {
                p.x = aabb.max.x;
            }
            if plane.normal.y >= 0.0 {
                p.y = aabb.max.y;
            }
            if plane.normal.z >= 0.0 {
                p.z = aabb.max.z;
            }

            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Fast boolean overlap test against a sphere
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        for plane in &self.planes {
            if plane.distance_to_point(sphere.center) < -sphere.radius {
                return false;
            }
        }
        true
    }

    /// Fast boolean overlap test against an oriented box
    pub fn intersects_obb(&self, obb: &OrientedBox) -> bool {
        for plane in &self.planes {
            if obb.side_of_plane(plane) == PlaneSide::Back {
                return false;
            }
        }
        true
    }

    /// Which side of a plane this frustum lies on
    pub fn side_of_plane(&self, plane: &Plane) -> PlaneSide {
        plane.classify_frustum(self)
    }

    /// Ray intersection; returns the nearest plane entry distance if hit
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_frustum(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{constants::HALF_PI, Mat4Ext};
    use approx::assert_relative_eq;

    fn test_frustum() -> Frustum {
        // Camera at the origin looking down +Z, 90 degree vertical fov,
        // square aspect, near 0.1, far 100
        let projection = Mat4::perspective(HALF_PI, 1.0, 0.1, 100.0);
        let view = Mat4::look_at(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0), Vec3::y());
        Frustum::from_matrix(projection * view)
    }

    #[test]
    fn test_point_containment() {
        let frustum = test_frustum();

        assert_eq!(
            frustum.contains_point(Vec3::new(0.0, 0.0, 5.0)),
            Containment::Contains
        );
        assert_eq!(
            frustum.contains_point(Vec3::new(0.0, 0.0, -5.0)),
            Containment::Disjoint
        );
        assert_eq!(
            frustum.contains_point(Vec3::new(200.0, 0.0, 5.0)),
            Containment::Disjoint
        );
    }

    #[test]
    fn test_corner_positions() {
        let frustum = test_frustum();
        let corners = frustum.corners();

        // Near-bottom-left at the 90 degree fov: half-width equals near
        assert_relative_eq!(corners[0].x, -0.1, epsilon = 1e-3);
        assert_relative_eq!(corners[0].y, -0.1, epsilon = 1e-3);
        assert_relative_eq!(corners[0].z, 0.1, epsilon = 1e-3);

        // Far-top-right
        assert_relative_eq!(corners[7].x, 100.0, epsilon = 0.1);
        assert_relative_eq!(corners[7].y, 100.0, epsilon = 0.1);
        assert_relative_eq!(corners[7].z, 100.0, epsilon = 0.1);
    }

    #[test]
    fn test_corners_lie_on_their_planes() {
        let frustum = test_frustum();

        for (i, corner) in frustum.corners().iter().enumerate() {
            let horizontal = if i & 1 != 0 { Frustum::RIGHT } else { Frustum::LEFT };
            let vertical = if i & 2 != 0 { Frustum::TOP } else { Frustum::BOTTOM };
            let depth = if i & 4 != 0 { Frustum::FAR } else { Frustum::NEAR };

            for plane_index in [horizontal, vertical, depth] {
                let distance = frustum.planes()[plane_index].distance_to_point(*corner);
                assert!(
                    distance.abs() < 1e-2,
                    "corner {i} is {distance} away from plane {plane_index}"
                );
            }
        }
    }

    #[test]
    fn test_aabb_culling() {
        let frustum = test_frustum();

        let visible = AABB::from_center_extents(Vec3::new(0.0, 0.0, 10.0), Vec3::new(1.0, 1.0, 1.0));
        let behind = AABB::from_center_extents(Vec3::new(0.0, 0.0, -10.0), Vec3::new(1.0, 1.0, 1.0));
        let straddling_near =
            AABB::from_center_extents(Vec3::new(0.0, 0.0, 0.1), Vec3::new(0.05, 0.05, 0.05));

        assert_eq!(frustum.contains_aabb(&visible), Containment::Contains);
        assert_eq!(frustum.contains_aabb(&behind), Containment::Disjoint);
        assert_eq!(
            frustum.contains_aabb(&straddling_near),
            Containment::Intersects
        );

        assert!(frustum.intersects_aabb(&visible));
        assert!(!frustum.intersects_aabb(&behind));
        assert!(frustum.intersects_aabb(&straddling_near));
    }

    #[test]
    fn test_sphere_culling() {
        let frustum = test_frustum();

        assert_eq!(
            frustum.contains_sphere(&Sphere::new(Vec3::new(0.0, 0.0, 50.0), 1.0)),
            Containment::Contains
        );
        assert_eq!(
            frustum.contains_sphere(&Sphere::new(Vec3::new(0.0, 0.0, -50.0), 1.0)),
            Containment::Disjoint
        );
        // Poking through the far plane
        assert_eq!(
            frustum.contains_sphere(&Sphere::new(Vec3::new(0.0, 0.0, 100.0), 5.0)),
            Containment::Intersects
        );
    }

    #[test]
    fn test_fast_point_mode_skips_boundary() {
        // The identity matrix yields exact planes (x,y in [-1,1], z in [0,1]),
        // so the boundary distance is exactly zero
        let frustum = Frustum::from_matrix(Mat4::identity());
        let on_near = Vec3::new(0.0, 0.0, 0.0);

        assert_eq!(
            frustum.contains_point_with(on_near, QueryPrecision::Precise),
            Containment::Intersects
        );
        assert_eq!(
            frustum.contains_point_with(on_near, QueryPrecision::Fast),
            Containment::Contains
        );
        assert_eq!(
            frustum.contains_point(Vec3::new(0.0, 0.0, 0.5)),
            Containment::Contains
        );
    }

    #[test]
    fn test_ray_enters_frustum() {
        let frustum = test_frustum();

        // From behind the camera straight toward the scene; the side planes
        // converge at the eye, so the nearest plane crossing is at t = 1
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0));
        let t = ray.intersect_frustum(&frustum).expect("should enter");
        assert_relative_eq!(t, 1.0, epsilon = 1e-3);

        // Pointing away from the frustum entirely
        let away = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(away.intersect_frustum(&frustum), None);
    }
}
