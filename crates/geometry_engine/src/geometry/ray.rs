//! Ray primitive and intersection tests
//!
//! All intersection tests return `None` when the ray does not meet the
//! target within its forward half-line, and otherwise the smallest
//! non-negative `t` such that `origin + direction * t` lies on or in the
//! target. The direction is not required to be normalized; `t` is a
//! multiple of the direction's own length.

use serde::{Deserialize, Serialize};

use super::{Frustum, Plane, Sphere, AABB};
use crate::foundation::math::Vec3;

const EPSILON: f32 = 0.000001;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (not required to be normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab-method intersection against an AABB
    ///
    /// The interval of overlap is narrowed one axis at a time. An axis the
    /// ray is parallel to rejects the whole query unless the origin already
    /// lies within that slab. A ray starting on a face and pointing inward
    /// hits at `t = 0`; pointing outward it misses.
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            let min = aabb.min[axis];
            let max = aabb.max[axis];

            if dir.abs() < EPSILON {
                // Parallel to this slab pair; reject unless already inside
                if origin < min || origin > max {
                    return None;
                }
            } else {
                let inv = 1.0 / dir;
                let mut t0 = (min - origin) * inv;
                let mut t1 = (max - origin) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }

                t_near = t_near.max(t0);
                t_far = t_far.min(t1);

                if t_near > t_far || t_far <= 0.0 {
                    return None;
                }
            }
        }

        Some(t_near.max(0.0))
    }

    /// Intersection against a sphere
    ///
    /// A ray starting inside the sphere hits at `t = 0`; a sphere behind
    /// the origin is a miss.
    pub fn intersect_sphere(&self, sphere: &Sphere) -> Option<f32> {
        let to_center = sphere.center - self.origin;
        let radius_sq = sphere.radius * sphere.radius;

        if to_center.norm_squared() <= radius_sq {
            return Some(0.0);
        }

        let length = self.direction.norm();
        if length < EPSILON {
            return None;
        }
        let unit_dir = self.direction / length;

        let projection = to_center.dot(&unit_dir);
        if projection < 0.0 {
            return None;
        }

        let discriminant = radius_sq - (to_center.norm_squared() - projection * projection);
        if discriminant < 0.0 {
            return None;
        }

        let t = (projection - discriminant.sqrt()).max(0.0);
        Some(t / length)
    }

    /// Intersection against a plane
    ///
    /// A ray nearly parallel to the plane is a miss, as is an intersection
    /// behind the origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal.dot(&self.direction);
        if denom.abs() < EPSILON {
            return None;
        }

        let t = -(plane.normal.dot(&self.origin) + plane.distance) / denom;
        if t < 0.0 {
            return None;
        }
        Some(t)
    }

    /// Intersection against a frustum
    ///
    /// Tests the six planes. A plane the origin is outside of and that the
    /// ray never crosses rejects the whole query. The result is the nearest
    /// plane entry point; a ray starting inside the frustum has no forward
    /// entry point and returns `None` (callers that need `t = 0` for that
    /// case can test [`Frustum::contains_point`] first).
    pub fn intersect_frustum(&self, frustum: &Frustum) -> Option<f32> {
        let mut nearest: Option<f32> = None;

        for plane in frustum.planes() {
            let origin_distance = plane.distance_to_point(self.origin);
            let t = self.intersect_plane(plane);

            match t {
                Some(t) => {
                    if nearest.map_or(true, |best| t < best) {
                        nearest = Some(t);
                    }
                }
                None => {
                    if origin_distance < 0.0 {
                        // Outside this plane and never crossing it
                        return None;
                    }
                }
            }
        }

        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_sphere_head_on() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let sphere = Sphere::new(Vec3::zeros(), 1.0);

        let t = ray.intersect_sphere(&sphere).expect("should hit");
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_sphere_inside_and_behind() {
        let sphere = Sphere::new(Vec3::zeros(), 1.0);

        let inside = Ray::new(Vec3::new(0.2, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(inside.intersect_sphere(&sphere), Some(0.0));

        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(behind.intersect_sphere(&sphere), None);
    }

    #[test]
    fn test_ray_sphere_unnormalized_direction() {
        // t is a multiple of the direction's length
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 2.0));
        let sphere = Sphere::new(Vec3::zeros(), 1.0);

        let t = ray.intersect_sphere(&sphere).expect("should hit");
        assert_relative_eq!(t, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_aabb_entry_distance() {
        let aabb = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::new(0.5, 0.5, -2.0), Vec3::new(0.0, 0.0, 1.0));

        let t = ray.intersect_aabb(&aabb).expect("should hit");
        assert_relative_eq!(t, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_aabb_on_face_boundary() {
        let aabb = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));

        let inward = Ray::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(inward.intersect_aabb(&aabb), Some(0.0));

        let outward = Ray::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(outward.intersect_aabb(&aabb), None);
    }

    #[test]
    fn test_ray_aabb_parallel_slab() {
        let aabb = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));

        // Parallel to the X slabs, origin outside them
        let miss = Ray::new(Vec3::new(2.0, 0.5, -1.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(miss.intersect_aabb(&aabb), None);

        // Parallel to the X slabs, origin inside them
        let hit = Ray::new(Vec3::new(0.5, 0.5, -1.0), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(hit.intersect_aabb(&aabb).unwrap(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_plane() {
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), 0.0);

        let down = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(down.intersect_plane(&plane).unwrap(), 3.0, epsilon = 1e-5);

        let parallel = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(parallel.intersect_plane(&plane), None);

        let away = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(away.intersect_plane(&plane), None);
    }
}
