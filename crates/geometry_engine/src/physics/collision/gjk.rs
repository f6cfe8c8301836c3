//! GJK distance and intersection engine
//!
//! Incremental simplex-based computation of the closest points between two
//! convex shapes through their support functions. The simplex is the
//! working approximation of the feature of the Minkowski difference closest
//! to the origin; each iteration adds one support point and reduces the
//! simplex to the Voronoi region nearest the origin. The origin being
//! enclosed by a four-point simplex proves overlap.
//!
//! The engine runs on shape *cores* (a sphere's core is its center, a
//! capsule's its axis segment); [`resolve_radii`] applies the rounding radii
//! to a core result afterwards.
//!
//! References: Gilbert, Johnson, Keerthi (1988); Ericson, "Real-Time
//! Collision Detection", chapter 5 (closest-point region tests).

use super::shape::ConvexShape;
use crate::foundation::math::{Iso, Vec3};

const EPSILON: f32 = 0.000001;

/// Tuning parameters for a GJK query
#[derive(Debug, Clone, Copy)]
pub struct GjkConfig {
    /// Iteration cap; acts as a deterministic circuit-breaker, not a
    /// wall-clock timeout
    pub max_iterations: u32,
    /// Squared-distance progress tolerance for termination
    pub tolerance: f32,
}

impl Default for GjkConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            tolerance: EPSILON,
        }
    }
}

/// One vertex of the simplex
///
/// Retains the originating support points on both shapes, not just their
/// Minkowski difference: the final barycentric weights are applied to these
/// to reconstruct the closest points in world space.
#[derive(Debug, Clone, Copy)]
pub struct SupportPoint {
    /// Support point on shape A in world space
    pub on_a: Vec3,
    /// Support point on shape B in world space
    pub on_b: Vec3,
    /// Minkowski difference point (`on_a - on_b`)
    pub w: Vec3,
}

impl SupportPoint {
    /// Pair up the originating support points of both shapes
    pub(crate) fn from_supports(on_a: Vec3, on_b: Vec3) -> Self {
        Self {
            on_a,
            on_b,
            w: on_a - on_b,
        }
    }

    fn zero() -> Self {
        Self {
            on_a: Vec3::zeros(),
            on_b: Vec3::zeros(),
            w: Vec3::zeros(),
        }
    }
}

/// GJK working simplex: 0 to 4 support points plus barycentric weights
///
/// A simplex may be kept across frames and passed back into
/// [`closest_points_seeded`] to warm-start the next query; temporal
/// coherence usually makes the reseeded query converge in one or two
/// iterations.
#[derive(Debug, Clone, Copy)]
pub struct Simplex {
    points: [SupportPoint; 4],
    weights: [f32; 4],
    len: usize,
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplex {
    /// Create an empty simplex
    pub fn new() -> Self {
        Self {
            points: [SupportPoint::zero(); 4],
            weights: [0.0; 4],
            len: 0,
        }
    }

    /// Number of points currently in the simplex
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the simplex holds no points
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The current points
    pub fn points(&self) -> &[SupportPoint] {
        &self.points[..self.len]
    }

    /// Append a support point; the simplex must not be full
    fn push(&mut self, point: SupportPoint) {
        debug_assert!(self.len < 4, "simplex overflow");
        self.points[self.len] = point;
        self.weights[self.len] = 0.0;
        self.len += 1;
    }

    /// Whether an equivalent support point is already present
    fn contains(&self, w: &Vec3) -> bool {
        self.points[..self.len]
            .iter()
            .any(|p| (p.w - w).norm_squared() < EPSILON)
    }

    /// Replace the simplex contents
    fn set(&mut self, points: &[SupportPoint], weights: &[f32]) {
        debug_assert!(points.len() == weights.len() && points.len() <= 4);
        self.len = points.len();
        for i in 0..self.len {
            self.points[i] = points[i];
            self.weights[i] = weights[i];
        }
    }

    /// Closest points on both shapes from the current barycentric weights
    fn witness_points(&self) -> (Vec3, Vec3) {
        let mut on_a = Vec3::zeros();
        let mut on_b = Vec3::zeros();
        for i in 0..self.len {
            on_a += self.points[i].on_a * self.weights[i];
            on_b += self.points[i].on_b * self.weights[i];
        }
        (on_a, on_b)
    }
}

/// Result of a GJK query between two shape cores
#[derive(Debug, Clone)]
pub struct GjkResult {
    /// Whether the cores overlap (origin enclosed or within tolerance)
    pub hit: bool,
    /// Distance between the cores; zero when `hit`
    pub distance: f32,
    /// Closest point on shape A's core in world space
    pub point_a: Vec3,
    /// Closest point on shape B's core in world space
    pub point_b: Vec3,
    /// Iterations executed
    pub iterations: u32,
    /// Terminal simplex, usable as an EPA seed or a warm start
    pub simplex: Simplex,
}

/// Outcome of reducing a simplex against the origin
enum Reduction {
    /// The origin is enclosed by a four-point simplex
    Enclosed,
    /// Closest point on the simplex to the origin
    Closest(Vec3),
}

/// Result of a closest-point computation on one triangle
struct TriangleRegion {
    points: [SupportPoint; 3],
    weights: [f32; 3],
    len: usize,
    closest: Vec3,
}

/// Support point of the Minkowski difference of two shape cores
fn minkowski_support(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
    direction: &Vec3,
) -> SupportPoint {
    let on_a = shape_a.support(iso_a, direction);
    let on_b = shape_b.support(iso_b, &-direction);
    SupportPoint::from_supports(on_a, on_b)
}

/// Closest point on a segment to the origin, with region reduction
fn reduce_segment(simplex: &mut Simplex) -> Vec3 {
    let a = simplex.points[0];
    let b = simplex.points[1];

    let ab = b.w - a.w;
    let denom = ab.norm_squared();
    if denom < EPSILON {
        // Coincident endpoints; collapse to one
        simplex.set(&[a], &[1.0]);
        return a.w;
    }

    let t = -a.w.dot(&ab) / denom;
    if t <= 0.0 {
        simplex.set(&[a], &[1.0]);
        a.w
    } else if t >= 1.0 {
        simplex.set(&[b], &[1.0]);
        b.w
    } else {
        simplex.set(&[a, b], &[1.0 - t, t]);
        a.w + ab * t
    }
}

/// Closest point on a triangle to the origin
///
/// Classifies the origin into one of the triangle's seven Voronoi regions
/// (three vertices, three edges, face) via signed projections, then
/// computes barycentric weights for the winning region. Every division is
/// guarded against a near-zero denominator.
fn closest_on_triangle(a: SupportPoint, b: SupportPoint, c: SupportPoint) -> TriangleRegion {
    let ab = b.w - a.w;
    let ac = c.w - a.w;
    let ap = -a.w;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return TriangleRegion {
            points: [a, b, c],
            weights: [1.0, 0.0, 0.0],
            len: 1,
            closest: a.w,
        };
    }

    let bp = -b.w;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return TriangleRegion {
            points: [b, a, c],
            weights: [1.0, 0.0, 0.0],
            len: 1,
            closest: b.w,
        };
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let denom = d1 - d3;
        let v = if denom.abs() > EPSILON { d1 / denom } else { 0.0 };
        return TriangleRegion {
            points: [a, b, c],
            weights: [1.0 - v, v, 0.0],
            len: 2,
            closest: a.w + ab * v,
        };
    }

    let cp = -c.w;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return TriangleRegion {
            points: [c, a, b],
            weights: [1.0, 0.0, 0.0],
            len: 1,
            closest: c.w,
        };
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let denom = d2 - d6;
        let w = if denom.abs() > EPSILON { d2 / denom } else { 0.0 };
        return TriangleRegion {
            points: [a, c, b],
            weights: [1.0 - w, w, 0.0],
            len: 2,
            closest: a.w + ac * w,
        };
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let denom = (d4 - d3) + (d5 - d6);
        let w = if denom.abs() > EPSILON {
            (d4 - d3) / denom
        } else {
            0.0
        };
        return TriangleRegion {
            points: [b, c, a],
            weights: [1.0 - w, w, 0.0],
            len: 2,
            closest: b.w + (c.w - b.w) * w,
        };
    }

    // Face interior
    let denom = va + vb + vc;
    if denom.abs() < EPSILON {
        // Sliver triangle; fall back to the best vertex
        return TriangleRegion {
            points: [a, b, c],
            weights: [1.0, 0.0, 0.0],
            len: 1,
            closest: a.w,
        };
    }
    let inv = 1.0 / denom;
    let v = vb * inv;
    let w = vc * inv;
    TriangleRegion {
        points: [a, b, c],
        weights: [1.0 - v - w, v, w],
        len: 3,
        closest: a.w + ab * v + ac * w,
    }
}

/// Closest point on a triangle simplex, with region reduction
fn reduce_triangle(simplex: &mut Simplex) -> Vec3 {
    let region = closest_on_triangle(simplex.points[0], simplex.points[1], simplex.points[2]);
    simplex.set(&region.points[..region.len], &region.weights[..region.len]);
    region.closest
}

/// Reduce a tetrahedron simplex, detecting enclosure of the origin
///
/// The origin is tested against each face plane with signed-volume style
/// triple products; lying inside all four faces means the origin is
/// enclosed. Otherwise the closest of the outside faces wins and the
/// simplex reduces to that face's region. A face whose opposing-vertex
/// denominator is near zero (near-coplanar tetrahedron) is treated as
/// outside rather than dividing by it.
fn reduce_tetrahedron(simplex: &mut Simplex) -> Reduction {
    let a = simplex.points[0];
    let b = simplex.points[1];
    let c = simplex.points[2];
    let d = simplex.points[3];

    // (face vertices, opposing vertex)
    let faces = [
        ([a, b, c], d),
        ([a, c, d], b),
        ([a, b, d], c),
        ([b, c, d], a),
    ];

    let mut best: Option<TriangleRegion> = None;
    let mut best_distance_sq = f32::INFINITY;

    for ([p0, p1, p2], opposite) in faces {
        let normal = (p1.w - p0.w).cross(&(p2.w - p0.w));
        let origin_side = -normal.dot(&p0.w);
        let opposite_side = normal.dot(&(opposite.w - p0.w));

        // Outside when the origin and the opposing vertex are on opposite
        // sides; a degenerate (coplanar) face counts as outside so a
        // collapsed tetrahedron can never fake an enclosure
        let outside = if opposite_side.abs() < EPSILON {
            true
        } else {
            origin_side * opposite_side < 0.0
        };

        if !outside {
            continue;
        }

        let region = closest_on_triangle(p0, p1, p2);
        let distance_sq = region.closest.norm_squared();
        if distance_sq < best_distance_sq {
            best_distance_sq = distance_sq;
            best = Some(region);
        }
    }

    match best {
        None => {
            // Inside all four faces; the exact weights are EPA's concern
            simplex.weights = [0.25; 4];
            Reduction::Enclosed
        }
        Some(region) => {
            simplex.set(&region.points[..region.len], &region.weights[..region.len]);
            Reduction::Closest(region.closest)
        }
    }
}

impl Simplex {
    /// Reduce to the Voronoi region closest to the origin
    fn reduce(&mut self) -> Reduction {
        match self.len {
            1 => {
                self.weights[0] = 1.0;
                Reduction::Closest(self.points[0].w)
            }
            2 => Reduction::Closest(reduce_segment(self)),
            3 => Reduction::Closest(reduce_triangle(self)),
            4 => reduce_tetrahedron(self),
            _ => unreachable!("reduce called on an empty simplex"),
        }
    }
}

/// Closest points between two shape cores
pub fn closest_points(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
    config: &GjkConfig,
) -> GjkResult {
    let mut simplex = Simplex::new();
    closest_points_seeded(shape_a, iso_a, shape_b, iso_b, config, &mut simplex)
}

/// Closest points between two shape cores, warm-started from `simplex`
///
/// An empty simplex starts the search from the direction between the shape
/// centers. A simplex carried over from the previous frame seeds the query
/// with that frame's witness direction instead, which usually makes the
/// re-query converge in one or two iterations under temporal coherence;
/// the stale support points themselves are discarded, since the shapes
/// have moved under them. The simplex is left in its terminal state for
/// reuse.
pub fn closest_points_seeded(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
    config: &GjkConfig,
    simplex: &mut Simplex,
) -> GjkResult {
    let mut direction = if simplex.is_empty() {
        shape_b.center(iso_b) - shape_a.center(iso_a)
    } else {
        let (point_a, point_b) = simplex.witness_points();
        point_b - point_a
    };
    if direction.norm_squared() < EPSILON {
        direction = Vec3::x();
    }

    simplex.set(&[], &[]);
    simplex.push(minkowski_support(shape_a, iso_a, shape_b, iso_b, &direction));

    let mut best_distance_sq = f32::INFINITY;
    let mut iterations = 0;

    loop {
        let closest = match simplex.reduce() {
            Reduction::Enclosed => {
                let (point_a, point_b) = simplex.witness_points();
                return GjkResult {
                    hit: true,
                    distance: 0.0,
                    point_a,
                    point_b,
                    iterations,
                    simplex: *simplex,
                };
            }
            Reduction::Closest(closest) => closest,
        };

        let distance_sq = closest.norm_squared();

        // Degenerate search direction: the origin lies on the simplex
        // within tolerance, so the cores are touching or enclosing
        if distance_sq < config.tolerance {
            let (point_a, point_b) = simplex.witness_points();
            return GjkResult {
                hit: true,
                distance: 0.0,
                point_a,
                point_b,
                iterations,
                simplex: *simplex,
            };
        }

        // No progress over the previous iteration: the simplex already
        // holds the closest feature
        if distance_sq >= best_distance_sq - config.tolerance {
            return separated(simplex, distance_sq, iterations);
        }
        best_distance_sq = distance_sq;

        if iterations >= config.max_iterations {
            // Treated as non-overlapping at the last computed distance;
            // callers should read this as "very close or touching"
            log::debug!(
                "gjk: iteration cap {} reached at distance^2 {distance_sq}",
                config.max_iterations
            );
            return separated(simplex, distance_sq, iterations);
        }
        iterations += 1;

        let direction = -closest;
        let support = minkowski_support(shape_a, iso_a, shape_b, iso_b, &direction);

        // A support point already in the simplex cannot improve it
        if simplex.contains(&support.w) {
            return separated(simplex, distance_sq, iterations);
        }

        simplex.push(support);
    }
}

fn separated(simplex: &Simplex, distance_sq: f32, iterations: u32) -> GjkResult {
    let (point_a, point_b) = simplex.witness_points();
    GjkResult {
        hit: false,
        distance: distance_sq.sqrt(),
        point_a,
        point_b,
        iterations,
        simplex: *simplex,
    }
}

/// Apply the rounding radii of two shapes to a core GJK result
///
/// When the gap between the cores exceeds the radii sum, the closest points
/// are pushed toward each other along the separating normal by each shape's
/// own radius. When the radii consume the whole gap the shapes are touching
/// or overlapping: the result is a hit at the midpoint with the remaining
/// depth.
pub fn resolve_radii(result: &GjkResult, radius_a: f32, radius_b: f32) -> GjkResult {
    let total = radius_a + radius_b;
    if result.hit || total == 0.0 {
        return result.clone();
    }

    let gap = result.distance - total;
    let offset = result.point_b - result.point_a;
    let norm = offset.norm();
    if norm < EPSILON {
        // Cores touching; the radii fully overlap
        return GjkResult {
            hit: true,
            distance: 0.0,
            ..result.clone()
        };
    }
    let normal = offset / norm;

    let point_a = result.point_a + normal * radius_a;
    let point_b = result.point_b - normal * radius_b;

    if gap > 0.0 {
        GjkResult {
            hit: false,
            distance: gap,
            point_a,
            point_b,
            ..result.clone()
        }
    } else {
        GjkResult {
            hit: true,
            distance: 0.0,
            point_a: (point_a + point_b) * 0.5,
            point_b: (point_a + point_b) * 0.5,
            ..result.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn iso_at(x: f32, y: f32, z: f32) -> Iso {
        Iso::translation(x, y, z)
    }

    fn config() -> GjkConfig {
        let _ = env_logger::builder().is_test(true).try_init();
        GjkConfig::default()
    }

    #[test]
    fn test_separated_boxes_distance() {
        let a = ConvexShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let b = ConvexShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();

        let result = closest_points(&a, &iso_at(0.0, 0.0, 0.0), &b, &iso_at(5.0, 0.0, 0.0), &config());

        assert!(!result.hit);
        assert_relative_eq!(result.distance, 3.0, epsilon = 1e-4);
        assert_relative_eq!(result.point_a.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.point_b.x, 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_overlapping_boxes_hit() {
        let a = ConvexShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let b = ConvexShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();

        let result = closest_points(&a, &iso_at(0.0, 0.0, 0.0), &b, &iso_at(1.0, 0.5, 0.0), &config());
        assert!(result.hit);
        assert_relative_eq!(result.distance, 0.0);
    }

    #[test]
    fn test_sphere_cores_and_radius_expansion() {
        let a = ConvexShape::sphere(1.0).unwrap();
        let b = ConvexShape::sphere(1.0).unwrap();

        // Centers 3 apart: cores are points 3 apart, radii leave a gap of 1
        let core = closest_points(&a, &iso_at(0.0, 0.0, 0.0), &b, &iso_at(3.0, 0.0, 0.0), &config());
        assert!(!core.hit);
        assert_relative_eq!(core.distance, 3.0, epsilon = 1e-5);

        let rounded = resolve_radii(&core, a.radius(), b.radius());
        assert!(!rounded.hit);
        assert_relative_eq!(rounded.distance, 1.0, epsilon = 1e-4);
        assert_relative_eq!(rounded.point_a.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(rounded.point_b.x, 2.0, epsilon = 1e-4);

        // Centers 1.5 apart: the radii consume the gap
        let core = closest_points(&a, &iso_at(0.0, 0.0, 0.0), &b, &iso_at(1.5, 0.0, 0.0), &config());
        let rounded = resolve_radii(&core, a.radius(), b.radius());
        assert!(rounded.hit);
        assert_relative_eq!(rounded.distance, 0.0);
    }

    #[test]
    fn test_sphere_hit_threshold_matches_radii_sum() {
        let a = ConvexShape::sphere(1.0).unwrap();
        let b = ConvexShape::sphere(0.5).unwrap();

        for (distance, expect_hit) in [(0.5, true), (1.4, true), (1.6, false), (3.0, false)] {
            let core = closest_points(
                &a,
                &iso_at(0.0, 0.0, 0.0),
                &b,
                &iso_at(distance, 0.0, 0.0),
                &config(),
            );
            let rounded = resolve_radii(&core, a.radius(), b.radius());
            assert_eq!(
                rounded.hit, expect_hit,
                "centers {distance} apart, radii 1.0 + 0.5"
            );
        }
    }

    #[test]
    fn test_hull_agrees_with_aabb_overlap() {
        use crate::geometry::AABB;

        let unit_cube = |center: Vec3| {
            AABB::from_center_extents(center, Vec3::new(1.0, 1.0, 1.0))
        };
        let cube_hull = || {
            ConvexShape::hull(
                unit_cube(Vec3::zeros()).corners().to_vec(),
            )
            .unwrap()
        };

        // Deterministic suite of overlapping, touching and disjoint pairs
        let offsets = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.9, 0.3, 0.0),
            Vec3::new(2.5, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(1.5, 1.5, 1.5),
            Vec3::new(-1.2, 0.7, -0.4),
            Vec3::new(2.1, 2.1, 2.1),
        ];

        for offset in offsets {
            let aabb_overlap = unit_cube(Vec3::zeros()).intersects_aabb(&unit_cube(offset));

            let result = closest_points(
                &cube_hull(),
                &Iso::identity(),
                &cube_hull(),
                &iso_at(offset.x, offset.y, offset.z),
                &config(),
            );

            assert_eq!(
                result.hit, aabb_overlap,
                "hull GJK disagrees with AABB test at offset {offset:?}"
            );
        }
    }

    #[test]
    fn test_point_like_segment_vs_box() {
        let point = ConvexShape::segment(Vec3::zeros(), Vec3::zeros());
        let cube = ConvexShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();

        let inside = closest_points(&point, &iso_at(0.5, 0.0, 0.0), &cube, &Iso::identity(), &config());
        assert!(inside.hit);

        let outside = closest_points(&point, &iso_at(3.0, 0.0, 0.0), &cube, &Iso::identity(), &config());
        assert!(!outside.hit);
        assert_relative_eq!(outside.distance, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_warm_start_reuses_simplex() {
        let a = ConvexShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let b = ConvexShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();

        let mut simplex = Simplex::new();
        let cold = closest_points_seeded(
            &a,
            &iso_at(0.0, 0.0, 0.0),
            &b,
            &iso_at(5.0, 0.0, 0.0),
            &config(),
            &mut simplex,
        );

        // Re-query after a small movement, reusing the terminal simplex
        let warm = closest_points_seeded(
            &a,
            &iso_at(0.0, 0.0, 0.0),
            &b,
            &iso_at(5.1, 0.0, 0.0),
            &config(),
            &mut simplex,
        );

        assert!(!warm.hit);
        assert!(warm.iterations <= cold.iterations);
        assert_relative_eq!(warm.distance, 3.1, epsilon = 1e-3);
    }

    #[test]
    fn test_touching_boxes_report_contact() {
        let a = ConvexShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let b = ConvexShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();

        // Faces exactly coincident at x = 1
        let result = closest_points(&a, &iso_at(0.0, 0.0, 0.0), &b, &iso_at(2.0, 0.0, 0.0), &config());
        assert!(result.hit || result.distance < 1e-3);
    }
}
