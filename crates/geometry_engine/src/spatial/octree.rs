//! Octree spatial partitioning structure
//!
//! Efficiently divides 3D space into hierarchical regions for fast
//! spatial queries. Each node subdivides into 8 octants when entry
//! density exceeds a threshold. Entries are identified by a caller-chosen
//! id type, typically an entity or proxy handle.

use crate::foundation::math::Vec3;
use crate::geometry::{Containment, Ray, AABB};

/// Configuration for octree behavior
#[derive(Debug, Clone)]
pub struct OctreeConfig {
    /// Maximum entries per node before subdivision
    pub max_entries_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum node size (prevents excessive subdivision)
    pub min_node_size: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_entries_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
        }
    }
}

/// Entry stored in the octree with position and bounding radius
#[derive(Debug, Clone, Copy)]
pub struct OctreeEntry<T> {
    /// Caller-chosen identifier
    pub id: T,
    /// World-space position
    pub position: Vec3,
    /// Bounding radius around the position
    pub radius: f32,
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
struct OctreeNode<T> {
    /// World-space bounds of this node
    bounds: AABB,

    /// Entries contained in this node (if leaf)
    entries: Vec<OctreeEntry<T>>,

    /// Child nodes (8 octants), None if this is a leaf
    children: Option<Box<[OctreeNode<T>; 8]>>,

    /// Depth in the tree (0 = root)
    depth: u32,
}

/// Octant index (0-7) for a position relative to a center point
///
/// Same bit layout as [`AABB::corners`]: bit 0 = x, bit 1 = y, bit 2 = z.
fn octant_index(center: Vec3, position: Vec3) -> usize {
    let x_bit = usize::from(position.x >= center.x);
    let y_bit = usize::from(position.y >= center.y);
    let z_bit = usize::from(position.z >= center.z);
    (z_bit << 2) | (y_bit << 1) | x_bit
}

impl<T: Copy + PartialEq> OctreeNode<T> {
    fn new(bounds: AABB, depth: u32) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            children: None,
            depth,
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Subdivide this node into 8 children and redistribute its entries
    fn subdivide(&mut self) {
        if self.children.is_some() {
            return;
        }

        let center = self.bounds.center();
        let quarter_extents = self.bounds.extents() * 0.5;

        let child = |octant: usize| {
            let x_sign = if octant & 1 != 0 { 1.0 } else { -1.0 };
            let y_sign = if octant & 2 != 0 { 1.0 } else { -1.0 };
            let z_sign = if octant & 4 != 0 { 1.0 } else { -1.0 };

            let child_center = Vec3::new(
                center.x + quarter_extents.x * x_sign,
                center.y + quarter_extents.y * y_sign,
                center.z + quarter_extents.z * z_sign,
            );

            OctreeNode::new(
                AABB::from_center_extents(child_center, quarter_extents),
                self.depth + 1,
            )
        };

        self.children = Some(Box::new([
            child(0),
            child(1),
            child(2),
            child(3),
            child(4),
            child(5),
            child(6),
            child(7),
        ]));

        let entries = std::mem::take(&mut self.entries);
        if let Some(ref mut children) = self.children {
            for entry in entries {
                let octant = octant_index(center, entry.position);
                children[octant].entries.push(entry);
            }
        }
    }

    fn insert(&mut self, entry: OctreeEntry<T>, config: &OctreeConfig) -> bool {
        if self.bounds.contains_point(entry.position) == Containment::Disjoint {
            return false;
        }

        if self.is_leaf() {
            let should_subdivide = self.entries.len() >= config.max_entries_per_node
                && self.depth < config.max_depth
                && self.bounds.extents().x > config.min_node_size;

            if !should_subdivide {
                self.entries.push(entry);
                return true;
            }
            self.subdivide();
        }

        let octant = octant_index(self.bounds.center(), entry.position);
        if let Some(ref mut children) = self.children {
            return children[octant].insert(entry, config);
        }

        false
    }

    fn remove(&mut self, id: T) -> bool {
        if let Some(index) = self.entries.iter().position(|e| e.id == id) {
            self.entries.swap_remove(index);
            return true;
        }

        if let Some(ref mut children) = self.children {
            for child in children.iter_mut() {
                if child.remove(id) {
                    return true;
                }
            }
        }

        false
    }

    /// Collect all entries within a radius of a point
    fn query_radius(&self, center: Vec3, radius: f32, results: &mut Vec<OctreeEntry<T>>) {
        // Skip the whole subtree when the sphere misses the node bounds
        let to_closest = self.bounds.closest_point(center) - center;
        if to_closest.norm_squared() > radius * radius {
            return;
        }

        for entry in &self.entries {
            let distance_sq = (entry.position - center).norm_squared();
            let combined = radius + entry.radius;
            if distance_sq <= combined * combined {
                results.push(*entry);
            }
        }

        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.query_radius(center, radius, results);
            }
        }
    }

    /// Collect all entries in nodes the ray passes through
    ///
    /// Node bounds are expanded by the largest entry radius in the tree, so
    /// entries stored in a neighboring node but extending into this one are
    /// still found.
    fn query_ray(&self, ray: &Ray, max_entry_radius: f32, results: &mut Vec<OctreeEntry<T>>) {
        let bounds = if max_entry_radius > 0.0 {
            let expansion = Vec3::new(max_entry_radius, max_entry_radius, max_entry_radius);
            AABB::new(self.bounds.min - expansion, self.bounds.max + expansion)
        } else {
            self.bounds
        };

        if ray.intersect_aabb(&bounds).is_none() {
            return;
        }

        results.extend_from_slice(&self.entries);

        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.query_ray(ray, max_entry_radius, results);
            }
        }
    }

    fn find(&self, id: T) -> Option<OctreeEntry<T>> {
        for entry in &self.entries {
            if entry.id == id {
                return Some(*entry);
            }
        }

        if let Some(ref children) = self.children {
            for child in children.iter() {
                if let Some(entry) = child.find(id) {
                    return Some(entry);
                }
            }
        }

        None
    }

    fn leaf_bounds<'a>(&'a self, leaves: &mut Vec<&'a AABB>) {
        if self.is_leaf() {
            leaves.push(&self.bounds);
        } else if let Some(ref children) = self.children {
            for child in children.iter() {
                child.leaf_bounds(leaves);
            }
        }
    }

    fn count(&self) -> usize {
        let mut count = self.entries.len();
        if let Some(ref children) = self.children {
            for child in children.iter() {
                count += child.count();
            }
        }
        count
    }
}

/// Octree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct Octree<T> {
    /// Root node containing the entire world space
    root: OctreeNode<T>,

    /// Configuration
    config: OctreeConfig,

    /// Cached maximum entry radius in the tree (updated on insert)
    max_entry_radius: f32,
}

impl<T: Copy + PartialEq> Octree<T> {
    /// Create a new octree with given world bounds
    pub fn new(world_bounds: AABB, config: OctreeConfig) -> Self {
        Self {
            root: OctreeNode::new(world_bounds, 0),
            config,
            max_entry_radius: 0.0,
        }
    }

    /// Insert an entry; fails when the position is outside the world bounds
    pub fn insert(&mut self, id: T, position: Vec3, radius: f32) -> bool {
        if radius > self.max_entry_radius {
            self.max_entry_radius = radius;
        }

        self.root.insert(
            OctreeEntry {
                id,
                position,
                radius,
            },
            &self.config,
        )
    }

    /// Remove an entry by id
    pub fn remove(&mut self, id: T) -> bool {
        self.root.remove(id)
    }

    /// All entries within a radius of a point
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<OctreeEntry<T>> {
        let mut results = Vec::new();
        self.root.query_radius(center, radius, &mut results);
        results
    }

    /// All entries that potentially intersect a ray
    ///
    /// Returns entries in nodes the ray passes through; exact intersection
    /// against each entry's actual shape is the caller's narrow phase.
    pub fn query_ray(&self, ray: &Ray) -> Vec<OctreeEntry<T>> {
        let mut results = Vec::new();
        self.root.query_ray(ray, self.max_entry_radius, &mut results);
        results
    }

    /// Potential collision candidates near an existing entry
    pub fn query_nearby(&self, id: T) -> Vec<T> {
        if let Some(entry) = self.find(id) {
            self.query_radius(entry.position, entry.radius * 2.0)
                .into_iter()
                .map(|e| e.id)
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Find an entry by id
    pub fn find(&self, id: T) -> Option<OctreeEntry<T>> {
        self.root.find(id)
    }

    /// Bounds of all leaf nodes (for debug visualization)
    pub fn leaf_bounds(&self) -> Vec<&AABB> {
        let mut leaves = Vec::new();
        self.root.leaf_bounds(&mut leaves);
        leaves
    }

    /// Total entry count
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Whether the octree holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries, keeping the world bounds
    pub fn clear(&mut self) {
        self.root = OctreeNode::new(self.root.bounds, 0);
        self.max_entry_radius = 0.0;
    }
}
