//! Bridge to the parry3d convex-collision library
//!
//! Translates [`ConvexShape`] plus rigid transform into parry's shape and
//! isometry types, runs its contact query, and translates the result back
//! into [`ContactInfo`]. Every conversion is NaN-guarded: a NaN component
//! in the returned normal or point means "no valid contact", even when the
//! library reported a geometric hit, so corrupt contact data never reaches
//! the physics layer.

use parry3d::query;
use parry3d::shape as pshape;
use thiserror::Error;

use super::contact::ContactInfo;
use super::shape::ConvexShape;
use crate::foundation::math::{Iso, Point3};

/// Error raised by the parry bridge
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollisionError {
    /// parry has no contact dispatcher for this shape pair
    #[error("contact query unsupported for shape pair: {a} vs {b}")]
    UnsupportedShapePair {
        /// Kind name of shape A
        a: &'static str,
        /// Kind name of shape B
        b: &'static str,
    },
    /// The hull vertices do not span a volume parry can triangulate
    #[error("convex hull is degenerate and has no parry representation")]
    DegenerateHull,
}

/// Convert a shape into its parry equivalent
fn to_parry(shape: &ConvexShape) -> Result<Box<dyn pshape::Shape>, CollisionError> {
    Ok(match shape {
        ConvexShape::Sphere { radius } => Box::new(pshape::Ball::new(*radius)),
        ConvexShape::Box { half_extents } => Box::new(pshape::Cuboid::new(*half_extents)),
        ConvexShape::Hull { vertices } => {
            let points: Vec<Point3> = vertices.iter().map(|v| Point3::from(*v)).collect();
            let hull = pshape::ConvexPolyhedron::from_convex_hull(&points)
                .ok_or(CollisionError::DegenerateHull)?;
            Box::new(hull)
        }
        ConvexShape::Capsule {
            half_height,
            radius,
        } => Box::new(pshape::Capsule::new_y(*half_height, *radius)),
        ConvexShape::Cylinder {
            half_height,
            radius,
        } => Box::new(pshape::Cylinder::new(*half_height, *radius)),
        ConvexShape::Cone {
            half_height,
            radius,
        } => Box::new(pshape::Cone::new(*half_height, *radius)),
        ConvexShape::Segment { start, end } => Box::new(pshape::Segment::new(
            Point3::from(*start),
            Point3::from(*end),
        )),
    })
}

/// Translate a parry contact, rejecting non-touching and NaN results
fn convert_contact(contact: &query::Contact) -> Option<ContactInfo> {
    if contact.dist > 0.0 {
        return None;
    }

    let normal = contact.normal1.into_inner();
    let point = (contact.point1.coords + contact.point2.coords) * 0.5;
    let depth = -contact.dist;

    if normal.iter().any(|v| v.is_nan()) || point.iter().any(|v| v.is_nan()) || depth.is_nan() {
        return None;
    }

    Some(ContactInfo {
        normal,
        depth,
        point,
    })
}

/// Contact between two shapes computed by parry
///
/// `prediction` is the maximum surface gap at which parry still reports a
/// contact candidate; only touching or penetrating results are translated
/// into a `ContactInfo`. The normal points from shape A toward shape B,
/// matching [`crate::physics::collision::contact`].
pub fn contact(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
    prediction: f32,
) -> Result<Option<ContactInfo>, CollisionError> {
    let parry_a = to_parry(shape_a)?;
    let parry_b = to_parry(shape_b)?;

    match query::contact(iso_a, parry_a.as_ref(), iso_b, parry_b.as_ref(), prediction) {
        Ok(Some(found)) => Ok(convert_contact(&found)),
        Ok(None) => Ok(None),
        Err(query::Unsupported) => Err(CollisionError::UnsupportedShapePair {
            a: shape_a.kind_name(),
            b: shape_b.kind_name(),
        }),
    }
}
