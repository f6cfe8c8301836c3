//! Narrow-phase collision detection
//!
//! Shape-agnostic convex collision built on support functions: one generic
//! GJK/EPA implementation handles every [`collision::ConvexShape`] pair
//! without per-pair special cases.

pub mod collision;
