//! Spatial primitives for play-space positioning
//!
//! Play space is a right-handed plane seen from the visitor:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Toward the camera (+), usually flattened to 0

mod bounds;
mod point;

pub use bounds::PlayBounds;
pub use point::{Point2, Point3, Vector3};
