//! Entity placement
//!
//! - Rejection-sampling placer with a deterministic fallback ring
//! - Category-balanced spawner that owns entity id allocation

mod placer;
mod spawner;

pub use placer::{Placement, SpatialPlacer};
pub use spawner::Spawner;
