//! Input side of the engine
//!
//! Turns raw detector output into play-space signals:
//! - Landmark frame data contract
//! - Image-space to play-space mapping
//! - Debounced pinch detection
//! - Open palm / fist classification
//! - Cursor smoothing and body-pose cursors
//! - Synthetic hands for demos and tests

mod cursor;
pub mod landmarks;
mod mapper;
mod pinch;
mod pose;
pub mod synthetic;

pub use cursor::{pose_index_tip, CursorSmoother};
pub use landmarks::{HandFrame, HandId, LandmarkFrame, MAX_HANDS};
pub use mapper::CoordinateMapper;
pub use pinch::{PinchEdge, PinchGestureDetector, PinchState};
pub use pose::{classify, HandPose};
