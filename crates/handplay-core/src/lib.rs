//! handplay-core: gesture interaction engine for camera-driven exhibits
//!
//! This crate turns a per-frame stream of hand and body landmarks into
//! reliable, debounced interaction events:
//! - Image-space to play-space coordinate mapping
//! - Pinch detection with hysteresis and a release grace period
//! - Per-hand grab / follow / deliver state machine with hand-loss grace
//! - Dwell-to-select targets with modal locking
//! - Rejection-sampling entity placement with category balancing
//! - Open palm / fist poses, fist-hold and two-hand pinch gestures

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod input;
pub mod interaction;
pub mod placement;
pub mod spatial;

// Re-export commonly used types
pub use config::{EngineConfig, ExhibitLayout};
pub use engine::{HandTrackerState, InteractionEngine, SessionStats};
pub use error::{EngineError, Result};
pub use event::{InteractionEvent, ReleaseReason, TickOutput};
pub use input::{HandFrame, HandPose, LandmarkFrame};
pub use interaction::{Category, DeliveryZone, DwellTarget, GrabPhase, GrabbableEntity, SizeClass};
pub use spatial::{PlayBounds, Point2, Point3};
